use crate::core::{
    connectivity::{self, Transports},
    history::{self, Trail},
    legality,
    location::{Location, PlaceId, PlaceType},
    map::Atlas,
    play_log::{self, Encounter, MalformedLog, TurnEvent},
    player::PlayerId,
    rule_helper::{self, NUM_PLAYERS},
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("malformed play log: {0}")]
    Malformed(#[from] MalformedLog),
    #[error("map has no place abbreviated '{0}'")]
    MissingLandmark(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[readonly::make]
pub struct GameSnapshot {
    pub round: usize,
    pub current_player: PlayerId,
    pub score: i32,
    pub health: [i32; NUM_PLAYERS],
}

/// Everything that can be worked out from a play log, seen by nobody in particular.
///
/// The log is decoded once; every other answer is recomputed from the decoded
/// records on each call.
#[derive(Clone, Debug)]
pub struct GameView<'m, M> {
    map: &'m M,
    play_log: String,
    events: Vec<TurnEvent>,
    hospital: PlaceId,
    castle: PlaceId,
}

impl<'m, M: Atlas> GameView<'m, M> {
    pub fn new(play_log: &str, map: &'m M) -> Result<Self, ViewError> {
        let hospital = map
            .place_by_abbrev(rule_helper::HOSPITAL_ABBREV)
            .ok_or(ViewError::MissingLandmark(rule_helper::HOSPITAL_ABBREV))?;
        let castle = map
            .place_by_abbrev(rule_helper::CASTLE_DRACULA_ABBREV)
            .ok_or(ViewError::MissingLandmark(rule_helper::CASTLE_DRACULA_ABBREV))?;
        let events = play_log::decode_play_log(play_log, map)?;

        Ok(Self {
            map,
            play_log: play_log.to_string(),
            events,
            hospital,
            castle,
        })
    }

    pub fn map(&self) -> &'m M {
        self.map
    }

    pub fn play_log(&self) -> &str {
        &self.play_log
    }

    pub fn events(&self) -> &[TurnEvent] {
        &self.events
    }

    pub fn hospital(&self) -> PlaceId {
        self.hospital
    }

    pub fn castle(&self) -> PlaceId {
        self.castle
    }

    pub fn round(&self) -> usize {
        self.events.len() / NUM_PLAYERS
    }

    pub fn current_player(&self) -> PlayerId {
        PlayerId::for_record(self.events.len())
    }

    pub fn score(&self) -> i32 {
        let hospital_visits: usize = PlayerId::hunters()
            .map(|hunter| self.hospital_visits(hunter))
            .sum();

        rule_helper::GAME_START_SCORE
            - rule_helper::SCORE_LOSS_DRACULA_TURN * self.round() as i32
            - rule_helper::SCORE_LOSS_HUNTER_HOSPITAL * hospital_visits as i32
            - rule_helper::SCORE_LOSS_VAMPIRE_MATURES * self.matured_vampires() as i32
    }

    pub fn health(&self, player_id: PlayerId) -> i32 {
        if player_id.is_dracula() {
            let hunter_encounters: usize = PlayerId::hunters()
                .map(|hunter| self.count_encounters(hunter, Encounter::Dracula))
                .sum();

            rule_helper::start_health(player_id)
                - rule_helper::LIFE_LOSS_HUNTER_ENCOUNTER * hunter_encounters as i32
                - rule_helper::LIFE_LOSS_SEA * self.dracula_turns_at_sea() as i32
                + rule_helper::LIFE_GAIN_CASTLE_DRACULA * self.dracula_turns_at_castle() as i32
        } else {
            let start = rule_helper::start_health(player_id);
            let health = start
                - rule_helper::LIFE_LOSS_TRAP_ENCOUNTER
                    * self.count_encounters(player_id, Encounter::Trap) as i32
                - rule_helper::LIFE_LOSS_DRACULA_ENCOUNTER
                    * self.count_encounters(player_id, Encounter::Dracula) as i32
                + rule_helper::LIFE_GAIN_REST * self.turns_rested(player_id) as i32;
            health.min(start)
        }
    }

    /// Most recent move of `player_id` as recorded, markers included.
    pub fn location(&self, player_id: PlayerId) -> Location {
        self.trail(player_id).latest()
    }

    /// Most recent move of `player_id` with hide, teleport and double-back traced back.
    pub fn resolved_location(&self, player_id: PlayerId) -> Location {
        self.resolved_trail(player_id).latest()
    }

    pub fn trail(&self, player_id: PlayerId) -> Trail {
        history::trail(&self.events, player_id)
    }

    pub fn resolved_trail(&self, player_id: PlayerId) -> Trail {
        history::resolved_trail(&self.events, player_id, self.castle)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut health = [0; NUM_PLAYERS];
        for player_id in PlayerId::all() {
            health[player_id.0] = self.health(player_id);
        }

        GameSnapshot {
            round: self.round(),
            current_player: self.current_player(),
            score: self.score(),
            health,
        }
    }

    pub fn connected_locations(
        &self,
        from: PlaceId,
        player_id: PlayerId,
        round: usize,
        transports: Transports,
    ) -> HashSet<PlaceId> {
        connectivity::connections(self.map, from, player_id, round, transports, self.hospital)
    }

    /// Round in which `player_id` makes their next move.
    pub fn next_round_for(&self, player_id: PlayerId) -> usize {
        if player_id >= self.current_player() {
            self.round()
        } else {
            self.round() + 1
        }
    }

    /// Where `player_id` could legally end their next move in `round`.
    ///
    /// A player with no recorded move may start anywhere (Dracula: any land
    /// place but the hospital). A player whose whereabouts are concealed gets
    /// an empty set.
    pub fn possible_moves(
        &self,
        player_id: PlayerId,
        round: usize,
        transports: Transports,
    ) -> HashSet<Location> {
        if player_id.is_dracula() {
            self.dracula_moves(round, transports.without_rail())
        } else {
            match self.location(player_id) {
                Location::Unknown => self
                    .map
                    .place_ids()
                    .into_iter()
                    .map(Location::Place)
                    .collect(),
                Location::Place(from) => self
                    .connected_locations(from, player_id, round, transports)
                    .into_iter()
                    .map(Location::Place)
                    .collect(),
                _ => HashSet::new(),
            }
        }
    }

    fn dracula_moves(&self, round: usize, transports: Transports) -> HashSet<Location> {
        let trail = self.trail(PlayerId::DRACULA);
        let resolved_trail = self.resolved_trail(PlayerId::DRACULA);
        if !trail.is_consistent() {
            log::warn!("dracula trail {trail} holds more than one hide or double back");
        }

        match resolved_trail.latest() {
            Location::Unknown if trail.known_len() == 0 => self
                .map
                .place_ids()
                .into_iter()
                .filter(|place_id| {
                    *place_id != self.hospital && self.map.place_type(*place_id) == PlaceType::Land
                })
                .map(Location::Place)
                .collect(),
            Location::Place(from) => {
                let candidates = self
                    .connected_locations(from, PlayerId::DRACULA, round, transports)
                    .into_iter()
                    .map(Location::Place)
                    .chain(legality::special_moves());
                legality::legal_moves(
                    candidates,
                    &trail,
                    &resolved_trail,
                    self.map.place_type(from),
                )
            }
            _ => HashSet::new(),
        }
    }

    pub fn location_text(&self, location: Location) -> String {
        match location {
            Location::Place(place_id) => self
                .map
                .abbrev(place_id)
                .map(str::to_string)
                .unwrap_or_else(|| location.to_string()),
            other => other.to_string(),
        }
    }

    pub fn trail_text(&self, trail: &Trail) -> String {
        trail
            .iter()
            .map(|location| self.location_text(location))
            .join(",")
    }

    pub fn summary(&self, leading_text: &str, trail_of: impl Fn(PlayerId) -> Trail) -> String {
        let mut sb = format!(
            "{leading_text}Round {}, {} to move, Score={}",
            self.round(),
            self.current_player().name(),
            self.score()
        );

        for player_id in PlayerId::all() {
            sb.push_str(&format!(
                "\n{leading_text}  {}(HP{:>2}) [{}]",
                player_id,
                self.health(player_id),
                self.trail_text(&trail_of(player_id)),
            ));

            if player_id == self.current_player() {
                sb.push_str(" *");
            }
        }

        sb
    }

    fn player_events(&self, player_id: PlayerId) -> impl Iterator<Item = &TurnEvent> + '_ {
        self.events
            .iter()
            .filter(move |event| event.player_id == player_id)
    }

    fn count_encounters(&self, player_id: PlayerId, encounter: Encounter) -> usize {
        self.player_events(player_id)
            .map(|event| event.count(encounter))
            .sum()
    }

    fn hospital_visits(&self, player_id: PlayerId) -> usize {
        self.player_events(player_id)
            .filter(|event| event.location == Location::Place(self.hospital))
            .count()
    }

    fn matured_vampires(&self) -> usize {
        self.count_encounters(PlayerId::DRACULA, Encounter::VampireMatured)
    }

    /// Every pair of consecutive moves to the same place counts as one rest.
    fn turns_rested(&self, player_id: PlayerId) -> usize {
        history::move_history(&self.events, player_id)
            .iter()
            .tuple_windows()
            .filter(|(previous, next)| previous == next)
            .count()
    }

    fn dracula_places(&self) -> Vec<Location> {
        history::resolve_history(
            &history::move_history(&self.events, PlayerId::DRACULA),
            self.castle,
        )
    }

    fn dracula_turns_at_sea(&self) -> usize {
        self.dracula_places()
            .into_iter()
            .filter(|location| match location {
                Location::SeaUnknown => true,
                Location::Place(place_id) => self.map.place_type(*place_id) == PlaceType::Sea,
                _ => false,
            })
            .count()
    }

    fn dracula_turns_at_castle(&self) -> usize {
        self.dracula_places()
            .into_iter()
            .filter(|location| *location == Location::Place(self.castle))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::map::{EuropeMap, PlaceLookup};

    fn europe() -> EuropeMap {
        EuropeMap::from_embedded_json().unwrap()
    }

    fn at(map: &EuropeMap, abbrev: &str) -> Location {
        Location::Place(map.place_by_abbrev(abbrev).unwrap())
    }

    #[test]
    fn empty_log_is_start_of_game() {
        let map = europe();
        let view = GameView::new("", &map).unwrap();

        assert_eq!(view.round(), 0);
        assert_eq!(view.current_player(), PlayerId::LORD_GODALMING);
        assert_eq!(view.score(), rule_helper::GAME_START_SCORE);
        assert_eq!(view.health(PlayerId::DR_SEWARD), rule_helper::GAME_START_HUNTER_LIFE_POINTS);
        assert_eq!(view.health(PlayerId::DRACULA), rule_helper::GAME_START_BLOOD_POINTS);
        for player_id in PlayerId::all() {
            assert_eq!(view.location(player_id), Location::Unknown);
        }
    }

    #[test]
    fn malformed_log_fails_construction() {
        let map = europe();
        assert!(matches!(
            GameView::new("GST..", &map),
            Err(ViewError::Malformed(MalformedLog::BadLength { .. }))
        ));
    }

    #[test]
    fn current_player_cycles_each_record() {
        let map = europe();
        let records = ["GST....", "SAO....", "HZU....", "MBB....", "DC?...."];
        for len in 0..=records.len() {
            let log = records[..len].join(" ");
            let view = GameView::new(&log, &map).unwrap();
            assert_eq!(view.current_player(), PlayerId(len % NUM_PLAYERS));
        }
    }

    #[test]
    fn first_round_locations() {
        let map = europe();
        let view = GameView::new("GST.... SAO.... HZU.... MBB.... DC?....", &map).unwrap();

        assert_eq!(view.round(), 1);
        assert_eq!(view.current_player(), PlayerId::LORD_GODALMING);
        assert_eq!(view.location(PlayerId::LORD_GODALMING), at(&map, "ST"));
        assert_eq!(view.location(PlayerId::DR_SEWARD), at(&map, "AO"));
        assert_eq!(view.location(PlayerId::VAN_HELSING), at(&map, "ZU"));
        assert_eq!(view.location(PlayerId::MINA_HARKER), at(&map, "BB"));
        assert_eq!(view.location(PlayerId::DRACULA), Location::CityUnknown);
        assert_eq!(view.score(), rule_helper::GAME_START_SCORE - 1);
    }

    #[test]
    fn confronting_dracula_costs_both_sides() {
        let map = europe();
        let view =
            GameView::new("GST.... SAO.... HCD.... MAO.... DGE.... GGED...", &map).unwrap();

        assert_eq!(view.location(PlayerId::DRACULA), at(&map, "GE"));
        assert_eq!(view.health(PlayerId::LORD_GODALMING), 5);
        assert_eq!(view.health(PlayerId::DRACULA), 30);
        assert_eq!(
            view.trail(PlayerId::LORD_GODALMING),
            Trail::from_slots([at(&map, "GE"), at(&map, "ST")])
        );
        assert_eq!(
            view.trail(PlayerId::DR_SEWARD),
            Trail::from_slots([at(&map, "AO")])
        );
    }

    #[test]
    fn double_back_to_sea_costs_blood() {
        let map = europe();
        let view = GameView::new(
            "GGE.... SGE.... HGE.... MGE.... DS?.... GST.... SST.... HST.... MST.... DD1....",
            &map,
        )
        .unwrap();

        assert_eq!(view.location(PlayerId::DRACULA), Location::DoubleBack(1));
        let trail = view.trail(PlayerId::DRACULA);
        assert_eq!(trail.get(0), Location::DoubleBack(1));
        assert_eq!(trail.get(1), Location::SeaUnknown);
        assert_eq!(view.health(PlayerId::DRACULA), rule_helper::GAME_START_BLOOD_POINTS - 4);
        assert_eq!(view.current_player(), PlayerId::LORD_GODALMING);
    }

    #[test]
    fn double_back_to_known_sea_costs_blood() {
        let map = europe();
        let view = GameView::new(
            "GGE.... SGE.... HGE.... MGE.... DEC.... GST.... SST.... HST.... MST.... DD1....",
            &map,
        )
        .unwrap();

        assert_eq!(view.trail(PlayerId::DRACULA).get(1), at(&map, "EC"));
        assert_eq!(view.resolved_location(PlayerId::DRACULA), at(&map, "EC"));
        assert_eq!(view.health(PlayerId::DRACULA), rule_helper::GAME_START_BLOOD_POINTS - 4);
    }

    #[test]
    fn resting_heals_every_repeat_up_to_cap() {
        let map = europe();
        let view = GameView::new(
            "GGETT.. SGE.... HGE.... MGE.... DKL.... \
             GGE.... SGE.... HGE.... MGE.... DBC.... \
             GGE.... SGE.... HGE.... MGE.... DCN....",
            &map,
        )
        .unwrap();

        // 9 - 4 for traps + 3 + 3 for two rests, capped at 9
        assert_eq!(view.health(PlayerId::LORD_GODALMING), 9);
        assert_eq!(view.health(PlayerId::DR_SEWARD), 9);
    }

    #[test]
    fn hunter_health_can_go_negative() {
        let map = europe();
        let view = GameView::new(
            "GGEDDD. SGE.... HGE.... MGE.... DGE.... GSTTT..",
            &map,
        )
        .unwrap();
        assert_eq!(view.health(PlayerId::LORD_GODALMING), 9 - 12 - 4);
    }

    #[test]
    fn hospital_and_matured_vampires_cost_score() {
        let map = europe();
        let view = GameView::new(
            "GJM.... SGE.... HGE.... MGE.... DKL..V. \
             GJM.... SGE.... HGE.... MGE.... DCD....",
            &map,
        )
        .unwrap();

        assert_eq!(view.score(), rule_helper::GAME_START_SCORE - 2 - 12 - 13);
    }

    #[test]
    fn castle_turns_restore_blood() {
        let map = europe();
        let view = GameView::new(
            "GGE.... SGE.... HGE.... MGE.... DCD.... \
             GGE.... SGE.... HGE.... MGE.... DHI.... \
             GGE.... SGE.... HGE.... MGE.... DGA.... \
             GGE.... SGE.... HGE.... MGE.... DTP....",
            &map,
        )
        .unwrap();

        assert_eq!(view.health(PlayerId::DRACULA), rule_helper::GAME_START_BLOOD_POINTS + 30);
        assert_eq!(view.resolved_location(PlayerId::DRACULA), at(&map, "CD"));
        assert_eq!(view.location(PlayerId::DRACULA), Location::Teleported);
    }

    #[test]
    fn snapshot_collects_derived_state() {
        let map = europe();
        let view =
            GameView::new("GST.... SAO.... HCD.... MAO.... DGE.... GGED...", &map).unwrap();
        let snapshot = view.snapshot();

        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.current_player, PlayerId::DR_SEWARD);
        assert_eq!(snapshot.health, [5, 9, 9, 9, 30]);
    }

    #[test]
    fn next_round_depends_on_turn_order() {
        let map = europe();
        let view = GameView::new("GST.... SAO.... HCD....", &map).unwrap();
        assert_eq!(view.next_round_for(PlayerId::LORD_GODALMING), 1);
        assert_eq!(view.next_round_for(PlayerId::MINA_HARKER), 0);
        assert_eq!(view.next_round_for(PlayerId::DRACULA), 0);
    }

    #[test]
    fn unplaced_hunter_may_start_anywhere() {
        let map = europe();
        let view = GameView::new("", &map).unwrap();
        let moves = view.possible_moves(PlayerId::LORD_GODALMING, 0, Transports::ALL);
        assert_eq!(moves.len(), map.place_ids().len());
    }

    #[test]
    fn concealed_dracula_has_no_known_moves() {
        let map = europe();
        let view = GameView::new("GST.... SAO.... HZU.... MBB.... DC?....", &map).unwrap();
        assert!(view.possible_moves(PlayerId::DRACULA, 1, Transports::ALL).is_empty());
    }
}

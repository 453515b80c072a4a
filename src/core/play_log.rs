use crate::core::{
    location::Location,
    map::PlaceLookup,
    player::PlayerId,
    rule_helper::{MAX_ENCOUNTERS, NO_ENCOUNTER, RECORD_SEPARATOR, RECORD_STRIDE, RECORD_WIDTH},
};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Offset of the first encounter character within a record.
const ENCOUNTER_OFFSET: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Encounter {
    /// Hunter: walked into a trap. Dracula: placed one.
    Trap,
    /// Hunter: found an immature vampire. Dracula: placed one.
    Vampire,
    /// Hunter confronted Dracula.
    Dracula,
    /// A trap fell off the end of Dracula's trail.
    TrapVanished,
    /// A vampire fell off the end of Dracula's trail and matured.
    VampireMatured,
}

impl Encounter {
    fn hunter_flag(flag: char) -> Option<Option<Encounter>> {
        match flag {
            NO_ENCOUNTER => Some(None),
            'T' => Some(Some(Encounter::Trap)),
            'V' => Some(Some(Encounter::Vampire)),
            'D' => Some(Some(Encounter::Dracula)),
            _ => None,
        }
    }

    fn dracula_flag(slot: usize, flag: char) -> Option<Option<Encounter>> {
        match (slot, flag) {
            (_, NO_ENCOUNTER) => Some(None),
            (0, 'T') => Some(Some(Encounter::Trap)),
            (1, 'V') => Some(Some(Encounter::Vampire)),
            (2, 'M') => Some(Some(Encounter::TrapVanished)),
            (2, 'V') => Some(Some(Encounter::VampireMatured)),
            _ => None,
        }
    }

    fn flag(self) -> char {
        match self {
            Encounter::Trap => 'T',
            Encounter::Vampire | Encounter::VampireMatured => 'V',
            Encounter::Dracula => 'D',
            Encounter::TrapVanished => 'M',
        }
    }

    fn dracula_slot(self) -> Option<usize> {
        match self {
            Encounter::Trap => Some(0),
            Encounter::Vampire => Some(1),
            Encounter::TrapVanished | Encounter::VampireMatured => Some(2),
            Encounter::Dracula => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedLog {
    #[error("play log length {length} is not a whole number of {width}-character records")]
    BadLength { length: usize, width: usize },
    #[error("play log contains non-ascii text")]
    NotAscii,
    #[error("record {record_idx} is not followed by a separator")]
    MissingSeparator { record_idx: usize },
    #[error("record {record_idx} has unknown player tag '{tag}'")]
    UnknownPlayer { record_idx: usize, tag: char },
    #[error("record {record_idx} belongs to {expected} but is tagged {found}")]
    WrongPlayer {
        record_idx: usize,
        expected: PlayerId,
        found: PlayerId,
    },
    #[error("record {record_idx} has unknown location code '{code}'")]
    UnknownLocationCode { record_idx: usize, code: String },
    #[error("record {record_idx} has unknown encounter '{flag}' in slot {slot}")]
    UnknownEncounter {
        record_idx: usize,
        slot: usize,
        flag: char,
    },
    #[error("record {record_idx} cannot encode location {location}")]
    UnencodableLocation {
        record_idx: usize,
        location: Location,
    },
    #[error("record {record_idx} has more than {} encounters", MAX_ENCOUNTERS)]
    TooManyEncounters { record_idx: usize },
    #[error("record {record_idx} cannot carry encounter {encounter:?}")]
    MisplacedEncounter {
        record_idx: usize,
        encounter: Encounter,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[readonly::make]
pub struct TurnEvent {
    pub player_id: PlayerId,
    pub location: Location,
    pub encounters: Vec<Encounter>,
}

impl TurnEvent {
    pub fn new(
        player_id: PlayerId,
        location: Location,
        encounters: impl IntoIterator<Item = Encounter>,
    ) -> Self {
        Self {
            player_id,
            location,
            encounters: encounters.into_iter().collect(),
        }
    }

    pub fn count(&self, encounter: Encounter) -> usize {
        self.encounters
            .iter()
            .filter(|candidate| **candidate == encounter)
            .count()
    }

    pub fn has(&self, encounter: Encounter) -> bool {
        self.encounters.contains(&encounter)
    }
}

impl fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}[{}]",
            self.player_id,
            self.location,
            self.encounters.iter().map(|encounter| encounter.flag()).join("")
        )
    }
}

pub fn record_count(play_log: &str) -> usize {
    play_log.len().div_ceil(RECORD_STRIDE)
}

/// Appends whitespace-separated `records` to `play_log`, normalizing separators.
pub fn append_records(play_log: &str, records: &str) -> String {
    play_log
        .split_whitespace()
        .chain(records.split_whitespace())
        .join(&RECORD_SEPARATOR.to_string())
}

/// `play_log` without its final record.
pub fn drop_last_record(play_log: &str) -> &str {
    let remaining = record_count(play_log).saturating_sub(1);
    let end = (remaining * RECORD_STRIDE).saturating_sub(1).min(play_log.len());
    &play_log[..end]
}

pub fn decode_play_log(
    play_log: &str,
    lookup: &impl PlaceLookup,
) -> Result<Vec<TurnEvent>, MalformedLog> {
    if !play_log.is_ascii() {
        return Err(MalformedLog::NotAscii);
    }

    let length = play_log.len();
    if length % RECORD_STRIDE != 0 && length % RECORD_STRIDE != RECORD_WIDTH {
        return Err(MalformedLog::BadLength {
            length,
            width: RECORD_STRIDE,
        });
    }

    let events = play_log
        .as_bytes()
        .chunks(RECORD_STRIDE)
        .enumerate()
        .map(|(record_idx, chunk)| decode_record(record_idx, chunk, lookup))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("decoded {} play records", events.len());
    Ok(events)
}

fn decode_record(
    record_idx: usize,
    chunk: &[u8],
    lookup: &impl PlaceLookup,
) -> Result<TurnEvent, MalformedLog> {
    let chars = chunk.iter().map(|byte| *byte as char).collect::<Vec<_>>();

    if chars.len() == RECORD_STRIDE && chars[RECORD_WIDTH] != RECORD_SEPARATOR {
        return Err(MalformedLog::MissingSeparator { record_idx });
    }

    let tag = chars[0];
    let found = PlayerId::from_tag(tag).ok_or(MalformedLog::UnknownPlayer { record_idx, tag })?;
    let expected = PlayerId::for_record(record_idx);
    if found != expected {
        return Err(MalformedLog::WrongPlayer {
            record_idx,
            expected,
            found,
        });
    }

    let code = chars[1..ENCOUNTER_OFFSET].iter().collect::<String>();
    let location = lookup
        .place_by_abbrev(&code)
        .map(Location::Place)
        .or_else(|| Location::from_special_code(&code))
        .ok_or_else(|| MalformedLog::UnknownLocationCode {
            record_idx,
            code: code.clone(),
        })?;

    let mut encounters = Vec::new();
    for (slot, flag) in chars[ENCOUNTER_OFFSET..RECORD_WIDTH].iter().copied().enumerate() {
        let decoded = if found.is_dracula() {
            Encounter::dracula_flag(slot, flag)
        } else {
            Encounter::hunter_flag(flag)
        };

        match decoded {
            Some(Some(encounter)) => encounters.push(encounter),
            Some(None) => {}
            None => {
                return Err(MalformedLog::UnknownEncounter {
                    record_idx,
                    slot,
                    flag,
                });
            }
        }
    }

    Ok(TurnEvent::new(found, location, encounters))
}

/// Writes events back out in play-log form, records joined by single spaces.
pub fn encode_play_log(
    events: &[TurnEvent],
    lookup: &impl PlaceLookup,
) -> Result<String, MalformedLog> {
    let records = events
        .iter()
        .enumerate()
        .map(|(record_idx, event)| encode_record(record_idx, event, lookup))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records.join(&RECORD_SEPARATOR.to_string()))
}

fn encode_record(
    record_idx: usize,
    event: &TurnEvent,
    lookup: &impl PlaceLookup,
) -> Result<String, MalformedLog> {
    let code = match event.location {
        Location::Place(place_id) => lookup.abbrev(place_id).map(str::to_string),
        other => other.special_code(),
    }
    .ok_or(MalformedLog::UnencodableLocation {
        record_idx,
        location: event.location,
    })?;

    let mut slots = [NO_ENCOUNTER; MAX_ENCOUNTERS];
    if event.player_id.is_dracula() {
        for encounter in &event.encounters {
            let slot = encounter
                .dracula_slot()
                .ok_or(MalformedLog::MisplacedEncounter {
                    record_idx,
                    encounter: *encounter,
                })?;
            slots[slot] = encounter.flag();
        }
    } else {
        if event.encounters.len() > MAX_ENCOUNTERS {
            return Err(MalformedLog::TooManyEncounters { record_idx });
        }
        for (slot, encounter) in event.encounters.iter().enumerate() {
            slots[slot] = encounter.flag();
        }
    }

    Ok(format!(
        "{}{}{}",
        event.player_id.tag(),
        code,
        slots.iter().collect::<String>()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        location::{PlaceId, MAX_DOUBLE_BACK},
        map::EuropeMap,
    };

    fn europe() -> EuropeMap {
        EuropeMap::from_embedded_json().unwrap()
    }

    #[test]
    fn empty_log_has_no_events() {
        assert_eq!(decode_play_log("", &europe()), Ok(Vec::new()));
    }

    #[test]
    fn first_round_decodes() {
        let map = europe();
        let events = decode_play_log("GST.... SAO.... HZU.... MBB.... DC?....", &map).unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].player_id, PlayerId::LORD_GODALMING);
        assert_eq!(
            events[0].location,
            Location::Place(map.place_by_abbrev("ST").unwrap())
        );
        assert_eq!(events[4].player_id, PlayerId::DRACULA);
        assert_eq!(events[4].location, Location::CityUnknown);
        assert!(events.iter().all(|event| event.encounters.is_empty()));
    }

    #[test]
    fn trailing_separator_is_accepted() {
        let map = europe();
        let events = decode_play_log("GST.... SAO.... ", &map).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(record_count("GST.... SAO.... "), 2);
        assert_eq!(record_count("GST.... SAO...."), 2);
    }

    #[test]
    fn hunter_encounters_are_counted() {
        let events = decode_play_log("GGETTD.", &europe()).unwrap();
        assert_eq!(events[0].count(Encounter::Trap), 2);
        assert_eq!(events[0].count(Encounter::Dracula), 1);
        assert!(!events[0].has(Encounter::Vampire));
    }

    #[test]
    fn dracula_flags_depend_on_slot() {
        let map = europe();
        let log = "GGE.... SGE.... HGE.... MGE.... DCDTVM.";
        let events = decode_play_log(log, &map).unwrap();
        assert_eq!(
            events[4].encounters,
            vec![Encounter::Trap, Encounter::Vampire, Encounter::TrapVanished]
        );

        let matured = decode_play_log("GGE.... SGE.... HGE.... MGE.... DCD..V.", &map).unwrap();
        assert_eq!(matured[4].encounters, vec![Encounter::VampireMatured]);

        let misplaced = decode_play_log("GGE.... SGE.... HGE.... MGE.... DCDV...", &map);
        assert_eq!(
            misplaced,
            Err(MalformedLog::UnknownEncounter {
                record_idx: 4,
                slot: 0,
                flag: 'V'
            })
        );
    }

    #[test]
    fn special_codes_decode() {
        let map = europe();
        let log = "GGE.... SGE.... HGE.... MGE.... DS?.... \
                   GGE.... SGE.... HGE.... MGE.... DD1.... \
                   GGE.... SGE.... HGE.... MGE.... DHI.... \
                   GGE.... SGE.... HGE.... MGE.... DTP....";
        let events = decode_play_log(log, &map).unwrap();
        let dracula_moves = events
            .iter()
            .filter(|event| event.player_id.is_dracula())
            .map(|event| event.location)
            .collect::<Vec<_>>();
        assert_eq!(
            dracula_moves,
            vec![
                Location::SeaUnknown,
                Location::DoubleBack(1),
                Location::Hidden,
                Location::Teleported
            ]
        );
    }

    #[test]
    fn bad_length_is_rejected() {
        assert_eq!(
            decode_play_log("GST...", &europe()),
            Err(MalformedLog::BadLength {
                length: 6,
                width: RECORD_STRIDE
            })
        );
    }

    #[test]
    fn wrong_player_order_is_rejected() {
        assert_eq!(
            decode_play_log("SST....", &europe()),
            Err(MalformedLog::WrongPlayer {
                record_idx: 0,
                expected: PlayerId::LORD_GODALMING,
                found: PlayerId::DR_SEWARD
            })
        );
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let map = europe();
        assert_eq!(
            decode_play_log("GXX....", &map),
            Err(MalformedLog::UnknownLocationCode {
                record_idx: 0,
                code: "XX".to_string()
            })
        );
        assert!(matches!(
            decode_play_log("GST..Q.", &map),
            Err(MalformedLog::UnknownEncounter { slot: 2, flag: 'Q', .. })
        ));
        assert!(matches!(
            decode_play_log("QST....", &map),
            Err(MalformedLog::UnknownPlayer { tag: 'Q', .. })
        ));
        assert_eq!(
            decode_play_log("GST....xSAO....", &map),
            Err(MalformedLog::MissingSeparator { record_idx: 0 })
        );
    }

    #[test]
    fn synthetic_events_survive_encoding() {
        let map = europe();
        let events = vec![
            TurnEvent::new(PlayerId::LORD_GODALMING, Location::Place(PlaceId(60)), []),
            TurnEvent::new(
                PlayerId::DR_SEWARD,
                Location::Place(PlaceId(28)),
                [Encounter::Trap, Encounter::Vampire, Encounter::Dracula],
            ),
            TurnEvent::new(PlayerId::VAN_HELSING, Location::Place(PlaceId(59)), []),
            TurnEvent::new(PlayerId::MINA_HARKER, Location::Place(PlaceId(4)), []),
            TurnEvent::new(
                PlayerId::DRACULA,
                Location::DoubleBack(2),
                [Encounter::Trap, Encounter::VampireMatured],
            ),
            TurnEvent::new(PlayerId::LORD_GODALMING, Location::Place(PlaceId(60)), []),
        ];

        let text = encode_play_log(&events, &map).unwrap();
        assert_eq!(
            text,
            "GST.... SGETVD. HJM.... MAO.... DD2T.V. GST...."
        );
        assert_eq!(decode_play_log(&text, &map), Ok(events));
    }

    #[test]
    fn unknown_locations_cannot_be_encoded() {
        let events = vec![TurnEvent::new(PlayerId::LORD_GODALMING, Location::Unknown, [])];
        assert_eq!(
            encode_play_log(&events, &europe()),
            Err(MalformedLog::UnencodableLocation {
                record_idx: 0,
                location: Location::Unknown
            })
        );
    }

    #[test]
    fn double_backs_outside_log_range_cannot_be_encoded() {
        for depth in [0, MAX_DOUBLE_BACK + 1] {
            let location = Location::DoubleBack(depth);
            let events = vec![
                TurnEvent::new(PlayerId::LORD_GODALMING, Location::Place(PlaceId(17)), []),
                TurnEvent::new(PlayerId::DR_SEWARD, location, []),
            ];
            assert_eq!(
                encode_play_log(&events, &europe()),
                Err(MalformedLog::UnencodableLocation {
                    record_idx: 1,
                    location
                })
            );
        }
    }

    #[test]
    fn records_are_appended_and_dropped() {
        let log = append_records("", "GST....  SAO....");
        assert_eq!(log, "GST.... SAO....");
        let log = append_records(&log, " HZU.... ");
        assert_eq!(log, "GST.... SAO.... HZU....");

        assert_eq!(drop_last_record(&log), "GST.... SAO....");
        assert_eq!(drop_last_record("GST.... "), "");
        assert_eq!(drop_last_record(""), "");
    }
}

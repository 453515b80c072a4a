use crate::core::{
    connectivity::Transports,
    game_view::{GameView, ViewError},
    history::Trail,
    location::Location,
    map::Atlas,
    minions::{MinionState, Minions},
    player::PlayerId,
};
use std::collections::HashSet;

/// The game as Dracula sees it. Every hide, teleport and double-back is traced
/// to the place it stands for.
#[derive(Clone, Debug)]
pub struct DraculaView<'m, M> {
    game: GameView<'m, M>,
}

impl<'m, M: Atlas> DraculaView<'m, M> {
    pub fn new(play_log: &str, map: &'m M) -> Result<Self, ViewError> {
        Ok(Self {
            game: GameView::new(play_log, map)?,
        })
    }

    pub fn game(&self) -> &GameView<'m, M> {
        &self.game
    }

    pub fn round(&self) -> usize {
        self.game.round()
    }

    pub fn current_player(&self) -> PlayerId {
        self.game.current_player()
    }

    pub fn score(&self) -> i32 {
        self.game.score()
    }

    pub fn health(&self, player_id: PlayerId) -> i32 {
        self.game.health(player_id)
    }

    pub fn where_is(&self, player_id: PlayerId) -> Location {
        self.game.resolved_location(player_id)
    }

    pub fn trail(&self, player_id: PlayerId) -> Trail {
        self.game.resolved_trail(player_id)
    }

    /// Where `player_id` started and ended their latest move.
    pub fn last_move(&self, player_id: PlayerId) -> (Location, Location) {
        let trail = self.trail(player_id);
        (trail.get(1), trail.get(0))
    }

    pub fn minions(&self) -> MinionState {
        MinionState::replay(self.game.events(), self.game.castle())
    }

    pub fn whats_there(&self, location: Location) -> Minions {
        self.minions().whats_there(location)
    }

    pub fn where_can_i_go(&self, road: bool, sea: bool) -> HashSet<Location> {
        self.where_can_they_go(PlayerId::DRACULA, Transports::new(road, false, sea))
    }

    pub fn where_can_they_go(
        &self,
        player_id: PlayerId,
        transports: Transports,
    ) -> HashSet<Location> {
        self.game
            .possible_moves(player_id, self.game.next_round_for(player_id), transports)
    }
}

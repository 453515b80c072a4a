use crate::core::{
    connectivity::Transports,
    game_view::{GameView, ViewError},
    history::Trail,
    location::Location,
    map::Atlas,
    player::PlayerId,
};
use std::collections::HashSet;

/// The game as a hunter sees it: Dracula's moves only as far as the log reveals them.
#[derive(Clone, Debug)]
pub struct HunterView<'m, M> {
    game: GameView<'m, M>,
}

impl<'m, M: Atlas> HunterView<'m, M> {
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

    /// The hunter whose turn it is, which is the hunter holding this view.
    pub fn who_am_i(&self) -> PlayerId {
        self.game.current_player()
    }

    pub fn score(&self) -> i32 {
        self.game.score()
    }

    pub fn health(&self, player_id: PlayerId) -> i32 {
        self.game.health(player_id)
    }

    pub fn where_is(&self, player_id: PlayerId) -> Location {
        self.game.location(player_id)
    }

    pub fn trail(&self, player_id: PlayerId) -> Trail {
        self.game.trail(player_id)
    }

    pub fn where_can_i_go(&self, transports: Transports) -> HashSet<Location> {
        self.where_can_they_go(self.who_am_i(), transports)
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

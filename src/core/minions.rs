use crate::core::{
    history::resolve_history,
    location::{Location, PlaceId},
    play_log::{Encounter, TurnEvent},
    rule_helper::TRAIL_SIZE,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Minions {
    pub traps: u32,
    pub vampires: u32,
}

/// Traps and the immature vampire Dracula has left on the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinionState {
    trap_counts: HashMap<PlaceId, u32>,
    vampire: Option<PlaceId>,
}

impl MinionState {
    pub fn replay(events: &[TurnEvent], castle: PlaceId) -> Self {
        let dracula_moves = events
            .iter()
            .filter(|event| event.player_id.is_dracula())
            .map(|event| event.location)
            .collect::<Vec<_>>();
        let dracula_places = resolve_history(&dracula_moves, castle);

        let mut state = MinionState::default();
        let mut dracula_turn = 0;

        for event in events {
            if event.player_id.is_dracula() {
                let here = dracula_places[dracula_turn].place();
                let left_trail = dracula_turn
                    .checked_sub(TRAIL_SIZE)
                    .and_then(|idx| dracula_places[idx].place());

                for encounter in &event.encounters {
                    match encounter {
                        Encounter::Trap => state.add_trap(here),
                        Encounter::Vampire => state.vampire = here,
                        Encounter::TrapVanished => state.remove_trap(left_trail),
                        Encounter::VampireMatured => state.vampire = None,
                        Encounter::Dracula => {}
                    }
                }
                dracula_turn += 1;
            } else {
                let here = event.location.place();
                for encounter in &event.encounters {
                    match encounter {
                        Encounter::Trap | Encounter::Dracula => state.remove_trap(here),
                        Encounter::Vampire => state.vampire = None,
                        Encounter::TrapVanished | Encounter::VampireMatured => {}
                    }
                }
            }
        }

        state
    }

    fn add_trap(&mut self, place_id: Option<PlaceId>) {
        if let Some(place_id) = place_id {
            *self.trap_counts.entry(place_id).or_insert(0) += 1;
        }
    }

    fn remove_trap(&mut self, place_id: Option<PlaceId>) {
        let Some(place_id) = place_id else {
            return;
        };

        if let Some(count) = self.trap_counts.get_mut(&place_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.trap_counts.remove(&place_id);
            }
        }
    }

    pub fn trap_count(&self, place_id: PlaceId) -> u32 {
        self.trap_counts.get(&place_id).copied().unwrap_or(0)
    }

    pub fn vampire(&self) -> Option<PlaceId> {
        self.vampire
    }

    pub fn whats_there(&self, location: Location) -> Minions {
        let Some(place_id) = location.place() else {
            return Minions::default();
        };

        Minions {
            traps: self.trap_count(place_id),
            vampires: u32::from(self.vampire == Some(place_id)),
        }
    }
}

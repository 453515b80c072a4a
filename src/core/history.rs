use crate::core::{
    location::{Location, PlaceId},
    play_log::TurnEvent,
    player::PlayerId,
    rule_helper::TRAIL_SIZE,
};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

/// The last `TRAIL_SIZE` moves of one player, most recent first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Trail([Location; TRAIL_SIZE]);

impl Trail {
    pub fn empty() -> Self {
        Trail([Location::Unknown; TRAIL_SIZE])
    }

    /// Builds a trail from a history listed oldest first.
    pub fn from_history(history: &[Location]) -> Self {
        let mut slots = [Location::Unknown; TRAIL_SIZE];
        for (slot, location) in slots.iter_mut().zip(history.iter().rev()) {
            *slot = *location;
        }
        Trail(slots)
    }

    /// Builds a trail from slots listed most recent first.
    pub fn from_slots(slots: impl IntoIterator<Item = Location>) -> Self {
        let mut trail = [Location::Unknown; TRAIL_SIZE];
        for (slot, location) in trail.iter_mut().zip(slots) {
            *slot = location;
        }
        Trail(trail)
    }

    pub fn get(&self, idx: usize) -> Location {
        self.0.get(idx).copied().unwrap_or(Location::Unknown)
    }

    pub fn latest(&self) -> Location {
        self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = Location> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, location: Location) -> bool {
        self.0.contains(&location)
    }

    pub fn contains_hide(&self) -> bool {
        self.contains(Location::Hidden)
    }

    pub fn contains_double_back(&self) -> bool {
        self.0.iter().any(|location| location.is_double_back())
    }

    /// Number of slots holding any information at all.
    pub fn known_len(&self) -> usize {
        self.0.iter().filter(|location| location.is_known()).count()
    }

    /// A legal log never leaves two hides or two double-backs in one window.
    pub fn is_consistent(&self) -> bool {
        let hides = self.0.iter().filter(|location| **location == Location::Hidden).count();
        let double_backs = self.0.iter().filter(|location| location.is_double_back()).count();
        hides <= 1 && double_backs <= 1
    }

    pub fn as_array(&self) -> [Location; TRAIL_SIZE] {
        self.0
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

/// Every move `player_id` made, oldest first, exactly as recorded.
pub fn move_history(events: &[TurnEvent], player_id: PlayerId) -> Vec<Location> {
    events
        .iter()
        .filter(|event| event.player_id == player_id)
        .map(|event| event.location)
        .collect()
}

/// Replaces hide, teleport and double-back markers with the place they stand for.
///
/// A hide repeats the previous resolved move, a teleport lands on `castle`, and
/// `DoubleBack(n)` repeats the resolved move made `n` of the player's own turns
/// earlier. Anything that cannot be traced back becomes `Location::Unknown`;
/// `CityUnknown` and `SeaUnknown` stay as they are.
pub fn resolve_history(moves: &[Location], castle: PlaceId) -> Vec<Location> {
    let mut resolved: Vec<Location> = Vec::with_capacity(moves.len());

    for (idx, location) in moves.iter().copied().enumerate() {
        let next = match location {
            Location::Hidden => resolved.last().copied().unwrap_or(Location::Unknown),
            Location::Teleported => Location::Place(castle),
            Location::DoubleBack(_) => location
                .double_back_depth()
                .and_then(|depth| idx.checked_sub(depth))
                .and_then(|earlier| resolved.get(earlier).copied())
                .unwrap_or(Location::Unknown),
            other => other,
        };
        resolved.push(next);
    }

    resolved
}

pub fn trail(events: &[TurnEvent], player_id: PlayerId) -> Trail {
    Trail::from_history(&move_history(events, player_id))
}

pub fn resolved_trail(events: &[TurnEvent], player_id: PlayerId, castle: PlaceId) -> Trail {
    Trail::from_history(&resolve_history(&move_history(events, player_id), castle))
}

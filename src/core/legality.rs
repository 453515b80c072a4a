use crate::core::{
    history::Trail,
    location::{Location, MAX_DOUBLE_BACK, PlaceType},
};
use std::collections::HashSet;

/// Special moves Dracula may always consider before filtering.
pub fn special_moves() -> impl Iterator<Item = Location> {
    std::iter::once(Location::Hidden).chain((1..=MAX_DOUBLE_BACK).map(Location::DoubleBack))
}

/// Removes the candidates Dracula's trail rules forbid.
///
/// `trail` holds the moves as recorded and `resolved_trail` the places they
/// stand for. `current_type` is the kind of place Dracula stands on, or
/// `PlaceType::Boundary` when that is not known.
pub fn legal_moves(
    candidates: impl IntoIterator<Item = Location>,
    trail: &Trail,
    resolved_trail: &Trail,
    current_type: PlaceType,
) -> HashSet<Location> {
    let hide_allowed = !trail.contains_hide() && current_type == PlaceType::Land;
    let double_back_allowed = !trail.contains_double_back();
    let known_len = trail.known_len();

    candidates
        .into_iter()
        .filter(|candidate| match candidate {
            Location::Hidden => hide_allowed,
            Location::DoubleBack(depth) => double_back_allowed && *depth as usize <= known_len,
            Location::Unknown => false,
            other => !trail.contains(*other) && !resolved_trail.contains(*other),
        })
        .collect()
}

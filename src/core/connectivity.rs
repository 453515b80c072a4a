use crate::core::{
    location::PlaceId,
    map::{MapGraph, Transport},
    player::PlayerId,
    rule_helper,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which kinds of edges a reachability query may use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transports {
    pub road: bool,
    pub rail: bool,
    pub sea: bool,
}

impl Transports {
    pub const ALL: Transports = Transports::new(true, true, true);
    pub const ROAD: Transports = Transports::new(true, false, false);
    pub const RAIL: Transports = Transports::new(false, true, false);
    pub const SEA: Transports = Transports::new(false, false, true);

    pub const fn new(road: bool, rail: bool, sea: bool) -> Self {
        Self { road, rail, sea }
    }

    pub fn without_rail(self) -> Self {
        Self { rail: false, ..self }
    }
}

impl Default for Transports {
    fn default() -> Self {
        Self::ALL
    }
}

/// Places `player_id` could reach from `origin` in one move during `round`.
///
/// The result always holds `origin`, and never the hospital when the mover
/// is Dracula.
pub fn connections(
    map: &impl MapGraph,
    origin: PlaceId,
    player_id: PlayerId,
    round: usize,
    transports: Transports,
    hospital: PlaceId,
) -> HashSet<PlaceId> {
    let mut reachable = HashSet::new();

    if transports.road {
        reachable.extend(map.adjacent(origin, Transport::Road));
    }
    if transports.sea {
        reachable.extend(map.adjacent(origin, Transport::Boat));
    }
    if transports.rail {
        reachable.extend(rail_connections(
            map,
            origin,
            rule_helper::rail_hop_limit(player_id, round),
        ));
    }

    reachable.insert(origin);
    if player_id.is_dracula() {
        reachable.remove(&hospital);
    }

    reachable
}

fn rail_connections(map: &impl MapGraph, origin: PlaceId, max_hops: usize) -> HashSet<PlaceId> {
    if max_hops == 0 {
        return HashSet::new();
    }

    let mut collected: HashSet<PlaceId> =
        map.adjacent(origin, Transport::Rail).into_iter().collect();
    for _ in 1..max_hops {
        let expansion = collected
            .iter()
            .flat_map(|station| map.adjacent(*station, Transport::Rail))
            .collect::<Vec<_>>();
        collected.extend(expansion);
    }

    collected
}

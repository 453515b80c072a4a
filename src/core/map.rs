use crate::core::location::{Place, PlaceId, PlaceType};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};
use thiserror::Error;

const EMBEDDED_EUROPE_JSON: &str = include_str!("../../data/europe.json");

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Transport {
    Road,
    Rail,
    Boat,
}

/// Edge queries over the board.
pub trait MapGraph {
    /// Places one `transport` edge away from `from`, in no particular order.
    fn adjacent(&self, from: PlaceId, transport: Transport) -> Vec<PlaceId>;
}

/// Place names, abbreviations and kinds.
pub trait PlaceLookup {
    fn place_by_abbrev(&self, abbrev: &str) -> Option<PlaceId>;
    fn abbrev(&self, place_id: PlaceId) -> Option<&str>;
    fn name(&self, place_id: PlaceId) -> Option<&str>;
    /// `PlaceType::Boundary` for ids that are not on the board.
    fn place_type(&self, place_id: PlaceId) -> PlaceType;
    fn place_ids(&self) -> Vec<PlaceId>;
}

/// Everything a view needs from the board.
pub trait Atlas: MapGraph + PlaceLookup {}

impl<T: MapGraph + PlaceLookup> Atlas for T {}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
#[readonly::make]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub transport: Transport,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[readonly::make]
pub struct MapSpecification {
    pub name: String,
    pub places: Vec<Place>,
    pub connections: Vec<Connection>,
}

impl MapSpecification {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("could not read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse map json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("place id {id} of '{abbrev}' does not match its position {position}")]
    MisplacedId {
        id: PlaceId,
        abbrev: String,
        position: usize,
    },
    #[error("abbreviation '{0}' is used by more than one place")]
    DuplicateAbbrev(String),
    #[error("connection names unknown place '{0}'")]
    UnknownPlace(String),
}

#[derive(Clone, Debug, PartialEq)]
#[readonly::make]
pub struct EuropeMap {
    pub name: String,
    pub places: Vec<Place>,                     // indexed by place id
    pub abbrev_index: HashMap<String, PlaceId>, // key is abbreviation
    pub adjacency: Vec<Vec<(PlaceId, Transport)>>, // indexed by place id
}

impl EuropeMap {
    pub fn from_embedded_json() -> Result<Self, MapLoadError> {
        Self::from_json_str(EMBEDDED_EUROPE_JSON)
    }

    pub fn from_json_file<P: AsRef<Path>>(map_path: P) -> Result<Self, MapLoadError> {
        let map_text = fs::read_to_string(map_path)?;
        Self::from_json_str(&map_text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MapLoadError> {
        let spec = MapSpecification::from_json_str(json)?;
        Self::from_spec(spec)
    }

    pub fn from_spec(spec: MapSpecification) -> Result<Self, MapLoadError> {
        let mut abbrev_index = HashMap::new();
        for (position, place) in spec.places.iter().enumerate() {
            if place.id.0 != position {
                return Err(MapLoadError::MisplacedId {
                    id: place.id,
                    abbrev: place.abbrev.clone(),
                    position,
                });
            }
            if abbrev_index.insert(place.abbrev.clone(), place.id).is_some() {
                return Err(MapLoadError::DuplicateAbbrev(place.abbrev.clone()));
            }
        }

        let mut adjacency = vec![Vec::new(); spec.places.len()];
        for connection in &spec.connections {
            let find = |abbrev: &str| {
                abbrev_index
                    .get(abbrev)
                    .copied()
                    .ok_or_else(|| MapLoadError::UnknownPlace(abbrev.to_string()))
            };
            let from = find(&connection.from)?;
            let to = find(&connection.to)?;
            adjacency[from.0].push((to, connection.transport));
            adjacency[to.0].push((from, connection.transport));
        }

        log::debug!(
            "loaded map '{}' with {} places and {} connections",
            spec.name,
            spec.places.len(),
            spec.connections.len()
        );

        Ok(EuropeMap {
            name: spec.name,
            places: spec.places,
            abbrev_index,
            adjacency,
        })
    }

    pub fn place(&self, place_id: PlaceId) -> Option<&Place> {
        self.places.get(place_id.0)
    }

    pub fn is_valid(&self) -> Result<(), Vec<String>> {
        let mut mistakes = Vec::new();

        for (idx, edges) in self.adjacency.iter().enumerate() {
            let from = PlaceId(idx);
            for &(to, transport) in edges {
                if to == from {
                    mistakes.push(format!("place {from} connects to itself by {transport:?}"));
                }
                if transport == Transport::Boat
                    && self.place_type(from) == PlaceType::Land
                    && self.place_type(to) == PlaceType::Land
                {
                    mistakes.push(format!("boat connection {from}-{to} has no sea end"));
                }
                if transport != Transport::Boat
                    && (self.place_type(from) == PlaceType::Sea
                        || self.place_type(to) == PlaceType::Sea)
                {
                    mistakes.push(format!("{transport:?} connection {from}-{to} touches sea"));
                }
            }

            let duplicates = edges.iter().duplicates().collect::<Vec<_>>();
            if !duplicates.is_empty() {
                mistakes.push(format!(
                    "place {from} lists repeated connections {}",
                    duplicates
                        .iter()
                        .map(|(to, transport)| format!("{to}/{transport:?}"))
                        .join(", ")
                ));
            }
        }

        if mistakes.is_empty() {
            Ok(())
        } else {
            Err(mistakes)
        }
    }
}

impl MapGraph for EuropeMap {
    fn adjacent(&self, from: PlaceId, transport: Transport) -> Vec<PlaceId> {
        self.adjacency
            .get(from.0)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|(_, edge_transport)| *edge_transport == transport)
                    .map(|(to, _)| *to)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PlaceLookup for EuropeMap {
    fn place_by_abbrev(&self, abbrev: &str) -> Option<PlaceId> {
        self.abbrev_index.get(abbrev).copied()
    }

    fn abbrev(&self, place_id: PlaceId) -> Option<&str> {
        self.place(place_id).map(|place| place.abbrev.as_str())
    }

    fn name(&self, place_id: PlaceId) -> Option<&str> {
        self.place(place_id).map(|place| place.name.as_str())
    }

    fn place_type(&self, place_id: PlaceId) -> PlaceType {
        self.place(place_id)
            .map(|place| place.kind)
            .unwrap_or(PlaceType::Boundary)
    }

    fn place_ids(&self) -> Vec<PlaceId> {
        self.places.iter().map(|place| place.id).collect()
    }
}

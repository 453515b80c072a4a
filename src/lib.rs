use serde::Serialize;
use std::collections::HashSet;
use wasm_bindgen::prelude::*;

pub mod core;

use crate::core::{
    connectivity::Transports,
    dracula_view::DraculaView,
    game_view::{GameSnapshot, GameView, ViewError},
    hunter_view::HunterView,
    location::{Location, PlaceType},
    map::{Atlas, EuropeMap, PlaceLookup},
    play_log,
    player::PlayerId,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaceInfo {
    id: usize,
    abbrev: String,
    name: String,
    is_sea: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerInfo {
    tag: char,
    name: &'static str,
    health: i32,
    location: String,
    trail: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewInfo {
    snapshot: GameSnapshot,
    players: Vec<PlayerInfo>,
}

fn view_info<M: Atlas>(
    game: &GameView<'_, M>,
    trail_of: impl Fn(PlayerId) -> Vec<Location>,
) -> ViewInfo {
    let players = PlayerId::all()
        .map(|player_id| {
            let trail = trail_of(player_id);
            PlayerInfo {
                tag: player_id.tag(),
                name: player_id.name(),
                health: game.health(player_id),
                location: trail
                    .first()
                    .map(|location| game.location_text(*location))
                    .unwrap_or_default(),
                trail: trail
                    .into_iter()
                    .map(|location| game.location_text(location))
                    .collect(),
            }
        })
        .collect();

    ViewInfo {
        snapshot: game.snapshot(),
        players,
    }
}

fn sorted_texts<M: Atlas>(game: &GameView<'_, M>, locations: HashSet<Location>) -> Vec<String> {
    let mut texts = locations
        .into_iter()
        .map(|location| game.location_text(location))
        .collect::<Vec<_>>();
    texts.sort();
    texts
}

fn to_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("serialization failed: {err}");
        fallback.to_string()
    })
}

#[wasm_bindgen]
pub struct GameViewHandle {
    map: EuropeMap,
    play_log: String,
    dracula_perspective: bool,
}

impl GameViewHandle {
    fn hunter_view(&self) -> Result<HunterView<'_, EuropeMap>, ViewError> {
        HunterView::new(&self.play_log, &self.map)
    }

    fn dracula_view(&self) -> Result<DraculaView<'_, EuropeMap>, ViewError> {
        DraculaView::new(&self.play_log, &self.map)
    }

    fn parse_player(player_tag: &str) -> Option<PlayerId> {
        let mut chars = player_tag.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(tag), None) => PlayerId::from_tag(tag),
            _ => None,
        }
    }
}

#[wasm_bindgen]
impl GameViewHandle {
    #[wasm_bindgen(js_name = "playLog")]
    pub fn play_log(&self) -> String {
        self.play_log.clone()
    }

    #[wasm_bindgen(js_name = "setDraculaPerspective")]
    pub fn set_dracula_perspective(&mut self, dracula_perspective: bool) {
        self.dracula_perspective = dracula_perspective;
    }

    /// Appends records; returns an empty string on success, else the problem.
    #[wasm_bindgen(js_name = "appendRecords")]
    pub fn append_records(&mut self, records: &str) -> String {
        let candidate = play_log::append_records(&self.play_log, records);
        match HunterView::new(&candidate, &self.map) {
            Ok(_) => {
                self.play_log = candidate;
                String::new()
            }
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = "undoLastRecord")]
    pub fn undo_last_record(&mut self) -> bool {
        if self.play_log.is_empty() {
            return false;
        }

        self.play_log = play_log::drop_last_record(&self.play_log).to_string();
        true
    }

    #[wasm_bindgen(js_name = "resetGame")]
    pub fn reset_game(&mut self) {
        self.play_log.clear();
    }

    pub fn summary(&self, indentation: &str) -> String {
        let summary = if self.dracula_perspective {
            self.dracula_view()
                .map(|view| view.game().summary(indentation, |player_id| view.trail(player_id)))
        } else {
            self.hunter_view()
                .map(|view| view.game().summary(indentation, |player_id| view.trail(player_id)))
        };

        summary.unwrap_or_else(|err| err.to_string())
    }

    #[wasm_bindgen(js_name = "placesJson")]
    pub fn places_json(&self) -> String {
        let places = self
            .map
            .place_ids()
            .into_iter()
            .map(|place_id| PlaceInfo {
                id: place_id.0,
                abbrev: self.map.abbrev(place_id).unwrap_or_default().to_string(),
                name: self.map.name(place_id).unwrap_or_default().to_string(),
                is_sea: self.map.place_type(place_id) == PlaceType::Sea,
            })
            .collect::<Vec<_>>();

        to_json(&places, "[]")
    }

    #[wasm_bindgen(js_name = "viewJson")]
    pub fn view_json(&self) -> String {
        let info = if self.dracula_perspective {
            self.dracula_view().map(|view| {
                view_info(view.game(), |player_id| view.trail(player_id).iter().collect())
            })
        } else {
            self.hunter_view().map(|view| {
                view_info(view.game(), |player_id| view.trail(player_id).iter().collect())
            })
        };

        match info {
            Ok(info) => to_json(&info, "{}"),
            Err(err) => to_json(&err.to_string(), "\"\""),
        }
    }

    /// Sorted codes of where `player_tag` may move next, as a JSON array.
    #[wasm_bindgen(js_name = "reachableJson")]
    pub fn reachable_json(&self, player_tag: &str, road: bool, rail: bool, sea: bool) -> String {
        let Some(player_id) = Self::parse_player(player_tag) else {
            return "[]".to_string();
        };
        let transports = Transports::new(road, rail, sea);

        let texts = if self.dracula_perspective {
            self.dracula_view().map(|view| {
                sorted_texts(view.game(), view.where_can_they_go(player_id, transports))
            })
        } else {
            self.hunter_view().map(|view| {
                sorted_texts(view.game(), view.where_can_they_go(player_id, transports))
            })
        };

        to_json(&texts.unwrap_or_default(), "[]")
    }

    /// Traps and vampire at `abbrev`; always empty outside Dracula's perspective.
    #[wasm_bindgen(js_name = "whatsThereJson")]
    pub fn whats_there_json(&self, abbrev: &str) -> String {
        let location = self
            .map
            .place_by_abbrev(&abbrev.trim().to_uppercase())
            .map(Location::Place)
            .unwrap_or(Location::Unknown);

        let minions = if self.dracula_perspective {
            self.dracula_view()
                .map(|view| view.whats_there(location))
                .unwrap_or_default()
        } else {
            Default::default()
        };

        to_json(&minions, "{\"traps\":0,\"vampires\":0}")
    }
}

#[wasm_bindgen(js_name = "newGameView")]
pub fn new_game_view(play_log: &str) -> Result<GameViewHandle, JsValue> {
    let map = EuropeMap::from_embedded_json().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let play_log = play_log::append_records("", play_log);
    HunterView::new(&play_log, &map).map_err(|err| JsValue::from_str(&err.to_string()))?;

    Ok(GameViewHandle {
        map,
        play_log,
        dracula_perspective: false,
    })
}

use crate::core::player::PlayerId;

pub const NUM_PLAYERS: usize = 5;
pub const TRAIL_SIZE: usize = 6;

pub const RECORD_WIDTH: usize = 7;
pub const RECORD_STRIDE: usize = RECORD_WIDTH + 1;
pub const RECORD_SEPARATOR: char = ' ';
pub const MAX_ENCOUNTERS: usize = 4;
pub const NO_ENCOUNTER: char = '.';

pub const GAME_START_SCORE: i32 = 366;
pub const SCORE_LOSS_DRACULA_TURN: i32 = 1;
pub const SCORE_LOSS_HUNTER_HOSPITAL: i32 = 6;
pub const SCORE_LOSS_VAMPIRE_MATURES: i32 = 13;

pub const GAME_START_HUNTER_LIFE_POINTS: i32 = 9;
pub const LIFE_LOSS_TRAP_ENCOUNTER: i32 = 2;
pub const LIFE_LOSS_DRACULA_ENCOUNTER: i32 = 4;
pub const LIFE_GAIN_REST: i32 = 3;

pub const GAME_START_BLOOD_POINTS: i32 = 40;
pub const LIFE_LOSS_HUNTER_ENCOUNTER: i32 = 10;
pub const LIFE_LOSS_SEA: i32 = 2;
pub const LIFE_GAIN_CASTLE_DRACULA: i32 = 10;

pub const HOSPITAL_ABBREV: &str = "JM";
pub const CASTLE_DRACULA_ABBREV: &str = "CD";

pub const RAIL_HOP_CYCLE: usize = 4;

pub fn start_health(player_id: PlayerId) -> i32 {
    if player_id.is_dracula() {
        GAME_START_BLOOD_POINTS
    } else {
        GAME_START_HUNTER_LIFE_POINTS
    }
}

/// How many rail hops `player_id` may chain together in `round`.
pub fn rail_hop_limit(player_id: PlayerId, round: usize) -> usize {
    if player_id.is_dracula() {
        0
    } else {
        (player_id.0 + round) % RAIL_HOP_CYCLE
    }
}

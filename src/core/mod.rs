pub mod connectivity;
pub mod dracula_view;
pub mod game_view;
pub mod history;
pub mod hunter_view;
pub mod legality;
pub mod location;
pub mod map;
pub mod minions;
pub mod play_log;
pub mod player;
pub mod rule_helper;

use fury_of_dracula_rust::core::{
    connectivity::Transports,
    dracula_view::DraculaView,
    game_view::{GameView, ViewError},
    hunter_view::HunterView,
    location::Location,
    map::{Atlas, EuropeMap, MapLoadError, PlaceLookup},
    play_log,
    player::PlayerId,
};
use itertools::Itertools;
use std::collections::HashSet;
use std::io::{self, Write};
use thiserror::Error;

const ARG_MAP: &str = "--map";
const ARG_LOG: &str = "--log";
const ARG_DRACULA: &str = "--dracula";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("argument {0} needs a value")]
    MissingValue(String),
    #[error("unrecognized argument '{0}'")]
    UnknownArgument(String),
    #[error(transparent)]
    Map(#[from] MapLoadError),
    #[error("map is invalid: {}", .0.join("; "))]
    InvalidMap(Vec<String>),
    #[error(transparent)]
    View(#[from] ViewError),
}

pub struct Session {
    map: EuropeMap,
    map_source: String,
    play_log: String,
    dracula_perspective: bool,
    should_quit: bool,
}

impl Session {
    pub fn new(cli_args: impl IntoIterator<Item = String>) -> Result<Self, SessionError> {
        let mut map_path = None;
        let mut initial_log = String::new();
        let mut dracula_perspective = false;

        let mut args = cli_args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                ARG_MAP => {
                    map_path = Some(args.next().ok_or(SessionError::MissingValue(arg))?);
                }
                ARG_LOG => {
                    let records = args.next().ok_or(SessionError::MissingValue(arg))?;
                    initial_log = play_log::append_records("", &records);
                }
                ARG_DRACULA => dracula_perspective = true,
                _ => return Err(SessionError::UnknownArgument(arg)),
            }
        }

        let (map, map_source) = match map_path {
            Some(path) => (EuropeMap::from_json_file(&path)?, path),
            None => (EuropeMap::from_embedded_json()?, "embedded".to_string()),
        };
        map.is_valid().map_err(SessionError::InvalidMap)?;
        HunterView::new(&initial_log, &map)?;

        Ok(Self {
            map,
            map_source,
            play_log: initial_log,
            dracula_perspective,
            should_quit: false,
        })
    }

    pub fn start(&mut self) {
        self.print_session_settings();
        self.print_summary();
        self.interpretation_loop();
    }

    fn interpretation_loop(&mut self) {
        let stdin = io::stdin();

        loop {
            let prompt = self.user_prompt_text();
            print!("{prompt}");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => return,
                Ok(_) => {
                    let line = line.trim_end_matches(['\r', '\n']).to_string();
                    for subline in line.split(';') {
                        self.interpret_directive(subline);
                        if self.should_quit {
                            return;
                        }
                    }
                }
                Err(err) => {
                    log::error!("failed to read directive: {err}");
                    return;
                }
            }
        }
    }

    fn interpret_directive(&mut self, directive: &str) {
        const TAG_PLAY: &str = "p";
        const TAG_UNDO: &str = "u";
        const TAG_RESET: &str = "r";
        const TAG_DISPLAY: &str = "d";
        const TAG_TRAIL: &str = "t";
        const TAG_GO: &str = "g";
        const TAG_WHATS_THERE: &str = "w";
        const TAG_VIEW: &str = "v";
        const TAG_HISTORY: &str = "h";
        const TAG_QUIT: &str = "q";

        let tokens = directive.split_whitespace().collect::<Vec<_>>();
        let Some(directive_tag) = tokens.first().map(|token| token.to_lowercase()) else {
            return;
        };

        if directive_tag == TAG_QUIT {
            self.should_quit = true;
        } else if directive_tag == TAG_PLAY {
            self.play_records(&tokens[1..]);
        } else if directive_tag == TAG_UNDO {
            println!("(UNDO)");
            self.play_log = play_log::drop_last_record(&self.play_log).to_string();
            self.print_summary();
        } else if directive_tag == TAG_RESET {
            println!("(RESET)");
            self.play_log.clear();
            self.print_summary();
        } else if directive_tag == TAG_DISPLAY {
            self.print_session_settings();
            self.print_summary();
        } else if directive_tag == TAG_TRAIL {
            self.print_trail(&tokens[1..]);
        } else if directive_tag == TAG_GO {
            self.print_reachable(&tokens[1..]);
        } else if directive_tag == TAG_WHATS_THERE {
            self.print_minions(&tokens[1..]);
        } else if directive_tag == TAG_VIEW {
            self.dracula_perspective = !self.dracula_perspective;
            self.print_session_settings();
            self.print_summary();
        } else if directive_tag == TAG_HISTORY {
            println!("{TAG_RESET}; {TAG_PLAY} {};", self.play_log);
        } else {
            let mut explanations = vec![
                "d       | display session settings and game state",
                "g [player] [road] [rail] [sea] | places player can reach next",
                "h       | display play log as directives",
                "p [record] [record] [...] | append play records",
                "q       | quit",
                "r       | reset to empty play log",
                "t [player] | display trail of player",
                "u       | undo last play record",
                "v       | switch between hunter and dracula perspective",
                "w [place] [place] [...] | traps and vampires at places (dracula only)",
            ];
            explanations.sort();
            println!("  unrecognized directive '{directive}'");
            for explanation in explanations {
                println!("  {explanation}");
            }
        }
    }

    fn play_records(&mut self, records: &[&str]) {
        let candidate = play_log::append_records(&self.play_log, &records.join(" "));
        match HunterView::new(&candidate, &self.map) {
            Ok(_) => {
                self.play_log = candidate;
                self.print_summary();
            }
            Err(err) => println!("  invalid records: {err}"),
        }
    }

    fn print_session_settings(&self) {
        println!("  Map:         {} ({})", self.map.name, self.map_source);
        println!("  Perspective: {}", self.perspective_text());
        println!("  Records:     {}", play_log::record_count(&self.play_log));
    }

    fn perspective_text(&self) -> &'static str {
        if self.dracula_perspective {
            "dracula"
        } else {
            "hunter"
        }
    }

    fn print_summary(&self) {
        let summary = if self.dracula_perspective {
            DraculaView::new(&self.play_log, &self.map)
                .map(|view| view.game().summary("  ", |player_id| view.trail(player_id)))
        } else {
            HunterView::new(&self.play_log, &self.map)
                .map(|view| view.game().summary("  ", |player_id| view.trail(player_id)))
        };

        match summary {
            Ok(summary) => println!("{summary}"),
            Err(err) => println!("  problem with play log: {err}"),
        }
    }

    fn print_trail(&self, tokens: &[&str]) {
        let Some(player_id) = self.player_from_tokens(tokens) else {
            return;
        };

        let trail = if self.dracula_perspective {
            DraculaView::new(&self.play_log, &self.map).map(|view| {
                let (start, end) = view.last_move(player_id);
                format!(
                    "[{}] last move {} -> {}",
                    view.game().trail_text(&view.trail(player_id)),
                    view.game().location_text(start),
                    view.game().location_text(end),
                )
            })
        } else {
            HunterView::new(&self.play_log, &self.map)
                .map(|view| format!("[{}]", view.game().trail_text(&view.trail(player_id))))
        };

        match trail {
            Ok(text) => println!("  {} {text}", player_id.name()),
            Err(err) => println!("  problem with play log: {err}"),
        }
    }

    fn print_reachable(&self, tokens: &[&str]) {
        let player_id = match tokens.first() {
            Some(token) if token.len() == 1 => match self.player_from_tokens(&tokens[..1]) {
                Some(player_id) => player_id,
                None => return,
            },
            _ => self.current_player(),
        };
        let transport_tokens = tokens
            .iter()
            .skip_while(|token| token.len() == 1)
            .copied()
            .collect::<Vec<_>>();
        let transports = match parse_transports(&transport_tokens) {
            Ok(transports) => transports,
            Err(message) => {
                println!("  {message}");
                return;
            }
        };

        let reachable = if self.dracula_perspective {
            DraculaView::new(&self.play_log, &self.map).map(|view| {
                let moves = view.where_can_they_go(player_id, transports);
                moves_text(view.game(), &moves)
            })
        } else {
            HunterView::new(&self.play_log, &self.map).map(|view| {
                let moves = view.where_can_they_go(player_id, transports);
                moves_text(view.game(), &moves)
            })
        };

        match reachable {
            Ok(text) if text.is_empty() => println!("  {} has no known moves", player_id.name()),
            Ok(text) => println!("  {} can go to {text}", player_id.name()),
            Err(err) => println!("  problem with play log: {err}"),
        }
    }

    fn print_minions(&self, tokens: &[&str]) {
        if !self.dracula_perspective {
            println!("  only dracula knows where minions are; switch perspective with v");
            return;
        }

        let view = match DraculaView::new(&self.play_log, &self.map) {
            Ok(view) => view,
            Err(err) => {
                println!("  problem with play log: {err}");
                return;
            }
        };
        let minions = view.minions();

        for token in tokens {
            let abbrev = token.to_uppercase();
            match self.map.place_by_abbrev(&abbrev) {
                Some(place_id) => {
                    let found = minions.whats_there(Location::Place(place_id));
                    println!(
                        "  {abbrev}: traps={} vampires={}",
                        found.traps, found.vampires
                    );
                }
                None => println!("  unknown place '{token}'"),
            }
        }
    }

    fn current_player(&self) -> PlayerId {
        PlayerId::for_record(play_log::record_count(&self.play_log))
    }

    fn player_from_tokens(&self, tokens: &[&str]) -> Option<PlayerId> {
        let Some(token) = tokens.first() else {
            return Some(self.current_player());
        };

        let mut chars = token.chars();
        let player_id = match (chars.next(), chars.next()) {
            (Some(tag), None) => PlayerId::from_tag(tag),
            _ => None,
        };

        if player_id.is_none() {
            println!("  '{token}' is not a player tag (G, S, H, M, D)");
        }
        player_id
    }

    fn user_prompt_text(&self) -> String {
        format!(
            "{}@{}> ",
            self.current_player().tag(),
            self.perspective_text()
        )
    }
}

fn moves_text<M: Atlas>(game: &GameView<'_, M>, moves: &HashSet<Location>) -> String {
    moves
        .iter()
        .map(|location| game.location_text(*location))
        .sorted()
        .join(" ")
}

fn parse_transports(tokens: &[&str]) -> Result<Transports, String> {
    if tokens.is_empty() {
        return Ok(Transports::ALL);
    }

    let mut transports = Transports::new(false, false, false);
    for token in tokens {
        match token.to_lowercase().as_str() {
            "road" => transports.road = true,
            "rail" => transports.rail = true,
            "sea" | "boat" => transports.sea = true,
            _ => return Err(format!("unknown transport '{token}' (road, rail, sea)")),
        }
    }

    Ok(transports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(args: &[&str]) -> Result<Session, SessionError> {
        Session::new(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn arguments_configure_session() {
        let session = session(&["--log", "GST.... SAO....", "--dracula"]).unwrap();
        assert_eq!(session.play_log, "GST.... SAO....");
        assert!(session.dracula_perspective);
        assert_eq!(session.current_player(), PlayerId::VAN_HELSING);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(matches!(session(&["--map"]), Err(SessionError::MissingValue(_))));
        assert!(matches!(session(&["--fast"]), Err(SessionError::UnknownArgument(_))));
        assert!(matches!(session(&["--log", "GXX...."]), Err(SessionError::View(_))));
    }

    #[test]
    fn directives_edit_play_log() {
        let mut session = session(&[]).unwrap();
        session.interpret_directive("p GST.... SAO....");
        assert_eq!(session.play_log, "GST.... SAO....");

        session.interpret_directive("p DST....");
        assert_eq!(session.play_log, "GST.... SAO....");

        session.interpret_directive("u");
        assert_eq!(session.play_log, "GST....");

        session.interpret_directive("r");
        assert!(session.play_log.is_empty());

        session.interpret_directive("v");
        assert!(session.dracula_perspective);

        session.interpret_directive("q");
        assert!(session.should_quit);
    }

    #[test]
    fn transports_parse_by_name() {
        assert_eq!(parse_transports(&[]), Ok(Transports::ALL));
        assert_eq!(parse_transports(&["road", "Boat"]), Ok(Transports::new(true, false, true)));
        assert!(parse_transports(&["plane"]).is_err());
    }
}

use crate::core::rule_helper::NUM_PLAYERS;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl PlayerId {
    pub const LORD_GODALMING: PlayerId = PlayerId(0);
    pub const DR_SEWARD: PlayerId = PlayerId(1);
    pub const VAN_HELSING: PlayerId = PlayerId(2);
    pub const MINA_HARKER: PlayerId = PlayerId(3);
    pub const DRACULA: PlayerId = PlayerId(4);

    const TAGS: [char; NUM_PLAYERS] = ['G', 'S', 'H', 'M', 'D'];
    const NAMES: [&'static str; NUM_PLAYERS] = [
        "Lord Godalming",
        "Dr Seward",
        "Van Helsing",
        "Mina Harker",
        "Dracula",
    ];

    pub fn all() -> impl Iterator<Item = PlayerId> {
        (0..NUM_PLAYERS).map(PlayerId)
    }

    pub fn hunters() -> impl Iterator<Item = PlayerId> {
        Self::all().filter(|player_id| player_id.is_hunter())
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        Self::TAGS
            .iter()
            .position(|candidate| *candidate == tag.to_ascii_uppercase())
            .map(PlayerId)
    }

    /// Player that owns the record at `record_idx` of a play log.
    pub fn for_record(record_idx: usize) -> Self {
        PlayerId(record_idx % NUM_PLAYERS)
    }

    pub fn tag(self) -> char {
        Self::TAGS[self.0]
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.0]
    }

    pub fn is_dracula(self) -> bool {
        self == Self::DRACULA
    }

    pub fn is_hunter(self) -> bool {
        self.0 < NUM_PLAYERS && !self.is_dracula()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

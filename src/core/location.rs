use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const CITY_UNKNOWN_CODE: &str = "C?";
pub const SEA_UNKNOWN_CODE: &str = "S?";
pub const HIDE_CODE: &str = "HI";
pub const TELEPORT_CODE: &str = "TP";
pub const DOUBLE_BACK_PREFIX: char = 'D';
pub const MAX_DOUBLE_BACK: u8 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaceId(pub usize);

impl<'de> Deserialize<'de> for PlaceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PlaceIdVisitor;

        impl<'de> Visitor<'de> for PlaceIdVisitor {
            type Value = PlaceId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a place id as a number or numeric string")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                usize::try_from(value)
                    .map(PlaceId)
                    .map_err(|_| E::custom("place id out of range for usize"))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value < 0 {
                    return Err(E::custom("place id must be non-negative"));
                }

                self.visit_u64(value as u64)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .trim()
                    .parse::<usize>()
                    .map(PlaceId)
                    .map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PlaceIdVisitor)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum PlaceType {
    Land,
    Sea,
    /// Anything that is not a real place on the board.
    Boundary,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
#[readonly::make]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub abbrev: String,
    pub kind: PlaceType,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{};{:?}", self.id, self.abbrev, self.name, self.kind)
    }
}

/// Where a player is, or what a play record says about where they went.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Location {
    Place(PlaceId),
    CityUnknown,
    SeaUnknown,
    Hidden,
    Teleported,
    DoubleBack(u8),
    Unknown,
}

impl Location {
    pub fn place(self) -> Option<PlaceId> {
        match self {
            Location::Place(place_id) => Some(place_id),
            _ => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Location::Unknown
    }

    pub fn is_double_back(self) -> bool {
        matches!(self, Location::DoubleBack(_))
    }

    /// Depth of a double-back the play log can express, `1..=MAX_DOUBLE_BACK`.
    pub fn double_back_depth(self) -> Option<usize> {
        match self {
            Location::DoubleBack(depth) if (1..=MAX_DOUBLE_BACK).contains(&depth) => {
                Some(depth as usize)
            }
            _ => None,
        }
    }

    /// Parses the two-character codes that are not place abbreviations.
    pub fn from_special_code(code: &str) -> Option<Self> {
        match code {
            CITY_UNKNOWN_CODE => Some(Location::CityUnknown),
            SEA_UNKNOWN_CODE => Some(Location::SeaUnknown),
            HIDE_CODE => Some(Location::Hidden),
            TELEPORT_CODE => Some(Location::Teleported),
            _ => {
                let mut chars = code.chars();
                let (Some(DOUBLE_BACK_PREFIX), Some(digit), None) =
                    (chars.next(), chars.next(), chars.next())
                else {
                    return None;
                };
                let depth = digit.to_digit(10)? as u8;
                (1..=MAX_DOUBLE_BACK)
                    .contains(&depth)
                    .then_some(Location::DoubleBack(depth))
            }
        }
    }

    pub fn special_code(self) -> Option<String> {
        match self {
            Location::CityUnknown => Some(CITY_UNKNOWN_CODE.to_string()),
            Location::SeaUnknown => Some(SEA_UNKNOWN_CODE.to_string()),
            Location::Hidden => Some(HIDE_CODE.to_string()),
            Location::Teleported => Some(TELEPORT_CODE.to_string()),
            Location::DoubleBack(_) => self
                .double_back_depth()
                .map(|depth| format!("{DOUBLE_BACK_PREFIX}{depth}")),
            Location::Place(_) | Location::Unknown => None,
        }
    }
}

impl From<PlaceId> for Location {
    fn from(place_id: PlaceId) -> Self {
        Location::Place(place_id)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Place(place_id) => write!(f, "#{place_id}"),
            Location::Unknown => f.write_str("??"),
            Location::DoubleBack(depth) => write!(f, "{DOUBLE_BACK_PREFIX}{depth}"),
            special => f.write_str(&special.special_code().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_codes_parse() {
        assert_eq!(Location::from_special_code("C?"), Some(Location::CityUnknown));
        assert_eq!(Location::from_special_code("S?"), Some(Location::SeaUnknown));
        assert_eq!(Location::from_special_code("HI"), Some(Location::Hidden));
        assert_eq!(Location::from_special_code("TP"), Some(Location::Teleported));
        assert_eq!(Location::from_special_code("D1"), Some(Location::DoubleBack(1)));
        assert_eq!(Location::from_special_code("D5"), Some(Location::DoubleBack(5)));
    }

    #[test]
    fn out_of_range_double_backs_are_rejected() {
        assert_eq!(Location::from_special_code("D0"), None);
        assert_eq!(Location::from_special_code("D6"), None);
        assert_eq!(Location::from_special_code("DX"), None);
        assert_eq!(Location::from_special_code("D"), None);
    }

    #[test]
    fn only_expressible_double_backs_have_depth_and_code() {
        assert_eq!(Location::DoubleBack(2).double_back_depth(), Some(2));
        assert_eq!(Location::DoubleBack(0).double_back_depth(), None);
        assert_eq!(Location::DoubleBack(6).double_back_depth(), None);
        assert_eq!(Location::DoubleBack(0).special_code(), None);
        assert_eq!(Location::DoubleBack(5).special_code(), Some("D5".to_string()));
        assert_eq!(Location::DoubleBack(0).to_string(), "D0");
    }

    #[test]
    fn display_uses_codes_for_markers() {
        assert_eq!(Location::Place(PlaceId(17)).to_string(), "#17");
        assert_eq!(Location::DoubleBack(3).to_string(), "D3");
        assert_eq!(Location::Unknown.to_string(), "??");
    }

    #[test]
    fn place_id_deserializes_from_number_or_string() {
        let from_number: PlaceId = serde_json::from_str("12").unwrap();
        let from_string: PlaceId = serde_json::from_str("\" 12 \"").unwrap();
        assert_eq!(from_number, PlaceId(12));
        assert_eq!(from_string, PlaceId(12));
        assert!(serde_json::from_str::<PlaceId>("-1").is_err());
    }
}

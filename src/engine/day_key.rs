use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical key for one calendar day of one user's attendance/leave records.
///
/// Wire form is `D-M-YYYY` without zero padding (`3-7-2024` for July 3rd
/// 2024), matching the attendance and leave document ids. The holiday catalog
/// stores its ids as ISO `YYYY-MM-DD`; those cross the boundary through
/// [`DayKey::from_iso`] so that all comparisons happen on this canonical type
/// and never on raw strings of either format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

#[derive(Debug, derive_more::Display)]
#[display(fmt = "invalid day key `{}`", _0)]
pub struct DayKeyParseError(String);

impl std::error::Error for DayKeyParseError {}

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Parse the holiday catalog's native `YYYY-MM-DD` id.
    pub fn from_iso(key: &str) -> Result<Self, DayKeyParseError> {
        NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .map(DayKey)
            .map_err(|_| DayKeyParseError(key.to_owned()))
    }

    /// Render as the holiday catalog's zero-padded `YYYY-MM-DD` id.
    pub fn iso_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        DayKey(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0.day(), self.0.month(), self.0.year())
    }
}

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (day, month, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(d), Some(m), Some(y)) => (
                d.parse::<u32>().map_err(|_| DayKeyParseError(s.to_owned()))?,
                m.parse::<u32>().map_err(|_| DayKeyParseError(s.to_owned()))?,
                y.parse::<i32>().map_err(|_| DayKeyParseError(s.to_owned()))?,
            ),
            _ => return Err(DayKeyParseError(s.to_owned())),
        };
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DayKey)
            .ok_or_else(|| DayKeyParseError(s.to_owned()))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renders_without_zero_padding() {
        assert_eq!(DayKey::new(date(2024, 7, 3)).to_string(), "3-7-2024");
        assert_eq!(DayKey::new(date(2024, 11, 25)).to_string(), "25-11-2024");
    }

    #[test]
    fn round_trips_through_canonical_form() {
        for d in [
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(2024, 12, 31),
            date(1999, 10, 9),
        ] {
            let key = DayKey::new(d);
            let parsed: DayKey = key.to_string().parse().unwrap();
            assert_eq!(parsed.date(), d);
        }
    }

    #[test]
    fn accepts_zero_padded_input() {
        let parsed: DayKey = "03-07-2024".parse().unwrap();
        assert_eq!(parsed, DayKey::new(date(2024, 7, 3)));
    }

    #[test]
    fn iso_converters_match_canonical_value() {
        let key = DayKey::from_iso("2024-07-03").unwrap();
        assert_eq!(key, DayKey::new(date(2024, 7, 3)));
        assert_eq!(key.iso_string(), "2024-07-03");
        assert_eq!(key.to_string(), "3-7-2024");
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<DayKey>().is_err());
        assert!("3-7".parse::<DayKey>().is_err());
        assert!("32-1-2024".parse::<DayKey>().is_err());
        assert!("a-b-c".parse::<DayKey>().is_err());
        assert!(DayKey::from_iso("3-7-2024").is_err());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let key = DayKey::new(date(2024, 7, 3));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"3-7-2024\"");
        let back: DayKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}

//! UTC wall-clock instants recorded on transcript entries and results.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant, serialized as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Complete minutes elapsed since `earlier`; zero when `earlier` is in the future.
    pub fn whole_minutes_since(&self, earlier: &Timestamp) -> i64 {
        (self.0 - earlier.0).num_minutes().max(0)
    }

    pub fn plus_secs(&self, secs: u32) -> Self {
        Self(self.0 + Duration::seconds(i64::from(secs)))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn partial_minutes_are_dropped() {
        let start = at("2024-03-01T09:00:00Z");
        assert_eq!(start.plus_secs(299).whole_minutes_since(&start), 4);
        assert_eq!(start.plus_secs(300).whole_minutes_since(&start), 5);
    }

    #[test]
    fn clock_going_backwards_counts_as_zero() {
        let start = at("2024-03-01T09:00:00Z");
        assert_eq!(start.whole_minutes_since(&start.plus_secs(600)), 0);
    }

    #[test]
    fn json_form_is_a_plain_rfc3339_string() {
        let ts = at("2024-03-01T09:30:00Z");
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-03-01T09:30:00Z\"");

        let parsed: Timestamp = serde_json::from_str("\"2024-03-01T09:30:00Z\"").unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn display_uses_second_precision() {
        assert_eq!(at("2024-03-01T09:30:00.123Z").to_string(), "2024-03-01T09:30:00Z");
    }
}

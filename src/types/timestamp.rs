use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-supplied "last updated" time, in seconds since the Unix epoch.
///
/// Never taken from the local clock: the engine trusts the upstream value
/// verbatim and only converts it to wall-clock form when rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const RENDER_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S";

    pub fn from_epoch_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    pub fn epoch_secs(&self) -> i64 {
        self.0
    }

    /// Formats in the given zone; `None` when the value is outside chrono's range.
    pub fn format_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<String>
    where
        Tz::Offset: fmt::Display,
    {
        let utc = DateTime::from_timestamp(self.0, 0)?;
        Some(utc.with_timezone(tz).format(Self::RENDER_FORMAT).to_string())
    }

}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// An OFX timestamp: the literal as written plus the instant it denotes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OfxDateTime {
    /// The literal, trimmed of surrounding whitespace.
    pub raw: String,
    /// The instant, normalized to UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub instant: OffsetDateTime,
    /// The offset the literal was written in, in minutes east of UTC. `None` when unspecified.
    pub offset_minutes: Option<i32>,
    /// The informational zone label from the bracket suffix, such as `PDT`.
    pub tz_name: Option<String>,
}

impl OfxDateTime {
    /// The instant expressed in the offset it was originally written in.
    pub fn local(&self) -> OffsetDateTime {
        match self
            .offset_minutes
            .and_then(|m| time::UtcOffset::from_whole_seconds(m * 60).ok())
        {
            Some(offset) => self.instant.to_offset(offset),
            None => self.instant,
        }
    }
}

impl fmt::Display for OfxDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

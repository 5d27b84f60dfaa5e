//! Knobs for the ingestion pipeline.

/// Number of characters searched for the body start marker.
pub const DEFAULT_LOOKAHEAD: usize = 2048;

/// The opening tag of the root envelope.
pub const DEFAULT_BODY_MARKER: &str = "<OFX>";

/// Timestamp fields tried, in order, when a response section needs a datetime.
pub const DEFAULT_DATETIME_CANDIDATES: [&str; 4] = ["DTACCTUP", "DTSTART", "DTCLIENT", "DTSERVER"];

/// Settings for a single parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseConfig {
    /// How many characters at the start of the input may hold the header.
    pub lookahead: usize,
    /// The literal that separates the header from the body.
    pub body_marker: String,
    /// Ordered timestamp tag names consulted by the datetime lookup.
    pub datetime_candidates: Vec<String>,
}

impl ParseConfig {
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_body_marker(mut self, marker: impl Into<String>) -> Self {
        self.body_marker = marker.into();
        self
    }

    pub fn with_datetime_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            lookahead: DEFAULT_LOOKAHEAD,
            body_marker: String::from(DEFAULT_BODY_MARKER),
            datetime_candidates: DEFAULT_DATETIME_CANDIDATES
                .iter()
                .map(|s| String::from(*s))
                .collect(),
        }
    }
}

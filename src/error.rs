use std::str::Utf8Error;

use thiserror::Error;

/// A failure that prevents an OFX document from being ingested.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    #[error("body start marker `{marker}` not found within the first {window} characters")]
    MalformedHeader { marker: String, window: usize },
    #[error("document contains no elements")]
    EmptyDocument,
    #[error("end tag `{found}` does not match open element `{}`", .expected.as_deref().unwrap_or("(none)"))]
    MismatchedTag {
        expected: Option<String>,
        found: String,
    },
    #[error("element `{0}` is never closed")]
    UnclosedTag(String),
    #[error("malformed timestamp `{0}`")]
    MalformedTimestamp(String),
    #[error("none of the timestamp fields {0:?} are present")]
    MissingTimestampField(Vec<String>),
    #[error("status is missing its `{0}` field")]
    IncompleteStatus(&'static str),
    #[error("status code `{0}` is not an integer")]
    InvalidStatusCode(String),
    #[error("parse error:\n{0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal oddity encountered while ingesting a document.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OfxParseWarning {
    #[error("unrecognized OFXHEADER value `{0}`")]
    UnrecognizedOfxHeaderVersion(u32),
    #[error("unrecognized VERSION value `{0}`")]
    UnrecognizedVersion(u32),
    #[error("skipped malformed header line `{0}`")]
    MalformedHeaderLine(String),
}

/// A value accompanied by the warnings raised while producing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Warn<T> {
    pub value: T,
    pub warnings: Vec<OfxParseWarning>,
}

impl<T> Warn<T> {
    /// Transforms the value, keeping the warnings.
    pub fn map<U, F>(self, f: F) -> Warn<U>
    where
        F: FnOnce(T) -> U,
    {
        Warn {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

impl<T> From<T> for Warn<T> {
    fn from(value: T) -> Self {
        Warn {
            value,
            warnings: Vec::new(),
        }
    }
}

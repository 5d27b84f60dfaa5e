//! Ingestion of OFX (Open Financial Exchange) response documents.
//!
//! The pipeline splits the colon-delimited header from the body, closes the elements that the
//! SGML dialect leaves open, builds an element tree and maps the well-known aggregates into
//! typed records.

pub mod config;
mod error;
pub mod map;
pub mod ofx;
mod parse;

pub use config::ParseConfig;
pub use error::{Error, OfxParseWarning, Result, Warn};
pub use ofx::{Document, Node, Ofx, OfxDateTime, OfxHeader, OfxResponse};
pub use parse::sgml::datetime::{find_datetime, ofx_datetime, parse_datetime};
pub use parse::sgml::document::build_document;
pub use parse::sgml::header::split_header;
pub use parse::sgml::normalize::normalize;

/// Ingests an OFX document with the default configuration.
pub fn from_str(input: &str) -> Result<Warn<Ofx>> {
    from_str_with(input, &ParseConfig::default())
}

/// Ingests an OFX document held as bytes, which must be UTF-8.
pub fn from_bytes(input: &[u8]) -> Result<Warn<Ofx>> {
    from_str(std::str::from_utf8(input)?)
}

/// Ingests an OFX document.
pub fn from_str_with(input: &str, config: &ParseConfig) -> Result<Warn<Ofx>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let Warn {
        value: (body, header),
        warnings,
    } = split_header(input, config)?;

    let document = build_document(&normalize(body)?)?;
    let response = map::map_response(&document, config)?;

    Ok(Warn {
        value: Ofx {
            header,
            document,
            response,
        },
        warnings,
    })
}

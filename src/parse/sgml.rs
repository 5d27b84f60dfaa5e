//! Parsers for SGML-based (v1.x) OFX documents.

pub(crate) mod datetime;
pub(crate) mod document;
pub(crate) mod element;
pub(crate) mod header;
pub(crate) mod normalize;

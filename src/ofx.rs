use serde::Serialize;

pub use self::datetime::OfxDateTime;
pub use self::document::{Document, Node, NodeId};
pub use self::header::*;
pub use self::response::*;

pub mod datetime;
pub mod document;
pub mod header;
pub mod response;

/// An ingested OFX document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ofx {
    /// The header section of the document.
    pub header: OfxHeader,
    /// The element tree of the body.
    #[serde(skip)]
    pub document: Document,
    /// The records mapped out of the body.
    pub response: OfxResponse,
}

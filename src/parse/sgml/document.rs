use nom::combinator::all_consuming;

use crate::error::{Error, Result};
use crate::ofx::document::{Document, NodeId};
use crate::parse::run_verbose;
use crate::parse::sgml::element::{decoded_text, tokens, Token};

/// Builds the element tree of normalized markup.
///
/// Every element must be explicitly closed; run [`normalize`](super::normalize::normalize)
/// first on raw OFX 1.x bodies.
pub fn build_document(markup: &str) -> Result<Document> {
    let mut doc = Document::default();
    let mut open: Vec<NodeId> = Vec::new();

    for token in tokens(markup)? {
        match token {
            Token::StartTag(name) => {
                let id = doc.push(open.last().copied(), name);
                open.push(id);
            }
            Token::EndTag(name) => match open.pop() {
                Some(id) if doc.name_of(id).eq_ignore_ascii_case(name) => {}
                Some(id) => {
                    return Err(Error::MismatchedTag {
                        expected: Some(String::from(doc.name_of(id))),
                        found: name.to_ascii_uppercase(),
                    })
                }
                None => {
                    return Err(Error::MismatchedTag {
                        expected: None,
                        found: name.to_ascii_uppercase(),
                    })
                }
            },
            Token::Text(raw) => {
                if let Some(&id) = open.last() {
                    let text = run_verbose(all_consuming(decoded_text), raw)?;
                    doc.append_text(id, text.trim());
                }
            }
            Token::Comment(_) | Token::ProcessingInstruction(_) => {}
        }
    }

    if let Some(&id) = open.last() {
        return Err(Error::UnclosedTag(String::from(doc.name_of(id))));
    }
    if doc.is_empty() {
        return Err(Error::EmptyDocument);
    }

    tracing::debug!(elements = doc.len(), "built OFX document");
    Ok(doc)
}

//! Rewrites an SGML body into well-formed markup.
//!
//! OFX 1.x lets an element with a text value omit its end tag. Whether a start tag opens such a
//! leaf or a container is decided document-wide: a name that is closed explicitly anywhere in
//! the body is a container everywhere, and every other name is a leaf that ends at the next tag.

use std::collections::HashSet;

use crate::error::Result;
use crate::parse::sgml::element::{tokens, Token};

/// Collects the uppercased names that appear in an end tag somewhere in the stream.
pub(crate) fn closed_tag_names(tokens: &[Token<'_>]) -> HashSet<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::EndTag(name) => Some(name.to_ascii_uppercase()),
            _ => None,
        })
        .collect()
}

/// Single-slot writer that closes leaf elements when the next tag arrives.
struct Normalizer<'a> {
    containers: HashSet<String>,
    pending: Option<&'a str>,
    out: String,
}

impl<'a> Normalizer<'a> {
    fn new(containers: HashSet<String>, capacity: usize) -> Self {
        Normalizer {
            containers,
            pending: None,
            out: String::with_capacity(capacity),
        }
    }

    fn close_pending(&mut self) {
        if let Some(name) = self.pending.take() {
            self.out.push_str("</");
            self.out.push_str(name);
            self.out.push('>');
        }
    }

    fn push(&mut self, token: Token<'a>) {
        match token {
            Token::StartTag(name) => {
                self.close_pending();
                self.out.push('<');
                self.out.push_str(name);
                self.out.push('>');
                if !self.containers.contains(&name.to_ascii_uppercase()) {
                    self.pending = Some(name);
                }
            }
            Token::EndTag(name) => {
                self.close_pending();
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
            }
            Token::ProcessingInstruction(raw) => {
                self.close_pending();
                self.out.push_str(raw);
            }
            Token::Comment(raw) => self.out.push_str(raw),
            Token::Text(text) => self.out.push_str(text.trim()),
        }
    }

    fn finish(mut self) -> String {
        self.close_pending();
        self.out
    }
}

/// Inserts the end tags that the body leaves implicit.
pub fn normalize(body: &str) -> Result<String> {
    let tokens = tokens(body)?;
    let containers = closed_tag_names(&tokens);
    tracing::debug!(
        tokens = tokens.len(),
        containers = containers.len(),
        "classified OFX tags"
    );

    let mut normalizer = Normalizer::new(containers, body.len() + body.len() / 4);
    for token in tokens {
        normalizer.push(token);
    }
    Ok(normalizer.finish())
}

use std::fmt;

use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum OfxContentType {
    OfxSgml,
    Unknown(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum OfxSecurity {
    None,
    Type1,
    Unknown(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum OfxEncoding {
    UsAscii,
    Utf8,
    Unknown(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum OfxCharset {
    Latin1,
    WindowsLatin1,
    None,
    Unknown(String),
}

/// The header segment of an OFX document.
///
/// Keys and values are uppercased. A value written as `NONE` is stored as absent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OfxHeader {
    fields: Vec<(String, Option<String>)>,
}

impl OfxHeader {
    pub(crate) fn insert(&mut self, key: String, value: Option<String>) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    /// The fields in the order they appeared.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Looks up a field value; `None` both when the key is missing and when its value is `NONE`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_deref())
    }

    /// The version of the header portion of the document (`OFXHEADER`).
    pub fn header_version(&self) -> Option<u32> {
        self.get("OFXHEADER").and_then(|v| v.parse().ok())
    }

    /// The version of the content portion of the document.
    pub fn version(&self) -> Option<u32> {
        self.get("VERSION").and_then(|v| v.parse().ok())
    }

    pub fn data(&self) -> OfxContentType {
        match self.get("DATA") {
            Some("OFXSGML") => OfxContentType::OfxSgml,
            other => OfxContentType::Unknown(String::from(other.unwrap_or_default())),
        }
    }

    /// The type of application-level security used for the `<OFX>` block.
    pub fn security(&self) -> OfxSecurity {
        match self.get("SECURITY") {
            None => OfxSecurity::None,
            Some("TYPE1") => OfxSecurity::Type1,
            Some(other) => OfxSecurity::Unknown(String::from(other)),
        }
    }

    /// The text encoding used for character data.
    pub fn encoding(&self) -> OfxEncoding {
        match self.get("ENCODING") {
            Some("USASCII") => OfxEncoding::UsAscii,
            Some("UTF-8") => OfxEncoding::Utf8,
            other => OfxEncoding::Unknown(String::from(other.unwrap_or_default())),
        }
    }

    /// The character set used for character data.
    pub fn charset(&self) -> OfxCharset {
        match self.get("CHARSET") {
            None => OfxCharset::None,
            Some("ISO-8859-1") => OfxCharset::Latin1,
            Some("1252") => OfxCharset::WindowsLatin1,
            Some(other) => OfxCharset::Unknown(String::from(other)),
        }
    }

    /// Unused.
    pub fn compression(&self) -> Option<&str> {
        self.get("COMPRESSION")
    }

    /// Intended to be used in conjunction with `new_file_uid` for file-based error recovery.
    pub fn old_file_uid(&self) -> Option<&str> {
        self.get("OLDFILEUID")
    }

    /// Uniquely identifies a request file.
    pub fn new_file_uid(&self) -> Option<&str> {
        self.get("NEWFILEUID")
    }
}

/// Renders the header as `KEY:VALUE` lines followed by a blank line.
impl fmt::Display for OfxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.fields() {
            write!(f, "{}:{}\r\n", key, value.unwrap_or("NONE"))?;
        }
        f.write_str("\r\n")
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for OfxHeader
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut header = OfxHeader::default();
        for (k, v) in iter {
            header.insert(k.into(), v.map(Into::into));
        }
        header
    }
}

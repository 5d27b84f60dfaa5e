use serde::Serialize;

use crate::ofx::datetime::OfxDateTime;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    #[serde(untagged)]
    Unknown(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Unknown(s) => s,
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "INFO" => Severity::Info,
            "WARN" => Severity::Warn,
            "ERROR" => Severity::Error,
            other => Severity::Unknown(String::from(other)),
        }
    }
}

/// The outcome reported by a `STATUS` aggregate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Status {
    pub code: i32,
    pub severity: Severity,
    pub message: Option<String>,
}

/// Identity of the financial institution (`FI`).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FinancialInstitution {
    pub org: Option<String>,
    pub fid: Option<String>,
}

/// The sign-on response (`SONRS`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SignonResponse {
    pub status: Option<Status>,
    pub server_date: OfxDateTime,
    pub language: Option<String>,
    pub financial_institution: Option<FinancialInstitution>,
}

/// Presence of a response section whose fields are not decoded yet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum SectionPresence {
    #[default]
    Absent,
    /// The section was found `count` times but its contents are left in the document tree.
    Undecoded { count: usize },
}

impl SectionPresence {
    pub(crate) fn from_count(count: usize) -> Self {
        match count {
            0 => SectionPresence::Absent,
            count => SectionPresence::Undecoded { count },
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, SectionPresence::Absent)
    }
}

/// The typed records extracted from an OFX response document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OfxResponse {
    /// The first `STATUS` aggregate in the document.
    pub status: Option<Status>,
    pub signon: Option<SignonResponse>,
    pub financial_institution: Option<FinancialInstitution>,
    /// Bank statements (`STMTRS`).
    pub bank_statement: SectionPresence,
    /// Credit card statements (`CCSTMTRS`).
    pub credit_card_statement: SectionPresence,
    /// Investment statements (`INVSTMTRS`).
    pub investment_statement: SectionPresence,
    /// Account information lists (`ACCTINFORS`).
    pub account_info: SectionPresence,
}

//! Maps well-known regions of an OFX document into typed records.

use crate::config::ParseConfig;
use crate::error::{Error, Result};
use crate::ofx::document::{Document, Node};
use crate::ofx::response::*;
use crate::parse::sgml::datetime::parse_datetime;

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(String::from)
}

/// Reads a `STATUS` aggregate. `CODE` and `SEVERITY` are required, `MESSAGE` is not.
pub fn map_status(status: Node<'_>) -> Result<Status> {
    let code = status
        .child_text("CODE")
        .filter(|c| !c.is_empty())
        .ok_or(Error::IncompleteStatus("CODE"))?;
    let severity = status
        .child_text("SEVERITY")
        .filter(|s| !s.is_empty())
        .ok_or(Error::IncompleteStatus("SEVERITY"))?;

    Ok(Status {
        code: code
            .parse()
            .map_err(|_| Error::InvalidStatusCode(String::from(code)))?,
        severity: Severity::from(severity),
        message: non_empty(status.child_text("MESSAGE")),
    })
}

/// Reads the first `STATUS` aggregate below `node`, if there is one.
pub fn find_status(node: Node<'_>) -> Result<Option<Status>> {
    node.first_descendant("STATUS").map(map_status).transpose()
}

/// Reads an `FI` aggregate.
pub fn map_financial_institution(fi: Node<'_>) -> FinancialInstitution {
    FinancialInstitution {
        org: non_empty(fi.child_text("ORG")),
        fid: non_empty(fi.child_text("FID")),
    }
}

/// Reads a `SONRS` aggregate.
pub fn map_signon(sonrs: Node<'_>, config: &ParseConfig) -> Result<SignonResponse> {
    Ok(SignonResponse {
        status: find_status(sonrs)?,
        server_date: parse_datetime(sonrs, &config.datetime_candidates)?,
        language: non_empty(sonrs.child_text("LANGUAGE")),
        financial_institution: sonrs.child("FI").map(map_financial_institution),
    })
}

fn presence(doc: &Document, name: &str) -> SectionPresence {
    let presence = SectionPresence::from_count(doc.all_descendants(name).len());
    if presence.is_present() {
        tracing::debug!(section = name, ?presence, "section recognized but not decoded");
    }
    presence
}

/// Extracts every record the document carries.
///
/// Absent sections leave their record unset; a present but incomplete section is an error.
pub fn map_response(doc: &Document, config: &ParseConfig) -> Result<OfxResponse> {
    let status = doc.first_descendant("STATUS").map(map_status).transpose()?;
    let signon = doc
        .first_descendant("SONRS")
        .map(|sonrs| map_signon(sonrs, config))
        .transpose()?;
    let financial_institution = match &signon {
        Some(SignonResponse {
            financial_institution: Some(fi),
            ..
        }) => Some(fi.clone()),
        _ => doc.first_descendant("FI").map(map_financial_institution),
    };

    let response = OfxResponse {
        status,
        signon,
        financial_institution,
        bank_statement: presence(doc, "STMTRS"),
        credit_card_statement: presence(doc, "CCSTMTRS"),
        investment_statement: presence(doc, "INVSTMTRS"),
        account_info: presence(doc, "ACCTINFORS"),
    };
    tracing::debug!(
        status = response.status.is_some(),
        signon = response.signon.is_some(),
        "mapped OFX response"
    );
    Ok(response)
}

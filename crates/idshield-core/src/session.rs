//! Verification session records
//!
//! A session record is written once per save and never read back into
//! memory except to recover the session counter.

use time::format_description::well_known::Rfc3339;

use crate::{Attribute, Operator, TimeInterval, VerificationOptions};

pub const SESSION_NAME: &str = "_VerificationSession";

/// Audit record of one verification pass
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationSession {
    pub id: i64,
    pub operator: Operator,
    pub interval: TimeInterval,
    pub source_doc_name: String,
    pub data_file: String,
    pub options: VerificationOptions,
    pub added: Vec<i64>,
    pub deleted: Vec<i64>,
    pub modified: Vec<i64>,
}

impl VerificationSession {
    pub fn to_attribute(&self) -> Attribute {
        let start = self
            .interval
            .start
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.interval.start.unix_timestamp().to_string());

        Attribute::new(SESSION_NAME, self.id.to_string())
            .with_child(Attribute::new("_UserName", self.operator.user.as_str()))
            .with_child(Attribute::new("_MachineName", self.operator.machine.as_str()))
            .with_child(Attribute::new("_DateTimeStamp", start))
            .with_child(Attribute::new(
                "_Duration",
                format!("{:.3}", self.interval.elapsed_seconds),
            ))
            .with_child(Attribute::new("_SourceDocName", self.source_doc_name.as_str()))
            .with_child(Attribute::new("_VOAFileName", self.data_file.as_str()))
            .with_child(options_attribute(&self.options))
            .with_child(id_list("_EntriesAdded", &self.added))
            .with_child(id_list("_EntriesDeleted", &self.deleted))
            .with_child(id_list("_EntriesModified", &self.modified))
    }

    /// Session id stored on a record, if the attribute is one
    pub fn id_of(attribute: &Attribute) -> Option<i64> {
        if !attribute.name.eq_ignore_ascii_case(SESSION_NAME) {
            return None;
        }
        attribute.text().trim().parse().ok()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn options_attribute(options: &VerificationOptions) -> Attribute {
    Attribute::new("_VerificationOptions", "")
        .with_child(Attribute::new("_VerifyAllPages", yes_no(options.verify_all_pages)))
        .with_child(Attribute::new(
            "_RequireExemptionCodes",
            yes_no(options.require_exemption_codes),
        ))
        .with_child(Attribute::new(
            "_VerifyFullPageClues",
            yes_no(options.verify_full_page_clues),
        ))
}

fn id_list(name: &str, ids: &[i64]) -> Attribute {
    let mut list = Attribute::new(name, "");
    for id in ids {
        list.push(Attribute::new("_ID", id.to_string()));
    }
    list
}

//! Data Models Module
//!
//! This module defines the core data structures used by dmarcsum to represent
//! a parsed DMARC aggregate report: the report metadata, the per-source
//! records with their authentication details, and the classification verdict.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Report metadata and the published policy, as found in the
/// `report_metadata` and `policy_published` elements.
///
/// All fields are kept as the raw text from the report; a missing element
/// leaves its field as an empty string. `begin` and `end` hold the raw
/// Unix-epoch text so that non-numeric values survive to the output.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ReportMetadata {
    pub org_name: String,
    pub report_id: String,
    pub begin: String,
    pub end: String,
    pub domain: String,
    pub policy: String,
    pub subdomain_policy: String,
    pub pct: String,
}

/// SPF detail from `auth_results/spf`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SpfDetail {
    pub domain: String,
    pub result: String,
}

/// DKIM detail from an `auth_results/dkim` element. A record may carry
/// several of these; the selector is frequently absent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DkimDetail {
    pub domain: String,
    pub result: String,
    pub selector: String,
}

/// One reporting record: a source IP and the authentication outcome shared
/// by `count` messages from it.
///
/// `disposition`, `spf` and `dkim` are the policy-evaluated results. They
/// are opaque strings; only equality with `"pass"` carries meaning for
/// classification, and unknown values flow through to the output unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RecordEntry {
    pub source_ip: String,
    pub count: u64,
    pub disposition: String,
    pub spf: String,
    pub dkim: String,
    pub spf_detail: Option<SpfDetail>,
    pub dkim_details: Vec<DkimDetail>,
}

/// A fully parsed report. Records keep document order, and the order is
/// preserved through classification and rendering.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ParsedReport {
    pub metadata: ReportMetadata,
    pub records: Vec<RecordEntry>,
}

/// Classification of a single record.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Success,
    Warning,
    Failure,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "success"),
            Verdict::Warning => write!(f, "warning"),
            Verdict::Failure => write!(f, "failure"),
        }
    }
}

impl ParsedReport {
    /// Sum of all message counts in the report.
    pub fn total_messages(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }
}

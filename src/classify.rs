//! Record Classification Module
//!
//! A flat decision table over the policy-evaluated SPF result, DKIM result
//! and disposition of a single record. Pure functions, no state.

use crate::models::{ParsedReport, RecordEntry, Verdict};

/// Classifies one record.
///
/// Precedence:
/// 1. Success — both SPF and DKIM passed and the message was delivered
///    (disposition `none` or `pass`).
/// 2. Warning — at least one mechanism passed and the message was not
///    rejected outright (disposition `none`, `pass`, or `quarantine`).
/// 3. Failure — everything else.
pub fn classify(record: &RecordEntry) -> Verdict {
    let spf_pass = record.spf == "pass";
    let dkim_pass = record.dkim == "pass";
    let delivered = matches!(record.disposition.as_str(), "none" | "pass");

    if spf_pass && dkim_pass && delivered {
        Verdict::Success
    } else if (spf_pass || dkim_pass) && (delivered || record.disposition == "quarantine") {
        Verdict::Warning
    } else {
        Verdict::Failure
    }
}

/// Classifies every record of a report, preserving record order.
pub fn classify_all(report: &ParsedReport) -> Vec<Verdict> {
    report.records.iter().map(classify).collect()
}

//! Report Rendering Module
//!
//! Two renderers over the same parsed report and verdicts: a digest view
//! that surfaces only failures and warnings with a closing summary line, and
//! a narrative view that walks every record in document order. Both build
//! plain UTF-8 text; styling of the surrounding CLI lives in `main`.

use crate::models::{ParsedReport, RecordEntry, Verdict};
use crate::parser::format_timestamp;

/// A rendering of a parsed report plus its per-record verdicts.
pub trait Renderer {
    fn render(&self, report: &ParsedReport, verdicts: &[Verdict]) -> String;
}

/// `"1 email"` / `"N emails"`.
pub fn count_phrase(count: u64) -> String {
    if count == 1 {
        "1 email".to_string()
    } else {
        format!("{} emails", count)
    }
}

fn sum_counts(report: &ParsedReport, verdicts: &[Verdict], which: Verdict) -> u64 {
    report
        .records
        .iter()
        .zip(verdicts)
        .filter(|(_, v)| **v == which)
        .map(|(r, _)| r.count)
        .sum()
}

fn header_lines(report: &ParsedReport, lines: &mut Vec<String>) {
    let m = &report.metadata;
    lines.push(format!(
        "Report: {} | From: {} | Period: {} to {}",
        m.domain,
        m.org_name,
        format_timestamp(&m.begin),
        format_timestamp(&m.end)
    ));
    lines.push(format!(
        "Policy: p={}, sp={}, pct={}",
        m.policy, m.subdomain_policy, m.pct
    ));
}

/// Digest view: failures and warnings only, with a summary line. A report
/// with neither collapses to a single all-clear line.
pub struct DigestRenderer;

impl Renderer for DigestRenderer {
    fn render(&self, report: &ParsedReport, verdicts: &[Verdict]) -> String {
        let failed: Vec<&RecordEntry> = report
            .records
            .iter()
            .zip(verdicts)
            .filter(|(_, v)| **v == Verdict::Failure)
            .map(|(r, _)| r)
            .collect();
        let warned: Vec<&RecordEntry> = report
            .records
            .iter()
            .zip(verdicts)
            .filter(|(_, v)| **v == Verdict::Warning)
            .map(|(r, _)| r)
            .collect();

        let total = report.total_messages();

        if failed.is_empty() && warned.is_empty() {
            return format!(
                "✅ {} ({}): All {} messages passed authentication",
                report.metadata.domain, report.metadata.org_name, total
            );
        }

        let mut lines = Vec::new();
        header_lines(report, &mut lines);
        lines.push(String::new());

        if !failed.is_empty() {
            lines.push("🚨 FAILURES - INVESTIGATE IMMEDIATELY 🚨".to_string());
            lines.push("=".repeat(60));
            for (i, rec) in failed.iter().enumerate() {
                lines.push(format!(
                    "\n❌ FAILURE #{}: {} from IP {}",
                    i + 1,
                    count_phrase(rec.count),
                    rec.source_ip
                ));
                lines.push(format!("   Disposition: {}", rec.disposition.to_uppercase()));
                lines.push(format!(
                    "   Policy Results: SPF={}, DKIM={}",
                    rec.spf.to_uppercase(),
                    rec.dkim.to_uppercase()
                ));
                if let Some(spf) = &rec.spf_detail {
                    lines.push(format!(
                        "   SPF Check: domain={}, result={}",
                        spf.domain, spf.result
                    ));
                }
                for (j, dkim) in rec.dkim_details.iter().enumerate() {
                    let selector_info = if dkim.selector.is_empty() {
                        String::new()
                    } else {
                        format!(", selector={}", dkim.selector)
                    };
                    lines.push(format!(
                        "   DKIM Check #{}: domain={}, result={}{}",
                        j + 1,
                        dkim.domain,
                        dkim.result,
                        selector_info
                    ));
                }
                lines.push("   → ACTION: Verify email authentication for this IP address".to_string());
            }
            lines.push(String::new());
        }

        if !warned.is_empty() {
            lines.push("⚠️ WARNINGS - PARTIAL AUTHENTICATION".to_string());
            lines.push("-".repeat(40));
            for (i, rec) in warned.iter().enumerate() {
                lines.push(format!(
                    "\n⚠️ WARNING #{}: {} from IP {}",
                    i + 1,
                    count_phrase(rec.count),
                    rec.source_ip
                ));
                lines.push(format!(
                    "   Policy Results: SPF={}, DKIM={}",
                    rec.spf.to_uppercase(),
                    rec.dkim.to_uppercase()
                ));
                if let Some(spf) = &rec.spf_detail {
                    lines.push(format!(
                        "   SPF: domain={}, result={}",
                        spf.domain, spf.result
                    ));
                }
                for dkim in &rec.dkim_details {
                    lines.push(format!(
                        "   DKIM: domain={}, result={}",
                        dkim.domain, dkim.result
                    ));
                }
            }
            lines.push(String::new());
        }

        let failed_count: u64 = failed.iter().map(|r| r.count).sum();
        let warning_count: u64 = warned.iter().map(|r| r.count).sum();
        let success_count = sum_counts(report, verdicts, Verdict::Success);

        let mut summary_parts = Vec::new();
        if failed_count > 0 {
            summary_parts.push(format!("🚨 {} FAILED", failed_count));
        }
        if warning_count > 0 {
            summary_parts.push(format!("⚠️ {} WARNINGS", warning_count));
        }
        if success_count > 0 {
            summary_parts.push(format!("✅ {} SUCCESS", success_count));
        }
        lines.push(format!(
            "SUMMARY: {} | Total: {} messages",
            summary_parts.join(" | "),
            total
        ));

        lines.join("\n")
    }
}

/// Narrative view: every record in document order, each with a status
/// banner, check-mark lines, and a closing sentence for the reader.
pub struct NarrativeRenderer;

const DIVIDER: &str = "----------------------------------------";

fn check(ok: bool) -> &'static str {
    if ok {
        "[✓]"
    } else {
        "[✗]"
    }
}

impl Renderer for NarrativeRenderer {
    fn render(&self, report: &ParsedReport, verdicts: &[Verdict]) -> String {
        let m = &report.metadata;
        let mut lines = Vec::new();
        lines.push(format!("DMARC Report for {}", m.domain));
        lines.push(format!(
            "From: {} | Period: {} to {}",
            m.org_name,
            format_timestamp(&m.begin),
            format_timestamp(&m.end)
        ));
        lines.push(format!(
            "Policy: p={}, sp={}, pct={}",
            m.policy, m.subdomain_policy, m.pct
        ));

        for (i, (rec, verdict)) in report.records.iter().zip(verdicts).enumerate() {
            lines.push(String::new());
            if i > 0 {
                lines.push(DIVIDER.to_string());
                lines.push(String::new());
            }

            let banner = match verdict {
                Verdict::Success => "✅ Successful Delivery",
                Verdict::Warning => "⚠️ Warning (Partial Pass)",
                Verdict::Failure => "❌ Failure",
            };
            lines.push(banner.to_string());
            lines.push(format!(
                "{} arrived from IP {}.",
                count_phrase(rec.count),
                rec.source_ip
            ));

            let spf_pass = rec.spf == "pass";
            let dkim_pass = rec.dkim == "pass";
            let delivered = matches!(rec.disposition.as_str(), "none" | "pass");
            lines.push(format!("  {} SPF: {}", check(spf_pass), rec.spf));
            lines.push(format!("  {} DKIM: {}", check(dkim_pass), rec.dkim));
            lines.push(format!(
                "  {} Outcome: disposition {}",
                check(delivered),
                rec.disposition
            ));

            let sentence = match verdict {
                Verdict::Success => format!(
                    "Nothing to do: {} accepted these messages as fully authenticated.",
                    m.org_name
                ),
                Verdict::Warning => {
                    // Both mechanisms can pass and still land here when the
                    // disposition was quarantine; no mechanism to blame then.
                    if spf_pass && dkim_pass {
                        format!(
                            "Both SPF and DKIM passed, but {} still applied disposition {}; review your DMARC policy for this source.",
                            m.org_name, rec.disposition
                        )
                    } else {
                        let (needs, passed) = if spf_pass {
                            ("DKIM", "SPF")
                        } else {
                            ("SPF", "DKIM")
                        };
                        format!(
                            "Check your {} setup: {} saw only {} pass for this source.",
                            needs, m.org_name, passed
                        )
                    }
                }
                Verdict::Failure => format!(
                    "These messages failed authentication at {}; verify this source is allowed to send for your domain.",
                    m.org_name
                ),
            };
            lines.push(sentence);
        }

        lines.join("\n")
    }
}

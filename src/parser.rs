//! XML Parser Module
//!
//! This module parses DMARC aggregate report XML into a [`ParsedReport`]. It
//! matches elements by local name so that namespaced and plain reports parse
//! identically, and it enforces a nesting depth limit. DOCTYPE declarations
//! are removed from the input before parsing; a DOCTYPE that defines two or
//! more entities is rejected outright.
//!
//! Every field lookup defaults to an empty string when the element is absent,
//! and an unparsable message count becomes 0. Only a malformed document fails
//! the parse as a whole.

use crate::error::{ReportError, Result};
use crate::models::{DkimDetail, ParsedReport, RecordEntry, ReportMetadata, SpfDetail};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const MAX_DEPTH: u32 = 20;

/// Parses DMARC XML content into a structured report.
///
/// # Errors
///
/// Returns an error if the XML cannot be parsed, if the nesting depth limit
/// is exceeded, or if the DOCTYPE block (if present) defines two or more
/// entity definitions.
pub fn parse_report(xml_content: &str) -> Result<ParsedReport> {
    let cleaned_xml = strip_doctype(xml_content)?;

    let mut reader = Reader::from_str(&cleaned_xml);
    reader.config_mut().trim_text(true);

    let mut report = ParsedReport::default();
    let mut depth: u32 = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(ReportError::Parse(
                        "XML nesting depth limit exceeded".into(),
                    ));
                }
                match e.local_name().as_ref() {
                    b"report_metadata" => {
                        parse_metadata(&mut reader, &mut report.metadata)?;
                        depth = depth.saturating_sub(1);
                    }
                    b"policy_published" => {
                        parse_policy_published(&mut reader, &mut report.metadata)?;
                        depth = depth.saturating_sub(1);
                    }
                    b"record" => {
                        report.records.push(parse_record(&mut reader)?);
                        depth = depth.saturating_sub(1);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => (),
        }
    }

    Ok(report)
}

/// Removes the DOCTYPE block, rejecting input that defines multiple entities.
fn strip_doctype(xml_content: &str) -> Result<String> {
    if let Some(start) = xml_content.find("<!DOCTYPE") {
        if let Some(end) = xml_content[start..].find("]>") {
            let doctype = &xml_content[start..start + end + 2];
            if doctype.matches("<!ENTITY").count() >= 2 {
                return Err(ReportError::Parse(
                    "Recursive entity definitions detected".into(),
                ));
            }
            let before = &xml_content[..start];
            let after = &xml_content[start + end + 2..];
            return Ok(format!("{}{}", before, after));
        }
    }
    Ok(xml_content.to_string())
}

/// Parses the `<report_metadata>` element, including the nested `date_range`.
fn parse_metadata(reader: &mut Reader<&[u8]>, metadata: &mut ReportMetadata) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"org_name" => {
                    metadata.org_name = reader.read_text(e.name())?.trim().to_string();
                }
                b"report_id" => {
                    metadata.report_id = reader.read_text(e.name())?.trim().to_string();
                }
                b"begin" => {
                    metadata.begin = reader.read_text(e.name())?.trim().to_string();
                }
                b"end" => {
                    metadata.end = reader.read_text(e.name())?.trim().to_string();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"report_metadata" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

/// Parses the `<policy_published>` element.
fn parse_policy_published(
    reader: &mut Reader<&[u8]>,
    metadata: &mut ReportMetadata,
) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"domain" => {
                    metadata.domain = reader.read_text(e.name())?.trim().to_string();
                }
                b"p" => {
                    metadata.policy = reader.read_text(e.name())?.trim().to_string();
                }
                b"sp" => {
                    metadata.subdomain_policy = reader.read_text(e.name())?.trim().to_string();
                }
                b"pct" => {
                    metadata.pct = reader.read_text(e.name())?.trim().to_string();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"policy_published" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

/// Parses one `<record>` element.
fn parse_record(reader: &mut Reader<&[u8]>) -> Result<RecordEntry> {
    let mut record = RecordEntry::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => parse_row(reader, &mut record)?,
                b"auth_results" => parse_auth_results(reader, &mut record)?,
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"record" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(record)
}

/// Parses the `<row>` element, including the nested `policy_evaluated`.
fn parse_row(reader: &mut Reader<&[u8]>, record: &mut RecordEntry) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"source_ip" => {
                    record.source_ip = reader.read_text(e.name())?.trim().to_string();
                }
                b"count" => {
                    record.count = reader.read_text(e.name())?.trim().parse().unwrap_or(0);
                }
                b"policy_evaluated" => parse_policy_evaluated(reader, record)?,
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"row" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

/// Parses the `<policy_evaluated>` element.
fn parse_policy_evaluated(reader: &mut Reader<&[u8]>, record: &mut RecordEntry) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"disposition" => {
                    record.disposition = reader.read_text(e.name())?.trim().to_string();
                }
                b"dkim" => {
                    record.dkim = reader.read_text(e.name())?.trim().to_string();
                }
                b"spf" => {
                    record.spf = reader.read_text(e.name())?.trim().to_string();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"policy_evaluated" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

/// Parses the `<auth_results>` element with its SPF and DKIM details.
fn parse_auth_results(reader: &mut Reader<&[u8]>, record: &mut RecordEntry) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"spf" => {
                    record.spf_detail = Some(parse_spf_detail(reader)?);
                }
                b"dkim" => {
                    record.dkim_details.push(parse_dkim_detail(reader)?);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"auth_results" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

/// Parses an `auth_results/spf` element.
fn parse_spf_detail(reader: &mut Reader<&[u8]>) -> Result<SpfDetail> {
    let mut detail = SpfDetail::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"domain" => {
                    detail.domain = reader.read_text(e.name())?.trim().to_string();
                }
                b"result" => {
                    detail.result = reader.read_text(e.name())?.trim().to_string();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"spf" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(detail)
}

/// Parses an `auth_results/dkim` element.
fn parse_dkim_detail(reader: &mut Reader<&[u8]>) -> Result<DkimDetail> {
    let mut detail = DkimDetail::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"domain" => {
                    detail.domain = reader.read_text(e.name())?.trim().to_string();
                }
                b"result" => {
                    detail.result = reader.read_text(e.name())?.trim().to_string();
                }
                b"selector" => {
                    detail.selector = reader.read_text(e.name())?.trim().to_string();
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"dkim" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportError::Xml(e)),
            _ => {}
        }
    }
    Ok(detail)
}

/// Converts Unix-epoch text to `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Non-numeric or out-of-range input is returned unchanged; this never fails.
pub fn format_timestamp(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

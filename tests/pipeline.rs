//! End-to-end pipeline tests for dmarcsum.
//!
//! These tests build report archives on disk, run them through extraction,
//! parsing, classification, and rendering, and check the resulting text.

use std::fs::File;
use std::io::Write;

use anyhow::Result;
use tempfile::tempdir;
use zip::write::FileOptions;

use dmarcsum::classify::classify_all;
use dmarcsum::config::Config;
use dmarcsum::extract::extract_payloads;
use dmarcsum::models::Verdict;
use dmarcsum::parser::parse_report;
use dmarcsum::render::{DigestRenderer, NarrativeRenderer, Renderer};

const REPORT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feedback>
  <report_metadata>
    <org_name>google.com</org_name>
    <report_id>9876</report_id>
    <date_range>
      <begin>1700000000</begin>
      <end>1700086399</end>
    </date_range>
  </report_metadata>
  <policy_published>
    <domain>example.com</domain>
    <p>quarantine</p>
    <sp>quarantine</sp>
    <pct>100</pct>
  </policy_published>
  <record>
    <row>
      <source_ip>192.0.2.1</source_ip>
      <count>10</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>pass</dkim>
        <spf>pass</spf>
      </policy_evaluated>
    </row>
  </record>
  <record>
    <row>
      <source_ip>198.51.100.7</source_ip>
      <count>2</count>
      <policy_evaluated>
        <disposition>quarantine</disposition>
        <dkim>pass</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <auth_results>
      <spf>
        <domain>other.example</domain>
        <result>fail</result>
      </spf>
      <dkim>
        <domain>example.com</domain>
        <result>pass</result>
        <selector>s2</selector>
      </dkim>
    </auth_results>
  </record>
  <record>
    <row>
      <source_ip>203.0.113.99</source_ip>
      <count>1</count>
      <policy_evaluated>
        <disposition>reject</disposition>
        <dkim>fail</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
  </record>
</feedback>"#;

fn config() -> Config {
    Config {
        reports_dir: "reports".into(),
        max_file_size: 10 * 1024 * 1024,
        max_decompressed_size: 100 * 1024 * 1024,
    }
}

#[test]
fn zip_report_to_digest_summary() -> Result<()> {
    let dir = tempdir()?;
    let zip_path = dir.path().join("report.zip");
    let file = File::create(&zip_path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options: FileOptions<()> = FileOptions::default();
    zip.start_file("example.com!google.com!1700000000!1700086399.xml", options)?;
    zip.write_all(REPORT_XML.as_bytes())?;
    zip.finish()?;

    let payloads = extract_payloads(&zip_path, &config())?;
    assert_eq!(payloads.len(), 1);

    let report = parse_report(&payloads[0])?;
    assert_eq!(report.records.len(), 3);

    let verdicts = classify_all(&report);
    assert_eq!(
        verdicts,
        vec![Verdict::Success, Verdict::Warning, Verdict::Failure]
    );

    let out = DigestRenderer.render(&report, &verdicts);
    assert!(out.contains("Report: example.com | From: google.com"));
    assert!(out.contains("Policy: p=quarantine, sp=quarantine, pct=100"));
    assert!(out.contains("❌ FAILURE #1: 1 email from IP 203.0.113.99"));
    assert!(out.contains("⚠️ WARNING #1: 2 emails from IP 198.51.100.7"));
    assert!(out.contains("   DKIM Check #1: domain=example.com, result=pass, selector=s2"));
    assert!(out.contains(
        "SUMMARY: 🚨 1 FAILED | ⚠️ 2 WARNINGS | ✅ 10 SUCCESS | Total: 13 messages"
    ));
    Ok(())
}

#[test]
fn gz_report_to_narrative_summary() -> Result<()> {
    let dir = tempdir()?;
    let gz_path = dir.path().join("report.xml.gz");
    let file = File::create(&gz_path)?;
    let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    gz.write_all(REPORT_XML.as_bytes())?;
    gz.finish()?;

    let payloads = extract_payloads(&gz_path, &config())?;
    assert_eq!(payloads.len(), 1);

    let report = parse_report(&payloads[0])?;
    let verdicts = classify_all(&report);
    let out = NarrativeRenderer.render(&report, &verdicts);

    assert!(out.contains("DMARC Report for example.com"));
    assert!(out.contains("✅ Successful Delivery"));
    assert!(out.contains("⚠️ Warning (Partial Pass)"));
    assert!(out.contains("❌ Failure"));
    assert!(out.contains("10 emails arrived from IP 192.0.2.1."));
    assert!(out.contains("Check your SPF setup: google.com saw only DKIM pass for this source."));
    Ok(())
}

#[test]
fn all_clear_report_renders_one_line() -> Result<()> {
    let xml = r#"<feedback>
      <report_metadata><org_name>mailer.example</org_name></report_metadata>
      <policy_published><domain>example.com</domain></policy_published>
      <record>
        <row>
          <source_ip>192.0.2.1</source_ip>
          <count>7</count>
          <policy_evaluated>
            <disposition>none</disposition>
            <dkim>pass</dkim>
            <spf>pass</spf>
          </policy_evaluated>
        </row>
      </record>
    </feedback>"#;

    let report = parse_report(xml)?;
    let verdicts = classify_all(&report);
    let out = DigestRenderer.render(&report, &verdicts);
    assert_eq!(
        out,
        "✅ example.com (mailer.example): All 7 messages passed authentication"
    );
    Ok(())
}

#[test]
fn classifier_totals_cover_every_message() -> Result<()> {
    let report = parse_report(REPORT_XML)?;
    let verdicts = classify_all(&report);

    let per_bucket: u64 = [Verdict::Success, Verdict::Warning, Verdict::Failure]
        .into_iter()
        .map(|bucket| {
            report
                .records
                .iter()
                .zip(&verdicts)
                .filter(|(_, v)| **v == bucket)
                .map(|(r, _)| r.count)
                .sum::<u64>()
        })
        .sum();
    assert_eq!(per_bucket, report.total_messages());
    Ok(())
}

#[test]
fn namespaced_gz_report_parses_like_plain() -> Result<()> {
    let namespaced = REPORT_XML.replace(
        "<feedback>",
        r#"<feedback xmlns="http://dmarc.org/dmarc-xml/0.1">"#,
    );

    let dir = tempdir()?;
    let gz_path = dir.path().join("ns.xml.gz");
    let file = File::create(&gz_path)?;
    let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    gz.write_all(namespaced.as_bytes())?;
    gz.finish()?;

    let payloads = extract_payloads(&gz_path, &config())?;
    let parsed = parse_report(&payloads[0])?;
    assert_eq!(parsed, parse_report(REPORT_XML)?);
    Ok(())
}

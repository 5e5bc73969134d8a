//! Archive Extraction Module
//!
//! This module turns a report file into XML payloads, dispatching on the file
//! extension: ZIP archives yield one payload per contained `.xml` entry, GZIP
//! files yield exactly one decompressed payload, and plain XML files are read
//! as-is. File size and decompressed size limits from the configuration are
//! enforced during extraction.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use zip::ZipArchive;

use crate::config::Config;
use crate::error::{ReportError, Result};

/// Extracts the XML payloads from a report file.
///
/// # Arguments
///
/// * `file_path` - The path to the input file (`.zip`, `.gz`, or `.xml`).
/// * `config` - Size limits applied during extraction.
///
/// A ZIP archive with no `.xml` entries is not an error: a notice is logged
/// and an empty vector is returned. Any extension other than the three
/// supported ones yields [`ReportError::UnsupportedFile`].
pub fn extract_payloads<P: AsRef<Path>>(file_path: P, config: &Config) -> Result<Vec<String>> {
    let file = File::open(&file_path)?;
    let file_size = file.metadata()?.len();
    if file_size > config.max_file_size as u64 {
        return Err(ReportError::FileTooLarge(format!(
            "File size {} bytes exceeds limit of {} bytes",
            file_size, config.max_file_size
        )));
    }

    let ext = file_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "zip" => extract_zip(file, config),
        "gz" => extract_gz(file, config),
        "xml" => {
            let mut reader = BufReader::new(file);
            let mut contents = String::new();
            reader.read_to_string(&mut contents)?;
            Ok(vec![contents])
        }
        _ => Err(ReportError::UnsupportedFile(
            "Unsupported file type. Please provide a .zip, .gz, or .xml file.".into(),
        )),
    }
}

/// Reads every `.xml` entry (case-insensitive) from a ZIP archive.
fn extract_zip(file: File, config: &Config) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut payloads = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().to_lowercase().ends_with(".xml") {
            continue;
        }
        if entry.size() > config.max_decompressed_size as u64 {
            return Err(ReportError::FileTooLarge(format!(
                "Entry too large in ZIP: {}",
                entry.name()
            )));
        }
        let mut contents = String::with_capacity(entry.size() as usize);
        entry.read_to_string(&mut contents)?;
        payloads.push(contents);
    }
    if payloads.is_empty() {
        log::warn!("No XML files found in the zip archive.");
    }
    Ok(payloads)
}

/// Decompresses a GZIP stream into a single payload.
fn extract_gz(file: File, config: &Config) -> Result<Vec<String>> {
    let mut gz = GzDecoder::new(BufReader::new(file));
    let mut contents = String::new();
    let len = gz.read_to_string(&mut contents)?;
    if len > config.max_decompressed_size {
        return Err(ReportError::FileTooLarge(
            "Decompressed GZ size exceeds limit".into(),
        ));
    }
    Ok(vec![contents])
}

//! Configuration Module
//!
//! This module reads configuration values from environment variables, provides
//! sensible defaults, and validates key parameters such as the maximum input
//! file size and decompression limit.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned in batch mode.
    pub reports_dir: PathBuf,
    pub max_file_size: usize,
    pub max_decompressed_size: usize,
}

impl Config {
    /// Creates a new configuration by reading environment variables.
    /// If a variable is missing or empty, a default value is used.
    pub fn new() -> Result<Self> {
        let reports_dir = env::var("DMARC_REPORTS_DIR")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("reports"));

        // Default 10MB per input file.
        let max_file_size = env::var("DMARC_MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        if max_file_size > 500_000_000 {
            return Err(anyhow::anyhow!("Max file size too large (500MB limit)"));
        }

        let max_decompressed_size = env::var("DMARC_MAX_DECOMPRESSED_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100 * 1024 * 1024);

        Ok(Config {
            reports_dir,
            max_file_size,
            max_decompressed_size,
        })
    }
}

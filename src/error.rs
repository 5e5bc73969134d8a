//! Error Handling Module
//!
//! This module defines custom error types for dmarcsum using the `thiserror` crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

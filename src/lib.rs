//! dmarcsum Library
//!
//! This library provides the core functionality for dmarcsum: configuration,
//! error handling, data models, archive extraction, DMARC XML parsing, record
//! classification, report rendering, and dialog notification.

pub mod classify;
pub mod config;
pub mod dialog;
pub mod error;
pub mod extract;
pub mod models;
pub mod parser;
pub mod render;

pub use classify::{classify, classify_all};
pub use config::Config;
pub use extract::extract_payloads;
pub use parser::parse_report;
pub use render::{DigestRenderer, NarrativeRenderer, Renderer};

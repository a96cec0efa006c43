//! Corrective Action Report extraction: section segmentation, per-section
//! field extraction, WHY-chain parsing and clause classification.

pub mod classify;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod records;

pub use classify::{ClassificationResult, ClauseClassifier};
pub use document::{Document, Page, Row};
pub use pipeline::Pipeline;
pub use records::CarReport;

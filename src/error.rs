//! Structured error types for the report engine.
//!
//! Only configuration and backend problems become errors. Template misses,
//! bad coordinates and out-of-range list references resolve to empty values
//! or defaults and never reach these types.

use thiserror::Error;

/// The unified error type returned by the public report API.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input (data set, document or configuration) failed to parse.
    #[error("Failed to parse JSON: {source}{}", hint_suffix(.hint))]
    Json {
        source: serde_json::Error,
        hint: String,
    },
    /// Layout markup could not be read.
    #[error("Failed to parse layout markup: {0}")]
    Xml(String),
    /// The document is structurally unusable (e.g. no page root).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Reading inputs or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The drawing surface failed outside a recoverable primitive.
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Json { source: e, hint }
    }
}

impl From<quick_xml::Error> for ReportError {
    fn from(e: quick_xml::Error) -> Self {
        ReportError::Xml(e.to_string())
    }
}

/// Errors raised by a drawing surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    /// The backend has no generator for this barcode family.
    #[error("unsupported barcode type '{0}'")]
    UnsupportedBarcode(String),
    /// The payload is not encodable in the requested family.
    #[error("invalid barcode payload: {0}")]
    InvalidBarcode(String),
    /// A drawing primitive was issued outside begin_page/end_page.
    #[error("no open page")]
    NoOpenPage,
    #[error("font error: {0}")]
    Font(String),
}

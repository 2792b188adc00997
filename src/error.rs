//! Structured error types for the report layout engine.
//!
//! Layout itself only fails for two reasons: the input is malformed
//! (a configuration error) or the pluggable text measurer gave up.
//! Overflowing content is never an error; it is clipped.

use thiserror::Error;

/// A text measurer could not produce a width for some text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot measure {text:?}: {reason}")]
pub struct MeasureError {
    pub text: String,
    pub reason: String,
}

impl MeasureError {
    pub fn new(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while validating or paginating a report document.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A card has a non-positive width, a non-positive fixed height, or
    /// does not fit the page content area horizontally.
    #[error("invalid card {title:?}: {reason}")]
    InvalidCard { title: String, reason: String },

    /// Page metrics leave no usable content area.
    #[error("invalid page metrics: {0}")]
    InvalidMetrics(String),

    /// A layout constant is negative, non-finite, or leaves a card no room.
    #[error("invalid layout options: {0}")]
    InvalidOptions(String),

    #[error("report document has no sections")]
    EmptyDocument,

    #[error("section {section} has no cards")]
    EmptySection { section: usize },

    #[error("section {section} contains an empty row")]
    EmptyRow { section: usize },

    /// The text measurer failed. Never caught inside the engine.
    #[error("text measurement failed: {0}")]
    Measurement(#[from] MeasureError),
}

/// The unified error type returned by the public `render_*` entry points.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a valid render request.
    #[error("failed to parse report input: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// PDF or JSON serialization of the laid-out pages failed.
    #[error("render error: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

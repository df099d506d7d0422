use thiserror::Error;

/// Errors that can occur during invoice construction or processing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FatturaError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Invoice number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// XML generation error: mandatory data missing or write failure.
    /// A partial document is never returned.
    #[error("XML error: {0}")]
    Xml(String),
}

/// A single validation discrepancy with field path and message.
///
/// Messages are user-facing Italian wording ("imponibile", "imposta",
/// "totale"), matching the administration UI these invoices feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the field (e.g. "totals.total").
    pub field: String,
    /// Human-readable description of the discrepancy.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

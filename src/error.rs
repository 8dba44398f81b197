// ❌ Error Taxonomy
//
// Only structural identity failures abort a record. Everything per-field
// degrades to None inside the builder and never reaches these types.

use thiserror::Error;

/// The document cannot become a record at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedDocumentError {
    #[error("entity document is not a JSON object")]
    NotAnObject,

    #[error("entity document is missing mandatory field `{0}`")]
    MissingField(&'static str),
}

/// Failures surfaced while interpreting a search response
#[derive(Debug, Error)]
pub enum SearchError {
    /// Non-404 status without a usable hit list
    #[error("could not get cvr company - status code: {status}; message: {message}")]
    Fatal { status: u16, message: String },

    #[error("search response body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error(transparent)]
    Malformed(#[from] MalformedDocumentError),
}

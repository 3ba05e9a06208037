use thiserror::Error;

/// Errors surfaced by the extraction/analysis collaborators. These are
/// reported to the user verbatim and never mutate the template cache.
#[derive(Debug, Clone, Error)]
pub enum AnalyzerError {
    #[error("Analysis request failed: {0}")]
    Api(String),

    #[error("Page is not accessible: {0}")]
    PageInaccessible(String),

    #[error("Malformed analysis response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by the live-page seam while resolving or writing a field.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    #[error("No element matches selector: {selector}")]
    ElementNotFound { selector: String },

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Script execution error: {0}")]
    Script(String),

    #[error("Element is not fillable: {0}")]
    NotFillable(String),

    #[error("Connection to page lost")]
    ConnectionLost,
}

impl PageError {
    /// Whether the failure means "the selector matched nothing", as opposed
    /// to a write that was attempted and threw.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PageError::ElementNotFound { .. } | PageError::SelectorInvalid { .. }
        )
    }
}

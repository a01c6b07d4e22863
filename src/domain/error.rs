use thiserror::Error;

use super::content::SinkError;

/// Failures raised by composition primitives and the render pass.
///
/// Every variant is fatal to the call that produced it. Authoring mistakes that
/// leave the output intact are reported as diagnostics instead.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("value for `{parameter}` cannot be null or empty")]
    Argument { parameter: &'static str },
    #[error("section `{name}` has already been defined")]
    Conflict { name: String },
    #[error(
        "`{operation}` cannot be called outside a content page's layout context (template `{template_path}`)"
    )]
    InvalidState {
        operation: &'static str,
        template_path: String,
    },
    #[error(
        "section `{name}` is not defined for layout `{template_path}` while rendering `{view_path}`"
    )]
    SectionNotDefined {
        name: String,
        template_path: String,
        view_path: String,
    },
    #[error("page `{path}` is not registered")]
    PageNotFound { path: String },
    #[error("page `{path}` is already registered")]
    DuplicatePage { path: String },
    #[error("path `{reference}` cannot be resolved from `{base}`")]
    InvalidPath { base: String, reference: String },
    #[error("layout chain for `{view_path}` exceeds maximum depth {max_depth}")]
    LayoutDepthExceeded { view_path: String, max_depth: usize },
    #[error("page `{path}` failed: {message}")]
    Page { path: String, message: String },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ComposeError {
    pub fn argument(parameter: &'static str) -> Self {
        Self::Argument { parameter }
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    pub fn invalid_state(operation: &'static str, template_path: impl Into<String>) -> Self {
        Self::InvalidState {
            operation,
            template_path: template_path.into(),
        }
    }

    pub fn page(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Page {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True when the failure means the requested view does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. })
    }
}

/// Reject empty identifiers before they reach a registry or composer.
pub(crate) fn require_name(value: &str, parameter: &'static str) -> Result<(), ComposeError> {
    if value.is_empty() {
        return Err(ComposeError::argument(parameter));
    }
    Ok(())
}

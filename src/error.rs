//! Error taxonomy of the form generator.

use thiserror::Error;

/// Failure returned by [`FormGenerator`](crate::generator::FormGenerator).
///
/// Input errors are raised before any page is laid out. Rendering errors abort the single
/// generation call; no partial byte stream is ever handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The application record does not match the shape its applicant type requires.
    #[error("inconsistent application data: {0}")]
    DataInconsistency(String),
    /// Layout or drawing failed.
    #[error("failed to render subscription form: {0}")]
    Render(String),
}

impl FormError {
    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::DataInconsistency(message.into())
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Returns `true` for errors detected before rendering started.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::DataInconsistency(_))
    }
}

impl From<genpdf::error::Error> for FormError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Render(err.to_string())
    }
}

use thiserror::Error;

/// Errors produced when building or validating model configuration.
///
/// Malformed LDIF text is never reported through this type; line defects are
/// recorded on the parsed line itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid wrap width {0}: must be 0 (no folding) or at least 2")]
    InvalidWrapWidth(usize),

    #[error("unknown line separator: {0:?}")]
    UnknownLineSeparator(String),
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;

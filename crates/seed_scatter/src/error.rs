//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration (reported before a run touches the scene),
//! failures raised by host collaborators while committing a placement, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to instantiate prototype '{prototype}': {message}")]
    Instantiation { prototype: String, message: String },

    #[error("collaborator error: {0}")]
    Collaborator(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an [`Error::Instantiation`] with owned fields.
    pub fn instantiation(prototype: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Instantiation {
            prototype: prototype.into(),
            message: message.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn instantiation_message_names_prototype() {
        let err = Error::instantiation("oak", "pool exhausted");
        assert_eq!(
            err.to_string(),
            "failed to instantiate prototype 'oak': pool exhausted"
        );
    }
}

//! Error values used by the trial parsers.
//!
//! These never escape the public parse API: a failed trial parse rewinds
//! the tokenizer cursor and the caller picks the next alternative, so an
//! error here is a control-flow signal rather than a user-visible
//! failure.

use crate::location::Location;
use thiserror::Error;

/// Parser error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}{}", .location.map_or(String::new(), |l| format!(" at {l}")))]
pub struct CssError {
    /// Error message
    pub message: String,
    /// Location of the error, if available (during parsing mostly)
    pub location: Option<Location>,
}

impl CssError {
    #[must_use]
    pub fn new(message: &str) -> Self {
        CssError {
            message: message.to_string(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(message: &str, location: Location) -> Self {
        CssError {
            message: message.to_string(),
            location: Some(location),
        }
    }
}

pub type CssResult<T> = Result<T, CssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_location() {
        let plain = CssError::new("expected ident");
        assert_eq!(plain.to_string(), "expected ident");

        let located = CssError::with_location("expected ident", Location::new(3, 14, 42));
        assert_eq!(located.to_string(), "expected ident at 3:14");
    }
}

//! Error types for the `easyaprs-models` crate.
//!
//! All fallible constructors and `TryFrom` implementations in this crate
//! return variants of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A callsign was empty or contained characters APRS-IS does not accept.
    #[error("invalid callsign \"{value}\": {reason}")]
    InvalidCallsign {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A symbol table or symbol code was not a single printable character.
    #[error("invalid symbol \"{value}\": {reason}")]
    InvalidSymbol {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A beacon interval was outside the accepted range.
    #[error("invalid interval {value} minutes: {reason}")]
    InvalidInterval {
        /// The value that failed validation.
        value: u32,
        /// Human-readable explanation.
        reason: String,
    },

    /// An object name was empty.
    #[error("invalid object name \"{value}\": {reason}")]
    InvalidObjectName {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_callsign() {
        let err = ModelError::InvalidCallsign {
            value: "".into(),
            reason: "must not be empty".into(),
        };
        assert_eq!(err.to_string(), "invalid callsign \"\": must not be empty");
    }

    #[test]
    fn error_display_interval() {
        let err = ModelError::InvalidInterval {
            value: 0,
            reason: "must be between 1 and 1440".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid interval 0 minutes: must be between 1 and 1440"
        );
    }

    #[test]
    fn error_display_symbol() {
        let err = ModelError::InvalidSymbol {
            value: "ab".into(),
            reason: "must be exactly one character".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid symbol \"ab\": must be exactly one character"
        );
    }
}

//! Error types for model construction and decoding.

use thiserror::Error;

/// Everything that can go wrong before a decode starts.
///
/// All checks run eagerly; once decoding begins it cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A distribution is missing an entry, holds a value outside [0,1],
    /// does not sum to ~1, or references an undeclared identifier.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The observation sequence or the state set is empty.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// An observation has no emission probability in the model.
    #[error("unknown observation {observation} at position {position}")]
    UnknownObservation {
        /// Index of the offending element in the observation sequence.
        position: usize,
        /// `Debug` rendering of the observation identifier.
        observation: String,
    },

    /// A state path handed to path scoring does not fit the observations
    /// or names an undeclared state.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;

impl DecodeError {
    pub(crate) fn invalid_model(msg: impl Into<String>) -> Self {
        let err = DecodeError::InvalidModel(msg.into());
        #[cfg(feature = "tracing")]
        tracing::debug!(error = %err, "model rejected");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeError;

    #[test]
    fn messages_name_the_problem() {
        let e = DecodeError::InvalidModel("transition row 1 sums to 0.9".into());
        assert_eq!(e.to_string(), "invalid model: transition row 1 sums to 0.9");

        let e = DecodeError::EmptyInput("observation sequence is empty");
        assert_eq!(e.to_string(), "empty input: observation sequence is empty");

        let e = DecodeError::UnknownObservation {
            position: 3,
            observation: "'x'".into(),
        };
        assert_eq!(e.to_string(), "unknown observation 'x' at position 3");
    }
}

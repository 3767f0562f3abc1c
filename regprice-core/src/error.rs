//! Engine error type.

use thiserror::Error;

/// Errors surfaced by the segmentation engine.
///
/// Only malformed input is an error. "No admissible split" is ordinary
/// control flow and is reported as `None` by the finder and refiner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SegmentError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_includes_reason() {
        let err = SegmentError::invalid_input("length 1 < 2");
        assert_eq!(err.to_string(), "invalid input: length 1 < 2");
    }
}

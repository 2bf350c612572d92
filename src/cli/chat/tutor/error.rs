//! Error types for the tutoring core.
//!
//! Only [`TutorError`] ever reaches the host. [`NotComputable`] and
//! [`NotApplicable`] are expected outcomes that steer the dialogue: the first
//! means "no expected answer", the second means "ask the text generator
//! instead of drawing a picture".

/// A specialized `Result` type for tutor turns.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that abort a single tutor turn. The caller keeps its previous
/// conversation state when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// The learner sent an empty or whitespace-only message.
    #[error("No message provided")]
    EmptyMessage,

    /// The text generator could not produce an explanation.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Failures of the generative-text collaborator.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("text generator is not configured: {0}")]
    NotConfigured(String),

    #[error("text generator timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("text generator request failed: {0}")]
    Transport(String),

    #[error("text generator returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("text generator returned no text")]
    EmptyResponse,
}

/// Why the evaluator cannot produce an expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotComputable {
    #[error("expected exactly two numbers, found {found}")]
    MissingOperands { found: usize },

    #[error("no arithmetic operator in the question")]
    NoArithmeticOperator,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result does not fit in an integer")]
    OutOfRange,
}

/// Why the illustration generator declined to draw a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotApplicable {
    #[error("expected exactly two numbers, found {found}")]
    MissingOperands { found: usize },

    #[error("more than {max} items to draw")]
    TooManyItems { max: usize },

    #[error("subtraction would go below zero")]
    NegativeResult,

    #[error("division by zero")]
    DivisionByZero,

    #[error("{dividend} cannot be shared equally into {divisor} groups")]
    NotDivisible { dividend: usize, divisor: usize },

    #[error("no picture for this kind of question")]
    NoPicture,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_converts_to_tutor_error() {
        let err: TutorError = UpstreamError::Timeout { timeout_secs: 30 }.into();
        assert!(matches!(err, TutorError::Upstream(UpstreamError::Timeout { .. })));
        assert_eq!(err.to_string(), "text generator timed out after 30s");
    }

    #[test]
    fn test_not_applicable_display() {
        let err = NotApplicable::NotDivisible {
            dividend: 12,
            divisor: 5,
        };
        assert_eq!(err.to_string(), "12 cannot be shared equally into 5 groups");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the tutor is in the dialogue for the current question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Waiting for a greeting or a new math question.
    #[default]
    AwaitingQuestion,
    /// A question was recognised; waiting for YES/NO to "would you like help?".
    AwaitingHelpConsent,
    /// The learner accepted help; the next turn renders the explanation.
    AwaitingExplanation,
    /// The explanation was shown; waiting for the learner's answer.
    AwaitingAnswer,
    /// The answer was wrong or uncheckable; waiting for YES/NO to the full solution.
    AwaitingFullSolutionConsent,
}

impl Step {
    /// Returns `true` while the tutor expects a YES or NO reply.
    pub fn expects_yes_no(&self) -> bool {
        matches!(self, Self::AwaitingHelpConsent | Self::AwaitingFullSolutionConsent)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingQuestion => "awaiting_question",
            Self::AwaitingHelpConsent => "awaiting_help_consent",
            Self::AwaitingExplanation => "awaiting_explanation",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::AwaitingFullSolutionConsent => "awaiting_full_solution_consent",
        };
        f.write_str(name)
    }
}

/// Per-session tutoring state. Only the tutor engine changes it; the host
/// just stores and hands it back on the next message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    pub step: Step,
    pub last_question: String,
    pub expected_answer: Option<i64>,
    pub hint_already_sent: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tutoring `question`, dropping whatever was in progress.
    pub fn begin_question(&mut self, question: &str, expected_answer: Option<i64>) {
        self.step = Step::AwaitingHelpConsent;
        self.last_question = question.to_string();
        self.expected_answer = expected_answer;
        self.hint_already_sent = false;
    }

    pub fn has_active_question(&self) -> bool {
        !self.last_question.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

//! The tutoring dialogue.
//!
//! [`Tutor::handle_message`] takes the session's current
//! [`ConversationState`] and one learner message, and returns the reply with
//! the next state. A single message can move through several steps: a new
//! question goes straight to the hint, and a "yes" to help goes straight to
//! the explanation.

pub mod answer;
pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod illustration;
pub mod tips;

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use tracing::{debug, info, warn};

use self::answer::check_answer;
use self::classifier::{classify, is_affirmative, is_negative, normalize, MessageKind};
pub use self::error::{Result, TutorError, UpstreamError};
use self::evaluator::evaluate;
use self::illustration::illustrate;
use self::tips::select_tip;
use crate::cli::chat::conversation_state::{ConversationState, Step};

/// Text generator used when a question cannot be explained with a picture,
/// and for full solutions.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> std::result::Result<String, UpstreamError>;
}

const SYSTEM_PROMPT: &str = "You are Counticus, a friendly Grade 1 math tutor.";

const MATH_ONLY_REPLY: &str = "Sorry, I can only help with math questions only.";
const HELP_DECLINED_REPLY: &str = "Alright! Let me know if you have another math question.";
const YES_NO_PROMPT: &str = "👇 Please answer YES or NO 👇";
const YES_NO_ONLY_REPLY: &str = "I'm sorry, I can't understand that.\n\nPlease reply with YES or NO only.";
const ASK_FOR_ANSWER: &str = "What do you think the answer is?";
const CORRECT_REPLY: &str = "That's correct! Great job! 🎉 Let me know if you want to try another question.";
const NOT_QUITE_REPLY: &str =
    "That's not quite right. Would you like me to explain the full solution?\n\nPlease answer YES or NO";
const UNCHECKED_ANSWER_REPLY: &str =
    "I can't check this one on my own. Would you like me to explain the full solution?\n\nPlease answer YES or NO";
const SOLUTION_DECLINED_REPLY: &str = "Okay! Feel free to ask me another math question anytime.";
const SOLUTION_YES_NO_REPLY: &str =
    "Sorry, your answer is not wrong or not valid. Please reply with 'YES' or 'NO' if you want the full explanation.";
const FALLBACK_REPLY: &str = "Sorry, I didn't understand that. Please ask a math question or say hello!";

/// Tips longer than this are swapped for [`FALLBACK_TIP`].
const MAX_TIP_CHARS: usize = 300;
const FALLBACK_TIP: &str = "Hi! When you add numbers, you just put them together. \
For example, if you have 1 apple and 1 more apple, how many apples do you have? \
Try counting them one by one! Would you like more help?";

/// Longest possible chain within one message is question → help consent and
/// help consent → explanation, or answer → full solution consent.
const MAX_STEPS_PER_MESSAGE: usize = 4;

static ANSWER_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)the answer is\s*[0-9]+\.?").expect("valid regex"));

/// The tutor's reply to one message together with the state to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub reply: String,
    pub state: ConversationState,
}

impl Turn {
    fn new(reply: impl Into<String>, state: ConversationState) -> Self {
        Self {
            reply: reply.into(),
            state,
        }
    }
}

pub struct Tutor {
    generator: Arc<dyn TextGenerator>,
}

impl Tutor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// A fresh conversation, as on the first message of a session.
    pub fn reset(&self) -> ConversationState {
        info!("Resetting tutor conversation");
        ConversationState::new()
    }

    /// Runs one learner message through the dialogue.
    ///
    /// On error the returned state is never produced, so the caller keeps
    /// `state` as it was and the same step can be retried.
    pub async fn handle_message<R>(&self, state: &ConversationState, raw: &str, rng: &mut R) -> Result<Turn>
    where
        R: Rng + Send + ?Sized,
    {
        let message = normalize(raw);
        if message.is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        let mut state = state.clone();
        if state.step != Step::AwaitingQuestion && !state.has_active_question() {
            warn!(step = %state.step, "No question in progress, starting over");
            state.clear();
        }
        let mut answer_check_skipped = false;

        for _ in 0..MAX_STEPS_PER_MESSAGE {
            debug!(step = %state.step, "Handling message");
            match state.step {
                Step::AwaitingQuestion => {
                    let classified = classify(&message);
                    match classified.kind {
                        MessageKind::Greeting => return Ok(Turn::new(greeting_reply(&message), state)),
                        MessageKind::Unrecognized => return Ok(Turn::new(MATH_ONLY_REPLY, state)),
                        MessageKind::MathQuestion => {
                            let expected = match evaluate(&classified) {
                                Ok(value) => Some(value),
                                Err(reason) => {
                                    debug!(%reason, "No expected answer");
                                    None
                                }
                            };
                            debug!(operator = %classified.operator, ?expected, "New math question");
                            state.begin_question(&message, expected);
                        }
                    }
                }
                Step::AwaitingHelpConsent => {
                    if is_affirmative(&message) {
                        state.step = Step::AwaitingExplanation;
                        state.hint_already_sent = false;
                    } else if is_negative(&message) {
                        state.clear();
                        return Ok(Turn::new(HELP_DECLINED_REPLY, state));
                    } else if !state.hint_already_sent {
                        let tip = bounded_tip(select_tip(&state.last_question, &mut *rng));
                        state.hint_already_sent = true;
                        return Ok(Turn::new(format!("{tip}\n\n{YES_NO_PROMPT}"), state));
                    } else {
                        return Ok(Turn::new(YES_NO_ONLY_REPLY, state));
                    }
                }
                Step::AwaitingExplanation => {
                    let reply = self.explain(&state.last_question, &mut *rng).await?;
                    state.step = Step::AwaitingAnswer;
                    return Ok(Turn::new(reply, state));
                }
                Step::AwaitingAnswer => match state.expected_answer {
                    None => {
                        debug!("No expected answer, skipping answer check");
                        answer_check_skipped = true;
                        state.step = Step::AwaitingFullSolutionConsent;
                    }
                    Some(expected) => {
                        if check_answer(&message, Some(expected)) {
                            debug!("Correct answer");
                            state.clear();
                            return Ok(Turn::new(CORRECT_REPLY, state));
                        }
                        state.step = Step::AwaitingFullSolutionConsent;
                        return Ok(Turn::new(NOT_QUITE_REPLY, state));
                    }
                },
                Step::AwaitingFullSolutionConsent => {
                    if is_affirmative(&message) {
                        let reply = self.full_solution(&state).await?;
                        state.clear();
                        return Ok(Turn::new(reply, state));
                    } else if is_negative(&message) {
                        state.clear();
                        return Ok(Turn::new(SOLUTION_DECLINED_REPLY, state));
                    } else if answer_check_skipped {
                        return Ok(Turn::new(UNCHECKED_ANSWER_REPLY, state));
                    } else {
                        return Ok(Turn::new(SOLUTION_YES_NO_REPLY, state));
                    }
                }
            }
        }

        warn!(step = %state.step, "Message did not settle on a step");
        Ok(Turn::new(FALLBACK_REPLY, self.reset()))
    }

    async fn explain<R>(&self, question: &str, rng: &mut R) -> Result<String>
    where
        R: Rng + Send + ?Sized,
    {
        match illustrate(&classify(question), rng) {
            Ok(picture) => Ok(format!("{picture}\n\n{ASK_FOR_ANSWER}")),
            Err(reason) => {
                debug!(%reason, "No picture, asking the text generator");
                let prompt = format!(
                    "Give a step-by-step solution without the final answer for this math problem: '{question}'. \
                     Then ask: '{ASK_FOR_ANSWER}'"
                );
                Ok(self.generator.generate(SYSTEM_PROMPT, &prompt).await?)
            }
        }
    }

    async fn full_solution(&self, state: &ConversationState) -> Result<String> {
        let prompt = format!(
            "Give a full step-by-step solution including the final answer for this math problem: '{}'. \
             Keep it short and friendly for Grade 1. \
             End the explanation with the final answer clearly stated at the bottom in bold.",
            state.last_question
        );
        let solution = self.generator.generate(SYSTEM_PROMPT, &prompt).await?;
        Ok(finalize_solution(&solution, state.expected_answer))
    }
}

/// Pooled tips are short; this only catches a pool edit that is not.
fn bounded_tip(tip: String) -> String {
    if tip.chars().count() > MAX_TIP_CHARS {
        warn!(len = tip.chars().count(), "Tip too long, using fallback");
        FALLBACK_TIP.to_string()
    } else {
        tip
    }
}

fn greeting_reply(message: &str) -> &'static str {
    match message {
        "hello" | "hi" => "Hello! I'm Counticus, your friendly math helper!",
        "hey" => "Hey! I'm here if you need help with math.",
        "good morning" => "Good morning! I'm here to help with math problems.",
        "good afternoon" => "Good afternoon! Ready to learn some math?",
        "good evening" => "Good evening! Counticus at your service!",
        "thank you" | "ty" => "You're welcome!",
        "thanks" => "No problem!",
        "ok" | "okay" => "Okay!",
        "sure" => "Okay! Just send me a math question when you're ready.",
        "alright" => "Alright! I'm here when you need help.",
        _ => "I'm here to help with math!",
    }
}

/// Drops the generator's own "the answer is N" phrases and, when the
/// expected answer is known, appends it as the last line.
fn finalize_solution(solution: &str, expected: Option<i64>) -> String {
    let mut reply = ANSWER_PHRASE_RE.replace_all(solution, "").trim().to_string();
    if let Some(expected) = expected {
        reply.push_str(&format!("\n\n**Final Answer: {expected}**"));
    }
    reply
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::tips::tips_for;
    use super::*;

    /// Replays canned generator results and records every prompt it gets.
    #[derive(Default)]
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<std::result::Result<String, UpstreamError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn with(replies: Vec<std::result::Result<String, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::default(),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, system_prompt: &str, user_prompt: &str) -> std::result::Result<String, UpstreamError> {
            assert_eq!(system_prompt, SYSTEM_PROMPT);
            self.prompts.lock().unwrap().push(user_prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(UpstreamError::EmptyResponse))
        }
    }

    fn tutor(generator: &Arc<ScriptedGenerator>) -> Tutor {
        Tutor::new(generator.clone())
    }

    async fn send(tutor: &Tutor, state: &ConversationState, message: &str) -> Turn {
        let mut rng = StdRng::seed_from_u64(42);
        tutor.handle_message(state, message, &mut rng).await.unwrap()
    }

    #[tokio::test]
    async fn test_greeting_keeps_state() {
        let generator = ScriptedGenerator::with(vec![]);
        let tutor = tutor(&generator);
        let turn = send(&tutor, &ConversationState::new(), "  Hello ").await;
        assert_eq!(turn.reply, "Hello! I'm Counticus, your friendly math helper!");
        assert_eq!(turn.state, ConversationState::new());

        let turn = send(&tutor, &ConversationState::new(), "yes").await;
        assert_eq!(turn.reply, "I'm here to help with math!");
    }

    #[tokio::test]
    async fn test_non_math_is_refused() {
        let generator = ScriptedGenerator::with(vec![]);
        let turn = send(&tutor(&generator), &ConversationState::new(), "tell me a joke").await;
        assert_eq!(turn.reply, MATH_ONLY_REPLY);
        assert_eq!(turn.state.step, Step::AwaitingQuestion);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let generator = ScriptedGenerator::with(vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = tutor(&generator)
            .handle_message(&ConversationState::new(), "   ", &mut rng)
            .await;
        assert!(matches!(result, Err(TutorError::EmptyMessage)));
    }

    #[tokio::test]
    async fn test_addition_walkthrough() {
        let generator = ScriptedGenerator::with(vec![]);
        let tutor = tutor(&generator);

        let turn = send(&tutor, &ConversationState::new(), "what is 3 + 2").await;
        assert_eq!(turn.state.step, Step::AwaitingHelpConsent);
        assert_eq!(turn.state.expected_answer, Some(5));
        assert_eq!(turn.state.last_question, "what is 3 + 2");
        assert!(turn.state.hint_already_sent);
        assert!(turn.reply.ends_with(YES_NO_PROMPT));
        let add_tips = tips_for("add").unwrap();
        assert!(add_tips.iter().any(|tip| turn.reply.starts_with(tip)));

        let turn = send(&tutor, &turn.state, "yes").await;
        assert_eq!(turn.state.step, Step::AwaitingAnswer);
        assert!(turn.reply.contains("first group of 3"));
        assert!(turn.reply.ends_with(ASK_FOR_ANSWER));

        let turn = send(&tutor, &turn.state, "5").await;
        assert_eq!(turn.reply, CORRECT_REPLY);
        assert_eq!(turn.state, ConversationState::new());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_no_resets_and_same_question_starts_fresh() {
        let generator = ScriptedGenerator::with(vec![]);
        let tutor = tutor(&generator);

        let first = send(&tutor, &ConversationState::new(), "what is 3 + 2").await;
        let declined = send(&tutor, &first.state, "no").await;
        assert_eq!(declined.reply, HELP_DECLINED_REPLY);
        assert_eq!(declined.state, ConversationState::new());

        let again = send(&tutor, &declined.state, "what is 3 + 2").await;
        assert_eq!(again.state, first.state);
        assert!(again.reply.ends_with(YES_NO_PROMPT));
    }

    #[tokio::test]
    async fn test_hint_is_sent_once() {
        let generator = ScriptedGenerator::with(vec![]);
        let tutor = tutor(&generator);

        let first = send(&tutor, &ConversationState::new(), "7 minus 4").await;
        let unclear = send(&tutor, &first.state, "maybe").await;
        assert_eq!(unclear.reply, YES_NO_ONLY_REPLY);
        assert_eq!(unclear.state, first.state);
    }

    #[tokio::test]
    async fn test_undrawable_division_uses_generator() {
        let generator = ScriptedGenerator::with(vec![
            Ok("Share 12 apples into 5 groups, one at a time.".to_string()),
            Ok("Each group gets 2 apples and 2 are left over. The answer is 2.".to_string()),
        ]);
        let tutor = tutor(&generator);

        let asked = send(&tutor, &ConversationState::new(), "12 divided by 5").await;
        assert_eq!(asked.state.expected_answer, Some(2));

        let explained = send(&tutor, &asked.state, "yes").await;
        assert_eq!(explained.state.step, Step::AwaitingAnswer);
        assert_eq!(explained.reply, "Share 12 apples into 5 groups, one at a time.");
        assert!(generator.prompts()[0].contains("without the final answer"));
        assert!(generator.prompts()[0].contains("'12 divided by 5'"));

        let wrong = send(&tutor, &explained.state, "i think 3").await;
        assert_eq!(wrong.reply, NOT_QUITE_REPLY);
        assert_eq!(wrong.state.step, Step::AwaitingFullSolutionConsent);

        let unclear = send(&tutor, &wrong.state, "what").await;
        assert_eq!(unclear.reply, SOLUTION_YES_NO_REPLY);

        let solved = send(&tutor, &wrong.state, "yeah").await;
        assert_eq!(
            solved.reply,
            "Each group gets 2 apples and 2 are left over.\n\n**Final Answer: 2**"
        );
        assert_eq!(solved.state, ConversationState::new());
        assert!(generator.prompts()[1].contains("including the final answer"));
    }

    #[tokio::test]
    async fn test_generator_failure_leaves_state_for_retry() {
        let generator = ScriptedGenerator::with(vec![
            Err(UpstreamError::Timeout { timeout_secs: 30 }),
            Ok("Count 30 and then 40 more.".to_string()),
        ]);
        let tutor = tutor(&generator);
        let mut rng = StdRng::seed_from_u64(5);

        let asked = send(&tutor, &ConversationState::new(), "30 + 40").await;
        let failed = tutor.handle_message(&asked.state, "yes", &mut rng).await;
        assert!(matches!(
            failed,
            Err(TutorError::Upstream(UpstreamError::Timeout { .. }))
        ));
        assert_eq!(asked.state.step, Step::AwaitingHelpConsent);

        let retried = send(&tutor, &asked.state, "yes").await;
        assert_eq!(retried.state.step, Step::AwaitingAnswer);
        assert_eq!(retried.reply, "Count 30 and then 40 more.");
    }

    #[tokio::test]
    async fn test_full_solution_failure_keeps_consent_step() {
        let generator = ScriptedGenerator::with(vec![Err(UpstreamError::EmptyResponse)]);
        let tutor = tutor(&generator);
        let mut rng = StdRng::seed_from_u64(5);

        let mut state = ConversationState::new();
        state.begin_question("what is 3 + 2", Some(5));
        state.step = Step::AwaitingFullSolutionConsent;

        let failed = tutor.handle_message(&state, "yes", &mut rng).await;
        assert!(matches!(
            failed,
            Err(TutorError::Upstream(UpstreamError::EmptyResponse))
        ));
        assert_eq!(generator.prompts().len(), 1);
    }

    #[test]
    fn test_overlong_tip_is_replaced() {
        let tip = tips_for("add").unwrap()[0];
        assert_eq!(bounded_tip(tip.to_string()), tip);
        assert_eq!(bounded_tip("a".repeat(MAX_TIP_CHARS + 1)), FALLBACK_TIP);
        assert!(FALLBACK_TIP.chars().count() <= MAX_TIP_CHARS);
    }

    #[tokio::test]
    async fn test_uncheckable_question_skips_to_full_solution() {
        let generator = ScriptedGenerator::with(vec![]);
        let tutor = tutor(&generator);

        let asked = send(&tutor, &ConversationState::new(), "which is greater 5 or 9").await;
        assert_eq!(asked.state.expected_answer, None);

        let pictured = send(&tutor, &asked.state, "yes").await;
        assert!(pictured.reply.contains(">, <, or ="));

        let answered = send(&tutor, &pictured.state, "9").await;
        assert_eq!(answered.reply, UNCHECKED_ANSWER_REPLY);
        assert_eq!(answered.state.step, Step::AwaitingFullSolutionConsent);

        let declined = send(&tutor, &answered.state, "nope").await;
        assert_eq!(declined.reply, SOLUTION_DECLINED_REPLY);
        assert_eq!(declined.state, ConversationState::new());
    }

    #[tokio::test]
    async fn test_full_solution_without_expected_answer() {
        let generator = ScriptedGenerator::with(vec![Ok("9 has more fruits, so 9 is greater.".to_string())]);
        let tutor = tutor(&generator);
        let state = ConversationState {
            step: Step::AwaitingAnswer,
            last_question: "which is greater 5 or 9".to_string(),
            expected_answer: None,
            hint_already_sent: false,
        };

        let solved = send(&tutor, &state, "yes").await;
        assert_eq!(solved.reply, "9 has more fruits, so 9 is greater.");
        assert_eq!(solved.state, ConversationState::new());
    }

    #[tokio::test]
    async fn test_step_without_question_starts_over() {
        let generator = ScriptedGenerator::with(vec![]);
        let state = ConversationState {
            step: Step::AwaitingAnswer,
            ..ConversationState::default()
        };
        let turn = send(&tutor(&generator), &state, "hi").await;
        assert_eq!(turn.reply, "Hello! I'm Counticus, your friendly math helper!");
        assert_eq!(turn.state, ConversationState::new());
    }

    #[test]
    fn test_finalize_solution_strips_answer_phrases() {
        assert_eq!(
            finalize_solution("3 and 2 make 5. The answer is 5.", Some(5)),
            "3 and 2 make 5.\n\n**Final Answer: 5**"
        );
        assert_eq!(finalize_solution("the answer is 7", None), "");
    }

    #[test]
    fn test_reset_is_initial_state() {
        let generator = ScriptedGenerator::with(vec![]);
        assert_eq!(tutor(&generator).reset(), ConversationState::new());
    }
}

//! Keyword and number based classification of learner messages.
//!
//! One [`classify`] call per question feeds both the evaluator and the
//! illustration generator, so the two can never disagree about which
//! operation a question asks for.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// `x` only counts as "times" when it stands alone or sits between numbers,
/// so words like "next" or "exactly" are not multiplication.
pub(super) static TIMES_X_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[\s\d])x([\s\d]|$)").expect("valid regex"));

/// Messages answered with a canned reply instead of tutoring.
pub const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "thank you",
    "thanks",
    "ty",
    "ok",
    "okay",
    "yes",
    "no",
    "sure",
    "alright",
];

const AFFIRMATIVE: &[&str] = &["yes", "yeah", "yep", "sure", "more help", "help"];
const NEGATIVE: &[&str] = &["no", "nah", "nope", "stop"];

/// Any of these (or a digit) makes a message a math question.
const MATH_KEYWORDS: &[&str] = &[
    "add",
    "addition",
    "plus",
    "subtract",
    "subtraction",
    "minus",
    "multiply",
    "multiplication",
    "times",
    "divide",
    "division",
    "count",
    "number",
    "place value",
    "roman numeral",
    "compare",
    "greater than",
    "less than",
    "equal",
    "word problem",
    "how many",
    "left",
    "more",
    "fewer",
    "counting forward",
    "skip counting",
    "counting backwards",
    "borrowing",
    "regrouping",
    "long division",
    "reading roman numerals",
    "converting roman numerals",
    "ones",
    "tens",
    "hundreds",
    "thousands",
    "ten thousands",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Greeting,
    MathQuestion,
    Unrecognized,
}

/// The operation a math question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Compare,
    Count,
    /// Numbers but no recognisable operation.
    None,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Compare => "compare",
            Self::Count => "count",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Surface forms per operator, checked top to bottom; the first operator
/// with any matching form wins. Reordering this table changes behaviour:
/// "how many more is 3 plus 2" must stay an addition, not a count.
const OPERATOR_TABLE: &[(Operator, &[&str])] = &[
    (Operator::Add, &["add", "addition", "plus", "+"]),
    (Operator::Subtract, &["subtract", "subtraction", "minus", "-"]),
    (
        Operator::Multiply,
        &["multiply", "multiplication", "multiplied", "times", "*", "×"],
    ),
    (
        Operator::Divide,
        &["divide", "division", "divided by", "over", "÷", "/"],
    ),
    (
        Operator::Compare,
        &[
            "greater than",
            "less than",
            "which is greater",
            "which is less",
            "greater",
            "less",
            "equal",
            "compare",
            ">",
            "<",
        ],
    ),
    (
        Operator::Count,
        &["count", "how many", "word problem", "more", "fewer", "left"],
    ),
];

/// Result of classifying one message. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedMessage {
    pub kind: MessageKind,
    pub operator: Operator,
    /// The two numbers of the question, present only when exactly two were found.
    pub operands: Option<(f64, f64)>,
    /// How many numbers the message contained.
    pub number_count: usize,
}

/// Lower-cases and trims a raw message.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_greeting(message: &str) -> bool {
    GREETINGS.contains(&message)
}

pub fn is_affirmative(message: &str) -> bool {
    AFFIRMATIVE.contains(&message)
}

pub fn is_negative(message: &str) -> bool {
    NEGATIVE.contains(&message)
}

pub fn is_math_question(message: &str) -> bool {
    message.chars().any(|c| c.is_ascii_digit()) || MATH_KEYWORDS.iter().any(|k| message.contains(k))
}

/// Every maximal run of digits, in order of appearance.
pub fn extract_numbers(message: &str) -> Vec<f64> {
    DIGIT_RUN_RE
        .find_iter(message)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

fn has_times_x(message: &str) -> bool {
    TIMES_X_RE.is_match(message)
}

/// Picks the operator of an already normalized message using [`OPERATOR_TABLE`].
pub fn detect_operator(message: &str) -> Operator {
    for (operator, forms) in OPERATOR_TABLE {
        let matched = forms.iter().any(|form| message.contains(form))
            || (*operator == Operator::Multiply && has_times_x(message));
        if matched {
            return *operator;
        }
    }
    Operator::None
}

/// Classifies an already normalized message.
pub fn classify(message: &str) -> ClassifiedMessage {
    let numbers = extract_numbers(message);
    let operands = match numbers.as_slice() {
        [a, b] => Some((*a, *b)),
        _ => None,
    };

    let kind = if is_greeting(message) {
        MessageKind::Greeting
    } else if is_math_question(message) {
        MessageKind::MathQuestion
    } else {
        MessageKind::Unrecognized
    };

    let operator = if kind == MessageKind::MathQuestion {
        detect_operator(message)
    } else {
        Operator::None
    };

    ClassifiedMessage {
        kind,
        operator,
        operands,
        number_count: numbers.len(),
    }
}

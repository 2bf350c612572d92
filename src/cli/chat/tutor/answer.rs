use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d*)?").expect("valid regex"));

/// Returns `true` when the first number in `reply`, truncated toward zero,
/// equals `expected`. Replies without a number never match.
pub fn check_answer(reply: &str, expected: Option<i64>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    let Some(found) = NUMBER_RE.find(reply) else {
        debug!("No number in answer");
        return false;
    };

    match found.as_str().parse::<f64>() {
        Ok(value) => {
            let answer = value.trunc();
            debug!(answer, expected, "Checking answer");
            answer == expected as f64
        }
        Err(_) => false,
    }
}

use super::classifier::{ClassifiedMessage, Operator};
use super::error::NotComputable;

/// Computes the expected answer of a classified question.
///
/// Results are truncated toward zero, so `12 ÷ 5` expects `2` and `3 - 5`
/// expects `-2`. Comparison, counting and operator-less questions have no
/// expected answer.
pub fn evaluate(question: &ClassifiedMessage) -> Result<i64, NotComputable> {
    let (a, b) = question.operands.ok_or(NotComputable::MissingOperands {
        found: question.number_count,
    })?;

    let value = match question.operator {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => {
            if b == 0.0 {
                return Err(NotComputable::DivisionByZero);
            }
            a / b
        }
        Operator::Compare | Operator::Count | Operator::None => {
            return Err(NotComputable::NoArithmeticOperator)
        }
    };

    truncate(value)
}

fn truncate(value: f64) -> Result<i64, NotComputable> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(NotComputable::OutOfRange);
    }
    Ok(truncated as i64)
}

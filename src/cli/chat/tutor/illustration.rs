//! Emoji pictures that walk a learner through a question without giving the
//! answer away (division is the exception: it states the group size).

use rand::seq::SliceRandom;
use rand::Rng;

use super::classifier::{ClassifiedMessage, Operator};
use super::error::NotApplicable;

/// Largest number of items drawn in any single group or total.
pub const MAX_ITEMS: usize = 20;

const ITEMS: &[&str] = &["🍎", "🍉", "🍓", "🎂", "🍭"];
const CONTRAST_ITEMS: &[&str] = &["🍇", "🍍", "🍉", "🍎", "🍓"];

/// Draws the question, or explains why it cannot be drawn.
pub fn illustrate<R>(question: &ClassifiedMessage, rng: &mut R) -> Result<String, NotApplicable>
where
    R: Rng + ?Sized,
{
    let (a, b) = question.operands.ok_or(NotApplicable::MissingOperands {
        found: question.number_count,
    })?;
    let item = pick(ITEMS, rng);

    let lines = match question.operator {
        Operator::Add => addition(items(a)?, items(b)?, item),
        Operator::Subtract => {
            let (n1, n2) = (items(a)?, items(b)?);
            if n1 < n2 {
                return Err(NotApplicable::NegativeResult);
            }
            subtraction(n1, n2, item)
        }
        Operator::Multiply => {
            if a * b > MAX_ITEMS as f64 {
                return Err(NotApplicable::TooManyItems { max: MAX_ITEMS });
            }
            multiplication(items(a)?, items(b)?, item)
        }
        Operator::Divide => {
            let n1 = items(a)?;
            if b == 0.0 {
                return Err(NotApplicable::DivisionByZero);
            }
            let n2 = items(b)?;
            if n1 % n2 != 0 {
                return Err(NotApplicable::NotDivisible {
                    dividend: n1,
                    divisor: n2,
                });
            }
            division(n1, n2, item)
        }
        Operator::Compare => {
            let other = pick(CONTRAST_ITEMS, rng);
            comparison(items(a)?, items(b)?, item, other)
        }
        Operator::Count => counting(items(a)?, item),
        Operator::None => return Err(NotApplicable::NoPicture),
    };

    Ok(lines.join("\n"))
}

fn pick<R>(choices: &[&'static str], rng: &mut R) -> &'static str
where
    R: Rng + ?Sized,
{
    choices.choose(rng).copied().unwrap_or("🍎")
}

fn items(n: f64) -> Result<usize, NotApplicable> {
    if n > MAX_ITEMS as f64 {
        return Err(NotApplicable::TooManyItems { max: MAX_ITEMS });
    }
    Ok(n as usize)
}

fn addition(n1: usize, n2: usize, item: &str) -> Vec<String> {
    vec![
        "Please count the emoji below\n".to_string(),
        "Addition means putting two groups together to find out how many there are in total.\n"
            .to_string(),
        format!("Here is the first group of {n1} {item}:\n"),
        format!("{}\n", item.repeat(n1)),
        format!("Here is the second group of {n2} {item}:\n"),
        format!("{}\n", item.repeat(n2)),
        "Now, let's put them together:\n".to_string(),
        format!("{}\n", item.repeat(n1 + n2)),
        "How many are there in total?".to_string(),
    ]
}

fn subtraction(n1: usize, n2: usize, item: &str) -> Vec<String> {
    vec![
        "Please count the emoji below\n".to_string(),
        "Subtraction helps us find out how many are left when some are taken away.\n".to_string(),
        format!("Imagine you have {n1} {item}, but then you give away {n2} {item}.\n"),
        format!("Here are your {n1} {item}:\n"),
        format!("{}\n", item.repeat(n1)),
        format!("After giving away {n2} {item}, you have:\n"),
        format!("{}\n", item.repeat(n1 - n2)),
        "How many do you think are left?".to_string(),
    ]
}

fn multiplication(baskets: usize, per_basket: usize, item: &str) -> Vec<String> {
    let mut lines = vec![
        "Multiplication is like having several groups of the same number of things!\n".to_string(),
        format!("Imagine you have {baskets} baskets, and each basket has {per_basket} {item} inside.\n"),
        "Let's look at each basket:\n".to_string(),
    ];
    for basket in 1..=baskets {
        lines.push(format!("Basket {basket}: {}\n", item.repeat(per_basket)));
    }
    lines.push("Now, let's count all the emojis in all the baskets together.\n".to_string());
    lines.push("Can you figure out how many emojis there are in total?".to_string());
    lines
}

fn division(n1: usize, groups: usize, item: &str) -> Vec<String> {
    let group_size = n1 / groups;
    let mut lines = vec![
        "Please count the emoji below\n".to_string(),
        format!("Let's divide {n1} {item} into {groups} equal groups.\n"),
        format!("We want to share {n1} {item} equally into {groups} groups.\n"),
        format!("Each group will have some {item}. Let's see how many:\n"),
    ];
    for group in 1..=groups {
        lines.push(format!("Group {group}: {}", item.repeat(group_size)));
    }
    lines.push(format!("So, each group has {group_size} {item}.\n"));
    lines
}

fn comparison(n1: usize, n2: usize, first: &str, second: &str) -> Vec<String> {
    vec![
        "Let's learn about comparing numbers and groups!\n".to_string(),
        format!("{} ({n1})  ?  {} ({n2})\n", first.repeat(n1), second.repeat(n2)),
        "Look carefully at these two groups of fruits.".to_string(),
        format!("Group 1 has {n1} {first}s."),
        format!("Group 2 has {n2} {second}s.\n"),
        "👉 When one number or group is GREATER, it means it has MORE than the other.".to_string(),
        "👉 When one number or group is LESS, it means it has FEWER than the other.".to_string(),
        "👉 When both groups are the SAME, they have EQUAL amounts.\n".to_string(),
        "So, is the first group >, <, or = the second group?".to_string(),
        "Think about it and pick the right symbol!".to_string(),
    ]
}

fn counting(n: usize, item: &str) -> Vec<String> {
    vec![
        "Let's practice counting!\n".to_string(),
        "Here are some fruits for you:\n".to_string(),
        format!("{} ({n})\n", item.repeat(n)),
        "Can you count how many fruits are here?".to_string(),
        "Take your time and try to count each fruit carefully.\n".to_string(),
    ]
}

//! Short teaching hints, picked by the topic a question mentions.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use tracing::debug;

use super::classifier::TIMES_X_RE;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

/// Symbols rewritten to words before matching topics.
const SYMBOL_WORDS: &[(&str, &str)] = &[
    ("*", " multiply "),
    ("×", " multiply "),
    ("+", " add "),
    ("-", " subtract "),
    ("÷", " divide "),
    ("/", " divide "),
    ("%", " modulo "),
    (">", " greater than "),
    ("<", " less than "),
    ("=", " equal "),
];

/// Multi-word phrases and their topics, longest first. Checked before any
/// single word so "greater than" never falls back to "greater".
const PHRASES: &[(&str, &str)] = &[
    ("converting roman numerals", "converting roman numerals"),
    ("reading roman numerals", "reading roman numerals"),
    ("counting backwards", "counting backwards"),
    ("counting forward", "counting forward"),
    ("ten thousands", "ten thousands"),
    ("skip counting", "skip counting"),
    ("long division", "long division"),
    ("roman numeral", "roman numeral"),
    ("greater than", "greater than"),
    ("word problem", "word problem"),
    ("place value", "place value"),
    ("less than", "less than"),
    ("how many", "how many"),
];

/// Single words that stand for a topic under another name.
const SYNONYMS: &[(&str, &str)] = &[
    ("plus", "add"),
    ("addition", "add"),
    ("minus", "subtract"),
    ("subtraction", "subtract"),
    ("times", "multiply"),
    ("multiplied", "multiply"),
    ("multiplication", "multiply"),
    ("division", "divide"),
    ("divided", "divide"),
    ("counting", "count"),
    ("placevalue", "place value"),
];

const TOPIC_TIPS: &[(&str, &[&str])] = &[
    (
        "add",
        &[
            "Adding means putting groups together to find out how many there are in all. Try counting one by one to see the total!",
            "When you add, you count all the things together to get a bigger number. For example, if you have 3 apples and add 2 more, count them all to see how many you have.",
            "Think of adding as putting two piles of toys together. How many toys do you have now? You can count each toy to find the total.",
            "You can add numbers in any order, and you will still get the same answer.",
            "Try adding numbers by counting up from the bigger number. For example, start at 5 and count up 3 more: 6, 7, 8.",
            "The plus sign (+) means add or join groups together. It tells you to put numbers together and find the total.",
        ],
    ),
    (
        "subtract",
        &[
            "Subtracting means taking some away. Try counting how many are left after you take some away from a group.",
            "Think of subtracting like eating some candies from a bowl. How many candies are left after you eat some?",
            "Try to count backwards when you subtract. For example, if you have 7 and take away 2, count backwards 6, 5.",
            "The minus sign (-) means take away. It tells you to find out how many are left after removing some.",
            "Remember, subtraction is the opposite of addition, and they work together to help you solve problems.",
        ],
    ),
    (
        "multiply",
        &[
            "Multiplying means you add the same number over and over again. For example, 3 times 4 means 3 + 3 + 3 + 3.",
            "Try thinking of multiplication as putting groups of the same size together, like baskets that each hold 2 apples.",
            "Multiplication helps you count faster because you can jump in groups instead of counting one by one.",
            "Draw 3 circles with 4 dots each to see how many dots there are in total.",
            "Multiplying zero with any number always gives zero because there is nothing in the groups to count.",
        ],
    ),
    (
        "divide",
        &[
            "Dividing means sharing things equally among groups.",
            "Imagine cutting a pizza into equal slices. That's dividing the pizza fairly.",
            "Division is the opposite of multiplication. It helps you find how big each group is.",
            "Try to split a big group into smaller equal parts, then count one part.",
            "Sometimes things don't split evenly, and a few are left over. That's called a remainder.",
        ],
    ),
    (
        "count",
        &[
            "Counting means saying numbers one by one in the right order to find out how many things there are.",
            "Try counting objects slowly and carefully so you don't miss any.",
            "Start counting from one and keep going until you reach the last object.",
            "Use your fingers, toys, or other objects to help you count.",
        ],
    ),
    (
        "number",
        &[
            "Numbers tell us how many things there are or how much of something we have.",
            "Numbers are made up of digits, and each digit has a place value.",
            "Look at each number carefully and think about what it means.",
        ],
    ),
    (
        "place value",
        &[
            "Place value tells us how much each digit in a number is worth depending on its position.",
            "In 23, the 2 means twenty because it is in the tens place, and the 3 is in the ones place.",
            "Look at the place of each digit (ones, tens, hundreds) to know its value.",
            "Try breaking numbers apart by place value to see what each part is worth.",
        ],
    ),
    (
        "roman numeral",
        &[
            "Roman numerals use letters like I, V, and X to show numbers instead of digits.",
            "Look at the letters in Roman numerals and add or subtract their values to find the number.",
            "Roman numerals are like secret codes for numbers. Can you decode what they mean?",
        ],
    ),
    (
        "compare",
        &[
            "Comparing numbers means finding out which number is bigger, smaller, or if they are the same.",
            "Try lining up numbers from smallest to biggest to compare them easily.",
            "Use symbols like > (greater than), < (less than), and = (equal to) to compare numbers.",
            "When numbers have the same number of digits, compare them starting from the left.",
        ],
    ),
    (
        "greater",
        &[
            "Greater means bigger. Try to find the bigger number when comparing two numbers.",
            "Use greater when comparing scores, ages, or amounts to see which is larger.",
            "Greater helps you order numbers from biggest to smallest.",
        ],
    ),
    (
        "greater than",
        &[
            "The symbol > shows 'greater than'. The bigger number goes first, like 5 > 3.",
            "Remember, the symbol > looks like an open mouth that always eats the bigger number.",
            "Try reading the symbol > out loud as 'is greater than' when you see it.",
        ],
    ),
    (
        "less",
        &[
            "Less means smaller. Try to find the smaller number when comparing two numbers.",
            "Use less when comparing prices, heights, or amounts to see which is smaller.",
            "Less helps you order numbers from smallest to biggest.",
        ],
    ),
    (
        "less than",
        &[
            "The symbol < shows 'less than'. The smaller number goes first, like 2 < 6.",
            "The symbol < still opens toward the bigger number, so the smaller number sits at the point.",
            "Try reading the symbol < out loud as 'is less than' when you see it.",
        ],
    ),
    (
        "equal",
        &[
            "Equal means two numbers are the same.",
            "The symbol = shows equal. Both sides have the same value.",
            "Try checking if two numbers are the same or not.",
        ],
    ),
    (
        "word problem",
        &[
            "Word problems tell a story with numbers to solve.",
            "Try reading carefully and find what the question asks.",
            "Break the problem into small parts to understand it.",
        ],
    ),
    (
        "how many",
        &[
            "When a question asks 'how many', count carefully.",
            "Look at the problem and see what needs to be counted.",
            "Use your fingers or objects to help count and answer.",
        ],
    ),
    (
        "left",
        &[
            "Left means what remains after some are taken away.",
            "Look for the word 'left' to know you should subtract.",
            "Imagine taking away some toys. How many are left?",
        ],
    ),
    (
        "more",
        &[
            "More means you add to get a bigger number.",
            "Try adding when you see the word 'more' in a problem.",
            "Look for how many more things there are.",
        ],
    ),
    (
        "fewer",
        &[
            "Fewer means less or a smaller number.",
            "Try subtracting when you see the word 'fewer'.",
            "Subtracting helps you find how many fewer there are.",
        ],
    ),
    (
        "counting forward",
        &[
            "Counting forward means saying numbers from small to big.",
            "Try starting at a number and counting up one by one.",
            "Counting forward helps you add or find the next number.",
        ],
    ),
    (
        "skip counting",
        &[
            "Skip counting means counting by 2s, 5s, or 10s.",
            "Try jumping numbers like 2, 4, 6 or 5, 10, 15.",
            "Practice skip counting to help with multiplication.",
        ],
    ),
    (
        "counting backwards",
        &[
            "Counting backwards means saying numbers from big to small.",
            "Try starting at a number and counting down one by one.",
            "Counting backwards helps with subtraction.",
        ],
    ),
    (
        "borrowing",
        &[
            "Borrowing means taking from the next place value to subtract.",
            "Try borrowing when the top digit is smaller than the bottom one.",
            "Imagine borrowing blocks from the next place to help subtract.",
        ],
    ),
    (
        "regrouping",
        &[
            "Regrouping means moving values between places to add or subtract.",
            "Think of regrouping like exchanging a ten for ten ones.",
            "Practice regrouping to make adding and subtracting easier.",
        ],
    ),
    (
        "long division",
        &[
            "Long division means dividing big numbers step by step.",
            "Try breaking the number into smaller parts to divide.",
            "Practice long division with small steps and take your time.",
        ],
    ),
    (
        "reading roman numerals",
        &[
            "Reading Roman numerals means knowing what letters like I, V, and X mean.",
            "Practice reading Roman numerals by learning each letter's value.",
            "Try reading the Roman numerals on a clock face.",
        ],
    ),
    (
        "converting roman numerals",
        &[
            "Converting Roman numerals means changing letters to regular numbers.",
            "Try adding or subtracting letter values when converting Roman numerals.",
            "Converting Roman numerals is like solving a number puzzle.",
        ],
    ),
    (
        "ones",
        &[
            "The ones place tells how many single items there are.",
            "Look at the digit in the ones place to know its value.",
            "Ones are the smallest place value in whole numbers.",
        ],
    ),
    (
        "tens",
        &[
            "The tens place tells how many groups of ten there are.",
            "Each digit in the tens place means ten times that digit.",
            "Try saying the value of the tens digit in a number.",
        ],
    ),
    (
        "hundreds",
        &[
            "The hundreds place tells how many groups of one hundred there are.",
            "Each digit in the hundreds place means one hundred times that digit.",
            "Try saying the value of the hundreds digit in a number.",
        ],
    ),
    (
        "thousands",
        &[
            "The thousands place tells how many groups of one thousand there are.",
            "Each digit in the thousands place means one thousand times that digit.",
            "Try saying the value of the thousands digit in a number.",
        ],
    ),
    (
        "ten thousands",
        &[
            "The ten thousands place tells how many groups of ten thousand there are.",
            "Each digit in the ten thousands place means ten thousand times that digit.",
            "Try saying the value of the ten thousands digit in a number.",
        ],
    ),
];

pub const GENERIC_TIPS: &[&str] = &[
    "Let's try to understand the problem step by step. Would you like more help?",
    "Math can be fun if we break it down together. Need some help?",
    "Take it one step at a time. Want me to guide you?",
    "Try to look at each number carefully. Need some help?",
    "Don't worry, I'm here to help you understand. Would you like more help?",
];

/// Tips for a topic, if it has any.
pub fn tips_for(topic: &str) -> Option<&'static [&'static str]> {
    TOPIC_TIPS
        .iter()
        .find(|(name, _)| *name == topic)
        .map(|(_, tips)| *tips)
}

fn normalize(question: &str) -> String {
    let mut text = question.to_lowercase();
    for (symbol, word) in SYMBOL_WORDS {
        text = text.replace(symbol, word);
    }
    TIMES_X_RE.replace_all(&text, "$1 multiply $2").into_owned()
}

/// Finds the topic a question is about: phrases first, then the first word
/// that names a topic directly or through a synonym.
pub fn resolve_topic(question: &str) -> Option<&'static str> {
    let text = normalize(question);

    if let Some((_, topic)) = PHRASES.iter().find(|(phrase, _)| text.contains(phrase)) {
        return Some(*topic);
    }

    TOKEN_RE.find_iter(&text).find_map(|token| {
        let token = token.as_str();
        SYNONYMS
            .iter()
            .find(|(word, _)| *word == token)
            .map(|(_, topic)| *topic)
            .or_else(|| TOPIC_TIPS.iter().find(|(name, _)| *name == token).map(|(name, _)| *name))
    })
}

/// Picks a random tip for `question`, or a generic encouragement when no
/// topic matches. Never returns an empty string.
pub fn select_tip<R>(question: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let topic = resolve_topic(question);
    debug!(?topic, "Selecting tip");

    let pool = topic.and_then(tips_for).unwrap_or(GENERIC_TIPS);
    pool.choose(rng)
        .or_else(|| GENERIC_TIPS.first())
        .map(|tip| tip.to_string())
        .unwrap_or_else(|| "Let's work through it together.".to_string())
}

use std::path::PathBuf;

use rustyline::{Config, Editor, Result};

use super::conversation_state::Step;

const HISTORY_FILE: &str = ".counticus_history";

/// The input prompt; it changes while the tutor waits for YES or NO.
pub fn generate_prompt(step: Step) -> String {
    if step.expects_yes_no() {
        "(yes/no) > ".to_string()
    } else {
        "> ".to_string()
    }
}

pub fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_follows_step() {
        assert_eq!(generate_prompt(Step::AwaitingQuestion), "> ");
        assert_eq!(generate_prompt(Step::AwaitingAnswer), "> ");
        assert_eq!(generate_prompt(Step::AwaitingHelpConsent), "(yes/no) > ");
        assert_eq!(generate_prompt(Step::AwaitingFullSolutionConsent), "(yes/no) > ");
    }
}

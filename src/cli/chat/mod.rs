pub mod conversation_state;
pub mod prompt;
pub mod session;
pub mod tutor;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use color_print::cformat;
use eyre::{Result, bail};
use prompt::generate_prompt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::SessionStore;
use tracing::{debug, warn};
use tutor::{TextGenerator, Tutor};

use crate::gemini_client::{GeminiClient, UnconfiguredGenerator};

/// Key of the one in-memory conversation this process tutors.
const SESSION_ID: &str = "default";

const WELCOME_TEXT: &str = "
Hi, I'm Counticus, your friendly math helper!

Things to try
• what is 3 + 2
• 12 divided by 4
• which is greater 5 or 9

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
Counticus math tutor

Send a math question and I'll offer a hint, show you how to solve it,
and check your answer. Reply YES or NO when I ask.

/reset        Forget the current question and start over
/help         Show this help dialogue
/quit         Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    sessions: SessionStore,
    timeout: Duration,
    tutor: Option<Tutor>,
    rng: StdRng,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            sessions: SessionStore::new(),
            timeout,
            tutor: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Uses `generator` instead of the Gemini client.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.tutor = Some(Tutor::new(generator));
        self
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.tutor.is_none() {
            let generator: Arc<dyn TextGenerator> = match GeminiClient::new(self.timeout) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    warn!("Gemini client unavailable: {}", e);
                    writeln!(
                        self.output,
                        "{}",
                        cformat!("<yellow>Text explanations are off: {}</yellow>", e)
                    )?;
                    Arc::new(UnconfiguredGenerator { reason: e.to_string() })
                }
            };
            self.tutor = Some(Tutor::new(generator));
        }

        if self.interactive {
            self.print_welcome()?;
        }

        // Handle non-interactive mode (single message)
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;
        let history = prompt::history_path();
        if let Some(path) = &history {
            // A missing history file just means a first run.
            let _ = rl.load_history(path);
        }

        loop {
            let step = self.sessions.state(SESSION_ID).await.step;
            let readline = rl.readline(&generate_prompt(step));

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "{}", cformat!("<red>Error:</red> {}", e))?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        if let Some(path) = &history {
            if let Err(e) = rl.save_history(path) {
                warn!("Could not save history to {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/reset" => {
                self.sessions.reset(SESSION_ID).await;
                writeln!(self.output, "Conversation reset.")?;
            }
            _ => {
                self.process_chat_input(input).await?;
            }
        }

        Ok(())
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<()> {
        let tutor = match &self.tutor {
            Some(tutor) => tutor,
            None => bail!("Tutor not initialized"),
        };

        // Held for the whole turn so messages of one session never interleave.
        let mut state = self.sessions.lock(SESSION_ID).await;
        let turn = tutor.handle_message(&state, input, &mut self.rng).await?;
        debug!(step = %turn.state.step, "Turn complete");
        *state = turn.state;

        writeln!(self.output, "{}", cformat!("<green><bold>Counticus:</bold></green> {}", turn.reply))?;

        Ok(())
    }
}

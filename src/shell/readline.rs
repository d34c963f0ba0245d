use crate::utils::config::Config;
use log::debug;
pub use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use rustyline::{CompletionType, Config as RLConfig};

pub struct ReadlineManager {
    editor: Editor<(), DefaultHistory>,
}

impl ReadlineManager {
    pub fn new(config: &Config) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let editor = Editor::with_config(rl_config)?;
        debug!("readline ready ({:?} mode)", config.get_edit_mode());
        Ok(Self { editor })
    }

    /// One blocking line read. Without a terminal on stdin the prompt is
    /// skipped and the line is read as is.
    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }
}

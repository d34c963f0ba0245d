use log::{debug, info, warn};

use crate::shell::builtins::Builtin;
use crate::shell::errors::ShellError;
use crate::shell::executor;
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::path::current_dir;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    readline: ReadlineManager,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ShellError> {
        Ok(Self {
            config,
            theme: Theme::load_theme(&config.theme),
            readline: ReadlineManager::new(config)?,
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        debug!("starting {}...", self.config.name);
        let result = self.run_loop();
        executor::reap_finished();
        debug!("leaving {}...", self.config.name);
        result
    }

    fn run_loop(&mut self) -> Result<(), ShellError> {
        loop {
            executor::reap_finished();
            let prompt = self.theme.prompt(&current_dir());

            match self.readline.readline(&prompt) {
                Ok(line) => self.handle_input(&line)?,
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("line discarded by interrupt");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) -> Result<(), ShellError> {
        if let Some(builtin) = Builtin::parse(line) {
            debug!("builtin: {:?}", builtin);
            builtin.execute();
            return Ok(());
        }

        let command = match Parser::with_max_args(line, self.config.max_args).parse_command() {
            Ok(command) => command,
            Err(e) => {
                warn!("syntax error in {:?}: {}", line, e);
                eprintln!("{}", (self.theme.error_style)(format!("syntax error: {}", e)));
                return Ok(());
            }
        };

        debug!("run: {}", command);
        let child = executor::spawn(&command)?;
        let status = executor::wait_child(child);
        if status != 0 {
            info!("`{}` exited with {}", command, status);
        }
        Ok(())
    }
}

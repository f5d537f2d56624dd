//! Shell context, dispatch, and error types for the command shell.

use std::{env, io};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigManager},
    errors::{ConfigError, ScheduleError, SnapshotError},
    installment::Installment,
    messages::PaymentMessages,
    schedule::{Clock, FixedClock, SystemClock},
};

use super::commands::{self, CommandRegistry};
use super::output::{self, OutputPreferences};

pub const SCRIPT_ENV: &str = "INSTALLMENT_CORE_CLI_SCRIPT";
pub const TODAY_ENV: &str = "INSTALLMENT_CORE_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell errors that end the session.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

/// Per-command failures reported back to the user without leaving the shell.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config: Config,
    pub config_manager: Option<ConfigManager>,
    pub installments: Vec<Installment>,
    pub clock: Box<dyn Clock>,
    pub messages: Box<dyn PaymentMessages>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::from_env()?;
        let config = config_manager.load()?;
        let mut context = Self::with_config(mode, config);
        context.config_manager = Some(config_manager);
        if let Some(day) = today_from_env() {
            context.clock = Box::new(FixedClock(day));
        }
        Ok(context)
    }

    /// Builds a context without touching the filesystem.
    pub fn with_config(mode: CliMode, config: Config) -> Self {
        let messages = config.messages();
        let context = Self {
            mode,
            registry: commands::registry(),
            config,
            config_manager: None,
            installments: Vec::new(),
            clock: Box::new(SystemClock),
            messages,
            last_command: None,
            running: true,
        };
        context.apply_output_preferences();
        context
    }

    pub(crate) fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            color: self.config.color_enabled && self.mode == CliMode::Interactive,
        });
    }

    pub(crate) fn reload_messages(&mut self) {
        self.messages = self.config.messages();
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn prompt(&self) -> String {
        let active = self.installments.iter().filter(|i| !i.archived).count();
        format!("installments({active})> ")
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => {
                tracing::debug!(error = ?other, "command failed");
                output::error(other);
            }
        }
    }

    /// Resolves a 1-based list position to a storage index.
    pub(crate) fn resolve_index(&self, raw: Option<&&str>) -> Result<usize, CommandError> {
        let raw = raw.ok_or_else(|| {
            CommandError::InvalidArguments("an installment number is required".into())
        })?;
        let position: usize = raw.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{raw}` is not an installment number"))
        })?;
        if position == 0 || position > self.installments.len() {
            return Err(CommandError::InvalidArguments(format!(
                "no installment #{position}; use `list all` to see numbers"
            )));
        }
        Ok(position - 1)
    }
}

fn today_from_env() -> Option<NaiveDate> {
    let raw = env::var(TODAY_ENV).ok()?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(err) => {
            tracing::warn!(value = %raw, error = %err, "ignoring invalid {}", TODAY_ENV);
            None
        }
    }
}

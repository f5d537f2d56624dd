pub mod commands;
mod core;
pub mod output;
mod shell;
pub mod table;

pub use self::core::{CliError, CliMode, CommandError, CommandResult, ShellContext};
pub use shell::run_cli;

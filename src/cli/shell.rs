use std::{
    env,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::schedule::PaymentFrequency;

use super::core::{CliError, CliMode, CommandError, LoopControl, ShellContext, SCRIPT_ENV};
use super::output;

const LIST_FILTERS: [&str; 3] = ["active", "archived", "all"];

/// Runs the shell, reading commands from stdin when the script variable is set.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, today = %context.today(), "shell started");

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Type `help` to list commands.");

    while context.running {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) if context.confirm_exit()? => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.trim()).ok();
        }
        execute(context, &line);
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        // `#` starts a comment line in scripts.
        if line.trim_start().starts_with('#') {
            continue;
        }
        if execute(context, &line) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one input line, reporting command failures without leaving the shell.
fn execute(context: &mut ShellContext, line: &str) -> LoopControl {
    match handle_line(context, line) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("could not parse command line: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };

    let command = match raw.to_lowercase().as_str() {
        "quit" | "q" => "exit".to_string(),
        "?" => "help".to_string(),
        other => other.to_string(),
    };
    let args: Vec<&str> = tokens[1..].iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completes command names, then frequency names and list filters for arguments.
struct CommandHelper {
    commands: Vec<&'static str>,
}

impl CommandHelper {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    fn argument_words(command: &str) -> Vec<&'static str> {
        match command {
            "add" | "next" => PaymentFrequency::ALL.iter().map(|f| f.as_str()).collect(),
            "list" => LIST_FILTERS.to_vec(),
            _ => Vec::new(),
        }
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map_or(0, |idx| idx + 1);
        let needle = prefix[start..].to_ascii_lowercase();

        let words = match prefix[..start].split_whitespace().next() {
            None | Some("help") => self.commands.clone(),
            Some(command) => Self::argument_words(&command.to_ascii_lowercase()),
        };
        let candidates = words
            .into_iter()
            .filter(|word| word.starts_with(&needle))
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn complete(line: &str) -> Vec<String> {
        let helper = CommandHelper::new(vec!["list", "load", "add", "help"]);
        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);
        let (_, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        pairs.into_iter().map(|pair| pair.replacement).collect()
    }

    #[test]
    fn completes_commands_then_arguments() {
        assert_eq!(complete("l"), vec!["list", "load"]);
        assert_eq!(complete("add Sofa 300 100 w"), vec!["weekly"]);
        assert_eq!(complete("list ar"), vec!["archived"]);
        assert_eq!(complete("help a"), vec!["add"]);
        assert!(complete("load pl").is_empty());
    }

    #[test]
    fn unparsable_lines_are_skipped() {
        let mut context = ShellContext::with_config(CliMode::Script, Config::default());
        assert_eq!(
            handle_line(&mut context, "add \"unterminated").unwrap(),
            LoopControl::Continue
        );
        assert!(context.last_command.is_none());
    }

    #[test]
    fn aliases_and_unknown_commands() {
        let mut context = ShellContext::with_config(CliMode::Script, Config::default());
        assert_eq!(handle_line(&mut context, "lst").unwrap(), LoopControl::Continue);
        assert_eq!(execute(&mut context, "pay 9"), LoopControl::Continue);
        assert_eq!(handle_line(&mut context, "QUIT").unwrap(), LoopControl::Exit);
        assert!(!context.running);
        assert_eq!(context.last_command.as_deref(), Some("QUIT"));
    }
}

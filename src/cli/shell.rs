use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::forms::FieldType;

/// Environment switch for non-interactive runs: when set, commands are read
/// line by line from stdin and no prompts are shown.
pub const SCRIPT_MODE_ENV: &str = "FORM_CORE_CLI_SCRIPT";

/// Commands whose first argument is a form title.
const TITLE_COMMANDS: &[&str] = &[
    "open-form",
    "delete-form",
    "toggle-form",
    "start-fill",
    "responses",
];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_MODE_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => interactive_loop(&mut context),
        CliMode::Script => script_loop(&mut context),
    }
}

fn interactive_loop(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellCompleter, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellCompleter::new(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(&line).ok();

                match execute_line(context, &line) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
                // Form titles are completion candidates, so the pool follows
                // every create/rename/delete.
                if let Some(completer) = editor.helper_mut() {
                    completer.refresh_titles(context);
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn script_loop(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        match execute_line(context, line.trim()) {
            Ok(LoopControl::Continue) if context.running => {}
            Ok(_) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn execute_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Position-aware tab completion: command names in the first word, form
/// titles after title-taking commands, and field type names after
/// `add-field`.
struct ShellCompleter {
    commands: Vec<String>,
    titles: Vec<String>,
}

impl ShellCompleter {
    fn new(context: &ShellContext) -> Self {
        let mut commands: Vec<String> = context
            .command_names()
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            titles: context.form_titles(),
        }
    }

    fn refresh_titles(&mut self, context: &ShellContext) {
        self.titles = context.form_titles();
    }

    /// Replacement candidates for the word starting at `start` in `prefix`.
    fn candidates(&self, prefix: &str, start: usize) -> Vec<String> {
        let word = prefix[start..].to_lowercase();
        let mut preceding = prefix[..start].split_whitespace();

        let Some(command) = preceding.next() else {
            return self
                .commands
                .iter()
                .filter(|name| name.starts_with(&word))
                .cloned()
                .collect();
        };
        // Only the first argument completes; beyond it arguments are
        // free-form labels and values.
        if preceding.next().is_some() {
            return Vec::new();
        }

        let command = command.to_lowercase();
        if TITLE_COMMANDS.contains(&command.as_str()) {
            return self
                .titles
                .iter()
                .filter(|title| title.to_lowercase().starts_with(&word))
                .map(|title| quote_title(title))
                .collect();
        }
        if command == "add-field" {
            return FieldType::NAMES
                .iter()
                .filter(|name| name.starts_with(&word))
                .map(|name| name.to_string())
                .collect();
        }
        Vec::new()
    }
}

/// Titles with spaces must stay one shell word when inserted into the line.
fn quote_title(title: &str) -> String {
    if title.contains(char::is_whitespace) {
        format!("\"{title}\"")
    } else {
        title.to_string()
    }
}

impl Helper for ShellCompleter {}

impl Completer for ShellCompleter {
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
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let pairs = self
            .candidates(prefix, start)
            .into_iter()
            .map(|replacement| Pair {
                display: replacement.trim_matches('"').to_string(),
                replacement,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;
}

impl Highlighter for ShellCompleter {}

impl Validator for ShellCompleter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> ShellCompleter {
        ShellCompleter {
            commands: vec![
                "add-field".into(),
                "new-form".into(),
                "next-page".into(),
                "open-form".into(),
            ],
            titles: vec!["Contact Us".into(), "Poll".into()],
        }
    }

    #[test]
    fn first_word_completes_command_names() {
        let completer = completer();
        assert_eq!(completer.candidates("ne", 0), vec!["new-form", "next-page"]);
        assert_eq!(completer.candidates("open-f", 0), vec!["open-form"]);
    }

    #[test]
    fn title_commands_complete_titles_quoted() {
        let completer = completer();
        assert_eq!(
            completer.candidates("open-form con", 10),
            vec!["\"Contact Us\""]
        );
        assert_eq!(completer.candidates("start-fill p", 11), vec!["Poll"]);
    }

    #[test]
    fn add_field_completes_type_names() {
        let completer = completer();
        assert_eq!(completer.candidates("add-field che", 10), vec!["checkbox"]);
    }

    #[test]
    fn later_arguments_do_not_complete() {
        let completer = completer();
        assert!(completer.candidates("answer 1 ", 9).is_empty());
        assert!(completer.candidates("open-form Poll ", 15).is_empty());
    }
}

//! Shell context, command dispatch, and CLI error types.

use std::{env, io, path::PathBuf};

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use thiserror::Error;
use uuid::Uuid;

use crate::builder::{BuilderError, BuilderSession};
use crate::cli::output;
use crate::cli::registry::CommandRegistry;
use crate::errors::FormError;
use crate::forms::Form;
use crate::respondent::{FlowError, RespondentFlow};
use crate::session::{AuthUser, SessionStore};
use crate::store::{FormStore, StoreError};

use super::commands;

/// Base-directory override so tests can isolate the session slot.
pub const DATA_DIR_ENV: &str = "FORM_CORE_DATA_DIR";

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

/// Errors that abort the shell loop itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Errors surfaced to the user at the point of one command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not logged in. Use `login <email>` first.")]
    NotLoggedIn,
    #[error("No form is open in the builder. Use `new-form` or `open-form` first.")]
    NoFormOpen,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Builder(#[from] BuilderError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

/// Shared CLI runtime state: the form store, the signed-in user, and the
/// optional builder and fill sessions.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: FormStore,
    pub sessions: SessionStore,
    pub user: Option<AuthUser>,
    pub builder: Option<BuilderSession>,
    pub fill: Option<RespondentFlow>,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let sessions = match env::var_os(DATA_DIR_ENV) {
            Some(base) => SessionStore::with_base_dir(PathBuf::from(base))?,
            None => SessionStore::new()?,
        };
        let user = sessions.load()?;
        if let (CliMode::Interactive, Some(user)) = (mode, user.as_ref()) {
            output::info(format!("Welcome back, {}.", user.name));
        }

        Ok(Self {
            mode,
            registry,
            store: FormStore::new(),
            sessions,
            user,
            builder: None,
            fill: None,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// Current form titles, for argument completion.
    pub(crate) fn form_titles(&self) -> Vec<String> {
        self.store.forms().iter().map(|form| form.title.clone()).collect()
    }

    /// Authentication gate for builder-side commands.
    pub(crate) fn require_user(&self) -> Result<&AuthUser, CommandError> {
        self.user.as_ref().ok_or(CommandError::NotLoggedIn)
    }

    pub(crate) fn require_builder(&mut self) -> Result<&mut BuilderSession, CommandError> {
        self.builder.as_mut().ok_or(CommandError::NoFormOpen)
    }

    pub(crate) fn open_form_id(&self) -> Option<Uuid> {
        self.builder.as_ref().map(|session| session.form_id())
    }

    /// Resolves a form argument by title.
    pub(crate) fn resolve_form(&self, title: &str) -> Result<&Form, CommandError> {
        self.store
            .form_by_title(title)
            .ok_or_else(|| CommandError::Message(format!("No form titled `{}`.", title)))
    }

    pub(crate) fn prompt(&self) -> String {
        let mut prompt = String::from("form-core");
        if let Some(session) = &self.builder {
            if let Some(form) = self.store.form(session.form_id()) {
                prompt.push_str(&format!(" [{} p{}]", form.title, session.active_page()));
            }
        }
        prompt.push_str("> ");
        prompt
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        dialoguer::Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()
            .map_err(|err| CliError::Io(io::Error::other(err)))
    }

    /// Handles one command's error at the point of the user action. Nothing
    /// propagates as an unhandled fault.
    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::Flow(FlowError::FormNotFound(_)) => {
                output::page_notice("Form not found");
                Ok(())
            }
            CommandError::Flow(FlowError::FormUnavailable(_)) => {
                output::page_notice("This form is currently unavailable");
                Ok(())
            }
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

//! Command handlers and registration for the shell.

use uuid::Uuid;

use crate::builder::{BuilderSession, FieldUpdate};
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::prompts;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::export;
use crate::forms::{AnswerValue, Field, FieldType, Form};
use crate::respondent::{Advance, RespondentFlow};
use crate::session::AuthUser;
use crate::store::FormStore;

pub fn register_all(registry: &mut CommandRegistry) {
    let entries = [
        CommandEntry::new("help", "system", "Show available commands", "help [command]", cmd_help),
        CommandEntry::new("exit", "system", "Leave the shell", "exit", cmd_exit),
        CommandEntry::new("quit", "system", "Leave the shell", "quit", cmd_exit),
        CommandEntry::new(
            "login",
            "session",
            "Sign in with an email address",
            "login <email> [name]",
            cmd_login,
        ),
        CommandEntry::new("logout", "session", "Sign out", "logout", cmd_logout),
        CommandEntry::new("whoami", "session", "Show the signed-in user", "whoami", cmd_whoami),
        CommandEntry::new(
            "new-form",
            "forms",
            "Create a form and open it in the builder",
            "new-form <title> [description]",
            cmd_new_form,
        ),
        CommandEntry::new("list-forms", "forms", "List every form", "list-forms", cmd_list_forms),
        CommandEntry::new(
            "open-form",
            "forms",
            "Open an existing form in the builder",
            "open-form <title>",
            cmd_open_form,
        ),
        CommandEntry::new(
            "show-form",
            "forms",
            "Show the open form and its fields",
            "show-form",
            cmd_show_form,
        ),
        CommandEntry::new(
            "delete-form",
            "forms",
            "Delete a form and its responses",
            "delete-form <title>",
            cmd_delete_form,
        ),
        CommandEntry::new(
            "toggle-form",
            "forms",
            "Publish or unpublish a form",
            "toggle-form <title>",
            cmd_toggle_form,
        ),
        CommandEntry::new(
            "add-field",
            "builder",
            "Append a field to the active page",
            "add-field [<type> <label>]",
            cmd_add_field,
        ),
        CommandEntry::new(
            "edit-field",
            "builder",
            "Rename a field",
            "edit-field <index> <label>",
            cmd_edit_field,
        ),
        CommandEntry::new(
            "require-field",
            "builder",
            "Mark a field required or optional",
            "require-field <index> <on|off>",
            cmd_require_field,
        ),
        CommandEntry::new(
            "remove-field",
            "builder",
            "Delete a field",
            "remove-field <index>",
            cmd_remove_field,
        ),
        CommandEntry::new(
            "move-field",
            "builder",
            "Move a field to another position",
            "move-field <from> <to>",
            cmd_move_field,
        ),
        CommandEntry::new(
            "set-page",
            "builder",
            "Assign a field to a page",
            "set-page <index> <page>",
            cmd_set_page,
        ),
        CommandEntry::new(
            "add-page",
            "builder",
            "Add an empty page and switch to it",
            "add-page",
            cmd_add_page,
        ),
        CommandEntry::new(
            "remove-page",
            "builder",
            "Remove an empty page",
            "remove-page <page>",
            cmd_remove_page,
        ),
        CommandEntry::new(
            "goto-page",
            "builder",
            "Switch the active editing page",
            "goto-page <page>",
            cmd_goto_page,
        ),
        CommandEntry::new(
            "start-fill",
            "respond",
            "Fill out a published form",
            "start-fill <title>",
            cmd_start_fill,
        ),
        CommandEntry::new(
            "answer",
            "respond",
            "Answer a field on the current page",
            "answer <index> <value>",
            cmd_answer,
        ),
        CommandEntry::new(
            "next-page",
            "respond",
            "Validate the page and move forward (submits on the last page)",
            "next-page",
            cmd_next_page,
        ),
        CommandEntry::new(
            "prev-page",
            "respond",
            "Go back one page",
            "prev-page",
            cmd_prev_page,
        ),
        CommandEntry::new(
            "show-page",
            "respond",
            "Show the current page of the fill session",
            "show-page",
            cmd_show_page,
        ),
        CommandEntry::new(
            "dashboard",
            "insights",
            "Show form and response counters",
            "dashboard",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "responses",
            "insights",
            "Show a form's responses as a table",
            "responses <title>",
            cmd_responses,
        ),
    ];
    for entry in entries {
        registry.register(entry);
    }
}

fn join_args(args: &[&str]) -> String {
    args.join(" ")
}

fn parse_index(value: &str, what: &str) -> Result<usize, CommandError> {
    value
        .parse::<usize>()
        .ok()
        .filter(|index| *index >= 1)
        .map(|index| index - 1)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{value}` is not a valid {what}")))
}

fn parse_page(value: &str) -> Result<u32, CommandError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|page| *page >= 1)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{value}` is not a valid page number")))
}

/// Splits the context into the store and builder session without overlapping
/// borrows.
fn builder_parts(
    ctx: &mut ShellContext,
) -> Result<(&mut FormStore, &mut BuilderSession), CommandError> {
    let ShellContext { store, builder, .. } = ctx;
    let session = builder.as_mut().ok_or(CommandError::NoFormOpen)?;
    Ok((store, session))
}

fn open_form<'a>(store: &'a FormStore, session: &BuilderSession) -> Result<&'a Form, CommandError> {
    store
        .form(session.form_id())
        .ok_or(CommandError::NoFormOpen)
}

fn field_id_at(form: &Form, index: usize) -> Result<Uuid, CommandError> {
    form.fields
        .get(index)
        .map(|field| field.id)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "Field {} does not exist (the form has {})",
                index + 1,
                form.fields.len()
            ))
        })
}

// --- session -------------------------------------------------------------

fn cmd_login(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(email) = args.first() else {
        return Err(CommandError::InvalidArguments("Usage: login <email> [name]".into()));
    };
    if !email.contains('@') {
        return Err(CommandError::InvalidArguments(format!(
            "`{email}` does not look like an email address"
        )));
    }
    let name = if args.len() > 1 {
        join_args(&args[1..])
    } else {
        email.split('@').next().unwrap_or(email).to_string()
    };
    let user = AuthUser::new(*email, name);
    ctx.sessions.save(&user)?;
    output::success(format!("Logged in as {} <{}>.", user.name, user.email));
    ctx.user = Some(user);
    Ok(())
}

fn cmd_logout(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    ctx.sessions.clear()?;
    ctx.user = None;
    ctx.builder = None;
    ctx.store.close_form();
    output::success("Logged out.");
    Ok(())
}

fn cmd_whoami(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match &ctx.user {
        Some(user) => output::info(format!("{} <{}>", user.name, user.email)),
        None => output::info("Not logged in."),
    }
    Ok(())
}

// --- forms ---------------------------------------------------------------

fn cmd_new_form(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user_id = ctx.require_user()?.id;
    let Some(title) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "Usage: new-form <title> [description]".into(),
        ));
    };
    let description = if args.len() > 1 {
        Some(join_args(&args[1..]))
    } else {
        None
    };
    let form_id = ctx.store.create_form(*title, description, Some(user_id))?;
    ctx.builder = Some(BuilderSession::open(&mut ctx.store, form_id)?);
    output::success(format!("New form created: {}", title));
    Ok(())
}

fn cmd_list_forms(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if ctx.store.forms().is_empty() {
        output::info("No forms yet. Use `new-form <title>` to create one.");
        return Ok(());
    }
    let headers = ["Title", "Status", "Fields", "Pages", "Responses"]
        .map(String::from)
        .to_vec();
    let rows: Vec<Vec<String>> = ctx
        .store
        .forms()
        .iter()
        .map(|form| {
            vec![
                form.title.clone(),
                form.status.to_string(),
                form.fields.len().to_string(),
                form.total_pages().to_string(),
                ctx.store.response_count(form.id).to_string(),
            ]
        })
        .collect();
    output::print_table(&headers, &rows);
    Ok(())
}

fn cmd_open_form(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("Usage: open-form <title>".into()));
    }
    let form_id = ctx.resolve_form(&join_args(args))?.id;
    ctx.builder = Some(BuilderSession::open(&mut ctx.store, form_id)?);
    output::success("Form opened in the builder.");
    Ok(())
}

fn cmd_show_form(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let (store, session) = builder_parts(ctx)?;
    let form = open_form(store, session)?;
    output::section(&form.title);
    if let Some(description) = &form.description {
        output::info(description);
    }
    output::info(format!(
        "Status: {} | Pages: {} (editing page {})",
        form.status,
        session.pages(),
        session.active_page()
    ));
    if form.fields.is_empty() {
        output::info("No fields yet. Use `add-field` to add one.");
        return Ok(());
    }
    let headers = ["#", "Label", "Type", "Page", "Required"]
        .map(String::from)
        .to_vec();
    let rows: Vec<Vec<String>> = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            vec![
                (idx + 1).to_string(),
                field.label.clone(),
                field.field_type.to_string(),
                field.page.to_string(),
                if field.required { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output::print_table(&headers, &rows);
    Ok(())
}

fn cmd_delete_form(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("Usage: delete-form <title>".into()));
    }
    let title = join_args(args);
    let form_id = ctx.resolve_form(&title)?.id;
    if ctx.mode() == CliMode::Interactive
        && !prompts::confirm(
            &ctx.theme,
            &format!("Delete `{}` and all of its responses?", title),
            false,
        )?
    {
        output::info("Delete cancelled.");
        return Ok(());
    }
    ctx.store.delete_form(form_id)?;
    if ctx.open_form_id() == Some(form_id) {
        ctx.builder = None;
    }
    output::success(format!("Form deleted: {}", title));
    Ok(())
}

fn cmd_toggle_form(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("Usage: toggle-form <title>".into()));
    }
    let form_id = ctx.resolve_form(&join_args(args))?.id;
    let status = ctx.store.toggle_form_status(form_id)?;
    output::success(format!("Form is now {}.", status));
    Ok(())
}

// --- builder -------------------------------------------------------------

fn cmd_add_field(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    if ctx.builder.is_none() {
        // Hard precondition: a titled form must exist before fields do.
        return Err(CommandError::NoFormOpen);
    }

    let (field_type, label, required) = if args.is_empty() {
        if ctx.mode() != CliMode::Interactive {
            return Err(CommandError::InvalidArguments(
                "Usage: add-field <type> <label>".into(),
            ));
        }
        let draft = prompts::field_wizard(&ctx.theme)?;
        (draft.field_type, draft.label, draft.required)
    } else {
        if args.len() < 2 {
            return Err(CommandError::InvalidArguments(
                "Usage: add-field <type> <label>".into(),
            ));
        }
        let field_type = FieldType::parse(args[0]).ok_or_else(|| {
            CommandError::InvalidArguments(format!("Unknown field type `{}`", args[0]))
        })?;
        (field_type, join_args(&args[1..]), false)
    };

    let (store, session) = builder_parts(ctx)?;
    let field_id = session.add_field(store, field_type, label.clone())?;
    if required {
        session.update_field(
            store,
            field_id,
            FieldUpdate {
                required: Some(true),
                ..FieldUpdate::default()
            },
        )?;
    }
    session.select_field(field_id);
    output::success(format!(
        "Field added: {} ({}) on page {}",
        label,
        field_type,
        session.active_page()
    ));
    Ok(())
}

fn cmd_edit_field(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(
            "Usage: edit-field <index> <label>".into(),
        ));
    }
    let index = parse_index(args[0], "field index")?;
    let label = join_args(&args[1..]);
    let (store, session) = builder_parts(ctx)?;
    let field_id = field_id_at(open_form(store, session)?, index)?;
    session.update_field(
        store,
        field_id,
        FieldUpdate {
            label: Some(label.clone()),
            ..FieldUpdate::default()
        },
    )?;
    output::success(format!("Field {} renamed to `{}`.", index + 1, label));
    Ok(())
}

fn cmd_require_field(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let (index, flag) = match args {
        [index, flag @ ("on" | "off")] => (parse_index(index, "field index")?, *flag == "on"),
        _ => {
            return Err(CommandError::InvalidArguments(
                "Usage: require-field <index> <on|off>".into(),
            ))
        }
    };
    let (store, session) = builder_parts(ctx)?;
    let field_id = field_id_at(open_form(store, session)?, index)?;
    session.update_field(
        store,
        field_id,
        FieldUpdate {
            required: Some(flag),
            ..FieldUpdate::default()
        },
    )?;
    output::success(format!(
        "Field {} is now {}.",
        index + 1,
        if flag { "required" } else { "optional" }
    ));
    Ok(())
}

fn cmd_remove_field(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let Some(index) = args.first() else {
        return Err(CommandError::InvalidArguments("Usage: remove-field <index>".into()));
    };
    let index = parse_index(index, "field index")?;
    let (store, session) = builder_parts(ctx)?;
    let field_id = field_id_at(open_form(store, session)?, index)?;
    session.remove_field(store, field_id)?;
    output::success(format!("Field {} removed.", index + 1));
    Ok(())
}

fn cmd_move_field(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let [from, to] = args else {
        return Err(CommandError::InvalidArguments(
            "Usage: move-field <from> <to>".into(),
        ));
    };
    let from = parse_index(from, "field index")?;
    let to = parse_index(to, "field index")?;
    let (store, session) = builder_parts(ctx)?;
    session.reorder_fields(store, from, to)?;
    output::success(format!("Field moved from {} to {}.", from + 1, to + 1));
    Ok(())
}

fn cmd_set_page(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let [index, page] = args else {
        return Err(CommandError::InvalidArguments(
            "Usage: set-page <index> <page>".into(),
        ));
    };
    let index = parse_index(index, "field index")?;
    let page = parse_page(page)?;
    let (store, session) = builder_parts(ctx)?;
    let field_id = field_id_at(open_form(store, session)?, index)?;
    session.update_field(
        store,
        field_id,
        FieldUpdate {
            page: Some(page),
            ..FieldUpdate::default()
        },
    )?;
    output::success(format!("Field {} moved to page {}.", index + 1, page));
    Ok(())
}

fn cmd_add_page(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let session = ctx.require_builder()?;
    let pages = session.add_page();
    output::success(format!("Page added. Now editing page {} of {}.", pages, pages));
    Ok(())
}

fn cmd_remove_page(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let Some(page) = args.first() else {
        return Err(CommandError::InvalidArguments("Usage: remove-page <page>".into()));
    };
    let page = parse_page(page)?;
    let (store, session) = builder_parts(ctx)?;
    session.remove_page(store, page)?;
    output::success(format!(
        "Page {} removed. The form now has {} page(s).",
        page,
        session.pages()
    ));
    Ok(())
}

fn cmd_goto_page(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    ctx.require_user()?;
    let Some(page) = args.first() else {
        return Err(CommandError::InvalidArguments("Usage: goto-page <page>".into()));
    };
    let page = parse_page(page)?;
    let session = ctx.require_builder()?;
    session.set_active_page(page)?;
    output::success(format!("Now editing page {}.", page));
    Ok(())
}

// --- respondent ----------------------------------------------------------

fn cmd_start_fill(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("Usage: start-fill <title>".into()));
    }
    let title = join_args(args);
    let Some(form) = ctx.store.form_by_title(&title) else {
        output::page_notice("Form not found");
        return Ok(());
    };
    let flow = RespondentFlow::start(&ctx.store, form.id)?;
    output::section(&flow.form().title);
    if let Some(description) = &flow.form().description {
        output::info(description);
    }
    ctx.fill = Some(flow);
    print_fill_page(ctx);
    Ok(())
}

fn cmd_answer(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(
            "Usage: answer <index> <value>".into(),
        ));
    }
    let index = parse_index(args[0], "field index")?;
    let value = join_args(&args[1..]);
    let flow = ctx
        .fill
        .as_mut()
        .ok_or_else(|| CommandError::Message("No fill session. Use `start-fill <title>`.".into()))?;
    let Some(field) = flow.page_fields().get(index).copied().cloned() else {
        return Err(CommandError::InvalidArguments(format!(
            "Field {} does not exist on this page",
            index + 1
        )));
    };
    let answer = answer_for(&field, &value);
    if field.field_type == FieldType::File {
        flow.attach_file(value.clone());
    }
    flow.set_answer(field.id, answer);
    output::success(format!("{}: {}", field.label, value));
    Ok(())
}

fn cmd_next_page(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let ShellContext { store, fill, .. } = ctx;
    let flow = fill
        .as_mut()
        .ok_or_else(|| CommandError::Message("No fill session. Use `start-fill <title>`.".into()))?;
    match flow.next(store) {
        Advance::Blocked => {
            for field in flow.page_fields() {
                if let Some(message) = flow.errors().get(&field.id) {
                    output::error(message);
                }
            }
        }
        Advance::Page(_) => print_fill_page(ctx),
        Advance::Submitted => {
            let thank_you = flow.form().settings.thank_you_message.clone();
            output::success("Response submitted.");
            output::info(thank_you);
        }
    }
    Ok(())
}

fn cmd_prev_page(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let flow = ctx
        .fill
        .as_mut()
        .ok_or_else(|| CommandError::Message("No fill session. Use `start-fill <title>`.".into()))?;
    if flow.previous().is_none() {
        output::info("Already on the first page.");
        return Ok(());
    }
    print_fill_page(ctx);
    Ok(())
}

fn cmd_show_page(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if ctx.fill.is_none() {
        return Err(CommandError::Message(
            "No fill session. Use `start-fill <title>`.".into(),
        ));
    }
    print_fill_page(ctx);
    Ok(())
}

fn print_fill_page(ctx: &ShellContext) {
    let Some(flow) = &ctx.fill else {
        return;
    };
    if flow.is_submitted() {
        output::info("This response has already been submitted.");
        return;
    }
    output::section(format!(
        "Page {} of {} ({:.0}%)",
        flow.current_page(),
        flow.total_pages(),
        flow.progress()
    ));
    for (idx, field) in flow.page_fields().iter().enumerate() {
        let marker = if field.required { " *" } else { "" };
        let answer = flow
            .answer(field.id)
            .map(|value| value.as_text())
            .unwrap_or_default();
        let mut line = format!("{}. {}{} [{}]", idx + 1, field.label, marker, field.field_type);
        if !answer.is_empty() {
            line.push_str(&format!(" = {}", answer));
        }
        output::info(line);
        if let Some(message) = flow.errors().get(&field.id) {
            output::error(message);
        }
    }
}

/// Shapes a raw CLI value into the answer variant the field expects.
fn answer_for(field: &Field, value: &str) -> AnswerValue {
    match field.field_type {
        FieldType::Checkbox => AnswerValue::MultiSelection(
            value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
        ),
        FieldType::Dropdown | FieldType::Radio => AnswerValue::Selection(value.to_string()),
        FieldType::TextArea => AnswerValue::MultiLine(value.to_string()),
        FieldType::Number => value
            .trim()
            .parse::<f64>()
            .map(AnswerValue::Number)
            .unwrap_or_else(|_| AnswerValue::Text(value.to_string())),
        FieldType::Date => value
            .trim()
            .parse::<chrono::NaiveDate>()
            .map(AnswerValue::Date)
            .unwrap_or_else(|_| AnswerValue::Text(value.to_string())),
        FieldType::File => AnswerValue::Files(vec![value.to_string()]),
        _ => AnswerValue::Text(value.to_string()),
    }
}

// --- insights ------------------------------------------------------------

fn cmd_dashboard(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let stats = ctx.store.stats();
    output::section("Dashboard");
    let headers = ["Total Forms", "Active", "Inactive", "Responses"]
        .map(String::from)
        .to_vec();
    let rows = vec![vec![
        stats.total_forms.to_string(),
        stats.active_forms.to_string(),
        stats.inactive_forms.to_string(),
        stats.total_responses.to_string(),
    ]];
    output::print_table(&headers, &rows);
    Ok(())
}

fn cmd_responses(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("Usage: responses <title>".into()));
    }
    let form = ctx.resolve_form(&join_args(args))?;
    let responses = ctx.store.responses_for(form.id);
    if responses.is_empty() {
        output::info("No responses yet.");
        return Ok(());
    }
    let headers = export::column_headers(form);
    let rows = export::response_rows(form, &responses);
    output::section(format!("{} ({} responses)", form.title, responses.len()));
    output::print_table(&headers, &rows);
    Ok(())
}

// --- system --------------------------------------------------------------

fn cmd_help(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let Some(entry) = ctx.registry.get(&name.to_lowercase()) else {
            return Err(CommandError::InvalidArguments(format!("Unknown command `{name}`")));
        };
        output::info(format!("{} — {}", entry.name, entry.description));
        output::info(format!("Usage: {}", entry.usage));
        return Ok(());
    }
    for (section, entries) in ctx.registry.sections() {
        output::section(section);
        for entry in entries {
            output::info(format!("{:<14} {}", entry.name, entry.description));
        }
    }
    Ok(())
}

fn cmd_exit(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

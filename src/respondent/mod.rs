//! Public fill-and-submit experience for a published form.
//!
//! Drives one respondent through the form page by page, accumulating answers
//! into a single map that is handed to the store exactly once, at final
//! submit.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::forms::{AnswerValue, Field, FieldType, Form, ValidationRules};
use crate::store::FormStore;

/// Local part, "@", and a domain containing at least one dot.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Form not found: {0}")]
    FormNotFound(Uuid),
    #[error("This form is currently unavailable")]
    FormUnavailable(Uuid),
}

/// Where the respondent is in the flow. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Filling(u32),
    Submitted,
}

/// Outcome of a forward navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given page.
    Page(u32),
    /// Final page passed validation; the response was submitted.
    Submitted,
    /// Validation failed; the page did not change.
    Blocked,
}

/// One respondent session over a snapshot of a published form.
#[derive(Debug)]
pub struct RespondentFlow {
    form: Form,
    state: FlowState,
    answers: HashMap<Uuid, AnswerValue>,
    files: Vec<String>,
    errors: HashMap<Uuid, String>,
}

impl RespondentFlow {
    /// Starts a flow for the given form id.
    ///
    /// Short-circuits before any state machine exists: unknown ids and
    /// inactive forms never reach `Filling(1)`.
    pub fn start(store: &FormStore, form_id: Uuid) -> Result<Self, FlowError> {
        let form = store.form(form_id).ok_or(FlowError::FormNotFound(form_id))?;
        if !form.is_active() {
            return Err(FlowError::FormUnavailable(form_id));
        }
        Ok(Self {
            form: form.clone(),
            state: FlowState::Filling(1),
            answers: HashMap::new(),
            files: Vec::new(),
            errors: HashMap::new(),
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        self.state == FlowState::Submitted
    }

    /// Current page number; the last filled page once submitted.
    pub fn current_page(&self) -> u32 {
        match self.state {
            FlowState::Filling(page) => page,
            FlowState::Submitted => self.form.total_pages(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.form.total_pages()
    }

    /// Fields on the page the respondent is looking at.
    pub fn page_fields(&self) -> Vec<&Field> {
        self.form.page_fields(self.current_page())
    }

    /// Completion percentage shown next to the pager. Cosmetic only.
    pub fn progress(&self) -> f64 {
        match self.state {
            FlowState::Filling(page) => {
                f64::from(page - 1) / f64::from(self.form.total_pages()) * 100.0
            }
            FlowState::Submitted => 100.0,
        }
    }

    /// Records an answer and optimistically clears any error the field had.
    pub fn set_answer(&mut self, field_id: Uuid, value: AnswerValue) {
        if self.is_submitted() {
            return;
        }
        self.errors.remove(&field_id);
        self.answers.insert(field_id, value);
    }

    pub fn answer(&self, field_id: Uuid) -> Option<&AnswerValue> {
        self.answers.get(&field_id)
    }

    pub fn answers(&self) -> &HashMap<Uuid, AnswerValue> {
        &self.answers
    }

    /// Remembers the name of an uploaded file. Contents are out of scope.
    pub fn attach_file(&mut self, name: impl Into<String>) {
        if !self.is_submitted() {
            self.files.push(name.into());
        }
    }

    /// Field-level errors from the last validation pass.
    pub fn errors(&self) -> &HashMap<Uuid, String> {
        &self.errors
    }

    /// Validates every field on the current page, collecting all errors
    /// rather than stopping at the first.
    pub fn validate_current_page(&mut self) -> bool {
        let page = self.current_page();
        let mut errors = HashMap::new();
        for field in self.form.page_fields(page) {
            if let Some(message) = validate_field(field, self.answers.get(&field.id)) {
                errors.insert(field.id, message);
            }
        }
        let ok = errors.is_empty();
        self.errors = errors;
        ok
    }

    /// Moves forward one page, or submits from the last page. Blocked while
    /// the current page has validation errors; a no-op once submitted.
    pub fn next(&mut self, store: &mut FormStore) -> Advance {
        let page = match self.state {
            FlowState::Filling(page) => page,
            FlowState::Submitted => return Advance::Submitted,
        };
        if !self.validate_current_page() {
            return Advance::Blocked;
        }
        if page < self.form.total_pages() {
            self.state = FlowState::Filling(page + 1);
            return Advance::Page(page + 1);
        }
        store.submit_response(
            self.form.id,
            std::mem::take(&mut self.answers),
            std::mem::take(&mut self.files),
        );
        self.state = FlowState::Submitted;
        Advance::Submitted
    }

    /// Moves back one page without re-running validation.
    pub fn previous(&mut self) -> Option<u32> {
        match self.state {
            FlowState::Filling(page) if page > 1 => {
                self.state = FlowState::Filling(page - 1);
                Some(page - 1)
            }
            _ => None,
        }
    }
}

/// Returns the error message for one field, if any.
fn validate_field(field: &Field, answer: Option<&AnswerValue>) -> Option<String> {
    let answer = match answer {
        Some(answer) if !answer.is_empty() => answer,
        _ => {
            if field.required {
                return Some(format!("{} is required", field.label));
            }
            return None;
        }
    };
    let text = answer.as_text();

    if field.field_type == FieldType::Email && !EMAIL_SHAPE.is_match(text.trim()) {
        return Some("Please enter a valid email address".into());
    }
    if let Some(rules) = &field.rules {
        if let Some(message) = check_rules(field, rules, answer, &text) {
            return Some(message);
        }
    }
    None
}

fn check_rules(
    field: &Field,
    rules: &ValidationRules,
    answer: &AnswerValue,
    text: &str,
) -> Option<String> {
    if let Some(min) = rules.min_length {
        if text.chars().count() < min {
            return Some(format!("{} must be at least {} characters", field.label, min));
        }
    }
    if let Some(max) = rules.max_length {
        if text.chars().count() > max {
            return Some(format!("{} must be at most {} characters", field.label, max));
        }
    }
    if let Some(pattern) = &rules.pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(text) {
                    return Some(format!("{} has an invalid format", field.label));
                }
            }
            // A broken pattern on the field never blocks the respondent.
            Err(_) => tracing::warn!(field = %field.label, "invalid validation pattern"),
        }
    }
    let numeric = match answer {
        AnswerValue::Number(value) => Some(*value),
        _ => text.trim().parse::<f64>().ok(),
    };
    if let Some(value) = numeric {
        if let Some(min) = rules.min {
            if value < min {
                return Some(format!("{} must be at least {}", field.label, min));
            }
        }
        if let Some(max) = rules.max {
            if value > max {
                return Some(format!("{} must be at most {}", field.label, max));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuilderSession;
    use crate::forms::FieldType;

    fn published_form(store: &mut FormStore) -> (Uuid, Uuid, Uuid) {
        let form_id = store.create_form("Contact Us", None, None).expect("create");
        let mut session = BuilderSession::open(store, form_id).expect("open");
        let name = session.add_field(store, FieldType::Text, "Name").unwrap();
        session
            .update_field(
                store,
                name,
                crate::builder::FieldUpdate {
                    required: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        session.add_page();
        let email = session.add_field(store, FieldType::Email, "Email").unwrap();
        store.toggle_form_status(form_id).unwrap();
        (form_id, name, email)
    }

    #[test]
    fn inactive_forms_never_enter_filling() {
        let mut store = FormStore::new();
        let form_id = store.create_form("Draft", None, None).unwrap();
        let err = RespondentFlow::start(&store, form_id).expect_err("inactive");
        assert!(matches!(err, FlowError::FormUnavailable(_)));
    }

    #[test]
    fn unknown_form_short_circuits() {
        let store = FormStore::new();
        let err = RespondentFlow::start(&store, Uuid::new_v4()).expect_err("missing");
        assert!(matches!(err, FlowError::FormNotFound(_)));
    }

    #[test]
    fn required_field_blocks_forward_navigation() {
        let mut store = FormStore::new();
        let (form_id, name, _) = published_form(&mut store);
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();

        assert_eq!(flow.next(&mut store), Advance::Blocked);
        assert_eq!(flow.current_page(), 1);
        assert_eq!(flow.errors().get(&name).map(String::as_str), Some("Name is required"));

        // Entering an answer clears the error immediately.
        flow.set_answer(name, AnswerValue::Text("Ada".into()));
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn email_shape_is_checked_when_present() {
        let mut store = FormStore::new();
        let (form_id, name, email) = published_form(&mut store);
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();
        flow.set_answer(name, AnswerValue::Text("Ada".into()));
        assert_eq!(flow.next(&mut store), Advance::Page(2));

        flow.set_answer(email, AnswerValue::Text("not-an-email".into()));
        assert_eq!(flow.next(&mut store), Advance::Blocked);
        assert_eq!(
            flow.errors().get(&email).map(String::as_str),
            Some("Please enter a valid email address")
        );

        flow.set_answer(email, AnswerValue::Text("a@b.co".into()));
        assert_eq!(flow.next(&mut store), Advance::Submitted);
    }

    #[test]
    fn submit_happens_exactly_once() {
        let mut store = FormStore::new();
        let (form_id, name, email) = published_form(&mut store);
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();
        flow.set_answer(name, AnswerValue::Text("Ada".into()));
        flow.next(&mut store);
        flow.set_answer(email, AnswerValue::Text("ada@example.com".into()));
        assert_eq!(flow.next(&mut store), Advance::Submitted);
        assert!(flow.is_submitted());

        // Terminal state: further calls change nothing.
        assert_eq!(flow.next(&mut store), Advance::Submitted);
        assert_eq!(store.responses_for(form_id).len(), 1);
    }

    #[test]
    fn previous_never_revalidates() {
        let mut store = FormStore::new();
        let (form_id, name, _) = published_form(&mut store);
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();
        flow.set_answer(name, AnswerValue::Text("Ada".into()));
        flow.next(&mut store);
        assert_eq!(flow.previous(), Some(1));
        assert_eq!(flow.previous(), None);
    }

    #[test]
    fn progress_tracks_page_position() {
        let mut store = FormStore::new();
        let (form_id, name, _) = published_form(&mut store);
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();
        assert_eq!(flow.progress(), 0.0);
        flow.set_answer(name, AnswerValue::Text("Ada".into()));
        flow.next(&mut store);
        assert_eq!(flow.progress(), 50.0);
    }

    #[test]
    fn length_rules_are_enforced() {
        let mut store = FormStore::new();
        let form_id = store.create_form("Limits", None, None).unwrap();
        let mut session = BuilderSession::open(&mut store, form_id).unwrap();
        let code = session.add_field(&mut store, FieldType::Text, "Code").unwrap();
        session
            .update_field(
                &mut store,
                code,
                crate::builder::FieldUpdate {
                    rules: Some(Some(ValidationRules {
                        min_length: Some(4),
                        ..Default::default()
                    })),
                    ..Default::default()
                },
            )
            .unwrap();
        store.toggle_form_status(form_id).unwrap();

        let mut flow = RespondentFlow::start(&store, form_id).unwrap();
        flow.set_answer(code, AnswerValue::Text("abc".into()));
        assert_eq!(flow.next(&mut store), Advance::Blocked);
        assert_eq!(
            flow.errors().get(&code).map(String::as_str),
            Some("Code must be at least 4 characters")
        );
    }

    fn form_with_pattern(store: &mut FormStore, pattern: &str) -> (Uuid, Uuid) {
        let form_id = store.create_form("Codes", None, None).unwrap();
        let mut session = BuilderSession::open(store, form_id).unwrap();
        let code = session.add_field(store, FieldType::Text, "Code").unwrap();
        session
            .update_field(
                store,
                code,
                crate::builder::FieldUpdate {
                    rules: Some(Some(ValidationRules {
                        pattern: Some(pattern.into()),
                        ..Default::default()
                    })),
                    ..Default::default()
                },
            )
            .unwrap();
        store.toggle_form_status(form_id).unwrap();
        (form_id, code)
    }

    #[test]
    fn pattern_rules_flag_mismatched_values() {
        let mut store = FormStore::new();
        let (form_id, code) = form_with_pattern(&mut store, "^[A-Z]{3}$");
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();

        flow.set_answer(code, AnswerValue::Text("abc".into()));
        assert_eq!(flow.next(&mut store), Advance::Blocked);
        assert_eq!(
            flow.errors().get(&code).map(String::as_str),
            Some("Code has an invalid format")
        );

        flow.set_answer(code, AnswerValue::Text("ABC".into()));
        assert_eq!(flow.next(&mut store), Advance::Submitted);
    }

    #[test]
    fn broken_patterns_never_block_the_respondent() {
        let mut store = FormStore::new();
        let (form_id, code) = form_with_pattern(&mut store, "(unclosed");
        let mut flow = RespondentFlow::start(&store, form_id).unwrap();

        flow.set_answer(code, AnswerValue::Text("anything".into()));
        assert_eq!(flow.next(&mut store), Advance::Submitted);
        assert!(flow.errors().is_empty());
        assert_eq!(store.responses_for(form_id).len(), 1);
    }
}

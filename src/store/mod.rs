//! In-memory owner of every form and response.
//!
//! All other components read and mutate through [`FormStore`]; nothing else
//! holds form state. The store also tracks which form is open in the builder
//! so partial updates can never desynchronize a cached copy.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::forms::{AnswerValue, Form, FormSettings, FormStatus, Response};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Form not found: {0}")]
    FormNotFound(Uuid),
    #[error("{0}")]
    Validation(String),
}

/// Optional replacements merged into a form by [`FormStore::update_form`].
#[derive(Debug, Clone, Default)]
pub struct FormUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<FormStatus>,
    pub settings: Option<FormSettings>,
}

/// Derived dashboard counters. Recomputed on every read, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_forms: usize,
    pub active_forms: usize,
    pub inactive_forms: usize,
    pub total_responses: usize,
}

/// Sole owner of all [`Form`] and [`Response`] entities for one session.
#[derive(Debug, Default)]
pub struct FormStore {
    forms: Vec<Form>,
    responses: Vec<Response>,
    current: Option<Uuid>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unpublished form and appends it to the collection.
    /// Rejects empty or whitespace-only titles.
    pub fn create_form(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        created_by: Option<Uuid>,
    ) -> StoreResult<Uuid> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::Validation("Form title cannot be empty".into()));
        }
        let form = Form::new(title, description, created_by);
        let id = form.id;
        tracing::info!(form_id = %id, title = %form.title, "form created");
        self.forms.push(form);
        Ok(id)
    }

    /// Merges the given updates into an existing form and bumps its
    /// updated timestamp.
    pub fn update_form(&mut self, id: Uuid, update: FormUpdate) -> StoreResult<()> {
        let form = self.form_mut(id).ok_or(StoreError::FormNotFound(id))?;
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(StoreError::Validation("Form title cannot be empty".into()));
            }
            form.title = title;
        }
        if let Some(description) = update.description {
            form.description = description;
        }
        if let Some(status) = update.status {
            form.status = status;
        }
        if let Some(settings) = update.settings {
            form.settings = settings;
        }
        form.touch();
        tracing::debug!(form_id = %id, "form updated");
        Ok(())
    }

    /// Removes a form along with its responses.
    ///
    /// Cascade-deleting responses is a deliberate departure from silently
    /// retaining orphans; see DESIGN.md.
    pub fn delete_form(&mut self, id: Uuid) -> StoreResult<()> {
        let before = self.forms.len();
        self.forms.retain(|form| form.id != id);
        if self.forms.len() == before {
            return Err(StoreError::FormNotFound(id));
        }
        self.responses.retain(|response| response.form_id != id);
        if self.current == Some(id) {
            self.current = None;
        }
        tracing::info!(form_id = %id, "form deleted");
        Ok(())
    }

    /// Flips a form between active and inactive.
    pub fn toggle_form_status(&mut self, id: Uuid) -> StoreResult<FormStatus> {
        let form = self.form_mut(id).ok_or(StoreError::FormNotFound(id))?;
        form.status = form.status.toggled();
        form.touch();
        let status = form.status;
        tracing::info!(form_id = %id, %status, "form status toggled");
        Ok(status)
    }

    /// Appends a finished response. Answer validation happened upstream in
    /// the respondent flow; the store records whatever it is handed.
    pub fn submit_response(
        &mut self,
        form_id: Uuid,
        answers: HashMap<Uuid, AnswerValue>,
        files: Vec<String>,
    ) -> Uuid {
        let response = Response::new(form_id, answers, files);
        let id = response.id;
        tracing::info!(form_id = %form_id, response_id = %id, "response submitted");
        self.responses.push(response);
        id
    }

    pub fn form(&self, id: Uuid) -> Option<&Form> {
        self.forms.iter().find(|form| form.id == id)
    }

    pub fn form_mut(&mut self, id: Uuid) -> Option<&mut Form> {
        self.forms.iter_mut().find(|form| form.id == id)
    }

    /// Finds a form by exact title match, case-insensitive.
    pub fn form_by_title(&self, title: &str) -> Option<&Form> {
        let needle = title.trim().to_lowercase();
        self.forms.iter().find(|form| form.title.to_lowercase() == needle)
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn responses_for(&self, form_id: Uuid) -> Vec<&Response> {
        self.responses
            .iter()
            .filter(|response| response.form_id == form_id)
            .collect()
    }

    pub fn response_count(&self, form_id: Uuid) -> usize {
        self.responses
            .iter()
            .filter(|response| response.form_id == form_id)
            .count()
    }

    /// Marks a form as the one open in the builder.
    pub fn open_form(&mut self, id: Uuid) -> StoreResult<()> {
        if self.form(id).is_none() {
            return Err(StoreError::FormNotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.current = None;
    }

    pub fn current_form(&self) -> Option<&Form> {
        self.current.and_then(|id| self.form(id))
    }

    pub fn current_form_id(&self) -> Option<Uuid> {
        self.current
    }

    /// Dashboard counters derived from the live collections.
    pub fn stats(&self) -> DashboardStats {
        let active_forms = self.forms.iter().filter(|form| form.is_active()).count();
        DashboardStats {
            total_forms: self.forms.len(),
            active_forms,
            inactive_forms: self.forms.len() - active_forms,
            total_responses: self.responses.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_form(title: &str) -> (FormStore, Uuid) {
        let mut store = FormStore::new();
        let id = store.create_form(title, None, None).expect("create form");
        (store, id)
    }

    #[test]
    fn create_rejects_blank_titles() {
        let mut store = FormStore::new();
        let err = store.create_form("   ", None, None).expect_err("blank title");
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.forms().is_empty());
    }

    #[test]
    fn update_merges_and_touches() {
        let (mut store, id) = store_with_form("Contact Us");
        let created = store.form(id).unwrap().updated_at;
        store
            .update_form(
                id,
                FormUpdate {
                    description: Some(Some("Reach out".into())),
                    ..FormUpdate::default()
                },
            )
            .unwrap();
        let form = store.form(id).unwrap();
        assert_eq!(form.description.as_deref(), Some("Reach out"));
        assert_eq!(form.title, "Contact Us");
        assert!(form.updated_at >= created);
    }

    #[test]
    fn delete_cascades_responses_and_clears_current() {
        let (mut store, id) = store_with_form("Survey");
        store.open_form(id).unwrap();
        store.submit_response(id, HashMap::new(), Vec::new());
        assert_eq!(store.stats().total_responses, 1);

        store.delete_form(id).unwrap();
        assert!(store.current_form().is_none());
        assert_eq!(store.stats().total_responses, 0);
        assert!(matches!(
            store.delete_form(id),
            Err(StoreError::FormNotFound(_))
        ));
    }

    #[test]
    fn toggle_twice_restores_status() {
        let (mut store, id) = store_with_form("Survey");
        assert_eq!(store.form(id).unwrap().status, FormStatus::Inactive);
        store.toggle_form_status(id).unwrap();
        assert_eq!(store.form(id).unwrap().status, FormStatus::Active);
        store.toggle_form_status(id).unwrap();
        assert_eq!(store.form(id).unwrap().status, FormStatus::Inactive);
    }

    #[test]
    fn stats_recompute_from_live_collections() {
        let (mut store, first) = store_with_form("One");
        let second = store.create_form("Two", None, None).unwrap();
        store.toggle_form_status(first).unwrap();
        store.submit_response(second, HashMap::new(), Vec::new());

        let stats = store.stats();
        assert_eq!(stats.total_forms, 2);
        assert_eq!(stats.active_forms, 1);
        assert_eq!(stats.inactive_forms, 1);
        assert_eq!(stats.total_responses, 1);
    }
}

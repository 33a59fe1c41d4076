//! Editing session for the form currently open in the builder.
//!
//! A [`BuilderSession`] never owns form state; every operation resolves the
//! form through the [`FormStore`] by id, so the builder view and the store can
//! never disagree about what the current form looks like.

use thiserror::Error;
use uuid::Uuid;

use crate::forms::{Field, FieldOption, FieldPosition, FieldType, FieldWidth, ValidationRules};
use crate::store::FormStore;

pub type BuilderResult<T> = Result<T, BuilderError>;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Form not found: {0}")]
    FormNotFound(Uuid),
    #[error("Field not found: {0}")]
    FieldNotFound(Uuid),
    #[error("Field index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Page {0} does not exist")]
    PageOutOfRange(u32),
    #[error("Page {0} still has fields assigned; move or remove them first")]
    PageNotEmpty(u32),
}

/// Optional replacements merged into a field by [`BuilderSession::update_field`].
///
/// Two-level `Option`s distinguish "leave unchanged" from "clear the value".
#[derive(Debug, Clone, Default)]
pub struct FieldUpdate {
    pub label: Option<String>,
    pub placeholder: Option<Option<String>>,
    pub required: Option<bool>,
    pub options: Option<Vec<FieldOption>>,
    pub rules: Option<Option<ValidationRules>>,
    pub page: Option<u32>,
    pub width: Option<FieldWidth>,
    pub position: Option<FieldPosition>,
}

/// Mutation surface scoped to one form being edited.
#[derive(Debug)]
pub struct BuilderSession {
    form_id: Uuid,
    pages: u32,
    active_page: u32,
    selected_field: Option<Uuid>,
}

impl BuilderSession {
    /// Opens an editing session on an existing form and marks it current in
    /// the store.
    pub fn open(store: &mut FormStore, form_id: Uuid) -> BuilderResult<Self> {
        let form = store.form(form_id).ok_or(BuilderError::FormNotFound(form_id))?;
        let pages = form.total_pages();
        store
            .open_form(form_id)
            .map_err(|_| BuilderError::FormNotFound(form_id))?;
        Ok(Self {
            form_id,
            pages,
            active_page: 1,
            selected_field: None,
        })
    }

    pub fn form_id(&self) -> Uuid {
        self.form_id
    }

    /// Page count as the builder sees it: derived field pages plus any
    /// trailing empty pages added in this session.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn active_page(&self) -> u32 {
        self.active_page
    }

    pub fn selected_field(&self) -> Option<Uuid> {
        self.selected_field
    }

    pub fn select_field(&mut self, field_id: Uuid) {
        self.selected_field = Some(field_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_field = None;
    }

    /// Switches the page new fields land on.
    pub fn set_active_page(&mut self, page: u32) -> BuilderResult<()> {
        if page == 0 || page > self.pages {
            return Err(BuilderError::PageOutOfRange(page));
        }
        self.active_page = page;
        Ok(())
    }

    /// Appends a new field to the end of the sequence, assigning it a fresh
    /// id and the active page.
    pub fn add_field(
        &mut self,
        store: &mut FormStore,
        field_type: FieldType,
        label: impl Into<String>,
    ) -> BuilderResult<Uuid> {
        let page = self.active_page;
        let form = self.form_mut(store)?;
        let field = Field::new(field_type, label, page);
        let id = field.id;
        form.fields.push(field);
        form.touch();
        tracing::debug!(form_id = %self.form_id, field_id = %id, "field added");
        Ok(id)
    }

    /// Merges the given updates into a field in place.
    pub fn update_field(
        &mut self,
        store: &mut FormStore,
        field_id: Uuid,
        update: FieldUpdate,
    ) -> BuilderResult<()> {
        if let Some(page) = update.page {
            if page == 0 || page > self.pages {
                return Err(BuilderError::PageOutOfRange(page));
            }
        }
        let form = self.form_mut(store)?;
        let field = form
            .field_mut(field_id)
            .ok_or(BuilderError::FieldNotFound(field_id))?;
        if let Some(label) = update.label {
            field.label = label;
        }
        if let Some(placeholder) = update.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = update.required {
            field.required = required;
        }
        if let Some(options) = update.options {
            field.options = options;
        }
        if let Some(rules) = update.rules {
            field.rules = rules;
        }
        if let Some(page) = update.page {
            field.page = page;
        }
        if let Some(width) = update.width {
            field.width = width;
        }
        if let Some(position) = update.position {
            field.position = position;
        }
        form.touch();
        Ok(())
    }

    /// Deletes a field from the sequence, clearing the selection if it
    /// pointed at the removed field.
    pub fn remove_field(&mut self, store: &mut FormStore, field_id: Uuid) -> BuilderResult<()> {
        let form = self.form_mut(store)?;
        let before = form.fields.len();
        form.fields.retain(|field| field.id != field_id);
        if form.fields.len() == before {
            return Err(BuilderError::FieldNotFound(field_id));
        }
        form.touch();
        if self.selected_field == Some(field_id) {
            self.selected_field = None;
        }
        tracing::debug!(form_id = %self.form_id, field_id = %field_id, "field removed");
        Ok(())
    }

    /// Moves the field at `from` to position `to`, preserving the relative
    /// order of every other field. Out-of-range indices are rejected.
    pub fn reorder_fields(
        &mut self,
        store: &mut FormStore,
        from: usize,
        to: usize,
    ) -> BuilderResult<()> {
        let form = self.form_mut(store)?;
        let len = form.fields.len();
        if from >= len {
            return Err(BuilderError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(BuilderError::IndexOutOfRange { index: to, len });
        }
        if from != to {
            let field = form.fields.remove(from);
            form.fields.insert(to, field);
            form.touch();
        }
        Ok(())
    }

    /// Adds an empty trailing page and makes it the active editing page.
    /// No field is created.
    pub fn add_page(&mut self) -> u32 {
        self.pages += 1;
        self.active_page = self.pages;
        self.pages
    }

    /// Removes an empty page, shifting every field on a later page down by
    /// one. Rejected when any field still carries the page number.
    pub fn remove_page(&mut self, store: &mut FormStore, page: u32) -> BuilderResult<()> {
        if page == 0 || page > self.pages {
            return Err(BuilderError::PageOutOfRange(page));
        }
        if self.pages == 1 {
            return Err(BuilderError::PageOutOfRange(page));
        }
        let form = self.form_mut(store)?;
        if form.fields.iter().any(|field| field.page == page) {
            return Err(BuilderError::PageNotEmpty(page));
        }
        for field in form.fields.iter_mut().filter(|field| field.page > page) {
            field.page -= 1;
        }
        form.touch();
        self.pages -= 1;
        if self.active_page > self.pages {
            self.active_page = self.pages;
        }
        tracing::debug!(form_id = %self.form_id, page, "page removed");
        Ok(())
    }

    fn form_mut<'a>(
        &self,
        store: &'a mut FormStore,
    ) -> BuilderResult<&'a mut crate::forms::Form> {
        store
            .form_mut(self.form_id)
            .ok_or(BuilderError::FormNotFound(self.form_id))
    }
}

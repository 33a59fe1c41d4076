use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::Field;

/// Publish state of a form. Only active forms accept submissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Active,
    Inactive,
}

impl FormStatus {
    pub fn toggled(self) -> Self {
        match self {
            FormStatus::Active => FormStatus::Inactive,
            FormStatus::Inactive => FormStatus::Active,
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormStatus::Active => f.write_str("Active"),
            FormStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

/// Form-level behavior toggles applied after submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSettings {
    pub email_notifications: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub thank_you_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            email_notifications: false,
            redirect_url: None,
            thank_you_message: "Thank you for your submission!".into(),
            expires_at: None,
        }
    }
}

/// A titled, paginated collection of fields with publish status and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: FormStatus,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub settings: FormSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Creates an unpublished form with no fields.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        created_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            status: FormStatus::Inactive,
            fields: Vec::new(),
            settings: FormSettings::default(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total page count, derived from the highest page number in use.
    /// A form with no fields still has exactly one page.
    pub fn total_pages(&self) -> u32 {
        self.fields.iter().map(|field| field.page).max().unwrap_or(1).max(1)
    }

    /// Fields assigned to `page`, in sequence order.
    pub fn page_fields(&self, page: u32) -> Vec<&Field> {
        self.fields.iter().filter(|field| field.page == page).collect()
    }

    pub fn field(&self, id: Uuid) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn field_mut(&mut self, id: Uuid) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    pub fn is_active(&self) -> bool {
        self.status == FormStatus::Active
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::field::FieldType;

    #[test]
    fn empty_form_has_one_page() {
        let form = Form::new("Contact Us", None, None);
        assert_eq!(form.status, FormStatus::Inactive);
        assert!(form.fields.is_empty());
        assert_eq!(form.total_pages(), 1);
    }

    #[test]
    fn total_pages_follows_highest_page_number() {
        let mut form = Form::new("Survey", None, None);
        form.fields.push(Field::new(FieldType::Text, "Name", 1));
        form.fields.push(Field::new(FieldType::Email, "Email", 3));
        assert_eq!(form.total_pages(), 3);
        assert_eq!(form.page_fields(3).len(), 1);
        assert!(form.page_fields(2).is_empty());
    }

    #[test]
    fn toggled_status_round_trips() {
        assert_eq!(FormStatus::Active.toggled().toggled(), FormStatus::Active);
        assert_eq!(FormStatus::Inactive.toggled(), FormStatus::Active);
    }
}

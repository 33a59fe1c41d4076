use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The vocabulary of input types a form can offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    TextArea,
    Email,
    Phone,
    Number,
    Password,
    Dropdown,
    Radio,
    Checkbox,
    Date,
    File,
    FirstName,
    LastName,
}

impl FieldType {
    /// Canonical lowercase name of every type, as accepted by [`FieldType::parse`].
    pub const NAMES: [&'static str; 13] = [
        "text",
        "textarea",
        "email",
        "phone",
        "number",
        "password",
        "dropdown",
        "radio",
        "checkbox",
        "date",
        "file",
        "first_name",
        "last_name",
    ];

    /// Types that carry a list of selectable options.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Radio | FieldType::Checkbox)
    }

    /// Checkbox fields accept more than one selected value.
    pub fn is_multi_select(&self) -> bool {
        matches!(self, FieldType::Checkbox)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let parsed = match value.trim().to_ascii_lowercase().as_str() {
            "text" => FieldType::Text,
            "textarea" => FieldType::TextArea,
            "email" => FieldType::Email,
            "phone" => FieldType::Phone,
            "number" => FieldType::Number,
            "password" => FieldType::Password,
            "dropdown" => FieldType::Dropdown,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "date" => FieldType::Date,
            "file" => FieldType::File,
            "first_name" | "firstname" => FieldType::FirstName,
            "last_name" | "lastname" => FieldType::LastName,
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldType::Text => "Text",
            FieldType::TextArea => "Text Area",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Number => "Number",
            FieldType::Password => "Password",
            FieldType::Dropdown => "Dropdown",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
            FieldType::File => "File",
            FieldType::FirstName => "First Name",
            FieldType::LastName => "Last Name",
        };
        f.write_str(label)
    }
}

/// One selectable entry for dropdown, radio, or checkbox fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldOption {
    pub id: Uuid,
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Optional per-field validation constraints applied by the respondent flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Horizontal share of the page a field occupies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

/// Alignment of a field within its row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldPosition {
    #[default]
    Left,
    Center,
    Right,
}

/// One configurable input unit on a form.
///
/// Field order within [`crate::forms::Form::fields`] drives both the builder
/// display order and, combined with `page`, the respondent page grouping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: Uuid,
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<ValidationRules>,
    pub page: u32,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(default)]
    pub position: FieldPosition,
}

impl Field {
    /// Creates a field on the given page with defaults for everything else.
    pub fn new(field_type: FieldType, label: impl Into<String>, page: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: Vec::new(),
            rules: None,
            page: page.max(1),
            width: FieldWidth::default(),
            position: FieldPosition::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = Some(rules);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_type_names() {
        assert_eq!(FieldType::parse("textarea"), Some(FieldType::TextArea));
        assert_eq!(FieldType::parse("First_Name"), Some(FieldType::FirstName));
        assert_eq!(FieldType::parse("unknown"), None);
        assert!(FieldType::NAMES.iter().all(|name| FieldType::parse(name).is_some()));
    }

    #[test]
    fn new_field_clamps_page_to_one() {
        let field = Field::new(FieldType::Text, "Name", 0);
        assert_eq!(field.page, 1);
        assert_eq!(field.width, FieldWidth::Full);
        assert_eq!(field.position, FieldPosition::Left);
    }
}

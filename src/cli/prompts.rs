//! Interactive prompts for the builder's field wizard.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cli::core::CommandError;
use crate::forms::FieldType;

const FIELD_TYPES: &[FieldType] = &[
    FieldType::Text,
    FieldType::TextArea,
    FieldType::Email,
    FieldType::Phone,
    FieldType::Number,
    FieldType::Password,
    FieldType::Dropdown,
    FieldType::Radio,
    FieldType::Checkbox,
    FieldType::Date,
    FieldType::File,
    FieldType::FirstName,
    FieldType::LastName,
];

/// Collected answers from the interactive add-field wizard.
pub struct FieldDraft {
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
}

pub fn field_wizard(theme: &ColorfulTheme) -> Result<FieldDraft, CommandError> {
    let labels: Vec<String> = FIELD_TYPES.iter().map(|ty| ty.to_string()).collect();
    let selection = Select::with_theme(theme)
        .with_prompt("Field type")
        .items(&labels)
        .default(0)
        .interact()?;
    let label: String = Input::with_theme(theme)
        .with_prompt("Label")
        .interact_text()?;
    let required = Confirm::with_theme(theme)
        .with_prompt("Required?")
        .default(false)
        .interact()?;
    Ok(FieldDraft {
        field_type: FIELD_TYPES[selection],
        label,
        required,
    })
}

pub fn confirm(theme: &ColorfulTheme, prompt: &str, default: bool) -> Result<bool, CommandError> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

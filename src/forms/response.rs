use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted answer, discriminated by the kind of value the field collects.
///
/// Replaces ad hoc runtime shape-checking with one exhaustively matched
/// representation shared by the respondent flow, storage, and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Text(String),
    MultiLine(String),
    Selection(String),
    MultiSelection(Vec<String>),
    Date(NaiveDate),
    Number(f64),
    Files(Vec<String>),
}

impl AnswerValue {
    /// True when the answer carries no usable content, which is what the
    /// required-field check cares about.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(value)
            | AnswerValue::MultiLine(value)
            | AnswerValue::Selection(value) => value.trim().is_empty(),
            AnswerValue::MultiSelection(values) | AnswerValue::Files(values) => values.is_empty(),
            AnswerValue::Date(_) | AnswerValue::Number(_) => false,
        }
    }

    /// Plain-text rendering for validation and export. Multi-valued answers
    /// are joined with ", ".
    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Text(value)
            | AnswerValue::MultiLine(value)
            | AnswerValue::Selection(value) => value.clone(),
            AnswerValue::MultiSelection(values) | AnswerValue::Files(values) => {
                values.join(", ")
            }
            AnswerValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            AnswerValue::Number(value) => {
                if value.fract() == 0.0 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
        }
    }
}

/// One respondent's completed answer set for a form. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub form_id: Uuid,
    pub answers: HashMap<Uuid, AnswerValue>,
    #[serde(default)]
    pub files: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Response {
    pub fn new(form_id: Uuid, answers: HashMap<Uuid, AnswerValue>, files: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_id,
            answers,
            files,
            submitted_at: Utc::now(),
        }
    }

    pub fn answer(&self, field_id: Uuid) -> Option<&AnswerValue> {
        self.answers.get(&field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_checks_cover_each_shape() {
        assert!(AnswerValue::Text("   ".into()).is_empty());
        assert!(AnswerValue::MultiSelection(Vec::new()).is_empty());
        assert!(!AnswerValue::Number(0.0).is_empty());
        assert!(!AnswerValue::Selection("red".into()).is_empty());
    }

    #[test]
    fn multi_values_join_with_comma_space() {
        let answer = AnswerValue::MultiSelection(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(answer.as_text(), "a, b, c");
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(AnswerValue::Number(42.0).as_text(), "42");
        assert_eq!(AnswerValue::Number(1.5).as_text(), "1.5");
    }
}

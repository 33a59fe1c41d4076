//! Read-only tabular view of a form's responses.
//!
//! This is the surface the export collaborator consumes: field labels as
//! column headers, one row per response, every answer rendered as plain text.
//! Output formatting (CSV quoting and the like) is the collaborator's job.

use crate::forms::{Form, Response};

pub const SUBMITTED_AT_HEADER: &str = "Submitted At";

/// Column headers in field sequence order, with the submission timestamp
/// appended last.
pub fn column_headers(form: &Form) -> Vec<String> {
    let mut headers: Vec<String> = form.fields.iter().map(|field| field.label.clone()).collect();
    headers.push(SUBMITTED_AT_HEADER.into());
    headers
}

/// One row per response, aligned with [`column_headers`]. Answers for fields
/// the response never saw render as empty cells; multi-valued answers join
/// with ", ".
pub fn response_rows(form: &Form, responses: &[&Response]) -> Vec<Vec<String>> {
    responses
        .iter()
        .map(|response| {
            let mut row: Vec<String> = form
                .fields
                .iter()
                .map(|field| {
                    response
                        .answer(field.id)
                        .map(|answer| answer.as_text())
                        .unwrap_or_default()
                })
                .collect();
            row.push(response.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string());
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::forms::{AnswerValue, Field, FieldType, Form};

    #[test]
    fn headers_follow_field_order() {
        let mut form = Form::new("Survey", None, None);
        form.fields.push(Field::new(FieldType::Text, "Name", 1));
        form.fields.push(Field::new(FieldType::Email, "Email", 1));
        let headers = column_headers(&form);
        insta::assert_snapshot!(headers.join("|"), @"Name|Email|Submitted At");
    }

    #[test]
    fn rows_render_missing_answers_as_empty_cells() {
        let mut form = Form::new("Survey", None, None);
        let name = Field::new(FieldType::Text, "Name", 1);
        let color = Field::new(FieldType::Checkbox, "Colors", 1);
        let name_id = name.id;
        let color_id = color.id;
        form.fields.push(name);
        form.fields.push(color);

        let mut answers = HashMap::new();
        answers.insert(name_id, AnswerValue::Text("Ada".into()));
        answers.insert(
            color_id,
            AnswerValue::MultiSelection(vec!["red".into(), "blue".into()]),
        );
        let full = Response::new(form.id, answers, Vec::new());
        let sparse = Response::new(form.id, HashMap::new(), Vec::new());

        let rows = response_rows(&form, &[&full, &sparse]);
        assert_eq!(rows[0][0], "Ada");
        assert_eq!(rows[0][1], "red, blue");
        assert_eq!(rows[1][0], "");
        assert_eq!(rows[1][1], "");
        assert_eq!(rows[0].len(), 3);
    }
}

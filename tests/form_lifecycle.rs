//! End-to-end runs through the public API: build a form, publish it, fill it
//! out, and read the responses back as an export table.

use form_core::builder::{BuilderSession, FieldUpdate};
use form_core::export;
use form_core::forms::{AnswerValue, FieldType, ValidationRules};
use form_core::respondent::{Advance, RespondentFlow};
use form_core::store::FormStore;

#[test]
fn build_publish_fill_export() {
    let mut store = FormStore::new();
    let form_id = store
        .create_form("Signup", Some("Join the beta".into()), None)
        .expect("create form");

    let mut builder = BuilderSession::open(&mut store, form_id).expect("open builder");
    let name = builder
        .add_field(&mut store, FieldType::Text, "Full Name")
        .unwrap();
    builder
        .update_field(
            &mut store,
            name,
            FieldUpdate {
                required: Some(true),
                ..FieldUpdate::default()
            },
        )
        .unwrap();
    builder.add_page();
    let email = builder
        .add_field(&mut store, FieldType::Email, "Email")
        .unwrap();
    let age = builder
        .add_field(&mut store, FieldType::Number, "Age")
        .unwrap();
    builder
        .update_field(
            &mut store,
            age,
            FieldUpdate {
                rules: Some(Some(ValidationRules {
                    min: Some(18.0),
                    ..ValidationRules::default()
                })),
                ..FieldUpdate::default()
            },
        )
        .unwrap();
    store.toggle_form_status(form_id).unwrap();

    let mut flow = RespondentFlow::start(&store, form_id).expect("start flow");
    assert_eq!(flow.total_pages(), 2);

    flow.set_answer(name, AnswerValue::Text("Ada Lovelace".into()));
    assert_eq!(flow.next(&mut store), Advance::Page(2));

    // Under-age blocks, then a valid value passes.
    flow.set_answer(email, AnswerValue::Text("ada@example.com".into()));
    flow.set_answer(age, AnswerValue::Number(12.0));
    assert_eq!(flow.next(&mut store), Advance::Blocked);
    flow.set_answer(age, AnswerValue::Number(36.0));
    assert_eq!(flow.next(&mut store), Advance::Submitted);

    let form = store.form(form_id).unwrap();
    let responses = store.responses_for(form_id);
    assert_eq!(responses.len(), 1);

    let headers = export::column_headers(form);
    assert_eq!(headers, vec!["Full Name", "Email", "Age", "Submitted At"]);
    let rows = export::response_rows(form, &responses);
    assert_eq!(rows[0][0], "Ada Lovelace");
    assert_eq!(rows[0][1], "ada@example.com");
    assert_eq!(rows[0][2], "36");
}

#[test]
fn deleting_a_form_drops_its_responses() {
    let mut store = FormStore::new();
    let form_id = store.create_form("Poll", None, None).unwrap();
    let mut builder = BuilderSession::open(&mut store, form_id).unwrap();
    let vote = builder
        .add_field(&mut store, FieldType::Radio, "Vote")
        .unwrap();
    store.toggle_form_status(form_id).unwrap();

    let mut flow = RespondentFlow::start(&store, form_id).unwrap();
    flow.set_answer(vote, AnswerValue::Selection("yes".into()));
    assert_eq!(flow.next(&mut store), Advance::Submitted);
    assert_eq!(store.stats().total_responses, 1);

    store.delete_form(form_id).unwrap();
    assert_eq!(store.stats().total_forms, 0);
    assert_eq!(store.stats().total_responses, 0);
}

#[test]
fn responses_survive_later_field_edits() {
    let mut store = FormStore::new();
    let form_id = store.create_form("Feedback", None, None).unwrap();
    let mut builder = BuilderSession::open(&mut store, form_id).unwrap();
    let rating = builder
        .add_field(&mut store, FieldType::Number, "Rating")
        .unwrap();
    let comment = builder
        .add_field(&mut store, FieldType::TextArea, "Comment")
        .unwrap();
    store.toggle_form_status(form_id).unwrap();

    let mut flow = RespondentFlow::start(&store, form_id).unwrap();
    flow.set_answer(rating, AnswerValue::Number(5.0));
    flow.set_answer(comment, AnswerValue::MultiLine("Loved it".into()));
    assert_eq!(flow.next(&mut store), Advance::Submitted);

    // Removing a field afterwards drops its column; the stored response keeps
    // the orphaned answer without breaking the export.
    builder.remove_field(&mut store, comment).unwrap();
    let form = store.form(form_id).unwrap();
    let responses = store.responses_for(form_id);
    assert_eq!(responses[0].answers.len(), 2);

    let headers = export::column_headers(form);
    assert_eq!(headers, vec!["Rating", "Submitted At"]);
    let rows = export::response_rows(form, &responses);
    assert_eq!(rows[0][0], "5");
    assert_eq!(rows[0].len(), 2);
}

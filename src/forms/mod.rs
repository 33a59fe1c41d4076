//! Form domain models: fields, forms, and respondent submissions.

pub mod field;
#[allow(clippy::module_inception)]
pub mod form;
pub mod response;

pub use field::{Field, FieldOption, FieldPosition, FieldType, FieldWidth, ValidationRules};
pub use form::{Form, FormSettings, FormStatus};
pub use response::{AnswerValue, Response};

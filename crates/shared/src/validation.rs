//! Flattening `validator` results into a single client-facing message.

use validator::ValidationErrors;

/// Message of the first failing rule.
///
/// Fields are visited in name order so the same body always yields the same
/// message. Rules without an explicit message fall back to `"<field> is invalid"`.
pub fn first_violation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    for (field, field_errors) in fields {
        if let Some(error) = field_errors.first() {
            return match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            };
        }
    }
    "Invalid request".to_string()
}

//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are separate
//! from the domain models in `src/models/`, which keep the hosted platform's
//! Portuguese field names. Everything here is camelCase.

pub mod analysis;
pub mod analytics;
pub mod chat;
pub mod feedback;
pub mod planning;

pub use analysis::*;
pub use analytics::*;
pub use chat::*;
pub use feedback::*;
pub use planning::*;

/// Turn `validator` errors into a single readable message.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
            format!("{field} ({})", codes.join(", "))
        })
        .collect();
    fields.sort();
    format!("Invalid fields: {}", fields.join("; "))
}

/// The serde tag of a unit enum variant, e.g. `ReplyKind::DateWarning` as `date_warning`.
pub(crate) fn wire_tag<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

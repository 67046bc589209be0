//! # Schema Validation
//!
//! Structural validation of event payloads against a service's declared
//! schemas. Validation has no side effects: on success the payload is
//! returned to the caller untouched.

use relay_types::{FieldType, ServiceDefinition, ValidationError};

/// Validate a payload against the schema declared for `event_key`.
///
/// # Errors
///
/// - [`ValidationError::UnknownEventKey`] if `event_key` is not declared.
/// - [`ValidationError::MissingRequiredField`] naming the first required
///   field absent from the payload.
/// - [`ValidationError::TypeMismatch`] naming the first present field whose
///   value does not conform to its declared type. A field explicitly set to
///   JSON `null` counts as present with type `null`.
///
/// Payload entries not declared in the schema are ignored.
pub fn validate(
    definition: &ServiceDefinition,
    event_key: &str,
    payload: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), ValidationError> {
    let schema = definition
        .event(event_key)
        .ok_or_else(|| ValidationError::UnknownEventKey {
            key: event_key.to_string(),
        })?;

    for (field_id, field) in &schema.data {
        match payload.get(field_id) {
            None if field.optional => {}
            None => {
                return Err(ValidationError::MissingRequiredField {
                    field: field_id.clone(),
                })
            }
            Some(value) if field.field_type.matches(value) => {}
            Some(value) => {
                return Err(ValidationError::TypeMismatch {
                    field: field_id.clone(),
                    expected: field.field_type,
                    actual: FieldType::name_of(value).to_string(),
                })
            }
        }
    }

    Ok(())
}

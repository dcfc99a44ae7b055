//! Common validation utilities.

use validator::ValidationError;

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Returns the names of the fields whose value is missing or blank.
///
/// Input pairs are `(field_name, value)`; order is preserved in the output.
pub fn missing_fields<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| validate_not_blank(v).is_err()))
        .map(|(name, _)| *name)
        .collect()
}

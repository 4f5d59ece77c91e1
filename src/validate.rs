//! Generic field validation helpers.
//!
//! All `check()` methods in the data model are built on these two functions.
//! They push [`ValidationError`]s into a caller-provided list so several
//! checks for the same field can fire at once (e.g. mandatory *and* too long).

use crate::error::ValidationError;

/// Checks that a mandatory field is present and that the value does not
/// exceed `max_len` characters. Both checks can fire for the same field.
pub fn check_mandatory_length(
    field_name: &str,
    mandatory: bool,
    max_len: usize,
    value: &str,
    errors: &mut Vec<ValidationError>,
) {
    if mandatory && is_empty(value) {
        errors.push(ValidationError::new(
            field_name,
            format!("The field '{}' must not be empty", field_name),
        ));
    }
    if value.chars().count() > max_len {
        errors.push(ValidationError::new(
            field_name,
            format!(
                "The field '{}'({}) must not be longer than {} characters",
                field_name, value, max_len
            ),
        ));
    }
}

/// Checks that a mandatory field is present and that the value is one of the
/// allowed entries.
///
/// An empty value on a non-mandatory field skips the membership check: an
/// absent optional field is not "an invalid member of the allow-list".
pub fn check_allowed(
    field_name: &str,
    mandatory: bool,
    allowed: &[&str],
    value: &str,
    errors: &mut Vec<ValidationError>,
) {
    if mandatory && is_empty(value) {
        errors.push(ValidationError::new(
            field_name,
            format!("The field '{}' must not be empty", field_name),
        ));
    }
    if !mandatory && is_empty(value) {
        return;
    }
    if !allowed.contains(&value) {
        errors.push(ValidationError::new(
            field_name,
            format!(
                "The field '{}' ({}) can have only one of the following values {:?}",
                field_name, value, allowed
            ),
        ));
    }
}

/// Returns true if the string is empty or contains only spaces.
pub fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatory_and_length_both_fire() {
        let mut errors = Vec::new();
        check_mandatory_length("iban", true, 21, "", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_name, "iban");

        errors.clear();
        check_mandatory_length("iban", true, 3, "CH44", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("longer than 3"));
    }

    #[test]
    fn test_allowed_values() {
        let mut errors = Vec::new();
        check_allowed("currency", true, &["CHF", "EUR"], "USD", &mut errors);
        assert_eq!(errors.len(), 1);

        errors.clear();
        check_allowed("currency", true, &["CHF", "EUR"], "CHF", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_optional_value_skips_membership() {
        let mut errors = Vec::new();
        check_allowed("currency", false, &["CHF", "EUR"], "", &mut errors);
        assert!(errors.is_empty());

        // mandatory empty still reports the missing field, once
        check_allowed("currency", true, &["CHF", "EUR"], "", &mut errors);
        assert_eq!(errors.len(), 2);
    }
}

//! Field bounds enforced at the API boundary
//!
//! Violations are rejected with HTTP 400 before any service method runs.

use thiserror::Error;

/// Youngest admissible user age.
pub const AGE_MIN: i32 = 1;

/// Oldest admissible user age.
pub const AGE_MAX: i32 = 120;

/// Minimum length of a person or team name, in characters.
pub const NAME_MIN_LEN: usize = 2;

/// Maximum length of a person or team name, in characters.
pub const NAME_MAX_LEN: usize = 64;

/// A request field rejected before it reaches any service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} must be between {min} and {max} characters, got {len}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        len: usize,
    },

    #[error("age must be between {min} and {max}, got {age}")]
    AgeOutOfRange { age: i32, min: i32, max: i32 },
}

/// Check a person or team name against the blank and length bounds.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }

    let len = value.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(ValidationError::Length {
            field,
            min: NAME_MIN_LEN,
            max: NAME_MAX_LEN,
            len,
        });
    }

    Ok(())
}

/// Check an age against the admissible range.
pub fn validate_age(age: i32) -> Result<(), ValidationError> {
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Err(ValidationError::AgeOutOfRange {
            age,
            min: AGE_MIN,
            max: AGE_MAX,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            validate_name("name", "   "),
            Err(ValidationError::Blank { field: "name" })
        );
        assert_eq!(
            validate_name("firstname", ""),
            Err(ValidationError::Blank { field: "firstname" })
        );
    }

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("name", "Jo").is_ok());
        assert!(validate_name("name", "J").is_err());
        assert!(validate_name("name", &"a".repeat(NAME_MAX_LEN)).is_ok());
        assert!(validate_name("name", &"a".repeat(NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn age_bounds() {
        assert!(validate_age(AGE_MIN).is_ok());
        assert!(validate_age(AGE_MAX).is_ok());
        assert!(validate_age(AGE_MIN - 1).is_err());
        assert!(validate_age(AGE_MAX + 1).is_err());
    }
}

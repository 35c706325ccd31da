//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, size, extra, guest name
pub const MAX_NAME_LEN: usize = 200;

/// Notes on order lines
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, street number, zip code
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Address parts: street, neighborhood, city, complement, reference
pub const MAX_ADDRESS_LEN: usize = 500;

/// Which limit was broken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextViolation {
    Empty { field: String },
    TooLong { field: String, len: usize, max: usize },
}

impl std::fmt::Display for TextViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooLong { field, len, max } => {
                write!(f, "{field} is too long ({len} chars, max {max})")
            }
        }
    }
}

/// Check that a required string is non-empty and within the length limit.
pub fn check_required_text(value: &str, field: &str, max_len: usize) -> Result<(), TextViolation> {
    if value.trim().is_empty() {
        return Err(TextViolation::Empty {
            field: field.to_string(),
        });
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(TextViolation::TooLong {
            field: field.to_string(),
            len,
            max: max_len,
        });
    }
    Ok(())
}

/// Check that an optional string, if present, is within the length limit.
pub fn check_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), TextViolation> {
    if let Some(v) = value {
        let len = v.chars().count();
        if len > max_len {
            return Err(TextViolation::TooLong {
                field: field.to_string(),
                len,
                max: max_len,
            });
        }
    }
    Ok(())
}

// ── Validation helpers (catalog writes) ─────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    check_required_text(value, field, max_len).map_err(|v| AppError::validation(v.to_string()))
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    check_optional_text(value, field, max_len).map_err(|v| AppError::validation(v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Margherita", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "name", MAX_NAME_LEN).unwrap_err();
        assert!(err.message.contains("too long"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "ã" is two bytes
        let name = "ã".repeat(MAX_SHORT_TEXT_LEN);
        assert!(check_required_text(&name, "street", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("sem cebola".into()), "note", MAX_NOTE_LEN).is_ok());
        assert_eq!(
            check_optional_text(&Some("x".repeat(MAX_NOTE_LEN + 1)), "note", MAX_NOTE_LEN),
            Err(TextViolation::TooLong {
                field: "note".into(),
                len: MAX_NOTE_LEN + 1,
                max: MAX_NOTE_LEN
            })
        );
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reference entity for leave categories. Never deleted while referenced;
/// retired by clearing `is_active`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "PTO")]
    pub code: String,
    #[schema(example = "Paid Time Off")]
    pub name: String,
    pub is_active: bool,
}

/// Codes are stored uppercase; resolution is case-insensitive.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn validate_code(code: &str) -> Result<(), String> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Leave type code must not be empty".to_string());
    }
    if code.len() > 20 {
        return Err("Leave type code must be at most 20 characters".to_string());
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Leave type code must be alphanumeric".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize_code("pto"), "PTO");
        assert_eq!(normalize_code("  Sick "), "SICK");
        assert_eq!(normalize_code("PTO"), "PTO");
    }

    #[test]
    fn test_validate_accepts_plain_codes() {
        assert!(validate_code("PTO").is_ok());
        assert!(validate_code("banked_holiday").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code(&"X".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_rejects_punctuation() {
        assert!(validate_code("P T O").is_err());
        assert!(validate_code("PTO;DROP").is_err());
    }
}

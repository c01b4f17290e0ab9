use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::ApiError;
use crate::models::ServiceCategory;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

pub fn validate_item_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid item ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_title(title: &str) -> Result<String, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Please provide a title"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Title cannot be more than {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_description(description: &str) -> Result<String, ApiError> {
    if description.trim().is_empty() {
        return Err(ApiError::validation("Please provide a description"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::validation(format!(
            "Description cannot be more than {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}

pub fn validate_service(service: &str) -> Result<ServiceCategory, ApiError> {
    ServiceCategory::from_str(service).map_err(|()| ApiError::validation("Invalid service type"))
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(email)
    } else {
        Err(ApiError::validation(
            "Please enter a valid email address",
        ))
    }
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id(1).is_ok());
        assert!(validate_item_id(12345).is_ok());
        assert!(validate_item_id(0).is_err());
        assert!(validate_item_id(-1).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Brand Film  ").unwrap(), "Brand Film");
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"a".repeat(101)).is_err());
        assert!(validate_title(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("A short write-up").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description(&"d".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_service() {
        assert!(validate_service("video-editing").is_ok());
        assert!(validate_service("website-development").is_ok());
        assert!(validate_service("VIDEO-EDITING").is_err());
        assert!(validate_service("consulting").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("studio@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.domain.io").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}

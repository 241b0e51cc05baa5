use crate::utils::error::{F1BetError, Result};
use url::Url;
use uuid::Uuid;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(F1BetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(F1BetError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(F1BetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(F1BetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(F1BetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Allowed values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

// 以下為請求欄位驗證

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| F1BetError::ValidationError {
        field: field_name.to_string(),
        reason: "must not be null".to_string(),
    })
}

pub fn validate_not_blank(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(F1BetError::ValidationError {
            field: field_name.to_string(),
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

/// Parses a UUID field, treating a malformed value as a bad request.
pub fn parse_uuid(field_name: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| {
        F1BetError::invalid_argument(format!("Invalid UUID for {}: {} ({})", field_name, value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("provider.base_url", "https://example.com").is_ok());
        assert!(validate_url("provider.base_url", "http://localhost:9000").is_ok());
        assert!(validate_url("provider.base_url", "").is_err());
        assert!(validate_url("provider.base_url", "invalid-url").is_err());
        assert!(validate_url("provider.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("provider.retry_attempts", 3, 1).is_ok());
        assert!(validate_positive_number("provider.retry_attempts", 0, 1).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("currency", "EUR").is_ok());
        let err = validate_not_blank("currency", "   ").unwrap_err();
        assert!(matches!(err, F1BetError::ValidationError { ref field, .. } if field == "currency"));
    }

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("userId", &id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_uuid("userId", "not-a-uuid"),
            Err(F1BetError::InvalidArgument { .. })
        ));
    }
}

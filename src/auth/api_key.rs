//! Admin API key
//!
//! The key is sent in `X-API-Key` or as an `Authorization: Bearer` token.
//! When no key is configured every request is granted admin access.

use crate::auth::AccessLevel;

/// Validates the configured admin key
#[derive(Debug, Clone, Default)]
pub struct ApiKeyValidator {
    admin_key: Option<String>,
}

impl ApiKeyValidator {
    pub fn new(admin_key: Option<String>) -> Self {
        Self {
            admin_key: admin_key.filter(|k| !k.is_empty()),
        }
    }

    /// Whether an admin key has been configured
    pub fn is_configured(&self) -> bool {
        self.admin_key.is_some()
    }

    /// Access granted to a request presenting `api_key`.
    ///
    /// Returns None for a wrong key.
    pub fn validate(&self, api_key: Option<&str>) -> Option<AccessLevel> {
        let Some(expected) = &self.admin_key else {
            return Some(AccessLevel::Admin);
        };

        match api_key {
            Some(key) if constant_time_compare(key, expected) => Some(AccessLevel::Admin),
            Some(_) => None,
            None => Some(AccessLevel::Public),
        }
    }

    /// Pick the key out of the `X-API-Key` and `Authorization` header values
    pub fn extract_key<'a>(
        x_api_key: Option<&'a str>,
        authorization: Option<&'a str>,
    ) -> Option<&'a str> {
        x_api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| {
                authorization
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
            })
    }
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_grants_admin() {
        let validator = ApiKeyValidator::new(None);
        assert!(!validator.is_configured());
        assert_eq!(validator.validate(None), Some(AccessLevel::Admin));
        assert_eq!(validator.validate(Some("anything")), Some(AccessLevel::Admin));
    }

    #[test]
    fn test_configured_key() {
        let validator = ApiKeyValidator::new(Some("s3cret".into()));
        assert!(validator.is_configured());
        assert_eq!(validator.validate(Some("s3cret")), Some(AccessLevel::Admin));
        assert_eq!(validator.validate(Some("wrong")), None);
        assert_eq!(validator.validate(None), Some(AccessLevel::Public));
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        assert!(!ApiKeyValidator::new(Some(String::new())).is_configured());
    }

    #[test]
    fn test_extract_key() {
        assert_eq!(
            ApiKeyValidator::extract_key(Some("abc"), Some("Bearer xyz")),
            Some("abc")
        );
        assert_eq!(
            ApiKeyValidator::extract_key(None, Some("Bearer xyz")),
            Some("xyz")
        );
        assert_eq!(ApiKeyValidator::extract_key(Some(" "), Some("Basic xyz")), None);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }
}

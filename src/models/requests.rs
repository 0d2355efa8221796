//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for pattern invalidation (POST /cache/:namespace/invalidate)
///
/// # Fields
/// - `pattern`: Regular expression matched against every key in the namespace
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Key pattern, regular-expression syntax
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_request_deserialize() {
        let json = r#"{"pattern": "listing:.*"}"#;
        let req: InvalidateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pattern, "listing:.*");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_pattern() {
        let req = InvalidateRequest {
            pattern: "".to_string(),
        };
        assert!(req.validate().is_some());
    }
}

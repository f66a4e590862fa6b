use subtle::ConstantTimeEq;

/// Header carrying the dashboard API key on mutating requests
pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented API key against the configured one.
///
/// With no key configured, every request is rejected.
pub fn api_key_matches(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (Some(expected), Some(presented)) => constant_time_compare(expected, presented),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches(Some("key"), Some("key")));
        assert!(!api_key_matches(Some("key"), Some("other")));
        assert!(!api_key_matches(Some("key"), None));
        assert!(!api_key_matches(None, Some("key")));
        assert!(!api_key_matches(None, None));
    }
}

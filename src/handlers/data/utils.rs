use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Only the literal string "true" forces a delete
    pub force: Option<String>,
}

impl DeleteQuery {
    pub fn force(&self) -> bool {
        self.force.as_deref() == Some("true")
    }
}

/// Parse a numeric path key, answering 400 with the usual error body when it is not a number.
pub fn parse_key(field: &str, raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("{} must be an integer, got '{}'", field, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_forces() {
        let q = |v: Option<&str>| DeleteQuery { force: v.map(str::to_string) }.force();
        assert!(q(Some("true")));
        assert!(!q(Some("1")));
        assert!(!q(Some("TRUE")));
        assert!(!q(None));
    }

    #[test]
    fn non_numeric_key_is_bad_request() {
        assert_eq!(parse_key("managerId", " 12 ").unwrap(), 12);
        let err = parse_key("managerId", "abc").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}

//! Assertions that turn a mismatch into an `ApiError` instead of a panic.
//!
//! Field lookups on untyped bodies report a missing or mistyped field as a
//! decode failure, and a present-but-different value as a mismatch.

use std::collections::BTreeSet;
use std::fmt::Debug;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

pub fn expect_eq<T>(field: &str, expected: &T, actual: &T) -> Result<(), ApiError>
where
    T: PartialEq + Debug + ?Sized,
{
    if expected == actual {
        return Ok(());
    }
    Err(ApiError::Mismatch {
        field: field.to_string(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

pub fn expect_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::HttpError {
        expected,
        status: response.status,
        body: response.body.clone(),
    })
}

/// Passes on any 4xx status.
pub fn expect_client_error(response: &HttpResponse) -> Result<(), ApiError> {
    if (400..500).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::Mismatch {
        field: "status".to_string(),
        expected: "4xx".to_string(),
        actual: response.status.to_string(),
    })
}

/// Look up a top-level field of a JSON object.
pub fn field<'a>(body: &'a Value, name: &str) -> Result<&'a Value, ApiError> {
    body.get(name)
        .ok_or_else(|| ApiError::DeserializationError(format!("missing field `{name}`")))
}

pub fn field_i64(body: &Value, name: &str) -> Result<i64, ApiError> {
    field(body, name)?.as_i64().ok_or_else(|| {
        ApiError::DeserializationError(format!("field `{name}` is not an integer"))
    })
}

/// Compare a body field with a literal, keeping JSON types distinct: the
/// boolean `false` does not equal the text `"false"`.
pub fn expect_field(body: &Value, name: &str, expected: impl Into<Value>) -> Result<(), ApiError> {
    let expected = expected.into();
    let actual = field(body, name)?;
    if *actual == expected {
        return Ok(());
    }
    Err(ApiError::Mismatch {
        field: name.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

/// Order-insensitive comparison of two string collections.
pub fn expect_same_set(field: &str, expected: &[&str], actual: &[String]) -> Result<(), ApiError> {
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    let actual: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
    expect_eq(field, &expected, &actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expect_eq_reports_debug_values() {
        let err = expect_eq("name", "Walk the dog", "Feed the dog").unwrap_err();
        match err {
            ApiError::Mismatch {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "name");
                assert_eq!(expected, "\"Walk the dog\"");
                assert_eq!(actual, "\"Feed the dog\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn expect_field_distinguishes_bool_from_text() {
        let body = json!({"isComplete": "false"});
        let err = expect_field(&body, "isComplete", false).unwrap_err();
        assert!(matches!(err, ApiError::Mismatch { .. }));
        assert!(expect_field(&body, "isComplete", "false").is_ok());
    }

    #[test]
    fn missing_field_is_a_decode_failure() {
        let body = json!({"name": "x"});
        let err = expect_field(&body, "id", 1).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
        let err = field_i64(&json!({"id": "1"}), "id").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn status_checks() {
        assert!(expect_status(&HttpResponse::new(200, ""), 200).is_ok());
        assert!(matches!(
            expect_status(&HttpResponse::new(500, "boom"), 200),
            Err(ApiError::HttpError { status: 500, .. })
        ));
        assert!(expect_client_error(&HttpResponse::new(404, "")).is_ok());
        assert!(expect_client_error(&HttpResponse::new(200, "")).is_err());
        assert!(expect_client_error(&HttpResponse::new(503, "")).is_err());
    }

    #[test]
    fn same_set_ignores_order_but_not_membership() {
        let actual = vec!["b".to_string(), "a".to_string()];
        assert!(expect_same_set("cities", &["a", "b"], &actual).is_ok());
        assert!(expect_same_set("cities", &["a", "b", "c"], &actual).is_err());
        assert!(expect_same_set("cities", &["a"], &actual).is_err());
    }
}

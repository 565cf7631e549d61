//! Success/failure envelope wrapping every API response
//!
//! A response is classified exactly once as validated data, a structured
//! error sent by the server, or an unrecognized body.

use super::error::{AppError, ErrorCode};
use crate::schema::Schema;
use serde_json::{json, Value};

pub const INVALID_SUCCESS_ENVELOPE: &str = "Invalid success response envelope";

/// A decoded failure, carrying the HTTP status to report.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeFailure {
    pub status: u16,
    pub error: AppError,
}

impl From<EnvelopeFailure> for crate::Error {
    fn from(failure: EnvelopeFailure) -> Self {
        crate::Error::Api {
            status: failure.status,
            error: failure.error,
        }
    }
}

pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Classify a response body.
///
/// `body` is `None` when the payload was empty or not valid JSON.
pub fn decode(
    status: u16,
    body: Option<&Value>,
    data_schema: &Schema,
) -> Result<Value, EnvelopeFailure> {
    if is_success_status(status) {
        return decode_success(body, data_schema).ok_or_else(|| EnvelopeFailure {
            status: 500,
            error: AppError::new(ErrorCode::InternalError, INVALID_SUCCESS_ENVELOPE),
        });
    }
    Err(EnvelopeFailure {
        status,
        error: decode_failure(body, status),
    })
}

fn decode_success(body: Option<&Value>, data_schema: &Schema) -> Option<Value> {
    let envelope = body?.as_object()?;
    if envelope.get("success") != Some(&Value::Bool(true)) {
        return None;
    }
    match data_schema.validate(envelope.get("data")?) {
        Ok(data) => Some(data),
        Err(issues) => {
            tracing::debug!(issues = issues.len(), "Success payload failed its schema");
            None
        }
    }
}

/// Read `{"success": false, "error": {...}}`, or synthesize an error from the
/// status code when the body has any other shape.
pub fn decode_failure(body: Option<&Value>, status: u16) -> AppError {
    body.and_then(Value::as_object)
        .filter(|envelope| envelope.get("success") == Some(&Value::Bool(false)))
        .and_then(|envelope| envelope.get("error"))
        .and_then(|error| serde_json::from_value::<AppError>(error.clone()).ok())
        .unwrap_or_else(|| {
            AppError::new(ErrorCode::for_status(status), format!("HTTP {}", status))
        })
}

pub fn encode_success(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn encode_failure(error: &AppError) -> Value {
    json!({ "success": false, "error": error })
}

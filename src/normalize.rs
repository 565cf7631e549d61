//! One error shape for both output surfaces
//!
//! The CLI renders a [`NormalizedError`] as text on stderr; the MCP server
//! serializes it as a failure envelope inside the tool result. Both show at
//! most [`MAX_DISPLAYED_ISSUES`] issues, in their original order.

use crate::api::envelope::encode_failure;
use crate::api::{AppError, AppErrorIssue, ErrorCode};
use crate::Error;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;

pub const MAX_DISPLAYED_ISSUES: usize = 5;
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<AppErrorIssue>>,
}

impl NormalizedError {
    /// Structured errors keep code and issues; anything else keeps only its
    /// message.
    pub fn from_error(err: &Error) -> Self {
        match err.app_error() {
            Some(app) => Self::from_app_error(app),
            None => Self::from_message(err.to_string()),
        }
    }

    pub fn from_app_error(app: &AppError) -> Self {
        Self {
            code: Some(app.code.clone()),
            message: app.message.clone(),
            issues: app.issues.clone(),
        }
    }

    /// A panic payload. Strings are not error objects, so this is always the
    /// fixed fallback.
    pub fn from_panic(_payload: &(dyn Any + Send)) -> Self {
        Self::unknown()
    }

    pub fn unknown() -> Self {
        Self::from_message(UNKNOWN_ERROR.to_string())
    }

    fn from_message(message: String) -> Self {
        Self {
            code: None,
            message,
            issues: None,
        }
    }

    /// A missing code is reported as an internal error in tool output.
    pub fn code_or_internal(&self) -> &str {
        self.code
            .as_deref()
            .unwrap_or(ErrorCode::InternalError.as_str())
    }

    /// The first issues, original order preserved
    pub fn displayed_issues(&self) -> &[AppErrorIssue] {
        match &self.issues {
            Some(issues) => &issues[..issues.len().min(MAX_DISPLAYED_ISSUES)],
            None => &[],
        }
    }

    /// `{"success": false, "error": {...}}` for tool output
    pub fn to_structured(&self) -> Value {
        let error = AppError {
            code: self.code_or_internal().to_string(),
            message: self.message.clone(),
            issues: self
                .issues
                .as_ref()
                .map(|_| self.displayed_issues().to_vec()),
        };
        encode_failure(&error)
    }

    /// Lines for the terminal: a header, then one line per displayed issue.
    /// The header only carries a `[CODE]` when there is one.
    pub fn render(&self) -> Vec<String> {
        let header = match &self.code {
            Some(code) => format!("Error [{}]: {}", code, self.message),
            None => format!("Error: {}", self.message),
        };
        let mut lines = vec![header];
        for issue in self.displayed_issues() {
            lines.push(format!(
                "  - {}: {} ({})",
                issue.display_path(),
                issue.message,
                issue.code
            ));
        }
        lines
    }
}

impl From<&Error> for NormalizedError {
    fn from(err: &Error) -> Self {
        Self::from_error(err)
    }
}

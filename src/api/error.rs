//! The structured `AppError` record shared by the API, local validation and
//! both output surfaces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine error kinds the platform reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    BadRequest,
    InternalError,
    DependencyError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::ValidationError,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::NotFound,
        ErrorCode::Conflict,
        ErrorCode::RateLimited,
        ErrorCode::BadRequest,
        ErrorCode::InternalError,
        ErrorCode::DependencyError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::DependencyError => "DEPENDENCY_ERROR",
        }
    }

    /// Bucket for failures whose body carried no usable error.
    pub fn for_status(status: u16) -> Self {
        if status >= 500 {
            ErrorCode::InternalError
        } else {
            ErrorCode::BadRequest
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level problem. `path` holds the field path segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppErrorIssue {
    pub path: Vec<String>,
    pub message: String,
    pub code: String,
}

impl AppErrorIssue {
    pub fn new(path: Vec<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Dotted path for display, `<root>` for object-level issues.
    pub fn display_path(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }
}

/// Error record as it appears inside `{"success": false, "error": ...}`.
///
/// `code` is kept as the raw string so a server-sent code is surfaced
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<AppErrorIssue>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
            issues: None,
        }
    }

    pub fn with_issues(mut self, issues: Vec<AppErrorIssue>) -> Self {
        self.issues = Some(issues);
        self
    }

    /// A `VALIDATION_ERROR` built from schema issues, in declaration order.
    ///
    /// The message repeats the first issue so a one-line rendering is still
    /// actionable.
    pub fn validation(issues: Vec<AppErrorIssue>) -> Self {
        let message = match issues.as_slice() {
            [] => "Invalid request".to_string(),
            [only] => only.message.clone(),
            [first, rest @ ..] => format!("{} (and {} more issue(s))", first.message, rest.len()),
        };
        Self::new(ErrorCode::ValidationError, message).with_issues(issues)
    }

    /// Parsed form of `code`, when it is one of the nine known kinds.
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == self.code)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

//! Cabal agent API: error records, envelope codec, typed payloads, request
//! builder and HTTP client

pub mod client;
pub mod envelope;
pub mod error;
pub mod request;
pub mod types;

pub use client::{submit_trade, AgentApi, AgentClient, AgentClientBuilder};
pub use error::{AppError, AppErrorIssue, ErrorCode};
pub use request::PreparedRequest;
pub use types::*;

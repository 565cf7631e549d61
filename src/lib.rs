//! Cabal CLI
//!
//! Client for the Cabal agent API, where AI agents trade on Solana and
//! Hyperliquid and post about their trades.
//!
//! - `schema`: declarative request/response contracts for every endpoint
//! - `api`: envelope codec, typed request builder and the HTTP client
//! - `normalize`: the one error shape shown by the CLI and the MCP server
//! - `commands` / `mcp`: the two output surfaces
//!
//! # Security Model
//!
//! - The API key lives in a `SecretString` and is redacted from `Debug`
//! - Every request body is validated locally before it is sent
//! - Credentials are only written to `.env`, which `init` git-ignores

pub mod api;
pub mod commands;
pub mod config;
pub mod mcp;
pub mod normalize;
pub mod schema;
pub mod verify;

mod error;

// Re-export commonly used types
pub use api::{AgentApi, AgentClient, AgentClientBuilder, AppError, AppErrorIssue, ErrorCode};
pub use config::Config;
pub use error::{Error, Result};
pub use normalize::NormalizedError;

//! Credential storage in the working directory's `.env`
//!
//! SECURITY: the API key is written to disk only here, and only into `.env`.
//! `init` follows every save with [`CredentialStore::ensure_env_ignored`] so
//! the file is never committed by accident.

use super::{AGENT_NAME_ENV, API_KEY_ENV, SITE_URL_ENV};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const GITIGNORE_FILE: &str = ".gitignore";
const SECTION_HEADER: &str = "# Cabal Agent Credentials";
const SECTION_NOTE: &str = "# Generated by cabal-cli - DO NOT COMMIT THIS FILE";

/// Keys rewritten on every save
const MANAGED_KEYS: &[&str] = &[API_KEY_ENV, AGENT_NAME_ENV, SITE_URL_ENV, "CABAL_API_URL"];

/// Keys written by older releases, removed on save
const LEGACY_KEYS: &[&str] = &[
    "CABAL_AGENT_ID",
    "SOLANA_PUBLIC_KEY",
    "SOLANA_PRIVATE_KEY",
    "EVM_PUBLIC_KEY",
    "EVM_PRIVATE_KEY",
];

/// What to persist after a successful `init`
pub struct Credentials {
    pub api_key: SecretString,
    pub agent_name: String,
    pub site_url: Option<String>,
}

// Implement Debug manually to keep the key out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("agent_name", &self.agent_name)
            .field("site_url", &self.site_url)
            .finish()
    }
}

/// Outcome of [`CredentialStore::ensure_env_ignored`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GitignoreUpdate {
    /// `.gitignore` did not exist and was created
    pub created: bool,
    /// `.env` was appended to an existing `.gitignore`
    pub added: bool,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn env_path(&self) -> PathBuf {
        self.dir.join(ENV_FILE)
    }

    pub fn gitignore_path(&self) -> PathBuf {
        self.dir.join(GITIGNORE_FILE)
    }

    /// Parse `.env`. A missing file is an empty map.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let path = self.env_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let iter = dotenvy::from_path_iter(&path).map_err(|e| env_error(&path, e))?;
        let mut values = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| env_error(&path, e))?;
            values.insert(key, value);
        }
        tracing::debug!(path = %path.display(), keys = values.len(), "Loaded .env");
        Ok(values)
    }

    /// True when `.env` holds a non-empty API key
    pub fn is_configured(&self) -> bool {
        self.load()
            .map(|values| values.get(API_KEY_ENV).is_some_and(|k| !k.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Rewrite `.env` with fresh credentials, keeping unrelated lines.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let path = self.env_path();
        let existing = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut kept: Vec<String> = Vec::new();
        for entry in entries(&existing) {
            if is_owned_entry(&entry) {
                continue;
            }
            if dotenvy::from_read_iter(entry.as_bytes()).any(|item| item.is_err()) {
                tracing::warn!(path = %path.display(), "Dropping unparseable .env line");
                continue;
            }
            kept.push(entry);
        }
        while kept.last().is_some_and(|l| l.trim().is_empty()) {
            kept.pop();
        }

        let mut content = kept.join("\n");
        if !content.is_empty() {
            content.push_str("\n\n");
        }
        content.push_str(SECTION_HEADER);
        content.push('\n');
        content.push_str(SECTION_NOTE);
        content.push('\n');
        push_entry(&mut content, API_KEY_ENV, credentials.api_key.expose_secret());
        push_entry(&mut content, AGENT_NAME_ENV, &credentials.agent_name);
        if let Some(site_url) = &credentials.site_url {
            push_entry(&mut content, SITE_URL_ENV, site_url);
        }

        fs::write(&path, content)?;
        restrict_permissions(&path)?;
        tracing::info!(path = %path.display(), "Saved credentials");
        Ok(())
    }

    pub fn is_env_ignored(&self) -> bool {
        fs::read_to_string(self.gitignore_path())
            .map(|content| content.lines().any(ignores_env))
            .unwrap_or(false)
    }

    /// Make sure `.gitignore` lists `.env`, creating the file if needed.
    pub fn ensure_env_ignored(&self) -> Result<GitignoreUpdate> {
        let path = self.gitignore_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&path, ".env\n")?;
                return Ok(GitignoreUpdate {
                    created: true,
                    added: false,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if content.lines().any(ignores_env) {
            return Ok(GitignoreUpdate::default());
        }

        let mut updated = content;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(".env\n");
        fs::write(&path, updated)?;
        Ok(GitignoreUpdate {
            created: false,
            added: true,
        })
    }
}

fn env_error(path: &Path, err: dotenvy::Error) -> Error {
    Error::Config(format!("Failed to read {}: {}", path.display(), err))
}

fn ignores_env(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(".env") || line == "*.env"
}

/// Split `.env` text into entries. A quoted value left open on its line runs
/// on until the line that closes it.
fn entries(content: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        let mut entry = line.to_string();
        if let Some(quote) = open_quote(line) {
            for next in lines.by_ref() {
                entry.push('\n');
                entry.push_str(next);
                if find_quote(next, quote) {
                    break;
                }
            }
        }
        entries.push(entry);
    }
    entries
}

/// The quote character of an assignment whose value is not closed on `line`
fn open_quote(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let (_, value) = trimmed.split_once('=')?;
    let value = value.trim_start();
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    (!find_quote(&value[1..], quote)).then_some(quote)
}

/// True when `text` holds an unescaped `quote`. Only double quotes escape.
fn find_quote(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            return true;
        }
    }
    false
}

/// Entries `save` owns: managed and legacy assignments plus the section header.
fn is_owned_entry(entry: &str) -> bool {
    let line = entry.lines().next().unwrap_or_default();
    let trimmed = line.trim();
    if trimmed == SECTION_HEADER || trimmed == SECTION_NOTE {
        return true;
    }
    let assignment = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    match assignment.split_once('=') {
        Some((key, _)) => {
            let key = key.trim();
            MANAGED_KEYS.iter().chain(LEGACY_KEYS).any(|k| *k == key)
        }
        None => false,
    }
}

fn push_entry(content: &mut String, key: &str, value: &str) {
    content.push_str(key);
    content.push('=');
    content.push_str(&quote(value));
    content.push('\n');
}

/// Double-quote values a `.env` parser would otherwise split or expand.
/// Line breaks are written as `\n` so every entry stays on one line.
fn quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '/' | '@'));
    if plain && !value.is_empty() {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\\' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\r' => {
                // The reader has no `\r` escape; CRLF and lone CR become `\n`
                chars.next_if_eq(&'\n');
                quoted.push_str("\\n");
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

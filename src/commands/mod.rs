//! Interactive CLI commands
//!
//! Each command takes the process [`Config`](crate::Config) and an
//! [`AgentApi`](crate::AgentApi), prints human-readable output to stdout and
//! returns errors for `main` to render.

pub mod init;
pub mod post;
pub mod status;
pub mod trade;
pub mod verify;

pub const BANNER: &str = "Cabal • AI Trading Collective";
pub const DASHBOARD_URL: &str = "https://cabal.trading/dashboard";
pub const SIGNUP_URL: &str = "https://cabal.trading/signup";
pub const DOCS_URL: &str = "https://cabal.trading/trading.md";

/// Section title followed by a blank line
pub(crate) fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!();
}

/// Getting-started text shown when no key is configured.
pub fn welcome_lines() -> Vec<String> {
    vec![
        BANNER.to_string(),
        String::new(),
        "Get started in 3 steps:".to_string(),
        format!("  1. Sign up      → {}", SIGNUP_URL),
        "  2. Copy API key → from your dashboard after signup".to_string(),
        "  3. Connect      → cabal-cli init".to_string(),
        String::new(),
        "Run `cabal-cli init` to get started.".to_string(),
    ]
}

pub fn print_welcome() {
    println!();
    for line in welcome_lines() {
        println!("{}", line);
    }
    println!();
}

pub(crate) fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${:.2}", value)
    }
}

/// `+$12.00 (+1.5%)`, `-$3.00 (-0.2%)`
pub(crate) fn format_pnl(value: f64, percent: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    let pct_sign = if percent >= 0.0 { "+" } else { "" };
    format!("{}${:.2} ({}{:.1}%)", sign, value.abs(), pct_sign, percent)
}

pub(crate) fn status_badge(status: &str) -> String {
    match status {
        "active" => "Active".to_string(),
        "pending" => "Pending".to_string(),
        "suspended" => "Suspended".to_string(),
        "liquidated" => "Liquidated".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn verified_label(verified: bool) -> &'static str {
    if verified {
        "Yes"
    } else {
        "No (connect X on dashboard)"
    }
}

//! Cabal CLI
//!
//! Command-line interface for Cabal agents. `--mcp` switches the whole
//! process into an MCP server on stdio.

use cabal_cli::commands::{self, init, post::PostArgs, trade::TradeArgs};
use cabal_cli::{mcp, AgentClient, Config, NormalizedError, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cabal-cli", version)]
#[command(about = "CLI for Cabal - AI Trading Collective")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect your agent with an API key
    Init {
        /// API key (prompted when omitted)
        api_key: Option<String>,
    },

    /// Check your agent status and wallet balances
    Status,

    /// Verify agent claim via tweet
    Verify {
        /// URL of the verification tweet
        tweet_url: String,
    },

    /// Execute a trade on Solana or Hyperliquid
    Trade {
        /// Chain (solana, hyperliquid)
        #[arg(short, long)]
        chain: Option<String>,

        /// Solana: input token symbol
        #[arg(short, long)]
        input: Option<String>,

        /// Solana: output token symbol
        #[arg(short, long)]
        output: Option<String>,

        /// Solana: amount of input token to swap
        #[arg(short, long)]
        amount: Option<f64>,

        /// Solana: slippage in basis points (1-500)
        #[arg(long)]
        slippage_bps: Option<u32>,

        /// Solana: quote only, don't execute
        #[arg(long)]
        dry_run: bool,

        /// Hyperliquid: coin symbol
        #[arg(long)]
        coin: Option<String>,

        /// Hyperliquid: buy or sell
        #[arg(long)]
        side: Option<String>,

        /// Hyperliquid: order size
        #[arg(long)]
        size: Option<f64>,

        /// Hyperliquid: market or limit
        #[arg(long)]
        order_type: Option<String>,

        /// Hyperliquid: limit price
        #[arg(long)]
        price: Option<f64>,

        /// Hyperliquid: leverage
        #[arg(long)]
        leverage: Option<f64>,

        /// Model making the trade
        #[arg(long)]
        model: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a post tied to a recent trade
    Post {
        /// Trade ID to attach the post to
        #[arg(short, long = "trade")]
        trade: String,

        /// Post title
        #[arg(long)]
        title: String,

        /// Post body
        #[arg(long)]
        body: String,

        /// Post type (entry, exit_gain, exit_loss, link)
        #[arg(long = "type", default_value = "entry")]
        post_type: String,

        /// Flair (gain, loss, yolo, discussion, dd, news, meme)
        #[arg(long)]
        flair: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let mcp_mode = std::env::args().skip(1).any(|arg| arg == "--mcp");
    let verbose = std::env::args().skip(1).any(|arg| arg == "-v" || arg == "--verbose");
    init_tracing(verbose);

    if mcp_mode {
        return finish(run_mcp().await, false);
    }

    let cli = Cli::parse();
    let is_init = matches!(cli.command, Some(Commands::Init { .. }));
    finish(run_cli(cli).await, is_init)
}

/// Logs always go to stderr; stdout carries command output or the MCP stream.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn finish(result: Result<()>, is_init: bool) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            for line in NormalizedError::from_error(&e).render() {
                eprintln!("{}", line);
            }
            if is_init {
                eprintln!("{}", init::FAILURE_HINT);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(timeout: Option<u64>, repairing: bool) -> Result<Config> {
    let dir = std::env::current_dir()?;
    let config = if repairing {
        Config::load_ignoring_broken_env(&dir)?
    } else {
        Config::load(&dir)?
    };
    Ok(match timeout {
        Some(secs) => config.with_timeout(Duration::from_secs(secs)),
        None => config,
    })
}

async fn run_mcp() -> Result<()> {
    let config = load_config(None, false)?;
    mcp::serve(&config).await
}

async fn run_cli(cli: Cli) -> Result<()> {
    let is_init = matches!(cli.command, Some(Commands::Init { .. }));
    let config = load_config(cli.timeout, is_init)?;

    let Some(command) = cli.command else {
        if config.is_configured() {
            Cli::command().print_help()?;
        } else {
            commands::print_welcome();
        }
        return Ok(());
    };

    match command {
        Commands::Init { api_key } => {
            let dir = std::env::current_dir()?;
            init::run(&config, &dir, api_key).await
        }
        Commands::Status => {
            let client = AgentClient::from_config(&config)?;
            commands::status::run(&client).await
        }
        Commands::Verify { tweet_url } => {
            let client = AgentClient::from_config(&config)?;
            commands::verify::run(&config, &client, &tweet_url).await
        }
        Commands::Trade {
            chain,
            input,
            output,
            amount,
            slippage_bps,
            dry_run,
            coin,
            side,
            size,
            order_type,
            price,
            leverage,
            model,
            yes,
        } => {
            let client = AgentClient::from_config(&config)?;
            let args = TradeArgs {
                chain,
                input,
                output,
                amount,
                slippage_bps,
                dry_run,
                coin,
                side,
                size,
                order_type,
                price,
                leverage,
                model,
                yes,
            };
            commands::trade::run(&client, args).await
        }
        Commands::Post {
            trade,
            title,
            body,
            post_type,
            flair,
        } => {
            let client = AgentClient::from_config(&config)?;
            let args = PostArgs {
                trade_id: trade,
                title,
                body,
                post_type,
                flair,
            };
            commands::post::run(&config, &client, &args).await
        }
    }
}

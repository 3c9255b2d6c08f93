//! zcache - interactive shell
//!
//! Runs a cache in-process and evaluates commands read from stdin, one per
//! line, printing each reply the way `redis-cli` does. Logs go to stderr and
//! are filtered with `RUST_LOG`.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zcache::{Cache, CacheConfig, CommandHandler, ExpiryConfig};

/// Embeddable in-process cache with sorted collections
#[derive(Parser, Debug)]
#[command(name = "zcache", version = zcache::VERSION, about)]
struct Args {
    /// Default time-to-live for writes, in seconds
    #[arg(long, default_value_t = 1800)]
    ttl: u64,

    /// Base interval of the background expiry sweeper, in milliseconds
    #[arg(long, default_value_t = 100)]
    sweep_interval_ms: u64,

    /// Disable the background expiry sweeper (expired keys are still hidden on read)
    #[arg(long)]
    no_sweeper: bool,
}

impl Args {
    fn cache_config(&self) -> anyhow::Result<CacheConfig> {
        if self.ttl == 0 {
            anyhow::bail!("--ttl must be at least 1 second");
        }

        let base = Duration::from_millis(self.sweep_interval_ms.max(1));
        let defaults = ExpiryConfig::default();
        let expiry = ExpiryConfig {
            base_interval: base,
            min_interval: defaults.min_interval.min(base),
            max_interval: defaults.max_interval.max(base),
            ..defaults
        };

        Ok(CacheConfig::new()
            .with_default_ttl(Duration::from_secs(self.ttl))
            .with_expiry(expiry))
    }
}

const HELP: &str = r#"Commands:
    SET key value [EX seconds | PX milliseconds]
    GET key
    DEL key [key ...]
    INCR key
    TTL key
    DBSIZE
    ZADD key score member [score member ...]
    ZCARD key
    ZRANK key member
    ZRANGE key start stop [WITHSCORES]
    PING [message]
    COMMAND
    HELP
    QUIT"#;

const PROMPT: &str = "zcache> ";

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(PROMPT.as_bytes())?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = args.cache_config()?;
    info!(
        default_ttl_secs = config.default_ttl.as_secs(),
        sweeper = !args.no_sweeper,
        "Starting zcache v{}",
        zcache::VERSION
    );

    let cache = Arc::new(Cache::with_config(config));
    let _sweeper = if args.no_sweeper {
        None
    } else {
        info!("Background expiry sweeper started");
        Some(cache.start_expiry_sweeper())
    };

    let handler = CommandHandler::new(Arc::clone(&cache));

    tokio::select! {
        result = repl(&handler) => result?,
        _ = signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    info!(keys = cache.dbsize(), "Shutdown complete");
    Ok(())
}

/// Reads commands from stdin until EOF or `QUIT`.
async fn repl(handler: &CommandHandler) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt().context("failed to write prompt")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            println!();
            return Ok(());
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_ascii_uppercase().as_str() {
            "QUIT" | "EXIT" => return Ok(()),
            "HELP" => {
                println!("{}", HELP);
                continue;
            }
            _ => {}
        }

        debug!(line, "Read command");
        println!("{}", handler.execute_line(line));
    }
}

//! `debug-dump` command line client.
//!
//! Sends a single envelope to a debug dump server, mainly to check that the
//! server is reachable and renders what it receives.
//!
//! Configuration precedence (last wins): defaults, `DEBUG_DUMP_*`
//! environment variables, `--config` file, `--host`/`--port` flags.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use debug_dump::config::{load_config, ConfigError};
use debug_dump::entry::NoLocation;
use debug_dump::observability::logging::init_tracing;
use debug_dump::{ConfigUpdate, Delivery, DumpClient, DumpConfig, Thrown, Value};

#[derive(Parser)]
#[command(name = "debug-dump")]
#[command(about = "Send a value to a debug dump server", long_about = None)]
struct Cli {
    /// Debug server host
    #[arg(long)]
    host: Option<String>,

    /// Debug server port
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML file with host/port/enabled
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a JSON value (anything that is not JSON is sent as a string)
    Dump {
        value: String,
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Log an error message
    Error { message: String },
    /// Log a warning with optional JSON context
    Warn {
        message: String,
        #[arg(long)]
        context: Option<String>,
    },
    /// Log a query with optional JSON bindings and duration in milliseconds
    Query {
        sql: String,
        #[arg(long)]
        bindings: Option<String>,
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Check that the server accepts envelopes
    Ping,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("debug_dump=info");

    let cli = Cli::parse();

    let update = match resolve_config(&cli) {
        Ok(update) => update,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::from(2);
        }
    };

    let config = DumpConfig::default().merge(&update);
    tracing::debug!(host = %config.host, port = config.port, enabled = config.enabled, "Configuration loaded");

    // Call sites inside this binary mean nothing to the server.
    let client = DumpClient::with_config(config).with_locator(NoLocation);

    let handle = match cli.command {
        Commands::Dump { value, label } => match label {
            Some(label) => client.dump_labeled(parse_json(&value), label),
            None => client.dump(parse_json(&value)),
        },
        Commands::Error { message } => client.log_error(Thrown::from(message)),
        Commands::Warn { message, context } => {
            client.log_warning(message, context.as_deref().map(parse_json))
        }
        Commands::Query {
            sql,
            bindings,
            duration,
        } => {
            let bindings = bindings.as_deref().map(parse_bindings).unwrap_or_default();
            let duration = duration.and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok());
            client.log_query(sql, bindings, duration)
        }
        Commands::Ping => client.dump_labeled(Value::object([("ping", true)]), "ping"),
    };

    match handle.wait().await {
        Delivery::Delivered { status } => {
            tracing::info!(status, "Envelope delivered");
            ExitCode::SUCCESS
        }
        Delivery::Disabled => {
            tracing::warn!("Sending is disabled, nothing was sent");
            ExitCode::FAILURE
        }
        Delivery::Failed => {
            tracing::error!("Debug server did not answer");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ConfigUpdate, ConfigError> {
    let mut update = ConfigUpdate::from_env()?;

    if let Some(path) = &cli.config {
        update = update.and(load_config(path)?);
    }

    let flags = ConfigUpdate {
        host: cli.host.clone(),
        port: cli.port,
        enabled: None,
    };
    Ok(update.and(flags))
}

fn parse_json(raw: &str) -> Value {
    serde_json::from_str::<JsonValue>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

fn parse_bindings(raw: &str) -> Vec<Value> {
    match parse_json(raw) {
        Value::Array(items) => items,
        single => vec![single],
    }
}

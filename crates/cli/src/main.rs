mod config;
mod lint;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use contractly_core::{Status, VALID_TRANSITIONS};

use crate::config::{init_logging, ServeOverrides, ServerConfig};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Contract lifecycle server and tooling.
#[derive(Parser)]
#[command(
    name = "contractly",
    version,
    about = "Contract lifecycle server and tooling"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the contract lifecycle HTTP API server
    Serve {
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port to listen on (default 5000)
        #[arg(long)]
        port: Option<u16>,
        /// Requests per minute per client IP
        #[arg(long)]
        rate_limit: Option<u64>,
        /// Require this key on every route except /health
        #[arg(long)]
        api_key: Option<String>,
        /// tracing filter, e.g. `info` or `contractly_lifecycle=debug`
        #[arg(long)]
        log_level: Option<String>,
        /// Refuse approval until a Checkbox field is ticked
        #[arg(long)]
        require_terms_acceptance: bool,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
    },

    /// Print the contract status transition table
    Transitions,

    /// Check a blueprint JSON file against the authoring rules
    Lint {
        /// Path to the blueprint JSON file
        file: PathBuf,
        /// Exit with status 1 when any warning is reported
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            rate_limit,
            api_key,
            log_level,
            require_terms_acceptance,
            tls_cert,
            tls_key,
        } => {
            // Validate TLS flags: both must be provided or neither
            if tls_cert.is_some() != tls_key.is_some() {
                report_error(
                    "error: --tls-cert and --tls-key must both be provided",
                    cli.output,
                    cli.quiet,
                );
                process::exit(1);
            }
            let overrides = ServeOverrides {
                port,
                rate_limit,
                api_key,
                log_level,
                require_terms_acceptance,
            };
            let config = match ServerConfig::resolve(config.as_deref(), overrides) {
                Ok(c) => c,
                Err(e) => {
                    report_error(&format!("error: {}", e), cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            if let Err(e) = init_logging(config.log_level.as_deref()) {
                report_error(&format!("error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    report_error(
                        &format!("failed to create tokio runtime: {}", e),
                        cli.output,
                        cli.quiet,
                    );
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(config, tls_cert, tls_key)) {
                report_error(&format!("Server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
        Commands::Transitions => cmd_transitions(cli.output),
        Commands::Lint { file, strict } => {
            lint::cmd_lint(&file, strict, cli.output, cli.quiet);
        }
    }
}

fn cmd_transitions(output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            for (from, to) in VALID_TRANSITIONS {
                println!("{} -> {}", from, to);
            }
            let terminal: Vec<&str> = Status::ALL
                .iter()
                .filter(|s| s.is_terminal())
                .map(|s| s.as_str())
                .collect();
            println!("terminal: {}", terminal.join(", "));
        }
        OutputFormat::Json => {
            let transitions: Vec<serde_json::Value> = VALID_TRANSITIONS
                .iter()
                .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
                .collect();
            let terminal: Vec<Status> = Status::ALL
                .into_iter()
                .filter(|s| s.is_terminal())
                .collect();
            let body = serde_json::json!({
                "statuses": Status::ALL,
                "transitions": transitions,
                "terminal": terminal,
            });
            println!("{}", body);
        }
    }
}

/// Report an error to stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

// src/main.rs

//! The main entry point for the SpinelChat server and client.

use anyhow::{Result, anyhow};
use spinelchat::client::{ChatClient, ClientExit, spawn_stdin_reader};
use spinelchat::config::{ClientConfig, Config, parse_port};
use spinelchat::server;
use std::env;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<ExitCode> {
    // Define version information.
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Collect command-line arguments to decide the execution mode.
    let args: Vec<String> = env::args().collect();

    // Handle the --version flag.
    if args.contains(&"--version".to_string()) {
        println!("SpinelChat version {VERSION}");
        return Ok(ExitCode::SUCCESS);
    }

    if args.len() > 1 && args[1] == "--client" {
        // --- Client Mode ---
        let mut config = ClientConfig::default();
        config.apply_env_overrides()?;
        apply_cli_overrides(&args, &mut config.host, &mut config.port)?;

        // Logs go to stderr and stay quiet so they don't interleave with chat output.
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        init_logging(&log_level);

        return run_client(config).await;
    }

    // --- Normal Server Mode ---

    // The configuration file is optional; without one the defaults apply.
    let mut config = match option_value(&args, "--config")? {
        Some(path) => Config::from_file(path)
            .map_err(|e| anyhow!("Failed to load configuration from \"{path}\": {e:#}"))?,
        None => Config::default(),
    };
    config.apply_env_overrides()?;
    apply_cli_overrides(&args, &mut config.host, &mut config.port)?;
    config.validate()?;

    // Get the log level from env var or config.
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    init_logging(&log_level);

    if let Err(e) = server::run(config).await {
        error!("Server runtime error: {:#}", e);
        return Err(e);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_client(config: ClientConfig) -> Result<ExitCode> {
    let client = match ChatClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Couldn't connect to the server. Aborting...");
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Connected to {}", client.peer_addr());

    let stdin = spawn_stdin_reader()?;
    let stdout = tokio::io::stdout();
    match client.run(stdin, stdout).await? {
        ClientExit::InputClosed => Ok(ExitCode::SUCCESS),
        ClientExit::ServerShutdown => Ok(ExitCode::FAILURE),
    }
}

/// Initializes the global subscriber with a compact, colored formatter on stderr.
fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Applies `--host` / `--port` flags, which take precedence over env and file.
fn apply_cli_overrides(args: &[String], host: &mut String, port: &mut u16) -> Result<()> {
    if let Some(h) = option_value(args, "--host")? {
        *host = h.to_string();
    }
    if let Some(p) = option_value(args, "--port")? {
        *port = parse_port(p)?;
    }
    Ok(())
}

/// Returns the value following `flag`, erroring if the flag has none.
fn option_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|arg| arg == flag) {
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| anyhow!("{flag} flag requires a value")),
        None => Ok(None),
    }
}

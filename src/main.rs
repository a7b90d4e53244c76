//! Shadowblade - Entry Point
//!
//! Modes:
//! - Default: armory MCP server over stdio
//! - --a2a / -a: Shadowblade agent HTTP server

use shadowblade::{standard_registry, AgentServer, Config, McpServer};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let a2a_mode = args.iter().any(|a| a == "--a2a" || a == "-a");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("Shadowblade v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: shadowblade [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --a2a, -a    Run the Shadowblade agent HTTP server");
        println!("  --help, -h   Show this help");
        println!();
        println!("Default: Run the armory MCP server (stdio)");
        println!();
        println!("Environment variables:");
        println!("  A2A_HOST                   Agent bind address (default: localhost)");
        println!("  A2A_PORT                   Agent port (default: 10003)");
        println!("  PUBLIC_URL                 URL advertised in the agent card");
        println!("  SHADOWBLADE_TASK_TTL       Task retention in seconds (default: 3600)");
        println!("  SHADOWBLADE_TASK_CAPACITY  Maximum retained tasks (default: 10000)");
        println!("  SHADOWBLADE_EVENT_BUFFER   Task event buffer (default: 64)");
        println!("  SHADOWBLADE_LOG_REQUESTS   Log HTTP requests (default: true)");
        return Ok(());
    }

    // Setup logging based on mode
    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if a2a_mode {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        // MCP mode - stdout carries the protocol, log to stderr as JSON
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    // Duplicate or invalid weapons abort startup
    let registry = Arc::new(standard_registry()?);

    if a2a_mode {
        info!("Shadowblade agent v{}", env!("CARGO_PKG_VERSION"));

        let config = Config::from_env();
        AgentServer::new(config, registry).run().await?;
    } else {
        info!("Armory MCP server v{}", env!("CARGO_PKG_VERSION"));

        McpServer::new(registry).run().await?;
    }

    Ok(())
}

//! mac-calendar-mcp: macOS Calendar & Reminders MCP server
//!
//! Exposes the local calendar store as read-only MCP tools over stdio.
//!
//! Usage:
//!   mac-calendar-mcp                  - Serve MCP on stdin/stdout
//!   mac-calendar-mcp --config <path>  - Serve with an explicit config file
//!   mac-calendar-mcp --help           - Show help

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mcal_calendar::{
    AccessGuard, CalendarService, CalendarStore, CalendarZone, MemoryStore, ServiceDefaults,
};
use mcal_core::{Config, StoreBackend, ToolManager};
use mcal_eventkit::EventKitStore;
use mcal_mcp::{CalendarMcpServer, serve_stdio};
use mcal_tools::register_default_tools;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// MCP server on stdio
    Serve { config: Option<PathBuf> },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args(std::env::args().skip(1))?;

    let config_path = match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("mac-calendar-mcp {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Serve { config } => config,
    };

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let config =
        Config::load(config_path.as_deref()).map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting mac-calendar-mcp...");
    tracing::info!("Store backend: {:?}", config.store.backend);
    tracing::info!("Timezone: {}", config.defaults.timezone);

    let zone = CalendarZone::parse(&config.defaults.timezone)
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    let store = open_store(&config)?;
    let guard = AccessGuard::new(store, Duration::from_secs(config.store.access_timeout_secs));
    let service = CalendarService::new(guard, zone).with_defaults(ServiceDefaults {
        days_ahead: i64::from(config.defaults.days_ahead),
        search_days_ahead: i64::from(config.defaults.search_days_ahead),
        include_undated_reminders: config.defaults.include_undated_reminders,
    });

    let mut tool_manager = ToolManager::new();
    register_default_tools(&mut tool_manager, Arc::new(service));
    tracing::info!(
        "Registered {} tools: {:?}",
        tool_manager.len(),
        tool_manager.tool_names()
    );

    let server = CalendarMcpServer::new(tool_manager, config.server.name.clone());

    tokio::select! {
        result = serve_stdio(server) => {
            result.map_err(|e| anyhow::anyhow!("MCP server error: {}", e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}

/// Parse command line arguments
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<RunMode> {
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a path", arg))?;
                config = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(RunMode::Serve { config })
}

/// Open the configured calendar store
fn open_store(config: &Config) -> anyhow::Result<Arc<dyn CalendarStore>> {
    match config.store.backend {
        StoreBackend::EventKit => {
            let store = EventKitStore::new()
                .map_err(|e| anyhow::anyhow!("Failed to open EventKit: {}", e))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Fixture => {
            let path = config
                .store
                .fixture_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Config error: store.fixture_path is not set"))?;
            tracing::info!("Loading fixture store from {}", path.display());
            let store = MemoryStore::from_json_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load fixture: {}", e))?;
            Ok(Arc::new(store))
        }
    }
}

/// Print help message
fn print_help() {
    println!("mac-calendar-mcp - macOS Calendar & Reminders MCP server");
    println!();
    println!("Usage:");
    println!("  mac-calendar-mcp                  Serve MCP on stdin/stdout");
    println!("  mac-calendar-mcp --config <path>  Use the given TOML config file");
    println!("  mac-calendar-mcp --help           Show this help message");
    println!("  mac-calendar-mcp --version        Show version");
    println!();
    println!("Environment Variables:");
    println!("  MCAL_CONFIG                     Config file path (default: ./mac-calendar-mcp.toml)");
    println!("  MCAL_SERVER_NAME                Server name reported to clients");
    println!("  MCAL_STORE_BACKEND              eventkit or fixture (default: eventkit)");
    println!("  MCAL_FIXTURE_PATH               JSON fixture for the fixture backend");
    println!("  MCAL_ACCESS_TIMEOUT_SECS        Permission prompt timeout (default: 30)");
    println!("  MCAL_DAYS_AHEAD                 Default event window in days (default: 7)");
    println!("  MCAL_SEARCH_DAYS_AHEAD          Default search window in days (default: 30)");
    println!("  MCAL_INCLUDE_UNDATED_REMINDERS  Include reminders without due date (default: false)");
    println!("  MCAL_TIMEZONE                   Zone for dates without offset (default: local)");
    println!("  RUST_LOG                        Log filter (logs are written to stderr)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults_to_serve() {
        assert_eq!(parse_args(args(&[])).unwrap(), RunMode::Serve { config: None });
    }

    #[test]
    fn test_parse_args_flags() {
        assert_eq!(parse_args(args(&["--help"])).unwrap(), RunMode::Help);
        assert_eq!(parse_args(args(&["-v"])).unwrap(), RunMode::Version);
        assert_eq!(
            parse_args(args(&["-c", "cal.toml"])).unwrap(),
            RunMode::Serve {
                config: Some(PathBuf::from("cal.toml"))
            }
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--cli"])).is_err());
    }

    #[test]
    fn test_open_fixture_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"calendars": [], "events": [], "reminders": []}}"#).unwrap();

        let mut config = Config::default();
        config.store.backend = StoreBackend::Fixture;
        config.store.fixture_path = Some(file.path().to_path_buf());
        assert!(open_store(&config).is_ok());

        config.store.fixture_path = Some(file.path().with_extension("missing"));
        assert!(open_store(&config).is_err());
    }
}

mod shutdown;

use anyhow::{anyhow, bail, Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use hub_db::{absolutize_sqlite_dsn, ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use portfolio::{PortfolioConfig, PortfolioModule};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use web_ingress::{WebIngress, WebIngressConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEV_SECRET: &str = "dev-secret-key-change-me";

/// PortfoHub Server - share your portfolio with the world
#[derive(Parser)]
#[command(name = "portfohub-server")]
#[command(about = "PortfoHub Server - multi-user portfolio sharing site")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("PortfoHub Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

/// Effective database DSN: relative SQLite files live under `home_dir`.
fn database_dsn(config: &AppConfig) -> Result<String> {
    let db = config.database.clone().unwrap_or_default();
    let raw = db.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    if !raw.starts_with("sqlite:") {
        bail!("Unsupported database URL '{raw}': only sqlite is supported");
    }
    Ok(absolutize_sqlite_dsn(raw, Path::new(&config.server.home_dir)))
}

fn connect_opts(db: &DatabaseConfig) -> ConnectOpts {
    ConnectOpts {
        max_conns: db.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        busy_timeout: db
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
    }
}

/// Ingress settings from `modules.web_ingress`, with the server section
/// filling whatever is left unset. The body limit follows the upload limit.
fn ingress_config(config: &AppConfig, portfolio: &PortfolioConfig) -> Result<WebIngressConfig> {
    let mut ingress: WebIngressConfig = config.module_config("web_ingress")?;
    if ingress.bind_addr.trim().is_empty() {
        ingress.bind_addr = format!("{}:{}", config.server.host, config.server.port);
    }
    if ingress.timeout_sec == 0 {
        ingress.timeout_sec = config.server.timeout_sec;
    }
    ingress.max_body_bytes = portfolio.max_upload_bytes;
    Ok(ingress)
}

fn portfolio_config(config: &AppConfig) -> Result<PortfolioConfig> {
    let cfg: PortfolioConfig = config.module_config("portfolio")?;
    if cfg.secret_key.trim().is_empty() {
        return Err(anyhow!("modules.portfolio.secret_key must not be empty"));
    }
    Ok(cfg)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let portfolio_cfg = portfolio_config(&config)?;
    if portfolio_cfg.secret_key == DEV_SECRET {
        tracing::warn!("Using the development session secret; set modules.portfolio.secret_key");
    }
    let ingress_cfg = ingress_config(&config, &portfolio_cfg)?;

    let dsn = database_dsn(&config)?;
    let db_cfg = config.database.clone().unwrap_or_default();
    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts(&db_cfg))
        .await
        .context("Failed to open database")?;
    PortfolioModule::migrate(&db).await?;

    let upload_dir = config.home_path(&portfolio_cfg.upload_dir);
    let module = PortfolioModule::init(portfolio_cfg, db.sea(), upload_dir).await?;

    let ingress = WebIngress::new(ingress_cfg, module.session_config()?);
    let router = ingress.build_router(module.router(Router::new()));

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    let served = ingress.serve(router, cancel).await;
    db.close().await;
    tracing::info!("PortfoHub Server stopped");
    served
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let portfolio_cfg = portfolio_config(config)?;
    let ingress = ingress_config(config, &portfolio_cfg)?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("Invalid bind address '{}'", ingress.bind_addr))?;
    let dsn = database_dsn(config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {dsn}");
    println!(
        "Uploads: {}",
        config.home_path(&portfolio_cfg.upload_dir).display()
    );
    println!("{}", config.to_yaml()?);

    Ok(())
}

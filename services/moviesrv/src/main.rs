//! MovieSrv main program
//!
//! `serve` (default) runs the HTTP API, `check` validates configuration and
//! the database, `grant-role` bootstraps administrators.

use std::path::Path;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use common::service_bootstrap::{init_logging, print_startup_banner};
use common::sqlite::SqliteClient;
use common::ServiceArgs;
use tracing::info;

use moviesrv::bootstrap::{create_app_state, create_service_info, init_schema};
use moviesrv::config::MoviesrvConfig;
use moviesrv::create_routes;

#[derive(Parser, Debug)]
#[command(author, version, about = "MovieSrv - Movie Catalog Service")]
struct Cli {
    #[command(flatten)]
    args: ServiceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Validate configuration and database, print the effective configuration
    Check,
    /// Grant a role to a registered user
    GrantRole {
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },
}

/// Layer CLI overrides on top of the loaded configuration
fn load_config(args: &ServiceArgs) -> anyhow::Result<MoviesrvConfig> {
    let mut config = MoviesrvConfig::load(args.config.as_deref().map(Path::new))?;

    if let Some(db_path) = &args.db_path {
        config.database.path = db_path.clone();
    }
    if let Some(bind) = &args.bind_address {
        let (host, port) = bind
            .rsplit_once(':')
            .with_context(|| format!("Bind address must be host:port, got '{}'", bind))?;
        config.api.host = host.to_string();
        config.api.port = port
            .parse()
            .with_context(|| format!("Invalid port in bind address '{}'", bind))?;
    }
    config.logging.level = args.log_filter(&config.logging.level);

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.args)?;

    if cli.args.validate {
        println!("Configuration OK");
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_service(config, !cli.args.no_color).await,
        Commands::Check => check_config(config).await,
        Commands::GrantRole { email, role } => grant_role(config, &email, &role).await,
    }
}

async fn run_service(config: MoviesrvConfig, ansi: bool) -> anyhow::Result<()> {
    let service_info = create_service_info();
    init_logging(
        &service_info,
        &config.logging.level,
        &config.log_dir(),
        config.logging.enable_api_log,
        ansi,
    )?;
    print_startup_banner(&service_info);

    let sqlite = SqliteClient::new(&config.database.path).await?;
    let bind_address = config.bind_address();
    let state = create_app_state(config, sqlite).await?;
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("API listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await?;

    info!("MovieSrv stopped");
    Ok(())
}

async fn check_config(config: MoviesrvConfig) -> anyhow::Result<()> {
    println!("=== MovieSrv configuration check ===\n");

    let mut printable = config.clone();
    printable.jwt.key = "***".to_string();
    println!("{}", serde_yaml::to_string(&printable)?);

    let sqlite = SqliteClient::new(&config.database.path).await?;
    sqlite.ping().await?;
    init_schema(sqlite.pool()).await?;
    println!("Database OK: {}", sqlite.path());

    moviesrv::TokenService::new(&config.jwt)?;
    println!("Token settings OK (expiry {} days)", config.jwt.expiration_in_days);
    Ok(())
}

async fn grant_role(config: MoviesrvConfig, email: &str, role: &str) -> anyhow::Result<()> {
    let sqlite = SqliteClient::new(&config.database.path).await?;
    let state = create_app_state(config, sqlite).await?;

    let message = state.auth.grant_role_by_email(email, role).await?;
    if !message.is_empty() {
        bail!("{}", message);
    }
    println!("Granted '{}' to {}", role, email);
    Ok(())
}

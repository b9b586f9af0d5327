// crates/backend-bin/src/main.rs
//! `gymdesk-server`: runs the web application or manages accounts.
use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use gymdesk_backend::{
    auth::{
        validate_password_strength, PasswordHasher, PasswordRequirements, MIN_PASSWORD_LENGTH,
    },
    config::{LogFormat, Settings, StorageBackend, DEFAULT_CONFIG_FILE},
    router,
    storage::{self, BootstrapOutcome, FlatFileStorage, MySqlStorage, Registration, Storage},
    AppState,
};
use gymdesk_common::Role;
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

/// Environment variable read by `create-user` before falling back to stdin
const NEW_USER_PASSWORD_ENV: &str = "GYMDESK_NEW_USER_PASSWORD";

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);
const THROTTLE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Parser)]
#[command(name = "gymdesk-server", version, about = "GymDesk gym management server")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve HTTP (the default)
    Serve,
    /// Create a login account
    CreateUser(CreateUserArgs),
}

#[derive(Debug, Args)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    display_name: String,
    /// admin, responsible or user
    #[arg(long, default_value = "user")]
    role: Role,
    #[arg(long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    init_tracing(&settings)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match settings.storage.backend {
            StorageBackend::Mysql => {
                let storage = MySqlStorage::connect_lazy(&settings.database);
                serve(storage, settings).await
            },
            StorageBackend::FlatFile => {
                let storage = FlatFileStorage::new(&settings.storage.data_dir)?;
                serve(storage, settings).await
            },
        },
        Command::CreateUser(args) => match settings.storage.backend {
            StorageBackend::Mysql => {
                let storage = MySqlStorage::connect_lazy(&settings.database);
                create_user(&storage, &settings, args).await
            },
            StorageBackend::FlatFile => {
                let storage = FlatFileStorage::new(&settings.storage.data_dir)?;
                create_user(&storage, &settings, args).await
            },
        },
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_level)?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match settings.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

async fn serve<S: Storage + Clone + 'static>(storage: S, settings: Settings) -> anyhow::Result<()> {
    if settings.uses_development_secret() {
        tracing::warn!("using the built-in development secret; set SECRET_KEY in production");
    }

    let state = Arc::new(AppState::new(storage, settings)?);

    // The server still starts when the store is down; requests report it.
    match storage::bootstrap(&state.storage, &state.settings.bootstrap_admin, &state.hasher).await {
        Ok(BootstrapOutcome::AlreadyInitialized) => {},
        Ok(BootstrapOutcome::AdminCreated { username, generated_password: Some(password) }) => {
            tracing::warn!(%username, %password, "seeded admin account with a generated password, change it");
        },
        Ok(BootstrapOutcome::AdminCreated { username, generated_password: None }) => {
            tracing::info!(%username, "seeded admin account");
        },
        Err(e) => tracing::error!(error = %e, "database bootstrap failed"),
    }

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = interval(SESSION_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired_sessions().await;
            tracing::debug!(removed, "expired sessions cleaned up");
        }
    });

    let limiter = state.login_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = interval(THROTTLE_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.cleanup();
        }
    });

    let addr = state.settings.bind_addr;
    let app = router::create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

async fn create_user<S: Storage>(
    storage: &S,
    settings: &Settings,
    args: CreateUserArgs,
) -> anyhow::Result<()> {
    let mut password = match std::env::var(NEW_USER_PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => {
            eprintln!("Password for {}:", args.username);
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            let password = line.trim_end_matches(['\r', '\n']).to_string();
            line.zeroize();
            password
        },
    };

    if !validate_password_strength(&password, &PasswordRequirements::default()) {
        password.zeroize();
        bail!(
            "password too weak: use at least {MIN_PASSWORD_LENGTH} characters mixing upper and lower case, digits and symbols"
        );
    }

    let hasher = PasswordHasher::from_settings(&settings.password_hash)?;
    storage.ensure_schema().await?;
    let created = storage::register_user(
        storage,
        &hasher,
        Registration {
            username: &args.username,
            password: &password,
            role: args.role,
            display_name: &args.display_name,
            email: args.email.as_deref(),
        },
    )
    .await;
    password.zeroize();

    let user = created?;
    println!("created user {} (id {}, role {})", user.username, user.id, user.role);
    Ok(())
}

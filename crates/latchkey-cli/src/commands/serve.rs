use anyhow::Context;
use latchkey_auth::{AuthConfig, AuthOptions, MemoryUserStore, PgUserStore, StoredUser, UserId, UserStore};
use latchkey_core::{AppConfig, AppConfigTrait, SERVICE_NAME, VERSION};
use latchkey_http::{
    build_app, init_logging, log_shutdown_info, log_startup_info, serve, AuthHandler, HttpConfig,
    LoggingConfig,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ServeArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `EMAIL:HASH` entries for the in-memory store
    pub users: Vec<String>,
}

/// Parse an `EMAIL:HASH` seed entry into a user with a fresh id
pub fn parse_seed_user(entry: &str) -> anyhow::Result<StoredUser> {
    let (email, hash) = entry
        .split_once(':')
        .filter(|(email, hash)| !email.is_empty() && !hash.is_empty())
        .with_context(|| format!("invalid --user value {:?}, expected EMAIL:HASH", entry))?;
    Ok(StoredUser::new(UserId::generate(), email, hash))
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut app_config = AppConfig::from_env()?;
    if let Some(host) = args.host {
        app_config.host = host;
    }
    if let Some(port) = args.port {
        app_config.port = port;
    }
    app_config.validate()?;

    init_logging(LoggingConfig::from_app_config(&app_config).with_service(SERVICE_NAME, VERSION))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let auth_config = AuthConfig::from_env()?;
    let http_config = HttpConfig::from_env()?;
    http_config.validate()?;

    let seeds = args
        .users
        .iter()
        .map(|entry| parse_seed_user(entry))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let store: Arc<dyn UserStore> = match &app_config.database_url {
        Some(url) => {
            if !seeds.is_empty() {
                warn!(count = seeds.len(), "Ignoring --user seeds because DATABASE_URL is set");
            }
            Arc::new(
                PgUserStore::connect(url, &auth_config.users)
                    .await
                    .context("failed to connect the user store")?,
            )
        }
        None if seeds.is_empty() => {
            warn!("DATABASE_URL is not set; using an empty in-memory user store");
            Arc::new(MemoryUserStore::new())
        }
        None => {
            info!(count = seeds.len(), "Seeding the in-memory user store");
            Arc::new(MemoryUserStore::with_users(seeds))
        }
    };
    info!(store = store.store_name(), environment = %app_config.environment, "User store ready");

    let options = AuthOptions::builder(auth_config).store(store).build()?;
    let handler = AuthHandler::new(Arc::new(options))?;
    let app = build_app(handler, &http_config);

    let address = app_config.bind_address();
    log_startup_info(SERVICE_NAME, VERSION, &address);
    serve(&address, app).await?;
    log_shutdown_info(SERVICE_NAME);

    Ok(())
}

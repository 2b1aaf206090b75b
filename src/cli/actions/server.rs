use crate::{
    api,
    auth::{AuthService, MemoryUserStore, PgUserStore, TokenSigner, UserStore},
    cli::telemetry,
    record::RecordSource,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub record_url: Url,
    pub record_key: SecretString,
    pub token_secret: Option<SecretString>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be opened, the token secret is empty,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store: Arc<dyn UserStore> = if let Some(dsn) = &args.dsn {
        Arc::new(
            PgUserStore::connect(dsn)
                .await
                .context("Failed to open the PostgreSQL credential store")?,
        )
    } else {
        warn!("No DSN configured, users are kept in memory and lost on restart");
        Arc::new(MemoryUserStore::new())
    };

    let signer = match args.token_secret {
        Some(secret) => TokenSigner::new(secret).context("Invalid token secret")?,
        None => {
            warn!("No token secret configured, session tokens will not survive a restart");
            TokenSigner::ephemeral()
        }
    };

    let records = RecordSource::new(args.record_url, args.record_key)
        .context("Failed to build the record client")?;

    let auth = Arc::new(AuthService::new(store, signer));

    let result = api::new(args.port, auth, Arc::new(records)).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        store = if args.dsn.is_some() { "postgres" } else { "memory" },
        record_url = %args.record_url,
        "Starting acceso"
    );
}

//! Luminous API server binary.
//!
//! Reads configuration from the environment (`LUM_PORT`,
//! `LUM_BACKUP_URL`, `LUM_BACKUP_TIMEOUT_SECS`,
//! `LUM_PROMOTION_DELAY_SECS`, `LUM_RATE_LIMIT_MAX`,
//! `LUM_RATE_LIMIT_WINDOW_SECS`), wires the optional backup authority
//! client, and serves the HWID gate API.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use lum_backup_client::{BackupConfig, HttpBackupClient};
use lum_registry::BackupAuthority;

use lum_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let backup: Option<Arc<dyn BackupAuthority>> = match &config.backup_url {
        Some(url) => {
            let client_config =
                BackupConfig::new(url.clone()).with_timeout(config.backup_timeout);
            match HttpBackupClient::new(client_config) {
                Ok(client) => {
                    tracing::info!(backup_url = %url, "backup authority configured");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "invalid backup authority configuration, \
                         running without reconciliation");
                    None
                }
            }
        }
        None => {
            tracing::info!("no backup authority configured, sync endpoints will return 503");
            None
        }
    };

    let port = config.port;
    let state = AppState::with_config(config, backup);
    let app = lum_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Luminous API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}

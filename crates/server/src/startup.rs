use std::{future::Future, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use service::{
    livret::{FileLivretStore, LivretRepository},
    runtime,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Bind the configured host (name or IP literal) and port.
pub async fn bind_listener(cfg: &AppConfig) -> Result<TcpListener, StartupError> {
    let host = cfg.server.host.as_str();
    let port = cfg.server.port;
    TcpListener::bind((host, port))
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {host}:{port}: {e}")))
}

/// Open the data file and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.storage.static_dir, &cfg.storage.data_file).await?;

    let store = FileLivretStore::new(&cfg.storage.data_file).await?;
    let records = store.list().await.len();
    info!(path = %store.path().display(), records, "student store ready");

    let repo: Arc<dyn LivretRepository> = store;
    let state = ServerState::new(repo, cfg.admin.password.clone());
    Ok(routes::build_router(state, build_cors(), &cfg.storage.static_dir))
}

/// Serve until the process is killed.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    run_until(cfg, std::future::pending()).await
}

/// Serve until `shutdown` resolves, then let in-flight requests (and their
/// store writes) finish before returning.
pub async fn run_until<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;
    let listener = bind_listener(&cfg).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting livret server");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(%addr, "livret server drained");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cfg_in(dir: &std::path::Path) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.storage.data_file = dir.join("livrets.json");
        cfg.storage.static_dir = dir.join("public");
        cfg
    }

    fn tmp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("livret_startup_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn binds_host_names_not_only_ip_literals() -> anyhow::Result<()> {
        let mut cfg = AppConfig::default();
        cfg.server.host = "localhost".into();
        cfg.server.port = 0;
        let listener = bind_listener(&cfg).await?;
        assert!(listener.local_addr()?.ip().is_loopback());
        Ok(())
    }

    #[tokio::test]
    async fn run_until_returns_once_shutdown_resolves() -> anyhow::Result<()> {
        let dir = tmp_dir();
        let mut cfg = cfg_in(&dir);
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 0;

        run_until(cfg, async {}).await?;
        assert!(tokio::fs::metadata(dir.join("livrets.json")).await?.is_file());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}

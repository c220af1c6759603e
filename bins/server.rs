use std::process::ExitCode;

use configs::AppConfig;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use uuid::Uuid;

fn install_panic_hook(service_id: Uuid) {
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "livret", event = "panic", %service_id, message = %info, "unhandled panic occurred");
    }));
}

fn build_runtime(cfg: &AppConfig) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

/// Resolves on Ctrl+C. A failing signal handler is logged and never resolves,
/// so the server keeps running rather than stopping at once.
async fn shutdown_signal(service_id: Uuid) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(service = "livret", event = "shutdown_signal", %service_id, "received Ctrl+C, draining requests"),
        Err(e) => {
            warn!(service = "livret", event = "signal_unavailable", error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

fn main() -> ExitCode {
    // .env first so RUST_LOG / LOG_FORMAT apply
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let service_id = Uuid::new_v4();
    install_panic_hook(service_id);

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "livret", event = "config_invalid", error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "livret", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "livret",
        event = "start",
        %service_id,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        host = %cfg.server.host,
        port = cfg.server.port,
        data_file = %cfg.storage.data_file.display(),
        "livret server starting"
    );

    match rt.block_on(server::run_until(cfg, shutdown_signal(service_id))) {
        Ok(()) => {
            info!(service = "livret", event = "stop", %service_id, "server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "livret", event = "run_failed", %service_id, error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

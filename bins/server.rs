use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // load .env first so RUST_LOG / LOG_FORMAT take effect
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "quizbox", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    // identity for this process, attached to lifecycle and panic events
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // route panics through tracing so they land in the same log stream
    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "quizbox",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    // config.toml first, then SERVER_HOST / SERVER_PORT / QUIZ_DB_DIR / TOKIO_WORKER_THREADS
    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "quizbox", event = "config_invalid", error = %e, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    // normalized to Some(n) by load_or_env; 0 and missing both become 4
    let worker_threads = cfg.server.worker_threads;

    // multi-threaded runtime sized from config, timers and IO enabled
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "quizbox", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "quizbox",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "quiz service starting"
    );

    rt.block_on(async move {
        // Ctrl+C triggers graceful shutdown; in-flight requests finish first
        let shutdown = async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(service = "quizbox", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
            }
        };
        // binds, serves and returns once shutdown completes
        match server::run(cfg, shutdown).await {
            Ok(()) => {
                info!(service = "quizbox", event = "stop", %service_id, pid, "quiz service stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "quizbox", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}

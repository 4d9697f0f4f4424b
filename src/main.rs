use cancelamento::config::AnalyzerConfig;
use cancelamento::pipeline::Pipeline;
use cancelamento::runtime::logging::init_tracing;
use cancelamento::service::router;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AnalyzerConfig::load_default() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("[Analyzer] {}", err);
            std::process::exit(1);
        }
    };

    let pipeline = Arc::new(Pipeline::from_config(&config));
    let app = router(pipeline);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("[Analyzer] Failed to bind to {}: {}", config.bind_addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!("[Analyzer] Listening on {}", config.bind_addr);

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("[Analyzer] Server failed: {}", err);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("[Analyzer] Failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("[Analyzer] Shutting down");
}

use axum::{routing::{get, post}, Router};
use doc_pairing_rust::{api, AppConfig, PairingEngine};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config.server);
    info!(
        "Pairing engine: {} classifier rules, {} warning markers",
        config.pairing.classifier_rules.rules().len(),
        config.pairing.admin_warning_markers.len()
    );

    // 配对引擎只读, 所有请求共享
    let engine = Arc::new(PairingEngine::new(&config.pairing));

    let pairing_routes = Router::new()
        .route("/api/pair/batch", post(api::pair_batch))
        .route("/api/pair/batches", post(api::pair_batches))
        .with_state(engine);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(pairing_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/pair/batch    - pair a single batch");
    info!("  POST /api/pair/batches  - pair many batches in parallel");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use axum::{extract::Request, ServiceExt};
use product_catalog_api::{
    app::catalog::service::{CatalogStore, ProductService},
    build_app,
    core::middleware::{ApiKey, API_KEY_HEADER},
    infrastructure::{config::load_config, logger::Logger},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // 文件日志的 guard 需要持有到进程退出
    let _guard = Logger::init(&config.logging)?;

    info!("启动商品目录 API 服务器...");

    let product_service = ProductService::new(CatalogStore::seeded());
    info!("✅ 已初始化 {} 个示例商品", product_service.count()?);

    let state = AppState {
        product_service,
        api_key: ApiKey::new(config.auth.api_key.as_str()),
    };
    let app = build_app(state);

    let listener = TcpListener::bind(config.listen_addr()).await?;

    info!("🚀 Server is running on http://localhost:{}", config.http.port);
    info!("📖 API 端点:");
    info!("   GET    /api/products        - 商品列表 (category, search, page, limit)");
    info!("   GET    /api/products/stats  - 分类统计");
    info!("   GET    /api/products/:id    - 获取商品");
    info!("   POST   /api/products        - 创建商品");
    info!("   PUT    /api/products/:id    - 更新商品");
    info!("   DELETE /api/products/:id    - 删除商品");
    info!("💡 写操作需要在请求头中携带 {}", API_KEY_HEADER);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务器已关闭");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，开始优雅关闭..."),
        _ = terminate => info!("收到 SIGTERM，开始优雅关闭..."),
    }
}

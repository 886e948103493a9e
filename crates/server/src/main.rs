/// Easy Net Fabric - Server
///
/// 后端服务器主程序，提供 REST API 与 Manager 消息总线

mod api;
mod app_state;
mod bus;
mod config;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{app_state::AppState, bus::ManagerBus};
use store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    info!("🚀 启动 Easy Net Fabric Server...");

    // 加载环境变量
    dotenvy::dotenv().ok();

    let cfg = config::Config::from_env()?;
    info!("✅ 配置加载成功");

    // 建池（带启动重试），构造数据访问门面
    let store = Store::connect(&cfg.engine_options()).await?;
    info!("✅ 数据库连接成功");

    // 初始化 Manager 消息总线
    let manager_bus = ManagerBus::new();
    manager_bus.clone().start_heartbeat_monitor(cfg.manager_timeout, 30);
    info!("✅ Manager 总线已初始化（心跳超时 {} 秒）", cfg.manager_timeout);

    let app_state = AppState::new(store, manager_bus);

    // 设置CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 构建应用路由
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ws/manager", get(bus::handle_manager_websocket))
        .nest("/api", api::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // 启动服务器
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server_port));
    info!("🎯 服务器监听在 http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> &'static str {
    "Easy Net Fabric Server API v1"
}

async fn health_handler() -> &'static str {
    "OK"
}

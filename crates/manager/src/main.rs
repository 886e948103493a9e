/// Easy Net Fabric - Manager
///
/// 站点侧管理进程：接入 Server 消息总线处理异步命令，
/// 并按固定间隔对账在途的网络变更

mod config;
mod tasks;
mod ws;

use common::ws_rpc::RegisterRequest;
use store::Store;
use tracing::info;

use ws::WsClient;

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

    info!("🚀 启动 Easy Net Fabric Manager...");

    // 加载配置
    dotenvy::dotenv().ok();
    let cfg = config::Config::from_env()?;
    info!("✅ 配置加载成功");

    // 建池（带启动重试），构造数据访问门面
    let store = Store::connect(&cfg.engine_options()).await?;
    info!("✅ 数据库连接成功");

    // 周期任务：按 report_interval 对账在途变更
    tasks::start_periodic_tasks(store.clone(), cfg.report_interval);
    info!("✅ 周期任务已启动（间隔 {} 秒）", cfg.report_interval);

    // RPC 方法路由
    let router = ws::build_router(store).await;
    info!("✅ RPC 处理器已初始化");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let register = RegisterRequest {
        manager_id: cfg.manager_id.clone(),
        site_name: cfg.site_name.clone(),
        hostname,
    };

    let ws_client = WsClient::new(
        cfg.server_ws_url.clone(),
        register,
        router,
        cfg.heartbeat_interval,
    );

    info!("🎯 连接到 Server: {}", cfg.server_ws_url);
    info!("📌 Manager ID: {}, 站点: {}", cfg.manager_id, cfg.site_name);

    // 运行 WebSocket 客户端（会自动重连）
    ws_client.run().await;

    Ok(())
}

/// Manager 消息总线
///
/// Server 侧维护所有已连上的 Manager 会话，
/// 控制器通过这里向站点 Manager 下发请求与变更通知

mod handler;
mod manager_bus;

pub use handler::handle_manager_websocket;
pub use manager_bus::{ManagerBus, ManagerSession};

/// 应用全局状态
///
/// 进程启动时构造一次，经 axum State 注入每个请求，
/// 取代散落的全局单例

use store::Store;

use crate::bus::ManagerBus;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 数据访问门面
    pub store: Store,
    /// Manager 消息总线
    pub manager_bus: ManagerBus,
}

impl AppState {
    pub fn new(store: Store, manager_bus: ManagerBus) -> Self {
        Self { store, manager_bus }
    }

    /// 数据访问门面（克隆句柄）
    pub fn store(&self) -> Store {
        self.store.clone()
    }

    /// Manager 消息总线（克隆句柄）
    pub fn manager_bus(&self) -> ManagerBus {
        self.manager_bus.clone()
    }
}

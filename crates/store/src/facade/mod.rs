/// 资源访问门面
///
/// 面向 Server / Manager 的数据操作目录：各实体的增删改查，
/// 加上 VLAN / GIC 的分配回收算法。句柄本身只是连接池的轻量克隆，
/// 可在任务间随意传递；每个写操作内部自己开一次会话

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::engine::{self, EngineOptions};
use crate::error::Result;

mod apps;
mod console;
mod gic;
mod templates;
mod topology;
mod vlan;
mod vms;

/// 数据访问门面句柄
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    /// 用现成的连接池构造门面
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 按引擎选项建池并构造门面
    pub async fn connect(options: &EngineOptions) -> Result<Self> {
        let db = engine::connect(options).await?;
        Ok(Self::new(db))
    }

    /// 底层连接池（进程级共享）
    pub fn conn(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// 当前时间，统一为带时区的 UTC
pub(crate) fn now() -> sea_orm::entity::prelude::DateTimeWithTimeZone {
    Utc::now().into()
}

/// GIC 绑定记录数据模型
///
/// 把一个应用 + 一个 gic 类型子接口挂到已租出的 GIC 上，
/// 生命周期 adding -> ok -> deleting

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gicextension")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gicextension_id: String,
    pub app_id: String,
    pub gic_id: String,
    pub subinterface_id: String,
    pub status: String,
    pub starttime: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 绑定记录状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GicExtensionStatus {
    Adding,
    Ok,
    Deleting,
}

impl GicExtensionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GicExtensionStatus::Adding => "adding",
            GicExtensionStatus::Ok => "ok",
            GicExtensionStatus::Deleting => "deleting",
        }
    }
}

/// 应用接入 GIC 请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinAppGicRequest {
    pub gicextension_id: String,
    pub app_id: String,
    pub gic_id: String,
    pub subinterface_id: String,
    pub status: GicExtensionStatus,
}

/// list_gic_app 支持的查询键
#[derive(Debug, Clone)]
pub enum GicAppFilter {
    GicId(String),
    Status(String),
}

/// 按路由设备汇总的绑定记录视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GicAppView {
    pub gicextension_id: String,
    pub sub_name: String,
    pub edge_name: String,
    pub group_name: String,
}

/// 正在调整 QoS 的 GIC 及其本地子接口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatingGicView {
    pub gic_id: String,
    pub subinterfaces: Vec<super::subinterface::SubinterfaceView>,
}

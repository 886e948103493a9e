/// 串口代理服务数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 集群内的串口代理（VSPC）服务实例
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vspc_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vspc_id: String,
    pub site_id: String,
    pub pod_id: String,
    pub cluster_id: String,
    pub vspc_server_ip: String,
    pub is_enable: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 创建串口代理 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVspcDto {
    pub site_id: String,
    pub pod_id: String,
    pub cluster_id: String,
    pub vspc_server_ip: String,
    pub is_enable: i32,
}

/// 更新串口代理 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVspcDto {
    pub vspc_server_ip: Option<String>,
    pub is_enable: Option<i32>,
}

/// list_vspc 支持的查询键
#[derive(Debug, Clone)]
pub enum VspcFilter {
    SiteId(String),
    ClusterId(String),
}

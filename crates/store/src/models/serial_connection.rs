/// 虚拟机串口连接数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 某台虚拟机租用的串口代理 IP/端口
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "serial_connection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub connection_id: String,
    pub site_id: String,
    pub pod_id: String,
    pub cluster_id: String,
    pub vm_name: String,
    pub vspc_server_ip: String,
    pub port: i32,
    pub is_connected: i32,
    pub vspc_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vspc_info::Entity",
        from = "Column::VspcId",
        to = "super::vspc_info::Column::VspcId"
    )]
    Vspc,
}

impl Related<super::vspc_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vspc.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 新增串口连接请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSerialRequest {
    pub connection_id: String,
    pub site_id: String,
    pub pod_id: String,
    pub cluster_id: String,
    pub vm_name: String,
    pub vspc_server_ip: String,
    pub port: i32,
    pub is_connected: i32,
    pub vspc_id: Option<String>,
}

/// 更新串口连接 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSerialDto {
    pub vspc_server_ip: Option<String>,
    pub port: Option<i32>,
    pub is_connected: Option<i32>,
}

/// list_vm_from_serial 支持的查询键
#[derive(Debug, Clone)]
pub enum SerialFilter {
    VmName(String),
    VspcId(String),
    SiteId(String),
    ClusterId(String),
}

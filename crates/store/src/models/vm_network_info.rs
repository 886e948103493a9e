/// 虚拟机网卡数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 网卡记录，把虚拟机接到某个已分配的子接口上
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vm_network_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub nic_id: String,
    pub subinterface_id: String,
    pub network_connect: String,
    pub mac: Option<String>,
    pub status: Option<String>,
    pub vm_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vm::Entity",
        from = "Column::VmId",
        to = "super::vm::Column::VmId"
    )]
    Vm,
}

impl Related<super::vm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 挂载网卡请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNicRequest {
    pub nic_id: String,
    pub vm_id: String,
    pub subinterface_id: String,
    pub status: Option<String>,
    pub network_connect: String,
}

/// 更新网卡 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNicDto {
    pub status: Option<String>,
    pub mac: Option<String>,
    pub network_connect: Option<String>,
}

/// 网卡视图（带地址信息）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicView {
    pub nic_id: String,
    pub subinterface_id: String,
    pub network_connect: String,
    pub mac: Option<String>,
    pub status: Option<String>,
    pub vm_id: Option<String>,
    pub ipv4: Option<super::vm_ipv4::Model>,
    pub ipv6: Option<super::vm_ipv6::Model>,
}

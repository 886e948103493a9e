/// 虚拟机 IPv4 地址数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vm_ipv4")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ip: String,
    pub mask: String,
    pub gateway: String,
    pub dns: String,
    pub nic_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vm_network_info::Entity",
        from = "Column::NicId",
        to = "super::vm_network_info::Column::NicId"
    )]
    Nic,
}

impl Related<super::vm_network_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Nic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// IPv4 配置规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmIpv4Spec {
    pub ip: String,
    pub mask: String,
    pub gateway: String,
    pub dns: String,
}

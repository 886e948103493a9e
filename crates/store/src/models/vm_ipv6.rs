/// 虚拟机 IPv6 地址数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vm_ipv6")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ip: Option<String>,
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

/// IPv6 配置规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmIpv6Spec {
    pub ip: String,
}

/// 虚拟机操作系统信息数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vm_os_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vm_os_id: String,
    pub hostname: Option<String>,
    pub os_type: String,
    pub os_version: String,
    pub os_bit: i32,
    pub username: String,
    pub password: String,
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

/// 操作系统信息规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsInfoSpec {
    pub hostname: Option<String>,
    pub os_type: String,
    pub os_version: String,
    pub os_bit: i32,
    pub username: String,
    pub password: String,
}

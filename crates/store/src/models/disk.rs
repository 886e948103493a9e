/// 虚拟机磁盘数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "disk")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub size: i32,
    /// 是否已在虚拟机上挂载完成：0 待挂载，1 已挂载
    pub is_load: i32,
    pub flavor_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flavor_info::Entity",
        from = "Column::FlavorId",
        to = "super::flavor_info::Column::FlavorId"
    )]
    FlavorInfo,
}

impl Related<super::flavor_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlavorInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 磁盘规格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSpec {
    pub size: i32,
    pub is_load: i32,
}

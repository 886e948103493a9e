/// 子接口 IPv6 网段数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "network_ipv6")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub network_num: Option<String>,
    pub network_address: Option<String>,
    /// adding | deleting | ok
    pub step: String,
    pub subinterface_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subinterface::Entity",
        from = "Column::SubinterfaceId",
        to = "super::subinterface::Column::SubinterfaceId"
    )]
    Subinterface,
}

impl Related<super::subinterface::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subinterface.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

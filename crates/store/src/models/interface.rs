/// 物理接口数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 物理接口，按资源池划分，子接口从这里租出
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "interface")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub interface_id: String,
    pub interface_name: Option<String>,
    pub pod_id: Option<String>,
    pub route_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::route::Entity",
        from = "Column::RouteId",
        to = "super::route::Column::RouteId"
    )]
    Route,
}

impl Related<super::route::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Route.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 创建物理接口 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInterfaceDto {
    pub interface_name: Option<String>,
    pub pod_id: Option<String>,
    pub route_id: Option<String>,
}

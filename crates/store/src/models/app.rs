/// 租户应用数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 租户应用，归属某个资源池，名下持有虚拟机与已分配的子接口
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub app_id: String,
    pub customer_id: String,
    pub zone_id: String,
    pub site_id: String,
    pub app_type: Option<String>,
    pub status: Option<String>,
    pub create_time: Option<DateTimeWithTimeZone>,
    pub pod_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pod::Entity",
        from = "Column::PodId",
        to = "super::pod::Column::PodId"
    )]
    Pod,
}

impl Related<super::pod::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 创建应用 DTO（app_id 由调用方给定）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppDto {
    pub app_id: String,
    pub customer_id: String,
    pub zone_id: String,
    pub site_id: String,
    pub pod_id: Option<String>,
    pub app_type: Option<String>,
    pub status: Option<String>,
}

/// 资源池数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 资源池（Pod），站点内的一组计算容量
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pod")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pod_id: String,
    pub pod_name: String,
    pub create_time: Option<DateTimeWithTimeZone>,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub site_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::SiteId"
    )]
    Site,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 创建资源池 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePodDto {
    pub pod_name: String,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub site_id: Option<String>,
}

/// 资源池视图（带所属站点名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodView {
    pub pod_id: String,
    pub pod_name: String,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub site_id: Option<String>,
    pub site_name: Option<String>,
}

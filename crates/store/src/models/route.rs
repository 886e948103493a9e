/// 路由设备数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 站点下被纳管的网络设备，物理接口挂在它下面
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "route")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub route_id: String,
    pub route_name: String,
    pub producer: Option<String>,
    pub product_serial: Option<String>,
    pub username: String,
    pub password: String,
    pub ip: String,
    pub port: i32,
    pub create_time: Option<DateTimeWithTimeZone>,
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

/// 创建路由设备 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRouteDto {
    pub route_name: String,
    pub producer: Option<String>,
    pub product_serial: Option<String>,
    pub username: String,
    pub password: String,
    pub ip: String,
    pub port: i32,
    pub site_id: Option<String>,
}

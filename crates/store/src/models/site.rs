/// 站点数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 站点，挂在可用区下，持有该站点 vCenter 的接入信息
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub site_id: String,
    pub site_name: String,
    pub create_time: Option<DateTimeWithTimeZone>,
    pub vcenter_ip: String,
    pub vcenter_port: i32,
    pub vcenter_username: String,
    pub vcenter_password: String,
    pub zone_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::zone::Entity",
        from = "Column::ZoneId",
        to = "super::zone::Column::ZoneId"
    )]
    Zone,
}

impl Related<super::zone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zone.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 创建站点 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSiteDto {
    pub site_name: String,
    pub vcenter_ip: String,
    pub vcenter_port: i32,
    pub vcenter_username: String,
    pub vcenter_password: String,
    pub zone_id: Option<String>,
}

/// 站点视图（带所属可用区名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteView {
    pub site_id: String,
    pub site_name: String,
    pub zone_id: Option<String>,
    pub zone_name: Option<String>,
}

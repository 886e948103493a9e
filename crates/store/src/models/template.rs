/// 虚拟机模板数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub template_id: String,
    pub template_name: String,
    pub template_type: String,
    pub os_type: String,
    pub os_version: String,
    pub os_bit: i32,
    pub cpu: i32,
    pub ram: i32,
    pub disk: i32,
    pub username: String,
    pub password: String,
    pub customer_id: Option<String>,
    pub vmware_tool: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 创建模板 DTO（template_id 由调用方给定）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateDto {
    pub template_id: String,
    pub template_name: String,
    pub template_type: String,
    pub os_type: String,
    pub os_version: String,
    pub os_bit: i32,
    pub cpu: i32,
    pub ram: i32,
    pub disk: i32,
    pub username: String,
    pub password: String,
    pub customer_id: Option<String>,
    pub vmware_tool: Option<i32>,
}

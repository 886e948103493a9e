/// GIC 数据模型
///
/// GIC 是跨站点共享的组互联带宽资源：customer_id 为空表示空闲，
/// 租出时写上客户、QoS 与分配时间

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gic")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gic_id: String,
    pub group_name: String,
    pub core_name: String,
    pub edge_name: String,
    pub evi_id: i32,
    pub edge_sid: i32,
    pub alloc_time: Option<DateTimeWithTimeZone>,
    pub qos: Option<i32>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 创建 GIC DTO（预置为空闲资源，无租户）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGicDto {
    pub group_name: String,
    pub core_name: String,
    pub edge_name: String,
    pub evi_id: i32,
    pub edge_sid: i32,
}

/// GIC 租借请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocGicRequest {
    pub customer_id: String,
    pub qos: i32,
}

/// 更新 GIC DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGicDto {
    pub qos: Option<i32>,
    pub status: Option<String>,
}

/// 子接口 IPv4 网段数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "network_ipv4")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub network_num: String,
    pub network_address: String,
    /// adding | deleting | ok
    pub step: String,
    /// 交换机上的主备网段标记：primary | secondary
    pub level: String,
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

/// 主备网段级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetLevel {
    Primary,
    Secondary,
}

impl NetLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetLevel::Primary => "primary",
            NetLevel::Secondary => "secondary",
        }
    }
}

/// 网段步进状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IpStep {
    Adding,
    Deleting,
    Ok,
}

impl IpStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpStep::Adding => "adding",
            IpStep::Deleting => "deleting",
            IpStep::Ok => "ok",
        }
    }
}

/// 更新网段 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNetworkIpv4Dto {
    pub network_num: Option<String>,
    pub network_address: Option<String>,
    pub level: Option<NetLevel>,
    pub step: Option<IpStep>,
}

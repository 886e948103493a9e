/// 子接口数据模型
///
/// 子接口是可租借的 VLAN 资源：app_id 为空表示空闲，
/// 分配即在一个事务里原子地写上归属字段

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::network_ipv4::{IpStep, NetLevel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subinterface")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subinterface_id: String,
    pub subinterface_name: String,
    pub vlan_id: i32,
    pub vlan_type: Option<String>,
    pub portgroup_name: String,
    pub oid: Option<String>,
    pub alloc_time: Option<DateTimeWithTimeZone>,
    pub update_time: Option<DateTimeWithTimeZone>,
    pub qos: Option<i32>,
    pub app_id: Option<String>,
    pub gic_id: Option<String>,
    pub status: Option<String>,
    pub interface_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::interface::Entity",
        from = "Column::InterfaceId",
        to = "super::interface::Column::InterfaceId"
    )]
    Interface,
}

impl Related<super::interface::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Interface.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// VLAN 类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VlanType {
    Public,
    Private,
    Gic,
}

impl VlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VlanType::Public => "public",
            VlanType::Private => "private",
            VlanType::Gic => "gic",
        }
    }
}

/// 子接口状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubinterfaceStatus {
    Processing,
    Ok,
    Deleting,
}

impl SubinterfaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubinterfaceStatus::Processing => "processing",
            SubinterfaceStatus::Ok => "ok",
            SubinterfaceStatus::Deleting => "deleting",
        }
    }
}

/// 创建子接口 DTO（预置为空闲资源，无归属）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubinterfaceDto {
    pub subinterface_name: String,
    pub vlan_id: i32,
    pub portgroup_name: String,
    pub interface_id: Option<String>,
}

/// 分配时附带的子网信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub network_num: String,
    pub network_address: String,
    pub level: NetLevel,
    pub step: IpStep,
}

/// VLAN 分配请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocVlanRequest {
    pub app_id: String,
    pub vlan_type: VlanType,
    pub qos: i32,
    pub status: SubinterfaceStatus,
    pub sub_net: Option<SubnetSpec>,
}

/// 更新 VLAN 时对 IPv4 子网的互斥子操作
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op_type", rename_all = "lowercase")]
pub enum SubnetOp {
    /// 新增一条网段，步进状态置为 adding
    Add {
        network_num: String,
        network_address: String,
        level: NetLevel,
    },
    /// 标记匹配网段为 deleting，物理删除由后续对账完成
    Delete { network_num: String },
}

/// VLAN 更新请求，仅当子接口状态为 ok 时允许
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVlanRequest {
    pub qos: Option<i32>,
    pub status: Option<SubinterfaceStatus>,
    pub sub_net: Option<SubnetOp>,
}

/// 子接口视图（带所属接口与路由设备）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubinterfaceView {
    pub subinterface_id: String,
    pub subinterface_name: String,
    pub vlan_id: i32,
    pub vlan_type: Option<String>,
    pub portgroup_name: String,
    pub qos: Option<i32>,
    pub app_id: Option<String>,
    pub gic_id: Option<String>,
    pub status: Option<String>,
    pub interface_id: Option<String>,
    pub route_id: Option<String>,
}

impl SubinterfaceView {
    pub fn assemble(model: Model, route_id: Option<String>) -> Self {
        Self {
            subinterface_id: model.subinterface_id,
            subinterface_name: model.subinterface_name,
            vlan_id: model.vlan_id,
            vlan_type: model.vlan_type,
            portgroup_name: model.portgroup_name,
            qos: model.qos,
            app_id: model.app_id,
            gic_id: model.gic_id,
            status: model.status,
            interface_id: model.interface_id,
            route_id,
        }
    }
}

/// 虚拟机数据模型

use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::disk::DiskSpec;
use super::vm_ipv4::VmIpv4Spec;
use super::vm_ipv6::VmIpv6Spec;
use super::vm_network_info::NicView;
use super::vm_os_info::OsInfoSpec;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vm")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vm_id: String,
    pub vm_name: String,
    pub processing: Option<i32>,
    pub template_id: String,
    pub customer_id: String,
    pub site_name: String,
    pub pod_name: String,
    pub cluster_name: String,
    pub datastore_name: String,
    pub status: String,
    pub create_time: DateTimeWithTimeZone,
    pub update_time: Option<DateTimeWithTimeZone>,
    pub configure_step: String,
    pub app_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app::Entity",
        from = "Column::AppId",
        to = "super::app::Column::AppId"
    )]
    App,
}

impl Related<super::app::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::App.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 规格信息（CPU/内存 + 磁盘列表）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorSpec {
    pub cpu: i32,
    pub ram: i32,
    pub disks: Vec<DiskSpec>,
}

/// 网卡挂载信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicSpec {
    pub subinterface_id: String,
    pub status: Option<String>,
    pub network_connect: String,
    pub mac: Option<String>,
    pub ipv4: Option<VmIpv4Spec>,
    pub ipv6: Option<VmIpv6Spec>,
}

/// 创建虚拟机请求：根记录加上整棵从属对象树，单事务写入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddVmRequest {
    pub vm_id: String,
    pub vm_name: String,
    pub template_id: String,
    pub customer_id: String,
    pub site_name: String,
    pub pod_name: String,
    pub cluster_name: String,
    pub datastore_name: String,
    pub status: String,
    pub configure_step: String,
    pub app_id: Option<String>,
    pub os_info: OsInfoSpec,
    pub flavor_info: FlavorSpec,
    pub network_info: Vec<NicSpec>,
}

/// add_vm 的返回项：请求里的子接口与生成的网卡 ID 的对应关系
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicCreated {
    pub subinterface_id: String,
    pub nic_id: String,
}

/// 更新虚拟机请求
///
/// network_info 以 subinterface_id -> mac 的映射回填网卡 MAC
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVmRequest {
    pub cpu: Option<i32>,
    pub ram: Option<i32>,
    pub status: Option<String>,
    pub configure_step: Option<String>,
    pub disks: Vec<DiskSpec>,
    pub network_info: HashMap<String, String>,
}

/// 标记删除虚拟机 DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletingVmDto {
    pub status: Option<String>,
    pub configure_step: Option<String>,
}

/// list_vm 支持的查询键
#[derive(Debug, Clone)]
pub enum VmFilter {
    AppId(String),
    SiteStatus { site_id: String, status: String },
}

/// 按站点过滤虚拟机的条件，status / configure_step 至少给一个
#[derive(Debug, Clone, Default)]
pub struct VmSiteFilter {
    pub status: Option<String>,
    pub configure_step: Option<String>,
}

/// 规格视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorView {
    pub flavor_id: String,
    pub cpu: i32,
    pub ram: i32,
    pub disks: Vec<super::disk::Model>,
}

/// 虚拟机详情视图：根记录 + 显式装配出的从属对象，只读、无环
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmDetail {
    pub vm: Model,
    pub os_info: Option<super::vm_os_info::Model>,
    pub flavor: Option<FlavorView>,
    pub nics: Vec<NicView>,
}

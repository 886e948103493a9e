/// 操作记录数据模型
///
/// 对虚拟机/网卡发起的操作只追加不修改内容，status 跟踪进度，
/// 用于幂等地识别在途操作

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub action_id: String,
    pub app_id: String,
    pub vm_id: String,
    pub nic_id: Option<String>,
    pub action: String,
    pub trigger_time: DateTimeWithTimeZone,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 操作进度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Processing,
    Done,
    Failed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Processing => "processing",
            ActionStatus::Done => "done",
            ActionStatus::Failed => "failed",
        }
    }
}

/// 新增操作记录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddActionRequest {
    pub action_id: String,
    pub app_id: String,
    pub vm_id: String,
    pub nic_id: Option<String>,
    pub action: String,
    pub status: ActionStatus,
}

/// list_action 支持的查询键
///
/// VmId 只列该虚拟机还在处理中的操作
#[derive(Debug, Clone)]
pub enum ActionFilter {
    Action(String),
    Status(String),
    AppId(String),
    VmId(String),
}

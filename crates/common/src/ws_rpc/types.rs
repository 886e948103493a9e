/// WebSocket RPC 数据类型定义
///
/// Server 与 Manager 之间总线消息的负载类型

use serde::{Deserialize, Serialize};

// ============================================================================
// Manager 注册
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub manager_id: String,
    pub site_name: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// 心跳相关
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub manager_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub ok: bool,
    pub server_time: i64,
}

// ============================================================================
// VLAN 下发
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyVlanRequest {
    pub subinterface_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyVlanResponse {
    pub success: bool,
    pub message: String,
}

/// VLAN 变更通知（alloc/update/free 之后由 Server 推送）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanChangedNotification {
    pub subinterface_id: String,
    /// alloc | update | deleting | free
    pub op: String,
}

// ============================================================================
// GIC 下发
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyGicRequest {
    pub gicextension_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyGicResponse {
    pub success: bool,
    pub message: String,
}

/// GIC 变更通知
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GicChangedNotification {
    pub gic_id: String,
    /// alloc | join | update | free
    pub op: String,
}

// ============================================================================
// VM 操作
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmActionRequest {
    pub action_id: String,
    pub vm_id: String,
    /// 操作名，对应 action 表的 action 字段
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmActionResponse {
    pub success: bool,
    pub message: String,
    pub action_id: String,
}

/// Manager 会话注册表

use common::ws_rpc::{RpcError, RpcErrorCode, RpcMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

/// 等待响应的请求信息
type PendingRequest = oneshot::Sender<Result<RpcMessage, RpcError>>;

/// 单个 Manager 会话
pub struct ManagerSession {
    /// Manager ID
    pub manager_id: String,

    /// Manager 负责的站点
    pub site_name: String,

    /// 发送消息的通道
    pub sender: mpsc::UnboundedSender<RpcMessage>,

    /// 最后心跳时间
    last_heartbeat: Arc<RwLock<std::time::Instant>>,

    /// 等待响应的请求 Map: request_id -> response_sender
    pending_requests: Arc<RwLock<HashMap<String, PendingRequest>>>,
}

impl ManagerSession {
    /// 发送 RPC 请求并等待响应
    pub async fn call(
        &self,
        method: impl Into<String>,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<RpcMessage, RpcError> {
        let method = method.into();
        let msg = RpcMessage::request(&method, payload);
        let request_id = msg.id.clone();

        info!(
            "📤 [Server -> Manager] 发送请求: manager={}, method={}, id={}",
            self.manager_id, method, request_id
        );

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending_requests.write().await;
            pending.insert(request_id.clone(), tx);
        }

        if self.sender.send(msg).is_err() {
            let mut pending = self.pending_requests.write().await;
            pending.remove(&request_id);
            return Err(RpcError::connection_closed());
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                let mut pending = self.pending_requests.write().await;
                pending.remove(&request_id);
                Err(RpcError::new(RpcErrorCode::InternalError, "响应通道被关闭"))
            }
            Err(_) => {
                let mut pending = self.pending_requests.write().await;
                pending.remove(&request_id);
                Err(RpcError::timeout(format!("请求超时: {}", request_id)))
            }
        }
    }

    /// 处理收到的响应消息（由 WebSocket handler 调用）
    pub async fn handle_response(&self, response: RpcMessage) {
        let request_id = response.id.clone();

        if let Some(ref error_info) = response.error {
            warn!(
                "📥 [Manager -> Server] 收到错误响应: manager={}, id={}, code={}, message={}",
                self.manager_id, request_id, error_info.code, error_info.message
            );
        } else {
            debug!(
                "📥 [Manager -> Server] 收到成功响应: manager={}, id={}",
                self.manager_id, request_id
            );
        }

        let sender = {
            let mut pending = self.pending_requests.write().await;
            pending.remove(&request_id)
        };

        let Some(sender) = sender else {
            debug!("收到未预期的响应: {}", request_id);
            return;
        };

        let result = match response.error {
            Some(error_info) => Err(RpcError::new(
                RpcErrorCode::InternalError,
                error_info.message,
            )),
            None => Ok(response),
        };
        if sender.send(result).is_err() {
            warn!("无法发送响应，等待者已关闭: {}", request_id);
        }
    }

    /// 发送通知
    pub async fn notify(
        &self,
        method: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<(), RpcError> {
        let msg = RpcMessage::notification(method, payload);
        self.sender
            .send(msg)
            .map_err(|_| RpcError::connection_closed())?;
        Ok(())
    }

    /// 更新最后心跳时间
    pub async fn update_heartbeat(&self) {
        let mut last_heartbeat = self.last_heartbeat.write().await;
        *last_heartbeat = std::time::Instant::now();
    }

    /// 距离上次心跳的秒数
    pub async fn heartbeat_elapsed(&self) -> u64 {
        let last_heartbeat = self.last_heartbeat.read().await;
        last_heartbeat.elapsed().as_secs()
    }
}

/// Manager 会话注册表
#[derive(Clone)]
pub struct ManagerBus {
    /// manager_id -> 会话
    sessions: Arc<RwLock<HashMap<String, Arc<ManagerSession>>>>,
}

impl ManagerBus {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 登记新的 Manager 会话
    pub async fn register(
        &self,
        manager_id: String,
        site_name: String,
        sender: mpsc::UnboundedSender<RpcMessage>,
    ) -> Arc<ManagerSession> {
        let session = Arc::new(ManagerSession {
            manager_id: manager_id.clone(),
            site_name,
            sender,
            last_heartbeat: Arc::new(RwLock::new(std::time::Instant::now())),
            pending_requests: Arc::new(RwLock::new(HashMap::new())),
        });

        let mut sessions = self.sessions.write().await;
        sessions.insert(manager_id.clone(), session.clone());

        info!("Manager 已注册: {}", manager_id);
        session
    }

    /// 注销 Manager 会话
    pub async fn unregister(&self, manager_id: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(manager_id).is_some() {
            info!("Manager 已注销: {}", manager_id);
        }
    }

    /// 取指定 Manager 的会话
    pub async fn get(&self, manager_id: &str) -> Option<Arc<ManagerSession>> {
        let sessions = self.sessions.read().await;
        sessions.get(manager_id).cloned()
    }

    /// 按站点找 Manager 会话
    pub async fn get_by_site(&self, site_name: &str) -> Option<Arc<ManagerSession>> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .find(|s| s.site_name == site_name)
            .cloned()
    }

    /// 在线 Manager 列表
    pub async fn list_managers(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        sessions.keys().cloned().collect()
    }

    /// 向指定 Manager 发送 RPC 请求
    pub async fn call(
        &self,
        manager_id: &str,
        method: impl Into<String>,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<RpcMessage, RpcError> {
        let session = self
            .get(manager_id)
            .await
            .ok_or_else(|| RpcError::manager_not_found(manager_id))?;
        session.call(method, payload, timeout).await
    }

    /// 向指定 Manager 发送通知
    pub async fn notify(
        &self,
        manager_id: &str,
        method: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<(), RpcError> {
        let session = self
            .get(manager_id)
            .await
            .ok_or_else(|| RpcError::manager_not_found(manager_id))?;
        session.notify(method, payload).await
    }

    /// 向所有 Manager 广播通知，返回送达数
    pub async fn broadcast(
        &self,
        method: impl Into<String> + Clone,
        payload: serde_json::Value,
    ) -> usize {
        let sessions = self.sessions.read().await;
        let mut count = 0;

        for (manager_id, session) in sessions.iter() {
            if let Err(e) = session.notify(method.clone(), payload.clone()).await {
                warn!("向 Manager {} 发送广播失败: {}", manager_id, e);
            } else {
                count += 1;
            }
        }

        debug!("广播消息已发送到 {} 个 Manager", count);
        count
    }

    /// 清理心跳超时的会话，返回被清理的 Manager ID
    pub async fn cleanup_timeout_sessions(&self, timeout_secs: u64) -> Vec<String> {
        let mut to_remove = Vec::new();

        {
            let sessions = self.sessions.read().await;
            for (manager_id, session) in sessions.iter() {
                if session.heartbeat_elapsed().await > timeout_secs {
                    warn!("Manager 心跳超时: {}", manager_id);
                    to_remove.push(manager_id.clone());
                }
            }
        }

        if !to_remove.is_empty() {
            let mut sessions = self.sessions.write().await;
            for manager_id in &to_remove {
                sessions.remove(manager_id);
                info!("已清理超时 Manager: {}", manager_id);
            }
        }

        to_remove
    }

    /// 启动心跳超时检查任务
    pub fn start_heartbeat_monitor(self, timeout_secs: u64, check_interval_secs: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs));

            loop {
                interval.tick().await;

                let removed = self.cleanup_timeout_sessions(timeout_secs).await;
                if !removed.is_empty() {
                    warn!("心跳监控: 清理了 {} 个超时 Manager", removed.len());
                }
            }
        });
    }
}

impl Default for ManagerBus {
    fn default() -> Self {
        Self::new()
    }
}

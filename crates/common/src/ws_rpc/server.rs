/// WebSocket RPC 服务端辅助工具

use super::{RpcMessage, RpcError, RpcErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 异步 RPC 方法处理器类型
pub type RpcHandler = Arc<
    dyn Fn(
            serde_json::Value,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<serde_json::Value, RpcError>> + Send>,
        > + Send
        + Sync,
>;

/// RPC 方法路由器
///
/// 消息总线两端都用它把方法名分发到对应的处理器
pub struct RpcRouter {
    handlers: Arc<RwLock<HashMap<String, RpcHandler>>>,
}

impl RpcRouter {
    /// 创建新的路由器
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 注册方法处理器
    pub async fn register<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<serde_json::Value, RpcError>> + Send + 'static,
    {
        let mut handlers = self.handlers.write().await;
        let handler = Arc::new(move |payload: serde_json::Value| {
            Box::pin(handler(payload))
                as std::pin::Pin<
                    Box<
                        dyn std::future::Future<Output = Result<serde_json::Value, RpcError>>
                            + Send,
                    >,
                >
        });
        handlers.insert(method.into(), handler);
    }

    /// 处理 RPC 请求
    pub async fn handle_request(&self, msg: RpcMessage) -> RpcMessage {
        let method = match &msg.method {
            Some(m) => m,
            None => {
                return RpcMessage::error_response(
                    msg.id,
                    RpcErrorCode::InvalidRequest.as_str(),
                    "缺少方法名",
                    None,
                );
            }
        };

        let payload = msg.payload.clone().unwrap_or(serde_json::Value::Null);

        info!("📨 [收到RPC请求] method={}, id={}", method, msg.id);

        let handler = {
            let handlers = self.handlers.read().await;
            handlers.get(method).cloned()
        };

        match handler {
            Some(handler) => match handler(payload).await {
                Ok(result) => {
                    debug!("✅ [RPC处理成功] method={}, id={}", method, msg.id);
                    RpcMessage::response(msg.id, result)
                }
                Err(err) => {
                    warn!(
                        "❌ [RPC处理失败] method={}, id={}, code={}, error={}",
                        method,
                        msg.id,
                        err.code.as_str(),
                        err.message
                    );
                    RpcMessage::error_response(
                        msg.id,
                        err.code.as_str(),
                        err.message,
                        err.details,
                    )
                }
            },
            None => RpcMessage::error_response(
                msg.id,
                RpcErrorCode::MethodNotFound.as_str(),
                format!("方法不存在: {}", method),
                None,
            ),
        }
    }

    /// 获取已注册的方法列表
    pub async fn list_methods(&self) -> Vec<String> {
        let handlers = self.handlers.read().await;
        let mut methods: Vec<String> = handlers.keys().cloned().collect();
        methods.sort();
        methods
    }
}

impl Default for RpcRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RpcRouter {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_dispatch() {
        let router = RpcRouter::new();

        router
            .register("echo", |payload| async move { Ok(json!({"echo": payload})) })
            .await;

        let req = RpcMessage::request("echo", json!({"hello": "world"}));
        let resp = router.handle_request(req).await;

        assert!(resp.is_success());
        assert_eq!(resp.payload.unwrap()["echo"]["hello"], "world");
    }

    #[tokio::test]
    async fn test_handler_error() {
        let router = RpcRouter::new();

        router
            .register("fail", |_| async move {
                Err(RpcError::new(RpcErrorCode::VlanNotFound, "子接口不存在"))
            })
            .await;

        let req = RpcMessage::request("fail", json!({}));
        let resp = router.handle_request(req).await;

        assert!(resp.is_error());
        assert_eq!(resp.error.unwrap().code, "VLAN_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let router = RpcRouter::new();
        let req = RpcMessage::request("unknown", json!({}));
        let resp = router.handle_request(req).await;

        assert!(resp.is_error());
        assert_eq!(
            resp.error.unwrap().code,
            RpcErrorCode::MethodNotFound.as_str()
        );
    }
}

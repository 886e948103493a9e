/// WebSocket 客户端
///
/// Manager 连接到 Server 总线端点，注册后收发 RPC；
/// 断线后固定间隔自动重连

use common::ws_rpc::{MessageType, RegisterRequest, RpcMessage, RpcRouter};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use common::ws_rpc::client::codec as ws_codec;

/// WebSocket 客户端
#[derive(Clone)]
pub struct WsClient {
    /// Server 总线地址
    server_url: String,

    /// 本 Manager 的注册信息
    register: RegisterRequest,

    /// RPC 方法路由器
    router: RpcRouter,

    /// 重连间隔（秒）
    reconnect_interval: u64,

    /// 心跳间隔（秒）
    heartbeat_interval: u64,
}

impl WsClient {
    pub fn new(
        server_url: impl Into<String>,
        register: RegisterRequest,
        router: RpcRouter,
        heartbeat_interval: u64,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            register,
            router,
            reconnect_interval: 5,
            heartbeat_interval,
        }
    }

    /// 启动客户端（连接并保持，断开后自动重连）
    pub async fn run(&self) {
        loop {
            info!("尝试连接到 Server: {}", self.server_url);

            match self.connect_and_run().await {
                Ok(()) => info!("连接正常关闭"),
                Err(e) => error!("连接错误: {}", e),
            }

            warn!("{}秒后重新连接...", self.reconnect_interval);
            tokio::time::sleep(Duration::from_secs(self.reconnect_interval)).await;
        }
    }

    async fn connect_and_run(&self) -> anyhow::Result<()> {
        let (ws_stream, _) = connect_async(&self.server_url).await?;
        info!("✅ WebSocket 连接成功");

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<RpcMessage>();

        // 发送注册请求并等待响应
        let register_msg =
            RpcMessage::request("register", serde_json::to_value(&self.register)?);
        ws_sender
            .send(ws_codec::encode(&register_msg).map_err(|e| anyhow::anyhow!("{}", e))?)
            .await?;
        debug!("已发送注册请求");

        match ws_receiver.next().await {
            Some(Ok(msg)) => {
                let rpc_msg =
                    ws_codec::decode(msg).map_err(|e| anyhow::anyhow!("{}", e))?;
                if !rpc_msg.is_success() {
                    anyhow::bail!("注册失败");
                }
                info!("✅ 注册成功: manager_id={}", self.register.manager_id);
            }
            _ => anyhow::bail!("等待注册响应时连接关闭"),
        }

        // 心跳任务
        let tx_heartbeat = tx.clone();
        let manager_id = self.register.manager_id.clone();
        let heartbeat_interval = self.heartbeat_interval;
        let heartbeat_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(heartbeat_interval));
            loop {
                interval.tick().await;
                let msg = RpcMessage::notification(
                    "heartbeat",
                    serde_json::json!({
                        "manager_id": manager_id,
                        "timestamp": chrono::Utc::now().timestamp(),
                    }),
                );
                if tx_heartbeat.send(msg).is_err() {
                    break;
                }
                debug!("发送心跳");
            }
        });

        // 发送任务
        let send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let ws_msg = match ws_codec::encode(&msg) {
                    Ok(m) => m,
                    Err(e) => {
                        error!("序列化消息失败: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(ws_msg).await {
                    error!("发送消息失败: {}", e);
                    break;
                }
            }
            debug!("发送任务结束");
        });

        // 接收任务：请求走路由器，通知就地处理
        let router = self.router.clone();
        let tx_recv = tx.clone();
        let recv_task = tokio::spawn(async move {
            while let Some(result) = ws_receiver.next().await {
                let msg = match result {
                    Ok(msg) => msg,
                    Err(e) => {
                        error!("接收消息错误: {}", e);
                        break;
                    }
                };
                if matches!(msg, Message::Close(_)) {
                    break;
                }
                let rpc_msg = match ws_codec::decode(msg) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("解析消息失败: {}", e);
                        continue;
                    }
                };

                match rpc_msg.message_type {
                    MessageType::Request => {
                        let router = router.clone();
                        let tx = tx_recv.clone();
                        tokio::spawn(async move {
                            let response = router.handle_request(rpc_msg).await;
                            let _ = tx.send(response);
                        });
                    }
                    MessageType::Notification => {
                        debug!(
                            "收到通知: method={:?}，留给周期任务统一对账",
                            rpc_msg.method
                        );
                    }
                    MessageType::Response => {
                        debug!("收到响应消息: {}", rpc_msg.id);
                    }
                }
            }
            debug!("接收任务结束");
        });

        tokio::select! {
            _ = send_task => {}
            _ = recv_task => {}
        }

        heartbeat_task.abort();
        Ok(())
    }
}

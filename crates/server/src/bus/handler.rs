/// Manager WebSocket 连接处理器
///
/// 第一条消息必须是 register 请求，之后进入收发循环；
/// 连接断开即从注册表注销

use axum::extract::ws::{Message as AxumWsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use common::ws_rpc::{MessageType, RegisterRequest, RegisterResponse, RpcMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{ManagerBus, ManagerSession};
use crate::app_state::AppState;

/// WebSocket 升级处理器
pub async fn handle_manager_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let bus = state.manager_bus();
    ws.on_upgrade(move |socket| handle_manager_connection(socket, bus))
}

async fn handle_manager_connection(socket: WebSocket, bus: ManagerBus) {
    info!("新的 Manager WebSocket 连接");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<RpcMessage>();

    // 等待注册消息
    let register = match wait_for_registration(&mut ws_receiver).await {
        Ok(register) => register,
        Err(e) => {
            error!("Manager 注册失败: {}", e);
            let _ = ws_sender.close().await;
            return;
        }
    };

    let response = RpcMessage::response(
        "register",
        serde_json::to_value(RegisterResponse {
            success: true,
            message: "注册成功".to_string(),
        })
        .unwrap_or_default(),
    );
    if let Err(e) = send_message(&mut ws_sender, response).await {
        error!("发送注册响应失败: {}", e);
        return;
    }

    let manager_id = register.manager_id.clone();
    let session = bus
        .register(register.manager_id, register.site_name.clone(), tx.clone())
        .await;
    info!(
        "Manager 已连接并注册: manager_id={}, site={}, hostname={}",
        manager_id, register.site_name, register.hostname
    );

    // 发送任务
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = send_message(&mut ws_sender, msg).await {
                error!("发送消息失败: {}", e);
                break;
            }
        }
        debug!("消息发送任务结束");
    });

    // 接收任务
    let session_clone = session.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(msg) => {
                    if let Err(e) = handle_incoming_message(msg, &session_clone).await {
                        warn!("处理消息失败: {}", e);
                    }
                }
                Err(e) => {
                    error!("接收消息错误: {}", e);
                    break;
                }
            }
        }
        debug!("消息接收任务结束");
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    bus.unregister(&manager_id).await;
    info!("Manager 连接已关闭: {}", manager_id);
}

/// 等待并解析注册消息
async fn wait_for_registration(
    receiver: &mut futures_util::stream::SplitStream<WebSocket>,
) -> Result<RegisterRequest, String> {
    match tokio::time::timeout(std::time::Duration::from_secs(10), receiver.next()).await {
        Ok(Some(Ok(msg))) => {
            let rpc_msg = parse_websocket_message(msg)?;

            if rpc_msg.message_type != MessageType::Request {
                return Err("期望收到注册请求".to_string());
            }
            if rpc_msg.method.as_deref() != Some("register") {
                return Err(format!("期望 register 方法，收到: {:?}", rpc_msg.method));
            }

            let payload = rpc_msg.payload.ok_or("缺少注册信息")?;
            serde_json::from_value(payload).map_err(|e| format!("解析注册信息失败: {}", e))
        }
        Ok(Some(Err(e))) => Err(format!("接收注册消息错误: {}", e)),
        Ok(None) => Err("连接已关闭".to_string()),
        Err(_) => Err("等待注册消息超时".to_string()),
    }
}

/// 处理收到的消息
async fn handle_incoming_message(
    ws_msg: AxumWsMessage,
    session: &ManagerSession,
) -> Result<(), String> {
    let rpc_msg = parse_websocket_message(ws_msg)?;

    match rpc_msg.message_type {
        MessageType::Notification => {
            let method = rpc_msg.method.as_deref().ok_or("通知消息缺少方法名")?;
            match method {
                "heartbeat" => {
                    session.update_heartbeat().await;
                    debug!("收到心跳: manager_id={}", session.manager_id);
                }
                other => {
                    warn!("未知的通知方法: {}", other);
                }
            }
            Ok(())
        }
        MessageType::Request => {
            // Manager 主动发请求的场景还没有，直接回方法不存在
            let method = rpc_msg.method.clone().unwrap_or_default();
            let response = RpcMessage::error_response(
                rpc_msg.id,
                "METHOD_NOT_FOUND",
                format!("方法不存在: {}", method),
                None,
            );
            session
                .sender
                .send(response)
                .map_err(|_| "发送错误响应失败".to_string())?;
            Ok(())
        }
        MessageType::Response => {
            session.handle_response(rpc_msg).await;
            Ok(())
        }
    }
}

fn parse_websocket_message(ws_msg: AxumWsMessage) -> Result<RpcMessage, String> {
    match ws_msg {
        AxumWsMessage::Text(text) => {
            RpcMessage::from_json(&text).map_err(|e| format!("解析 JSON 失败: {}", e))
        }
        AxumWsMessage::Binary(data) => {
            let text =
                String::from_utf8(data).map_err(|e| format!("二进制转字符串失败: {}", e))?;
            RpcMessage::from_json(&text).map_err(|e| format!("解析 JSON 失败: {}", e))
        }
        AxumWsMessage::Close(_) => Err("连接关闭".to_string()),
        _ => Err("不支持的消息类型".to_string()),
    }
}

async fn send_message(
    sender: &mut futures_util::stream::SplitSink<WebSocket, AxumWsMessage>,
    msg: RpcMessage,
) -> Result<(), String> {
    let json = msg.to_json().map_err(|e| format!("序列化消息失败: {}", e))?;
    sender
        .send(AxumWsMessage::Text(json))
        .await
        .map_err(|e| format!("发送 WebSocket 消息失败: {}", e))?;
    Ok(())
}

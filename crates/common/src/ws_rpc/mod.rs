/// WebSocket RPC 模块
///
/// 提供基于 WebSocket 的双向 RPC 通信框架，
/// Server 与 Manager 之间的消息总线建立在这之上

pub mod message;
pub mod error;
pub mod types;
pub mod client;
pub mod server;

pub use client::WsRpcConnection;
pub use error::{RpcError, RpcErrorCode};
pub use message::{RpcMessage, MessageType};
pub use server::RpcRouter;
pub use types::*;

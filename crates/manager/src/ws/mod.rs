/// Manager 侧消息总线接入

mod client;
mod handler;

pub use client::WsClient;
pub use handler::build_router;

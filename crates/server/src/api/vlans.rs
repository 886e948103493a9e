/// 子接口（VLAN）接口
///
/// 变更落库后给站点 Manager 推一条总线通知；
/// Manager 不在线只记日志，不影响本次请求

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use common::ws_rpc::VlanChangedNotification;
use store::models::subinterface::{AllocVlanRequest, UpdateVlanRequest};

use super::{not_found, ApiError};
use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vlans))
        .route("/alloc", post(alloc_vlan))
        .route(
            "/:subinterface_id",
            get(get_vlan).put(update_vlan).delete(deleting_vlan),
        )
        .route("/:subinterface_id/free", post(free_vlan))
        .route("/:subinterface_id/netlevel", post(update_netlevel))
}

#[derive(Debug, Deserialize)]
struct VlanQuery {
    app_id: Option<String>,
}

async fn notify_vlan_changed(state: &AppState, subinterface_id: &str, op: &str) {
    let payload = serde_json::to_value(VlanChangedNotification {
        subinterface_id: subinterface_id.to_string(),
        op: op.to_string(),
    })
    .unwrap_or_default();
    if state.manager_bus.broadcast("vlan_changed", payload).await == 0 {
        warn!("没有在线的 Manager，vlan_changed 通知未送达");
    }
}

/// 列出子接口
async fn list_vlans(
    State(state): State<AppState>,
    Query(query): Query<VlanQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let vlans = state
        .store
        .list_subinterface(query.app_id.as_deref())
        .await?;
    Ok(Json(vlans))
}

/// 为应用分配子接口
async fn alloc_vlan(
    State(state): State<AppState>,
    Json(req): Json<AllocVlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subinterface_id = state.store.alloc_vlan(req).await?;
    notify_vlan_changed(&state, &subinterface_id, "alloc").await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "subinterface_id": subinterface_id })),
    ))
}

/// 取子接口
async fn get_vlan(
    State(state): State<AppState>,
    Path(subinterface_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vlan = state
        .store
        .get_subinterface(&subinterface_id)
        .await?
        .ok_or_else(|| not_found(format!("subinterface {}", subinterface_id)))?;
    Ok(Json(vlan))
}

/// 更新子接口
async fn update_vlan(
    State(state): State<AppState>,
    Path(subinterface_id): Path<String>,
    Json(req): Json<UpdateVlanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_vlan(&subinterface_id, req).await?;
    notify_vlan_changed(&state, &subinterface_id, "update").await;
    Ok(StatusCode::NO_CONTENT)
}

/// 标记子接口进入删除流程
async fn deleting_vlan(
    State(state): State<AppState>,
    Path(subinterface_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.deleting_vlan(&subinterface_id).await?;
    notify_vlan_changed(&state, &subinterface_id, "deleting").await;
    Ok(StatusCode::NO_CONTENT)
}

/// 释放子接口
async fn free_vlan(
    State(state): State<AppState>,
    Path(subinterface_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.free_vlan(&subinterface_id).await?;
    notify_vlan_changed(&state, &subinterface_id, "free").await;
    Ok(StatusCode::NO_CONTENT)
}

/// 重新推导主网段
async fn update_netlevel(
    State(state): State<AppState>,
    Path(subinterface_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_vlan_netlevel(&subinterface_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

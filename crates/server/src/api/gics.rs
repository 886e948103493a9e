/// GIC 接口

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

use common::ws_rpc::GicChangedNotification;
use store::models::gic::{AllocGicRequest, CreateGicDto, UpdateGicDto};
use store::models::gic_extension::{GicAppFilter, JoinAppGicRequest};

use super::{not_found, ApiError};
use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_gic))
        .route("/alloc", post(alloc_gic))
        .route("/join", post(join_app_gic))
        .route("/extensions", get(list_extensions))
        .route(
            "/extensions/:gicextension_id",
            get(get_extension)
                .put(update_extension)
                .delete(deleting_extension),
        )
        .route("/extensions/:gicextension_id/purge", post(purge_extension))
        .route("/:gic_id", get(get_gic).put(update_gic))
        .route("/:gic_id/free", post(free_gic))
}

#[derive(Debug, Deserialize)]
struct ExtensionQuery {
    gic_id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateExtensionBody {
    status: String,
}

async fn notify_gic_changed(state: &AppState, gic_id: &str, op: &str) {
    let payload = serde_json::to_value(GicChangedNotification {
        gic_id: gic_id.to_string(),
        op: op.to_string(),
    })
    .unwrap_or_default();
    if state.manager_bus.broadcast("gic_changed", payload).await == 0 {
        warn!("没有在线的 Manager，gic_changed 通知未送达");
    }
}

/// 预置 GIC 资源
async fn create_gic(
    State(state): State<AppState>,
    Json(dto): Json<CreateGicDto>,
) -> Result<impl IntoResponse, ApiError> {
    let gic_id = state.store.add_gic(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "gic_id": gic_id }))))
}

/// 租借 GIC
async fn alloc_gic(
    State(state): State<AppState>,
    Json(req): Json<AllocGicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gic_id = state.store.alloc_gic(req).await?;
    notify_gic_changed(&state, &gic_id, "alloc").await;
    Ok((StatusCode::CREATED, Json(json!({ "gic_id": gic_id }))))
}

/// 取 GIC
async fn get_gic(
    State(state): State<AppState>,
    Path(gic_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let gic = state
        .store
        .get_gic(&gic_id)
        .await?
        .ok_or_else(|| not_found(format!("gic {}", gic_id)))?;
    Ok(Json(gic))
}

/// 更新 GIC
async fn update_gic(
    State(state): State<AppState>,
    Path(gic_id): Path<String>,
    Json(dto): Json<UpdateGicDto>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_gic(&gic_id, dto).await?;
    notify_gic_changed(&state, &gic_id, "update").await;
    Ok(StatusCode::NO_CONTENT)
}

/// 归还 GIC
async fn free_gic(
    State(state): State<AppState>,
    Path(gic_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.free_gic(&gic_id).await?;
    notify_gic_changed(&state, &gic_id, "free").await;
    Ok(StatusCode::NO_CONTENT)
}

/// 把应用挂到 GIC 上
async fn join_app_gic(
    State(state): State<AppState>,
    Json(req): Json<JoinAppGicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gic_id = req.gic_id.clone();
    state.store.join_app_gic(req).await?;
    notify_gic_changed(&state, &gic_id, "join").await;
    Ok(StatusCode::CREATED)
}

/// 列出绑定记录
async fn list_extensions(
    State(state): State<AppState>,
    Query(query): Query<ExtensionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match (query.gic_id, query.status) {
        (Some(gic_id), _) => Some(GicAppFilter::GicId(gic_id)),
        (None, Some(status)) => Some(GicAppFilter::Status(status)),
        (None, None) => None,
    };
    let extensions = state.store.list_gic_app(filter).await?;
    Ok(Json(extensions))
}

/// 取绑定记录
async fn get_extension(
    State(state): State<AppState>,
    Path(gicextension_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ext = state
        .store
        .get_gicextension(&gicextension_id)
        .await?
        .ok_or_else(|| not_found(format!("gicextension {}", gicextension_id)))?;
    Ok(Json(ext))
}

/// 推进绑定记录状态
async fn update_extension(
    State(state): State<AppState>,
    Path(gicextension_id): Path<String>,
    Json(body): Json<UpdateExtensionBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .update_gicextension(&gicextension_id, &body.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 标记绑定记录进入删除流程
async fn deleting_extension(
    State(state): State<AppState>,
    Path(gicextension_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.deleting_gicextension(&gicextension_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 物理删除绑定记录（解绑完成后的收尾）
async fn purge_extension(
    State(state): State<AppState>,
    Path(gicextension_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_gicextension(&gicextension_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

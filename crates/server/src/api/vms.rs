/// 虚拟机接口

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use store::DbError;

use store::models::action::{ActionFilter, ActionStatus, AddActionRequest};
use store::models::vm::{AddVmRequest, DeletingVmDto, UpdateVmRequest, VmFilter};
use store::models::vm_network_info::{AddNicRequest, UpdateNicDto};

use super::{not_found, ApiError};
use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vms).post(create_vm))
        .route("/nics", get(list_nics))
        .route("/nics/:nic_id", put(update_nic).delete(delete_nic))
        .route("/actions", get(list_actions).post(create_action))
        .route("/actions/:action_id", put(update_action))
        .route(
            "/:vm_id",
            get(get_vm).put(update_vm).delete(deleting_vm),
        )
        .route("/:vm_id/nics", post(add_nic))
        .route("/:vm_id/wrap", post(wrap_update_vm))
}

#[derive(Debug, Deserialize)]
struct VmQuery {
    app_id: Option<String>,
    site_id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NicQuery {
    app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionQuery {
    action: Option<String>,
    status: Option<String>,
    app_id: Option<String>,
    vm_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateActionBody {
    status: ActionStatus,
}

#[derive(Debug, Deserialize)]
struct WrapBody {
    configure_step: String,
}

#[derive(Debug, Deserialize)]
struct AddNicBody {
    nic_id: String,
    subinterface_id: String,
    status: Option<String>,
    network_connect: String,
}

/// 列出虚拟机
async fn list_vms(
    State(state): State<AppState>,
    Query(query): Query<VmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match (query.app_id, query.site_id, query.status) {
        (Some(app_id), _, _) => Some(VmFilter::AppId(app_id)),
        (None, Some(site_id), Some(status)) => Some(VmFilter::SiteStatus { site_id, status }),
        (None, None, None) => None,
        _ => {
            return Err(ApiError::from(DbError::InvalidArgument(
                "site_id 与 status 必须成对出现".to_string(),
            )))
        }
    };
    let vms = state.store.list_vm(filter).await?;
    Ok(Json(vms))
}

/// 创建虚拟机（整棵从属对象树）
async fn create_vm(
    State(state): State<AppState>,
    Json(req): Json<AddVmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nics = state.store.add_vm(req).await?;
    Ok((StatusCode::CREATED, Json(nics)))
}

/// 取虚拟机详情
async fn get_vm(
    State(state): State<AppState>,
    Path(vm_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .store
        .get_vm(&vm_id)
        .await?
        .ok_or_else(|| not_found(format!("vm {}", vm_id)))?;
    Ok(Json(detail))
}

/// 更新虚拟机
async fn update_vm(
    State(state): State<AppState>,
    Path(vm_id): Path<String>,
    Json(req): Json<UpdateVmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_vm(&vm_id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 推进配置步骤并落实磁盘挂载
async fn wrap_update_vm(
    State(state): State<AppState>,
    Path(vm_id): Path<String>,
    Json(body): Json<WrapBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .wrap_update_vm(&vm_id, &body.configure_step)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 标记删除虚拟机
async fn deleting_vm(
    State(state): State<AppState>,
    Path(vm_id): Path<String>,
    Json(dto): Json<DeletingVmDto>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.deleting_vm(&vm_id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 列出网卡
async fn list_nics(
    State(state): State<AppState>,
    Query(query): Query<NicQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let nics = state.store.list_nic(query.app_id.as_deref()).await?;
    Ok(Json(nics))
}

/// 给虚拟机挂网卡
async fn add_nic(
    State(state): State<AppState>,
    Path(vm_id): Path<String>,
    Json(body): Json<AddNicBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .add_nic(AddNicRequest {
            nic_id: body.nic_id,
            vm_id,
            subinterface_id: body.subinterface_id,
            status: body.status,
            network_connect: body.network_connect,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

/// 更新网卡
async fn update_nic(
    State(state): State<AppState>,
    Path(nic_id): Path<String>,
    Json(dto): Json<UpdateNicDto>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_nic(&nic_id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 拔网卡
async fn delete_nic(
    State(state): State<AppState>,
    Path(nic_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_nic(&nic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 列出操作记录
async fn list_actions(
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = if let Some(action) = query.action {
        Some(ActionFilter::Action(action))
    } else if let Some(status) = query.status {
        Some(ActionFilter::Status(status))
    } else if let Some(app_id) = query.app_id {
        Some(ActionFilter::AppId(app_id))
    } else {
        query.vm_id.map(ActionFilter::VmId)
    };
    let actions = state.store.list_action(filter).await?;
    Ok(Json(actions))
}

/// 追加操作记录
async fn create_action(
    State(state): State<AppState>,
    Json(req): Json<AddActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.add_action(req).await?;
    Ok(StatusCode::CREATED)
}

/// 推进操作记录状态
async fn update_action(
    State(state): State<AppState>,
    Path(action_id): Path<String>,
    Json(body): Json<UpdateActionBody>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.update_action(&action_id, body.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

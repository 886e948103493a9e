/// 租户应用接口

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use store::models::app::CreateAppDto;

use super::{not_found, ApiError};
use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_apps).post(create_app))
        .route("/:app_id", get(get_app).delete(delete_app))
        .route("/:app_id/clusters", get(list_clusters_from_app))
        .route("/:app_id/site", get(get_site_from_app))
}

#[derive(Debug, Deserialize)]
struct AppQuery {
    customer_id: Option<String>,
}

/// 列出应用
async fn list_apps(
    State(state): State<AppState>,
    Query(query): Query<AppQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let apps = state.store.list_app(query.customer_id.as_deref()).await?;
    Ok(Json(apps))
}

/// 创建应用
async fn create_app(
    State(state): State<AppState>,
    Json(dto): Json<CreateAppDto>,
) -> Result<impl IntoResponse, ApiError> {
    let app_id = state.store.add_app(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "app_id": app_id }))))
}

/// 取应用
async fn get_app(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state
        .store
        .get_app(&app_id)
        .await?
        .ok_or_else(|| not_found(format!("app {}", app_id)))?;
    Ok(Json(app))
}

/// 删除应用（软删除）
async fn delete_app(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_app(&app_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 列出应用所在资源池的集群
async fn list_clusters_from_app(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clusters = state.store.list_clusters_from_app(&app_id).await?;
    Ok(Json(clusters))
}

/// 反查应用所在站点
async fn get_site_from_app(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let site = state
        .store
        .get_site_from_app(&app_id)
        .await?
        .ok_or_else(|| not_found(format!("app {} 的站点", app_id)))?;
    Ok(Json(site))
}

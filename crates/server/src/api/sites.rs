/// 站点拓扑接口

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use store::models::cluster::CreateClusterDto;
use store::models::datastore::CreateDatastoreDto;
use store::models::interface::CreateInterfaceDto;
use store::models::pod::CreatePodDto;
use store::models::route::CreateRouteDto;
use store::models::site::CreateSiteDto;
use store::models::subinterface::CreateSubinterfaceDto;

use super::{not_found, ApiError};
use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sites).post(create_site))
        .route("/:site_name", get(get_site))
        .route("/pods", get(list_pods).post(create_pod))
        .route("/clusters", get(list_clusters).post(create_cluster))
        .route("/datastores", get(list_datastores).post(create_datastore))
        .route("/routes", post(create_route))
        .route("/interfaces", post(create_interface))
        .route("/subinterfaces", post(create_subinterface))
}

#[derive(Debug, Deserialize)]
struct PodQuery {
    site_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClusterQuery {
    pod_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatastoreQuery {
    cluster_id: Option<String>,
}

/// 列出站点（带可用区）
async fn list_sites(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sites = state.store.list_zone().await?;
    Ok(Json(sites))
}

/// 创建站点
async fn create_site(
    State(state): State<AppState>,
    Json(dto): Json<CreateSiteDto>,
) -> Result<impl IntoResponse, ApiError> {
    let site_id = state.store.add_site(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "site_id": site_id }))))
}

/// 按名称取站点
async fn get_site(
    State(state): State<AppState>,
    Path(site_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let site = state
        .store
        .get_site(&site_name)
        .await?
        .ok_or_else(|| not_found(format!("site {}", site_name)))?;
    Ok(Json(site))
}

/// 列出资源池
async fn list_pods(
    State(state): State<AppState>,
    Query(query): Query<PodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pods = state.store.list_pod(query.site_id.as_deref()).await?;
    Ok(Json(pods))
}

/// 创建资源池
async fn create_pod(
    State(state): State<AppState>,
    Json(dto): Json<CreatePodDto>,
) -> Result<impl IntoResponse, ApiError> {
    let pod_id = state.store.add_pod(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "pod_id": pod_id }))))
}

/// 列出集群
async fn list_clusters(
    State(state): State<AppState>,
    Query(query): Query<ClusterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let clusters = state.store.list_cluster(query.pod_id.as_deref()).await?;
    Ok(Json(clusters))
}

/// 创建集群
async fn create_cluster(
    State(state): State<AppState>,
    Json(dto): Json<CreateClusterDto>,
) -> Result<impl IntoResponse, ApiError> {
    let cluster_id = state.store.add_cluster(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "cluster_id": cluster_id }))))
}

/// 列出数据存储
async fn list_datastores(
    State(state): State<AppState>,
    Query(query): Query<DatastoreQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let datastores = state
        .store
        .list_datastore(query.cluster_id.as_deref())
        .await?;
    Ok(Json(datastores))
}

/// 创建数据存储
async fn create_datastore(
    State(state): State<AppState>,
    Json(dto): Json<CreateDatastoreDto>,
) -> Result<impl IntoResponse, ApiError> {
    let datastore_id = state.store.add_datastore(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "datastore_id": datastore_id })),
    ))
}

/// 纳管路由设备
async fn create_route(
    State(state): State<AppState>,
    Json(dto): Json<CreateRouteDto>,
) -> Result<impl IntoResponse, ApiError> {
    let route_id = state.store.add_route(dto).await?;
    Ok((StatusCode::CREATED, Json(json!({ "route_id": route_id }))))
}

/// 登记物理接口
async fn create_interface(
    State(state): State<AppState>,
    Json(dto): Json<CreateInterfaceDto>,
) -> Result<impl IntoResponse, ApiError> {
    let interface_id = state.store.add_interface(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "interface_id": interface_id })),
    ))
}

/// 预置子接口资源
async fn create_subinterface(
    State(state): State<AppState>,
    Json(dto): Json<CreateSubinterfaceDto>,
) -> Result<impl IntoResponse, ApiError> {
    let subinterface_id = state.store.add_subinterface(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "subinterface_id": subinterface_id })),
    ))
}

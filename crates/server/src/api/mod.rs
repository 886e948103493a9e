/// REST 接口层
///
/// 控制器一律薄封装：解析请求 -> 调门面 -> 映射响应。
/// 非 2xx 响应统一包成 {"error_message": {...}} 信封

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use store::DbError;

use crate::app_state::AppState;

pub mod apps;
pub mod gics;
pub mod sites;
pub mod vlans;
pub mod vms;

/// 组装 /api 下的全部路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sites", sites::routes())
        .nest("/apps", apps::routes())
        .nest("/vlans", vlans::routes())
        .nest("/gics", gics::routes())
        .nest("/vms", vms::routes())
}

/// 错误信封里的结构化内容
#[derive(Debug, Serialize)]
struct ErrorMessage {
    code: String,
    message: String,
}

/// 统一错误响应信封
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error_message: ErrorMessage,
}

/// API 错误：存储层错误分类到 HTTP 状态码的唯一映射点
#[derive(Debug)]
pub struct ApiError(DbError);

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DbError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DbError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            DbError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DbError::UnknownVlan(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_VLAN"),
            DbError::NotAllowUpdate(_) => (StatusCode::METHOD_NOT_ALLOWED, "NOT_ALLOW_UPDATE"),
            DbError::NotAllowDelete(_) => (StatusCode::METHOD_NOT_ALLOWED, "NOT_ALLOW_DELETE"),
            DbError::VlanType(_) => (StatusCode::METHOD_NOT_ALLOWED, "VLAN_TYPE_ERROR"),
            DbError::InvalidGic(_) => (StatusCode::METHOD_NOT_ALLOWED, "INVALID_GIC"),
            DbError::DuplicateEntry { .. } => (StatusCode::CONFLICT, "DUPLICATE_ENTRY"),
            DbError::VlanAlreadyExist(_) => (StatusCode::CONFLICT, "VLAN_ALREADY_EXIST"),
            DbError::ResourceExhausted(_) => (StatusCode::CONFLICT, "RESOURCE_EXHAUSTED"),
            DbError::Deadlock => (StatusCode::SERVICE_UNAVAILABLE, "DEADLOCK"),
            DbError::Connection(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONNECTION_ERROR"),
            DbError::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        };

        let body = Json(ErrorEnvelope {
            error_message: ErrorMessage {
                code: code.to_string(),
                message: self.0.to_string(),
            },
        });

        (status, body).into_response()
    }
}

/// 单行资源缺失的统一 404
pub(crate) fn not_found(what: impl Into<String>) -> ApiError {
    ApiError(DbError::NotFound(what.into()))
}

/// RPC 方法处理器
///
/// Server 经总线下发的异步命令在这里落到数据层

use common::ws_rpc::{
    ApplyGicRequest, ApplyVlanRequest, ApplyVlanResponse, RpcError, RpcErrorCode, RpcRouter,
    VmActionRequest, VmActionResponse,
};
use serde_json::json;
use store::models::action::ActionStatus;
use store::models::gic_extension::GicExtensionStatus;
use store::models::subinterface::SubinterfaceStatus;
use store::{DbError, Store};
use tracing::info;

/// 存储层错误映射为总线错误；单行缺失用各方法自己的 not-found 码
fn to_rpc_error(not_found_code: RpcErrorCode) -> impl Fn(DbError) -> RpcError {
    move |err| match &err {
        DbError::NotFound(what) => RpcError::new(not_found_code.clone(), what.clone()),
        _ => RpcError::new(RpcErrorCode::DatabaseError, err.to_string()),
    }
}

/// 注册全部 RPC 方法
pub async fn build_router(store: Store) -> RpcRouter {
    let router = RpcRouter::new();

    // 连通性自检
    router
        .register("echo", |payload| async move { Ok(payload) })
        .await;

    // 子接口配置在设备上落地后，把状态扭转为 ok 并补推主网段
    let store_vlan = store.clone();
    router
        .register("apply_vlan", move |payload| {
            let store = store_vlan.clone();
            async move {
                let req: ApplyVlanRequest = serde_json::from_value(payload)
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                info!("下发子接口配置: {}", req.subinterface_id);

                store
                    .update_vlan_status(&req.subinterface_id, SubinterfaceStatus::Ok)
                    .await
                    .map_err(to_rpc_error(RpcErrorCode::VlanNotFound))?;
                store
                    .update_vlan_netlevel(&req.subinterface_id)
                    .await
                    .map_err(to_rpc_error(RpcErrorCode::VlanNotFound))?;

                Ok(serde_json::to_value(ApplyVlanResponse {
                    success: true,
                    message: format!("子接口 {} 已生效", req.subinterface_id),
                })
                .unwrap_or_default())
            }
        })
        .await;

    // GIC 绑定在设备上落地后，把绑定记录扭转为 ok
    let store_gic = store.clone();
    router
        .register("apply_gic", move |payload| {
            let store = store_gic.clone();
            async move {
                let req: ApplyGicRequest = serde_json::from_value(payload)
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                info!("下发 GIC 绑定: {}", req.gicextension_id);

                store
                    .update_gicextension(
                        &req.gicextension_id,
                        GicExtensionStatus::Ok.as_str(),
                    )
                    .await
                    .map_err(to_rpc_error(RpcErrorCode::GicNotFound))?;

                Ok(json!({ "success": true }))
            }
        })
        .await;

    // 虚拟机操作完成回执，推进操作记录
    let store_action = store.clone();
    router
        .register("vm_action", move |payload| {
            let store = store_action.clone();
            async move {
                let req: VmActionRequest = serde_json::from_value(payload)
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                info!(
                    "处理虚拟机操作: vm={}, action={}",
                    req.vm_id, req.action
                );

                store
                    .update_action(&req.action_id, ActionStatus::Done)
                    .await
                    .map_err(to_rpc_error(RpcErrorCode::ActionFailed))?;

                Ok(serde_json::to_value(VmActionResponse {
                    success: true,
                    message: format!("操作 {} 已完成", req.action),
                    action_id: req.action_id,
                })
                .unwrap_or_default())
            }
        })
        .await;

    router
}

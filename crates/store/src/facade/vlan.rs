/// 子接口（VLAN 资源）操作
///
/// 分配走"随机挑选 + 条件更新"的原子抢占，抢失败换一个候选重试，
/// 次数有界，绝不空转

use std::collections::HashMap;

use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, warn};

use super::{now, Store};
use crate::error::{translate_err, DbError, Result};
use crate::models::app;
use crate::models::interface;
use crate::models::network_ipv4::{self, IpStep, NetLevel, UpdateNetworkIpv4Dto};
use crate::models::network_ipv6;
use crate::models::subinterface::{
    self, AllocVlanRequest, SubinterfaceStatus, SubinterfaceView, SubnetOp, UpdateVlanRequest,
};
use crate::session::Session;

/// 单次分配中对候选子接口的最大抢占尝试次数
const VLAN_ALLOC_ATTEMPTS: usize = 8;

impl Store {
    /// 取子接口视图；行不存在或尚未分配时返回 None
    pub async fn get_subinterface(
        &self,
        subinterface_id: &str,
    ) -> Result<Option<SubinterfaceView>> {
        let Some(model) = subinterface::Entity::find_by_id(subinterface_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
        else {
            return Ok(None);
        };
        if model.app_id.is_none() || model.vlan_type.is_none() {
            return Ok(None);
        }
        let route_id = self.route_of_interface(model.interface_id.as_deref()).await?;
        Ok(Some(SubinterfaceView::assemble(model, route_id)))
    }

    /// 列出子接口：带 app_id 时列该应用名下的，不带时列全部已分配的
    pub async fn list_subinterface(
        &self,
        app_id: Option<&str>,
    ) -> Result<Vec<SubinterfaceView>> {
        let query = match app_id {
            Some(app_id) => {
                subinterface::Entity::find().filter(subinterface::Column::AppId.eq(app_id))
            }
            None => {
                subinterface::Entity::find().filter(subinterface::Column::AppId.is_not_null())
            }
        };
        let models = query.all(&self.db).await.map_err(translate_err)?;
        self.assemble_subinterface_views(models).await
    }

    /// 列出某路由设备下处于指定状态的子接口
    pub async fn list_subinterface_from_route(
        &self,
        route_id: &str,
        status: &str,
    ) -> Result<Vec<SubinterfaceView>> {
        let models = subinterface::Entity::find()
            .filter(subinterface::Column::Status.eq(status))
            .all(&self.db)
            .await
            .map_err(translate_err)?;
        let views = self.assemble_subinterface_views(models).await?;
        Ok(views
            .into_iter()
            .filter(|v| v.route_id.as_deref() == Some(route_id))
            .collect())
    }

    /// 为应用分配一个子接口
    ///
    /// 应用 -> 资源池 -> 该池第一个物理接口 -> 随机抢占一个空闲子接口。
    /// 抢占是 "UPDATE ... WHERE app_id IS NULL" 的条件更新，
    /// 影响行数为 0 说明被并发请求抢先，换候选重试；
    /// 没有空闲行或尝试耗尽时报 ResourceExhausted
    pub async fn alloc_vlan(&self, req: AllocVlanRequest) -> Result<String> {
        let session = Session::begin(&self.db).await?;

        let app = app::Entity::find_by_id(&req.app_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("app {}", req.app_id)))?;
        let pod_id = app
            .pod_id
            .ok_or_else(|| DbError::Validation(format!("app {} 未落在资源池", req.app_id)))?;

        // 遍历顺序按接口 ID 固定，保证选择可复现
        let iface = interface::Entity::find()
            .filter(interface::Column::PodId.eq(&pod_id))
            .order_by_asc(interface::Column::InterfaceId)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("pod {} 下没有物理接口", pod_id)))?;

        let mut candidates: Vec<String> = subinterface::Entity::find()
            .filter(subinterface::Column::InterfaceId.eq(&iface.interface_id))
            .filter(subinterface::Column::AppId.is_null())
            .all(session.conn())
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|s| s.subinterface_id)
            .collect();

        if candidates.is_empty() {
            return Err(DbError::ResourceExhausted(format!(
                "接口 {} 下已无空闲子接口",
                iface.interface_id
            )));
        }

        for _ in 0..VLAN_ALLOC_ATTEMPTS {
            let idx = {
                let mut rng = rand::thread_rng();
                rng.gen_range(0..candidates.len())
            };
            let picked = candidates.swap_remove(idx);

            let claimed = subinterface::Entity::update_many()
                .col_expr(subinterface::Column::AppId, Expr::value(Some(req.app_id.clone())))
                .col_expr(
                    subinterface::Column::VlanType,
                    Expr::value(Some(req.vlan_type.as_str().to_string())),
                )
                .col_expr(subinterface::Column::Qos, Expr::value(Some(req.qos)))
                .col_expr(
                    subinterface::Column::Status,
                    Expr::value(Some(req.status.as_str().to_string())),
                )
                .col_expr(subinterface::Column::AllocTime, Expr::value(Some(now())))
                .filter(subinterface::Column::SubinterfaceId.eq(&picked))
                .filter(subinterface::Column::AppId.is_null())
                .exec(session.conn())
                .await
                .map_err(translate_err)?;

            if claimed.rows_affected != 1 {
                // 并发方抢先占走了这一行
                debug!("子接口 {} 已被抢占，更换候选", picked);
                if candidates.is_empty() {
                    break;
                }
                continue;
            }

            if let Some(sub_net) = &req.sub_net {
                network_ipv4::ActiveModel {
                    network_num: Set(sub_net.network_num.clone()),
                    network_address: Set(sub_net.network_address.clone()),
                    level: Set(sub_net.level.as_str().to_string()),
                    step: Set(sub_net.step.as_str().to_string()),
                    subinterface_id: Set(Some(picked.clone())),
                    ..Default::default()
                }
                .insert(session.conn())
                .await
                .map_err(translate_err)?;
            }

            session.commit().await?;
            return Ok(picked);
        }

        Err(DbError::ResourceExhausted(format!(
            "接口 {} 上的子接口抢占连续失败",
            iface.interface_id
        )))
    }

    /// 更新子接口；仅当前状态为 ok 时允许
    ///
    /// sub_net 携带对 IPv4 网段的互斥子操作：Add 插入 adding 行，
    /// Delete 只做 deleting 标记，真正移除等网络侧变更落地后另行执行
    pub async fn update_vlan(
        &self,
        subinterface_id: &str,
        req: UpdateVlanRequest,
    ) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        let sub = subinterface::Entity::find_by_id(subinterface_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("subinterface {}", subinterface_id)))?;

        if sub.status.as_deref() != Some(SubinterfaceStatus::Ok.as_str()) {
            return Err(DbError::NotAllowUpdate(format!(
                "subinterface {} 状态不是 ok",
                subinterface_id
            )));
        }

        let mut active: subinterface::ActiveModel = sub.into();
        if let Some(qos) = req.qos {
            active.qos = Set(Some(qos));
        }
        if let Some(status) = req.status {
            active.status = Set(Some(status.as_str().to_string()));
        }
        active.update_time = Set(Some(now()));
        active.update(session.conn()).await.map_err(translate_err)?;

        match req.sub_net {
            None => {}
            Some(SubnetOp::Add {
                network_num,
                network_address,
                level,
            }) => {
                network_ipv4::ActiveModel {
                    network_num: Set(network_num),
                    network_address: Set(network_address),
                    level: Set(level.as_str().to_string()),
                    step: Set(IpStep::Adding.as_str().to_string()),
                    subinterface_id: Set(Some(subinterface_id.to_string())),
                    ..Default::default()
                }
                .insert(session.conn())
                .await
                .map_err(translate_err)?;
            }
            Some(SubnetOp::Delete { network_num }) => {
                network_ipv4::Entity::update_many()
                    .col_expr(
                        network_ipv4::Column::Step,
                        Expr::value(IpStep::Deleting.as_str()),
                    )
                    .filter(network_ipv4::Column::SubinterfaceId.eq(subinterface_id))
                    .filter(network_ipv4::Column::NetworkNum.eq(&network_num))
                    .exec(session.conn())
                    .await
                    .map_err(translate_err)?;
            }
        }

        session.commit().await
    }

    /// 子接口状态扭转
    ///
    /// 配置在网络设备上落地后由 Manager 调用，不受 ok 门控约束
    pub async fn update_vlan_status(
        &self,
        subinterface_id: &str,
        status: SubinterfaceStatus,
    ) -> Result<()> {
        let sub = subinterface::Entity::find_by_id(subinterface_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("subinterface {}", subinterface_id)))?;

        let mut active: subinterface::ActiveModel = sub.into();
        active.status = Set(Some(status.as_str().to_string()));
        active.update_time = Set(Some(now()));
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 标记子接口进入删除流程；只允许从 ok 进入 deleting
    pub async fn deleting_vlan(&self, subinterface_id: &str) -> Result<()> {
        let sub = subinterface::Entity::find_by_id(subinterface_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("subinterface {}", subinterface_id)))?;

        if sub.app_id.is_none() || sub.vlan_type.is_none() {
            return Err(DbError::NotFound(format!(
                "subinterface {} 未分配",
                subinterface_id
            )));
        }
        if sub.status.as_deref() != Some(SubinterfaceStatus::Ok.as_str()) {
            return Err(DbError::NotAllowDelete(format!(
                "subinterface {} 状态不是 ok",
                subinterface_id
            )));
        }

        let mut active: subinterface::ActiveModel = sub.into();
        active.status = Set(Some(SubinterfaceStatus::Deleting.as_str().to_string()));
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 释放子接口：清掉全部归属字段并级联删除 IPv4/IPv6 网段，回到空闲态
    pub async fn free_vlan(&self, subinterface_id: &str) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        subinterface::Entity::find_by_id(subinterface_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("subinterface {}", subinterface_id)))?;

        network_ipv4::Entity::delete_many()
            .filter(network_ipv4::Column::SubinterfaceId.eq(subinterface_id))
            .exec(session.conn())
            .await
            .map_err(translate_err)?;
        network_ipv6::Entity::delete_many()
            .filter(network_ipv6::Column::SubinterfaceId.eq(subinterface_id))
            .exec(session.conn())
            .await
            .map_err(translate_err)?;

        subinterface::Entity::update_many()
            .col_expr(subinterface::Column::VlanType, Expr::value(Option::<String>::None))
            .col_expr(
                subinterface::Column::AllocTime,
                Expr::value(Option::<sea_orm::entity::prelude::DateTimeWithTimeZone>::None),
            )
            .col_expr(subinterface::Column::Qos, Expr::value(Option::<i32>::None))
            .col_expr(subinterface::Column::AppId, Expr::value(Option::<String>::None))
            .col_expr(subinterface::Column::GicId, Expr::value(Option::<String>::None))
            .col_expr(subinterface::Column::Status, Expr::value(Option::<String>::None))
            .filter(subinterface::Column::SubinterfaceId.eq(subinterface_id))
            .exec(session.conn())
            .await
            .map_err(translate_err)?;

        session.commit().await
    }

    /// 重新推导主网段：有 primary 则不动，否则把最早创建的一条提为 primary
    ///
    /// 重复调用是幂等的
    pub async fn update_vlan_netlevel(&self, subinterface_id: &str) -> Result<()> {
        let ipv4s = network_ipv4::Entity::find()
            .filter(network_ipv4::Column::SubinterfaceId.eq(subinterface_id))
            .order_by_asc(network_ipv4::Column::Id)
            .all(&self.db)
            .await
            .map_err(translate_err)?;

        if ipv4s.is_empty() {
            return Ok(());
        }
        if ipv4s
            .iter()
            .any(|row| row.level == NetLevel::Primary.as_str())
        {
            return Ok(());
        }

        if let Some(first) = ipv4s.into_iter().next() {
            let id = first.id;
            let mut active: network_ipv4::ActiveModel = first.into();
            active.level = Set(NetLevel::Primary.as_str().to_string());
            active.update(&self.db).await.map_err(translate_err)?;
            debug!("子接口 {} 的网段 {} 提升为 primary", subinterface_id, id);
        }
        Ok(())
    }

    /// 更新单条 IPv4 网段
    pub async fn update_network_ipv4(&self, id: i32, dto: UpdateNetworkIpv4Dto) -> Result<()> {
        let row = network_ipv4::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("network_ipv4 {}", id)))?;

        let mut active: network_ipv4::ActiveModel = row.into();
        if let Some(network_num) = dto.network_num {
            active.network_num = Set(network_num);
        }
        if let Some(network_address) = dto.network_address {
            active.network_address = Set(network_address);
        }
        if let Some(level) = dto.level {
            active.level = Set(level.as_str().to_string());
        }
        if let Some(step) = dto.step {
            active.step = Set(step.as_str().to_string());
        }
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 物理删除单条 IPv4 网段（网络侧变更落地后的收尾）
    pub async fn delete_network_ipv4(&self, id: i32) -> Result<()> {
        network_ipv4::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("network_ipv4 {}", id)))?;

        network_ipv4::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(translate_err)?;
        Ok(())
    }

    /// 列出某子接口名下的全部 IPv4 网段，按创建顺序
    pub async fn list_network_ipv4(
        &self,
        subinterface_id: &str,
    ) -> Result<Vec<network_ipv4::Model>> {
        network_ipv4::Entity::find()
            .filter(network_ipv4::Column::SubinterfaceId.eq(subinterface_id))
            .order_by_asc(network_ipv4::Column::Id)
            .all(&self.db)
            .await
            .map_err(translate_err)
    }

    pub(super) async fn route_of_interface(
        &self,
        interface_id: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(interface_id) = interface_id else {
            return Ok(None);
        };
        let iface = interface::Entity::find_by_id(interface_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?;
        Ok(iface.and_then(|i| i.route_id))
    }

    pub(super) async fn assemble_subinterface_views(
        &self,
        models: Vec<subinterface::Model>,
    ) -> Result<Vec<SubinterfaceView>> {
        let interfaces: HashMap<String, Option<String>> = interface::Entity::find()
            .all(&self.db)
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|i| (i.interface_id, i.route_id))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| {
                let route_id = m
                    .interface_id
                    .as_ref()
                    .and_then(|id| interfaces.get(id).cloned())
                    .flatten();
                if route_id.is_none() {
                    warn!("子接口 {} 没有关联到路由设备", m.subinterface_id);
                }
                SubinterfaceView::assemble(m, route_id)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::app::CreateAppDto;
    use crate::models::interface::CreateInterfaceDto;
    use crate::models::pod::CreatePodDto;
    use crate::models::site::CreateSiteDto;
    use crate::models::subinterface::{CreateSubinterfaceDto, SubnetSpec, VlanType};
    use crate::test_util::mem_store;

    /// 站点 -> 资源池 -> 接口 -> n 个空闲子接口 -> 应用
    async fn seed_fabric(store: &Store, subinterfaces: usize) -> (String, Vec<String>) {
        let site_id = store
            .add_site(CreateSiteDto {
                site_name: "s1".to_string(),
                vcenter_ip: "10.0.0.2".to_string(),
                vcenter_port: 443,
                vcenter_username: "admin".to_string(),
                vcenter_password: "secret".to_string(),
                zone_id: None,
            })
            .await
            .unwrap();
        let pod_id = store
            .add_pod(CreatePodDto {
                pod_name: "p1".to_string(),
                total_cpu: 64,
                total_ram: 256,
                used_cpu: 0,
                used_ram: 0,
                site_id: Some(site_id.clone()),
            })
            .await
            .unwrap();
        let interface_id = store
            .add_interface(CreateInterfaceDto {
                interface_name: Some("ge-0/0/1".to_string()),
                pod_id: Some(pod_id.clone()),
                route_id: None,
            })
            .await
            .unwrap();

        let mut sub_ids = Vec::new();
        for i in 0..subinterfaces {
            let id = store
                .add_subinterface(CreateSubinterfaceDto {
                    subinterface_name: format!("ge-0/0/1.{}", 100 + i),
                    vlan_id: 100 + i as i32,
                    portgroup_name: format!("pg-{}", i),
                    interface_id: Some(interface_id.clone()),
                })
                .await
                .unwrap();
            sub_ids.push(id);
        }

        store
            .add_app(CreateAppDto {
                app_id: "a1".to_string(),
                customer_id: "cust-1".to_string(),
                zone_id: "z1".to_string(),
                site_id,
                pod_id: Some(pod_id),
                app_type: None,
                status: Some("ok".to_string()),
            })
            .await
            .unwrap();

        (interface_id, sub_ids)
    }

    fn alloc_req(app_id: &str) -> AllocVlanRequest {
        AllocVlanRequest {
            app_id: app_id.to_string(),
            vlan_type: VlanType::Public,
            qos: 10,
            status: SubinterfaceStatus::Processing,
            sub_net: None,
        }
    }

    #[tokio::test]
    async fn test_alloc_vlan_exclusive_until_exhausted() {
        let store = mem_store().await;
        let (_, sub_ids) = seed_fabric(&store, 2).await;

        store
            .add_app(CreateAppDto {
                app_id: "a2".to_string(),
                customer_id: "cust-2".to_string(),
                zone_id: "z1".to_string(),
                site_id: "s1".to_string(),
                pod_id: store.get_app("a1").await.unwrap().unwrap().pod_id,
                app_type: None,
                status: Some("ok".to_string()),
            })
            .await
            .unwrap();

        let first = store.alloc_vlan(alloc_req("a1")).await.unwrap();
        let second = store.alloc_vlan(alloc_req("a2")).await.unwrap();

        // 两次分配拿到的是两个不同的子接口
        assert_ne!(first, second);
        assert!(sub_ids.contains(&first));
        assert!(sub_ids.contains(&second));

        let err = store.alloc_vlan(alloc_req("a1")).await.unwrap_err();
        assert!(matches!(err, DbError::ResourceExhausted(_)));
    }

    #[tokio::test]
    async fn test_alloc_vlan_missing_app() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;
        let err = store.alloc_vlan(alloc_req("ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_alloc_vlan_attaches_subnet() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;

        let mut req = alloc_req("a1");
        req.sub_net = Some(SubnetSpec {
            network_num: "172.2.3.0/24".to_string(),
            network_address: "172.2.3.1/24".to_string(),
            level: NetLevel::Primary,
            step: IpStep::Adding,
        });
        let sub_id = store.alloc_vlan(req).await.unwrap();

        let nets = store.list_network_ipv4(&sub_id).await.unwrap();
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].network_num, "172.2.3.0/24");
        assert_eq!(nets[0].level, "primary");
    }

    #[tokio::test]
    async fn test_update_vlan_gated_by_status() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;
        let sub_id = store.alloc_vlan(alloc_req("a1")).await.unwrap();

        // 分配后状态是 processing，更新与删除都被拒绝
        let err = store
            .update_vlan(&sub_id, UpdateVlanRequest { qos: Some(20), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotAllowUpdate(_)));

        let err = store.deleting_vlan(&sub_id).await.unwrap_err();
        assert!(matches!(err, DbError::NotAllowDelete(_)));
    }

    #[tokio::test]
    async fn test_update_vlan_subnet_ops() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;
        let sub_id = store.alloc_vlan(alloc_req("a1")).await.unwrap();

        // 配置完成，进入 ok
        store
            .update_vlan_status(&sub_id, SubinterfaceStatus::Ok)
            .await
            .unwrap();

        store
            .update_vlan(
                &sub_id,
                UpdateVlanRequest {
                    qos: Some(15),
                    status: None,
                    sub_net: Some(SubnetOp::Add {
                        network_num: "172.3.2.0/24".to_string(),
                        network_address: "172.3.2.1/24".to_string(),
                        level: NetLevel::Secondary,
                    }),
                },
            )
            .await
            .unwrap();

        let nets = store.list_network_ipv4(&sub_id).await.unwrap();
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].step, "adding");

        store
            .update_vlan(
                &sub_id,
                UpdateVlanRequest {
                    qos: None,
                    status: None,
                    sub_net: Some(SubnetOp::Delete {
                        network_num: "172.3.2.0/24".to_string(),
                    }),
                },
            )
            .await
            .unwrap();

        let nets = store.list_network_ipv4(&sub_id).await.unwrap();
        assert_eq!(nets[0].step, "deleting");

        let view = store.get_subinterface(&sub_id).await.unwrap().unwrap();
        assert_eq!(view.qos, Some(15));
    }

    #[tokio::test]
    async fn test_deleting_vlan_from_ok() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;
        let sub_id = store.alloc_vlan(alloc_req("a1")).await.unwrap();
        store
            .update_vlan_status(&sub_id, SubinterfaceStatus::Ok)
            .await
            .unwrap();

        store.deleting_vlan(&sub_id).await.unwrap();
        let view = store.get_subinterface(&sub_id).await.unwrap().unwrap();
        assert_eq!(view.status.as_deref(), Some("deleting"));

        // deleting 状态下不允许再次标记
        let err = store.deleting_vlan(&sub_id).await.unwrap_err();
        assert!(matches!(err, DbError::NotAllowDelete(_)));
    }

    #[tokio::test]
    async fn test_free_vlan_resets_row() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;

        let mut req = alloc_req("a1");
        req.sub_net = Some(SubnetSpec {
            network_num: "172.2.3.0/24".to_string(),
            network_address: "172.2.3.1/24".to_string(),
            level: NetLevel::Primary,
            step: IpStep::Ok,
        });
        let sub_id = store.alloc_vlan(req).await.unwrap();
        store
            .update_vlan_status(&sub_id, SubinterfaceStatus::Ok)
            .await
            .unwrap();
        store
            .update_vlan(
                &sub_id,
                UpdateVlanRequest {
                    qos: None,
                    status: None,
                    sub_net: Some(SubnetOp::Add {
                        network_num: "172.3.2.0/24".to_string(),
                        network_address: "172.3.2.1/24".to_string(),
                        level: NetLevel::Secondary,
                    }),
                },
            )
            .await
            .unwrap();

        store.free_vlan(&sub_id).await.unwrap();

        // 释放后归属字段清空、网段清零，get_subinterface 视作未分配
        assert!(store.get_subinterface(&sub_id).await.unwrap().is_none());
        assert!(store.list_network_ipv4(&sub_id).await.unwrap().is_empty());

        let raw = subinterface::Entity::find_by_id(&sub_id)
            .one(store.conn())
            .await
            .unwrap()
            .unwrap();
        assert!(raw.app_id.is_none());
        assert!(raw.vlan_type.is_none());
        assert!(raw.status.is_none());
        assert!(raw.qos.is_none());

        // 回到空闲池，可再次分配
        let again = store.alloc_vlan(alloc_req("a1")).await.unwrap();
        assert_eq!(again, sub_id);
    }

    #[tokio::test]
    async fn test_update_vlan_netlevel_idempotent() {
        let store = mem_store().await;
        seed_fabric(&store, 1).await;
        let sub_id = store.alloc_vlan(alloc_req("a1")).await.unwrap();
        store
            .update_vlan_status(&sub_id, SubinterfaceStatus::Ok)
            .await
            .unwrap();

        for num in ["172.3.1.0/24", "172.3.2.0/24"] {
            store
                .update_vlan(
                    &sub_id,
                    UpdateVlanRequest {
                        qos: None,
                        status: None,
                        sub_net: Some(SubnetOp::Add {
                            network_num: num.to_string(),
                            network_address: num.to_string(),
                            level: NetLevel::Secondary,
                        }),
                    },
                )
                .await
                .unwrap();
        }

        store.update_vlan_netlevel(&sub_id).await.unwrap();
        let nets = store.list_network_ipv4(&sub_id).await.unwrap();
        assert_eq!(nets[0].level, "primary");
        assert_eq!(nets[1].level, "secondary");

        // 再跑一次结果不变
        store.update_vlan_netlevel(&sub_id).await.unwrap();
        let nets2 = store.list_network_ipv4(&sub_id).await.unwrap();
        assert_eq!(nets2[0].level, "primary");
        assert_eq!(nets2[1].level, "secondary");
    }

    #[tokio::test]
    async fn test_list_subinterface_from_route() {
        let store = mem_store().await;
        let site_id = store
            .add_site(CreateSiteDto {
                site_name: "s1".to_string(),
                vcenter_ip: "10.0.0.2".to_string(),
                vcenter_port: 443,
                vcenter_username: "admin".to_string(),
                vcenter_password: "secret".to_string(),
                zone_id: None,
            })
            .await
            .unwrap();
        let pod_id = store
            .add_pod(CreatePodDto {
                pod_name: "p1".to_string(),
                total_cpu: 64,
                total_ram: 256,
                used_cpu: 0,
                used_ram: 0,
                site_id: Some(site_id.clone()),
            })
            .await
            .unwrap();
        let route_id = store
            .add_route(crate::models::route::CreateRouteDto {
                route_name: "r1".to_string(),
                producer: None,
                product_serial: None,
                username: "admin".to_string(),
                password: "secret".to_string(),
                ip: "10.0.0.254".to_string(),
                port: 8728,
                site_id: Some(site_id.clone()),
            })
            .await
            .unwrap();
        let interface_id = store
            .add_interface(CreateInterfaceDto {
                interface_name: Some("ge-0/0/1".to_string()),
                pod_id: Some(pod_id.clone()),
                route_id: Some(route_id.clone()),
            })
            .await
            .unwrap();
        store
            .add_subinterface(CreateSubinterfaceDto {
                subinterface_name: "ge-0/0/1.100".to_string(),
                vlan_id: 100,
                portgroup_name: "pg-0".to_string(),
                interface_id: Some(interface_id),
            })
            .await
            .unwrap();
        store
            .add_app(CreateAppDto {
                app_id: "a1".to_string(),
                customer_id: "cust-1".to_string(),
                zone_id: "z1".to_string(),
                site_id,
                pod_id: Some(pod_id),
                app_type: None,
                status: Some("ok".to_string()),
            })
            .await
            .unwrap();

        let sub_id = store.alloc_vlan(alloc_req("a1")).await.unwrap();

        let on_route = store
            .list_subinterface_from_route(&route_id, "processing")
            .await
            .unwrap();
        assert_eq!(on_route.len(), 1);
        assert_eq!(on_route[0].subinterface_id, sub_id);
        assert_eq!(on_route[0].route_id.as_deref(), Some(route_id.as_str()));

        // 其他路由设备名下为空，状态不匹配时也为空
        assert!(store
            .list_subinterface_from_route("ghost", "processing")
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .list_subinterface_from_route(&route_id, "ok")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_subinterface_default_allocated_only() {
        let store = mem_store().await;
        seed_fabric(&store, 2).await;
        store.alloc_vlan(alloc_req("a1")).await.unwrap();

        assert_eq!(store.list_subinterface(None).await.unwrap().len(), 1);
        assert_eq!(store.list_subinterface(Some("a1")).await.unwrap().len(), 1);
        assert!(store
            .list_subinterface(Some("ghost"))
            .await
            .unwrap()
            .is_empty());
    }
}

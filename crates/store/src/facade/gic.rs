/// GIC 租借与绑定操作

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::warn;

use super::{now, Store};
use crate::error::{translate_err, DbError, Result};
use crate::models::app;
use crate::models::gic::{self, AllocGicRequest, UpdateGicDto};
use crate::models::gic_extension::{
    self, GicAppFilter, GicAppView, GicExtensionStatus, JoinAppGicRequest, UpdatingGicView,
};
use crate::models::subinterface::{self, VlanType};
use crate::session::Session;

impl Store {
    /// 租借一个空闲 GIC
    ///
    /// 按 ID 顺序取第一个 customer_id 为空的行，用条件更新原子抢占；
    /// 没有空闲行时报 ResourceExhausted
    pub async fn alloc_gic(&self, req: AllocGicRequest) -> Result<String> {
        let free_ids: Vec<String> = gic::Entity::find()
            .filter(gic::Column::CustomerId.is_null())
            .order_by_asc(gic::Column::GicId)
            .all(&self.db)
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|g| g.gic_id)
            .collect();

        if free_ids.is_empty() {
            return Err(DbError::ResourceExhausted("已无空闲 GIC".to_string()));
        }

        for gic_id in free_ids {
            let claimed = gic::Entity::update_many()
                .col_expr(
                    gic::Column::CustomerId,
                    Expr::value(Some(req.customer_id.clone())),
                )
                .col_expr(gic::Column::Qos, Expr::value(Some(req.qos)))
                .col_expr(gic::Column::AllocTime, Expr::value(Some(now())))
                .filter(gic::Column::GicId.eq(&gic_id))
                .filter(gic::Column::CustomerId.is_null())
                .exec(&self.db)
                .await
                .map_err(translate_err)?;

            if claimed.rows_affected == 1 {
                return Ok(gic_id);
            }
            // 被并发请求抢先，顺延到下一个空闲行
        }

        Err(DbError::ResourceExhausted("空闲 GIC 已被抢占一空".to_string()))
    }

    /// 取 GIC，不存在时返回 None（用作存在性探测）
    pub async fn get_gic(&self, gic_id: &str) -> Result<Option<gic::Model>> {
        gic::Entity::find_by_id(gic_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 归还 GIC：清掉租借字段
    ///
    /// 名下的绑定记录不在这里收拾，由调用方走 deleting/delete_gicextension
    pub async fn free_gic(&self, gic_id: &str) -> Result<()> {
        let gic = gic::Entity::find_by_id(gic_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gic {}", gic_id)))?;

        let mut active: gic::ActiveModel = gic.into();
        active.alloc_time = Set(None);
        active.qos = Set(None);
        active.customer_id = Set(None);
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 更新 GIC 的 QoS / 状态
    pub async fn update_gic(&self, gic_id: &str, dto: UpdateGicDto) -> Result<()> {
        let gic = gic::Entity::find_by_id(gic_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gic {}", gic_id)))?;

        let mut active: gic::ActiveModel = gic.into();
        if let Some(qos) = dto.qos {
            active.qos = Set(Some(qos));
        }
        if let Some(status) = dto.status {
            active.status = Set(Some(status));
        }
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 把应用挂到已租出的 GIC 上
    ///
    /// 校验依次进行：应用存在、GIC 存在且已租出（否则 InvalidGic）、
    /// 子接口存在且类型为 gic（否则 VlanTypeError）；
    /// 全部通过后才写子接口的 gic_id 并插入绑定记录，单事务提交
    pub async fn join_app_gic(&self, req: JoinAppGicRequest) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        app::Entity::find_by_id(&req.app_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("app {}", req.app_id)))?;

        let gic = gic::Entity::find_by_id(&req.gic_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gic {}", req.gic_id)))?;
        if gic.customer_id.is_none() {
            return Err(DbError::InvalidGic(format!("gic {} 尚未租出", req.gic_id)));
        }

        let sub = subinterface::Entity::find_by_id(&req.subinterface_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| {
                DbError::NotFound(format!("subinterface {}", req.subinterface_id))
            })?;
        if sub.vlan_type.as_deref() != Some(VlanType::Gic.as_str()) {
            return Err(DbError::VlanType(format!(
                "subinterface {} 的类型不是 gic",
                req.subinterface_id
            )));
        }

        let mut active: subinterface::ActiveModel = sub.into();
        active.gic_id = Set(Some(req.gic_id.clone()));
        active.update(session.conn()).await.map_err(translate_err)?;

        gic_extension::ActiveModel {
            gicextension_id: Set(req.gicextension_id),
            app_id: Set(req.app_id),
            gic_id: Set(req.gic_id),
            subinterface_id: Set(req.subinterface_id),
            status: Set(req.status.as_str().to_string()),
            starttime: Set(Some(now())),
        }
        .insert(session.conn())
        .await
        .map_err(translate_err)?;

        session.commit().await
    }

    /// 取绑定记录，不存在时返回 None
    pub async fn get_gicextension(
        &self,
        gicextension_id: &str,
    ) -> Result<Option<gic_extension::Model>> {
        gic_extension::Entity::find_by_id(gicextension_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 列出绑定记录，可按 GIC 或状态过滤
    pub async fn list_gic_app(
        &self,
        filter: Option<GicAppFilter>,
    ) -> Result<Vec<gic_extension::Model>> {
        let query = match filter {
            None => gic_extension::Entity::find(),
            Some(GicAppFilter::GicId(gic_id)) => {
                gic_extension::Entity::find().filter(gic_extension::Column::GicId.eq(gic_id))
            }
            Some(GicAppFilter::Status(status)) => {
                gic_extension::Entity::find().filter(gic_extension::Column::Status.eq(status))
            }
        };
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 更新绑定记录状态
    pub async fn update_gicextension(&self, gicextension_id: &str, status: &str) -> Result<()> {
        let ext = gic_extension::Entity::find_by_id(gicextension_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gicextension {}", gicextension_id)))?;

        let mut active: gic_extension::ActiveModel = ext.into();
        active.status = Set(status.to_string());
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 标记绑定记录进入删除流程；只允许从 ok 进入 deleting
    pub async fn deleting_gicextension(&self, gicextension_id: &str) -> Result<()> {
        let ext = gic_extension::Entity::find_by_id(gicextension_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gicextension {}", gicextension_id)))?;

        if ext.status != GicExtensionStatus::Ok.as_str() {
            return Err(DbError::NotAllowDelete(format!(
                "gicextension {} 状态不是 ok",
                gicextension_id
            )));
        }

        let mut active: gic_extension::ActiveModel = ext.into();
        active.status = Set(GicExtensionStatus::Deleting.as_str().to_string());
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 物理删除绑定记录（网络侧解绑完成后的收尾）
    pub async fn delete_gicextension(&self, gicextension_id: &str) -> Result<()> {
        gic_extension::Entity::find_by_id(gicextension_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("gicextension {}", gicextension_id)))?;

        gic_extension::Entity::delete_by_id(gicextension_id)
            .exec(&self.db)
            .await
            .map_err(translate_err)?;
        Ok(())
    }

    /// 按路由设备汇总指定状态的绑定记录
    pub async fn list_gicextension_from_route(
        &self,
        route_id: &str,
        status: GicExtensionStatus,
    ) -> Result<Vec<GicAppView>> {
        let exts = gic_extension::Entity::find()
            .filter(gic_extension::Column::Status.eq(status.as_str()))
            .all(&self.db)
            .await
            .map_err(translate_err)?;

        let mut views = Vec::new();
        for ext in exts {
            let Some(sub) = self.get_subinterface(&ext.subinterface_id).await? else {
                continue;
            };
            if sub.route_id.as_deref() != Some(route_id) {
                continue;
            }
            let Some(gic) = self.get_gic(&ext.gic_id).await? else {
                warn!("绑定记录 {} 指向不存在的 gic {}", ext.gicextension_id, ext.gic_id);
                continue;
            };
            views.push(GicAppView {
                gicextension_id: ext.gicextension_id,
                sub_name: sub.subinterface_name,
                edge_name: gic.edge_name,
                group_name: gic.group_name,
            });
        }
        Ok(views)
    }

    /// 列出正在调整 QoS 的 GIC 及其落在某路由设备上的子接口
    pub async fn list_updating_gic_from_route(
        &self,
        route_id: &str,
    ) -> Result<Vec<UpdatingGicView>> {
        let gics = gic::Entity::find()
            .filter(gic::Column::Status.eq("updating"))
            .all(&self.db)
            .await
            .map_err(translate_err)?;

        let mut output = Vec::new();
        for gic in gics {
            let models = subinterface::Entity::find()
                .filter(subinterface::Column::GicId.eq(&gic.gic_id))
                .all(&self.db)
                .await
                .map_err(translate_err)?;
            if models.is_empty() {
                continue;
            }

            let mut locals = Vec::new();
            for view in self.assemble_subinterface_views(models).await? {
                if view.route_id.as_deref() != Some(route_id) {
                    continue;
                }
                if view.status.as_deref() != Some("ok") {
                    warn!(
                        "gic {} 调整 QoS 时子接口 {} 状态不是 ok",
                        gic.gic_id, view.subinterface_id
                    );
                    continue;
                }
                locals.push(view);
            }
            output.push(UpdatingGicView {
                gic_id: gic.gic_id,
                subinterfaces: locals,
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::app::CreateAppDto;
    use crate::models::gic::CreateGicDto;
    use crate::models::subinterface::{AllocVlanRequest, SubinterfaceStatus};
    use crate::models::interface::CreateInterfaceDto;
    use crate::models::pod::CreatePodDto;
    use crate::models::site::CreateSiteDto;
    use crate::models::subinterface::CreateSubinterfaceDto;
    use crate::test_util::mem_store;

    fn gic_dto(n: u32) -> CreateGicDto {
        CreateGicDto {
            group_name: format!("group-{}", n),
            core_name: "core-1".to_string(),
            edge_name: format!("edge-{}", n),
            evi_id: n as i32,
            edge_sid: (n * 10) as i32,
        }
    }

    async fn seed_gic_fabric(store: &Store) -> String {
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
        "a1".to_string()
    }

    #[tokio::test]
    async fn test_alloc_gic_until_exhausted() {
        let store = mem_store().await;
        let gic_id = store.add_gic(gic_dto(1)).await.unwrap();

        let leased = store
            .alloc_gic(AllocGicRequest {
                customer_id: "cust-1".to_string(),
                qos: 100,
            })
            .await
            .unwrap();
        assert_eq!(leased, gic_id);

        let gic = store.get_gic(&gic_id).await.unwrap().unwrap();
        assert_eq!(gic.customer_id.as_deref(), Some("cust-1"));
        assert_eq!(gic.qos, Some(100));
        assert!(gic.alloc_time.is_some());

        // 唯一一行已租出，再分配报资源耗尽
        let err = store
            .alloc_gic(AllocGicRequest {
                customer_id: "cust-2".to_string(),
                qos: 50,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ResourceExhausted(_)));
    }

    #[tokio::test]
    async fn test_free_gic_leaves_extensions() {
        let store = mem_store().await;
        let app_id = seed_gic_fabric(&store).await;
        let gic_id = store.add_gic(gic_dto(1)).await.unwrap();
        store
            .alloc_gic(AllocGicRequest {
                customer_id: "cust-1".to_string(),
                qos: 100,
            })
            .await
            .unwrap();

        let sub_id = store
            .alloc_vlan(AllocVlanRequest {
                app_id: app_id.clone(),
                vlan_type: VlanType::Gic,
                qos: 10,
                status: SubinterfaceStatus::Ok,
                sub_net: None,
            })
            .await
            .unwrap();

        store
            .join_app_gic(JoinAppGicRequest {
                gicextension_id: "ge-1".to_string(),
                app_id,
                gic_id: gic_id.clone(),
                subinterface_id: sub_id,
                status: GicExtensionStatus::Adding,
            })
            .await
            .unwrap();

        store.free_gic(&gic_id).await.unwrap();
        let gic = store.get_gic(&gic_id).await.unwrap().unwrap();
        assert!(gic.customer_id.is_none());
        assert!(gic.qos.is_none());

        // 归还不触碰绑定记录，由调用方另行回收
        assert!(store.get_gicextension("ge-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_join_app_gic_rejects_wrong_vlan_type() {
        let store = mem_store().await;
        let app_id = seed_gic_fabric(&store).await;
        let gic_id = store.add_gic(gic_dto(1)).await.unwrap();
        store
            .alloc_gic(AllocGicRequest {
                customer_id: "cust-1".to_string(),
                qos: 100,
            })
            .await
            .unwrap();

        // 子接口分配成 public 类型
        let sub_id = store
            .alloc_vlan(AllocVlanRequest {
                app_id: app_id.clone(),
                vlan_type: VlanType::Public,
                qos: 10,
                status: SubinterfaceStatus::Ok,
                sub_net: None,
            })
            .await
            .unwrap();

        let err = store
            .join_app_gic(JoinAppGicRequest {
                gicextension_id: "ge-1".to_string(),
                app_id,
                gic_id,
                subinterface_id: sub_id,
                status: GicExtensionStatus::Adding,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VlanType(_)));

        // 校验失败的事务没有留下绑定记录
        assert!(store.get_gicextension("ge-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_join_app_gic_rejects_unleased_gic() {
        let store = mem_store().await;
        let app_id = seed_gic_fabric(&store).await;
        let gic_id = store.add_gic(gic_dto(1)).await.unwrap();

        let err = store
            .join_app_gic(JoinAppGicRequest {
                gicextension_id: "ge-1".to_string(),
                app_id,
                gic_id,
                subinterface_id: "whatever".to_string(),
                status: GicExtensionStatus::Adding,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidGic(_)));
    }

    #[tokio::test]
    async fn test_gicextension_lifecycle() {
        let store = mem_store().await;
        let app_id = seed_gic_fabric(&store).await;
        let gic_id = store.add_gic(gic_dto(1)).await.unwrap();
        store
            .alloc_gic(AllocGicRequest {
                customer_id: "cust-1".to_string(),
                qos: 100,
            })
            .await
            .unwrap();
        let sub_id = store
            .alloc_vlan(AllocVlanRequest {
                app_id: app_id.clone(),
                vlan_type: VlanType::Gic,
                qos: 10,
                status: SubinterfaceStatus::Ok,
                sub_net: None,
            })
            .await
            .unwrap();
        store
            .join_app_gic(JoinAppGicRequest {
                gicextension_id: "ge-1".to_string(),
                app_id,
                gic_id: gic_id.clone(),
                subinterface_id: sub_id,
                status: GicExtensionStatus::Adding,
            })
            .await
            .unwrap();

        // adding 状态不允许直接进入删除流程
        let err = store.deleting_gicextension("ge-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotAllowDelete(_)));

        store.update_gicextension("ge-1", "ok").await.unwrap();
        store.deleting_gicextension("ge-1").await.unwrap();
        let ext = store.get_gicextension("ge-1").await.unwrap().unwrap();
        assert_eq!(ext.status, "deleting");

        assert_eq!(
            store
                .list_gic_app(Some(GicAppFilter::GicId(gic_id)))
                .await
                .unwrap()
                .len(),
            1
        );

        store.delete_gicextension("ge-1").await.unwrap();
        assert!(store.get_gicextension("ge-1").await.unwrap().is_none());
    }
}

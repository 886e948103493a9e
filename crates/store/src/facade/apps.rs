/// 租户应用操作

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::{now, Store};
use crate::error::{translate_err, DbError, Result};
use crate::models::app::{self, CreateAppDto};
use crate::models::cluster;
use crate::models::pod;
use crate::models::site;

impl Store {
    /// 列出应用，可按客户过滤
    pub async fn list_app(&self, customer_id: Option<&str>) -> Result<Vec<app::Model>> {
        let mut query = app::Entity::find();
        if let Some(customer_id) = customer_id {
            query = query.filter(app::Column::CustomerId.eq(customer_id));
        }
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 取应用，不存在时返回 None（用作存在性探测）
    pub async fn get_app(&self, app_id: &str) -> Result<Option<app::Model>> {
        app::Entity::find_by_id(app_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 新建应用
    pub async fn add_app(&self, dto: CreateAppDto) -> Result<String> {
        let app_id = dto.app_id.clone();
        app::ActiveModel {
            app_id: Set(dto.app_id),
            customer_id: Set(dto.customer_id),
            zone_id: Set(dto.zone_id),
            site_id: Set(dto.site_id),
            app_type: Set(dto.app_type),
            status: Set(dto.status),
            create_time: Set(Some(now())),
            pod_id: Set(dto.pod_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(app_id)
    }

    /// 删除应用（软删除：status 置 delete，名下资源由回收流程另行处理）
    pub async fn delete_app(&self, app_id: &str) -> Result<()> {
        let app = app::Entity::find_by_id(app_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("app {}", app_id)))?;

        let mut active: app::ActiveModel = app.into();
        active.status = Set(Some("delete".to_string()));
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 列出应用所在资源池下的全部集群
    pub async fn list_clusters_from_app(&self, app_id: &str) -> Result<Vec<cluster::Model>> {
        let app = app::Entity::find_by_id(app_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("app {}", app_id)))?;

        let Some(pod_id) = app.pod_id else {
            return Ok(Vec::new());
        };
        cluster::Entity::find()
            .filter(cluster::Column::PodId.eq(pod_id))
            .all(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 反查应用所在站点，链路断裂时返回 None
    pub async fn get_site_from_app(&self, app_id: &str) -> Result<Option<site::Model>> {
        let Some(app) = self.get_app(app_id).await? else {
            return Ok(None);
        };
        let Some(pod_id) = app.pod_id else {
            return Ok(None);
        };
        let Some(pod) = pod::Entity::find_by_id(pod_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
        else {
            return Ok(None);
        };
        let Some(site_id) = pod.site_id else {
            return Ok(None);
        };
        site::Entity::find_by_id(site_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::models::cluster::CreateClusterDto;
    use crate::models::pod::CreatePodDto;
    use crate::models::site::CreateSiteDto;
    use crate::test_util::mem_store;

    async fn seed_app(store: &Store, app_id: &str) -> (String, String) {
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
        store
            .add_app(CreateAppDto {
                app_id: app_id.to_string(),
                customer_id: "cust-1".to_string(),
                zone_id: "z1".to_string(),
                site_id: site_id.clone(),
                pod_id: Some(pod_id.clone()),
                app_type: Some("web".to_string()),
                status: Some("ok".to_string()),
            })
            .await
            .unwrap();
        (site_id, pod_id)
    }

    #[tokio::test]
    async fn test_app_lifecycle() {
        let store = mem_store().await;
        let (_, pod_id) = seed_app(&store, "a1").await;

        assert_eq!(store.list_app(None).await.unwrap().len(), 1);
        assert_eq!(store.list_app(Some("cust-1")).await.unwrap().len(), 1);
        assert!(store.list_app(Some("cust-2")).await.unwrap().is_empty());

        store
            .add_cluster(CreateClusterDto {
                cluster_name: "c1".to_string(),
                total_cpu: 8,
                total_ram: 32,
                used_cpu: 0,
                used_ram: 0,
                pod_id: Some(pod_id),
            })
            .await
            .unwrap();
        assert_eq!(store.list_clusters_from_app("a1").await.unwrap().len(), 1);

        let site = store.get_site_from_app("a1").await.unwrap();
        assert_eq!(site.unwrap().site_name, "s1");

        store.delete_app("a1").await.unwrap();
        let app = store.get_app("a1").await.unwrap().unwrap();
        assert_eq!(app.status.as_deref(), Some("delete"));
    }

    #[tokio::test]
    async fn test_delete_missing_app() {
        let store = mem_store().await;
        let err = store.delete_app("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_app_id_reports_columns() {
        let store = mem_store().await;
        seed_app(&store, "a1").await;

        let err = store
            .add_app(CreateAppDto {
                app_id: "a1".to_string(),
                customer_id: "cust-2".to_string(),
                zone_id: "z1".to_string(),
                site_id: "s1".to_string(),
                pod_id: None,
                app_type: None,
                status: None,
            })
            .await
            .unwrap_err();

        match err {
            DbError::DuplicateEntry { columns } => {
                assert_eq!(columns, vec!["app_id".to_string()]);
            }
            other => panic!("想要 DuplicateEntry，拿到 {:?}", other),
        }
    }
}

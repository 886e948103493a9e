/// 站点拓扑操作：可用区/站点/资源池/集群/数据存储，
/// 以及路由设备、物理接口、子接口、GIC 的资源预置

use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{now, Store};
use crate::error::{translate_err, Result};
use crate::models::cluster::{self, ClusterKey, ClusterView, CreateClusterDto};
use crate::models::datastore::{self, CreateDatastoreDto};
use crate::models::gic::{self, CreateGicDto};
use crate::models::interface::{self, CreateInterfaceDto};
use crate::models::pod::{self, CreatePodDto, PodView};
use crate::models::route::{self, CreateRouteDto};
use crate::models::site::{self, CreateSiteDto, SiteView};
use crate::models::subinterface::{self, CreateSubinterfaceDto};
use crate::models::zone;

impl Store {
    /// 新建可用区
    pub async fn add_zone(&self, zone_name: &str) -> Result<String> {
        let zone_id = Uuid::new_v4().to_string();
        zone::ActiveModel {
            zone_id: Set(zone_id.clone()),
            zone_name: Set(zone_name.to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(zone_id)
    }

    /// 列出全部站点及其所属可用区
    pub async fn list_zone(&self) -> Result<Vec<SiteView>> {
        let sites = site::Entity::find()
            .all(&self.db)
            .await
            .map_err(translate_err)?;
        let zones: HashMap<String, String> = zone::Entity::find()
            .all(&self.db)
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|z| (z.zone_id, z.zone_name))
            .collect();

        Ok(sites
            .into_iter()
            .map(|s| {
                let zone_name = s.zone_id.as_ref().and_then(|id| zones.get(id).cloned());
                SiteView {
                    site_id: s.site_id,
                    site_name: s.site_name,
                    zone_id: s.zone_id,
                    zone_name,
                }
            })
            .collect())
    }

    /// 新建站点
    pub async fn add_site(&self, dto: CreateSiteDto) -> Result<String> {
        let site_id = Uuid::new_v4().to_string();
        site::ActiveModel {
            site_id: Set(site_id.clone()),
            site_name: Set(dto.site_name),
            create_time: Set(Some(now())),
            vcenter_ip: Set(dto.vcenter_ip),
            vcenter_port: Set(dto.vcenter_port),
            vcenter_username: Set(dto.vcenter_username),
            vcenter_password: Set(dto.vcenter_password),
            zone_id: Set(dto.zone_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(site_id)
    }

    /// 按名称取站点，不存在时返回 None（用作存在性探测）
    pub async fn get_site(&self, name: &str) -> Result<Option<site::Model>> {
        site::Entity::find()
            .filter(site::Column::SiteName.eq(name))
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 列出资源池，可按站点过滤
    pub async fn list_pod(&self, site_id: Option<&str>) -> Result<Vec<PodView>> {
        let mut query = pod::Entity::find();
        if let Some(site_id) = site_id {
            query = query.filter(pod::Column::SiteId.eq(site_id));
        }
        let pods = query.all(&self.db).await.map_err(translate_err)?;

        let sites: HashMap<String, String> = site::Entity::find()
            .all(&self.db)
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|s| (s.site_id, s.site_name))
            .collect();

        Ok(pods
            .into_iter()
            .map(|p| {
                let site_name = p.site_id.as_ref().and_then(|id| sites.get(id).cloned());
                PodView {
                    pod_id: p.pod_id,
                    pod_name: p.pod_name,
                    total_cpu: p.total_cpu,
                    total_ram: p.total_ram,
                    used_cpu: p.used_cpu,
                    used_ram: p.used_ram,
                    site_id: p.site_id,
                    site_name,
                }
            })
            .collect())
    }

    /// 新建资源池
    pub async fn add_pod(&self, dto: CreatePodDto) -> Result<String> {
        let pod_id = Uuid::new_v4().to_string();
        pod::ActiveModel {
            pod_id: Set(pod_id.clone()),
            pod_name: Set(dto.pod_name),
            create_time: Set(Some(now())),
            total_cpu: Set(dto.total_cpu),
            total_ram: Set(dto.total_ram),
            used_cpu: Set(dto.used_cpu),
            used_ram: Set(dto.used_ram),
            site_id: Set(dto.site_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(pod_id)
    }

    /// 列出集群，可按资源池过滤
    pub async fn list_cluster(&self, pod_id: Option<&str>) -> Result<Vec<ClusterView>> {
        let mut query = cluster::Entity::find();
        if let Some(pod_id) = pod_id {
            query = query.filter(cluster::Column::PodId.eq(pod_id));
        }
        let clusters = query.all(&self.db).await.map_err(translate_err)?;

        let pods: HashMap<String, String> = pod::Entity::find()
            .all(&self.db)
            .await
            .map_err(translate_err)?
            .into_iter()
            .map(|p| (p.pod_id, p.pod_name))
            .collect();

        Ok(clusters.into_iter().map(|c| {
            let pod_name = c.pod_id.as_ref().and_then(|id| pods.get(id).cloned());
            ClusterView {
                cluster_id: c.cluster_id,
                cluster_name: c.cluster_name,
                total_cpu: c.total_cpu,
                total_ram: c.total_ram,
                used_cpu: c.used_cpu,
                used_ram: c.used_ram,
                pod_id: c.pod_id,
                pod_name,
            }
        })
        .collect())
    }

    /// 按 ID 或名称取集群，不存在时返回 None
    pub async fn get_cluster(&self, key: ClusterKey) -> Result<Option<cluster::Model>> {
        let query = match key {
            ClusterKey::Id(id) => {
                cluster::Entity::find().filter(cluster::Column::ClusterId.eq(id))
            }
            ClusterKey::Name(name) => {
                cluster::Entity::find().filter(cluster::Column::ClusterName.eq(name))
            }
        };
        query.one(&self.db).await.map_err(translate_err)
    }

    /// 新建集群
    pub async fn add_cluster(&self, dto: CreateClusterDto) -> Result<String> {
        let cluster_id = Uuid::new_v4().to_string();
        cluster::ActiveModel {
            cluster_id: Set(cluster_id.clone()),
            cluster_name: Set(dto.cluster_name),
            total_cpu: Set(dto.total_cpu),
            total_ram: Set(dto.total_ram),
            used_cpu: Set(dto.used_cpu),
            used_ram: Set(dto.used_ram),
            pod_id: Set(dto.pod_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(cluster_id)
    }

    /// 列出数据存储，可按集群过滤
    pub async fn list_datastore(
        &self,
        cluster_id: Option<&str>,
    ) -> Result<Vec<datastore::Model>> {
        let mut query = datastore::Entity::find();
        if let Some(cluster_id) = cluster_id {
            query = query.filter(datastore::Column::ClusterId.eq(cluster_id));
        }
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 新建数据存储
    pub async fn add_datastore(&self, dto: CreateDatastoreDto) -> Result<String> {
        let datastore_id = Uuid::new_v4().to_string();
        datastore::ActiveModel {
            datastore_id: Set(datastore_id.clone()),
            datastore_name: Set(dto.datastore_name),
            cluster_id: Set(dto.cluster_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(datastore_id)
    }

    /// 纳管路由设备
    pub async fn add_route(&self, dto: CreateRouteDto) -> Result<String> {
        let route_id = Uuid::new_v4().to_string();
        route::ActiveModel {
            route_id: Set(route_id.clone()),
            route_name: Set(dto.route_name),
            producer: Set(dto.producer),
            product_serial: Set(dto.product_serial),
            username: Set(dto.username),
            password: Set(dto.password),
            ip: Set(dto.ip),
            port: Set(dto.port),
            create_time: Set(Some(now())),
            site_id: Set(dto.site_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(route_id)
    }

    /// 新建物理接口
    pub async fn add_interface(&self, dto: CreateInterfaceDto) -> Result<String> {
        let interface_id = Uuid::new_v4().to_string();
        interface::ActiveModel {
            interface_id: Set(interface_id.clone()),
            interface_name: Set(dto.interface_name),
            pod_id: Set(dto.pod_id),
            route_id: Set(dto.route_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(interface_id)
    }

    /// 预置子接口资源（无归属，等待分配）
    pub async fn add_subinterface(&self, dto: CreateSubinterfaceDto) -> Result<String> {
        let subinterface_id = Uuid::new_v4().to_string();
        subinterface::ActiveModel {
            subinterface_id: Set(subinterface_id.clone()),
            subinterface_name: Set(dto.subinterface_name),
            vlan_id: Set(dto.vlan_id),
            portgroup_name: Set(dto.portgroup_name),
            interface_id: Set(dto.interface_id),
            vlan_type: Set(None),
            oid: Set(None),
            alloc_time: Set(None),
            update_time: Set(None),
            qos: Set(None),
            app_id: Set(None),
            gic_id: Set(None),
            status: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(subinterface_id)
    }

    /// 预置 GIC 资源（无租户，等待租借）
    pub async fn add_gic(&self, dto: CreateGicDto) -> Result<String> {
        let gic_id = Uuid::new_v4().to_string();
        gic::ActiveModel {
            gic_id: Set(gic_id.clone()),
            group_name: Set(dto.group_name),
            core_name: Set(dto.core_name),
            edge_name: Set(dto.edge_name),
            evi_id: Set(dto.evi_id),
            edge_sid: Set(dto.edge_sid),
            alloc_time: Set(None),
            qos: Set(None),
            status: Set(None),
            customer_id: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(gic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::mem_store;

    #[tokio::test]
    async fn test_topology_roundtrip() {
        let store = mem_store().await;

        let zone_id = store.add_zone("north").await.unwrap();
        let site_id = store
            .add_site(CreateSiteDto {
                site_name: "s1".to_string(),
                vcenter_ip: "10.0.0.2".to_string(),
                vcenter_port: 443,
                vcenter_username: "admin".to_string(),
                vcenter_password: "secret".to_string(),
                zone_id: Some(zone_id),
            })
            .await
            .unwrap();

        let sites = store.list_zone().await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].zone_name.as_deref(), Some("north"));

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

        let pods = store.list_pod(Some(&site_id)).await.unwrap();
        assert_eq!(pods.len(), 1);
        assert_eq!(pods[0].site_name.as_deref(), Some("s1"));

        let cluster_id = store
            .add_cluster(CreateClusterDto {
                cluster_name: "c1".to_string(),
                total_cpu: 32,
                total_ram: 128,
                used_cpu: 0,
                used_ram: 0,
                pod_id: Some(pod_id.clone()),
            })
            .await
            .unwrap();

        let found = store
            .get_cluster(ClusterKey::Name("c1".to_string()))
            .await
            .unwrap();
        assert_eq!(found.unwrap().cluster_id, cluster_id);

        // 其他资源池下没有集群
        assert!(store.list_cluster(Some("nope")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_site_missing_returns_none() {
        let store = mem_store().await;
        assert!(store.get_site("ghost").await.unwrap().is_none());
    }
}

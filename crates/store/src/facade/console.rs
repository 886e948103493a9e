/// 串口代理与串口连接操作

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::Store;
use crate::error::{translate_err, DbError, Result};
use crate::models::serial_connection::{self, AddSerialRequest, SerialFilter, UpdateSerialDto};
use crate::models::vspc_info::{self, CreateVspcDto, UpdateVspcDto, VspcFilter};

impl Store {
    /// 取串口代理，不存在时返回 None
    pub async fn get_vspc(&self, vspc_id: &str) -> Result<Option<vspc_info::Model>> {
        vspc_info::Entity::find_by_id(vspc_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 列出串口代理，可按站点或集群过滤
    pub async fn list_vspc(&self, filter: Option<VspcFilter>) -> Result<Vec<vspc_info::Model>> {
        let query = match filter {
            None => vspc_info::Entity::find(),
            Some(VspcFilter::SiteId(site_id)) => {
                vspc_info::Entity::find().filter(vspc_info::Column::SiteId.eq(site_id))
            }
            Some(VspcFilter::ClusterId(cluster_id)) => {
                vspc_info::Entity::find().filter(vspc_info::Column::ClusterId.eq(cluster_id))
            }
        };
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 登记串口代理服务
    pub async fn add_vspc(&self, dto: CreateVspcDto) -> Result<String> {
        let vspc_id = Uuid::new_v4().to_string();
        vspc_info::ActiveModel {
            vspc_id: Set(vspc_id.clone()),
            site_id: Set(dto.site_id),
            pod_id: Set(dto.pod_id),
            cluster_id: Set(dto.cluster_id),
            vspc_server_ip: Set(dto.vspc_server_ip),
            is_enable: Set(dto.is_enable),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(vspc_id)
    }

    /// 更新串口代理
    pub async fn update_vspc(&self, vspc_id: &str, dto: UpdateVspcDto) -> Result<()> {
        let vspc = vspc_info::Entity::find_by_id(vspc_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vspc {}", vspc_id)))?;

        let mut active: vspc_info::ActiveModel = vspc.into();
        if let Some(ip) = dto.vspc_server_ip {
            active.vspc_server_ip = Set(ip);
        }
        if let Some(is_enable) = dto.is_enable {
            active.is_enable = Set(is_enable);
        }
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 列出串口连接，可按虚拟机名/代理/站点/集群过滤
    pub async fn list_vm_from_serial(
        &self,
        filter: Option<SerialFilter>,
    ) -> Result<Vec<serial_connection::Model>> {
        let query = match filter {
            None => serial_connection::Entity::find(),
            Some(SerialFilter::VmName(vm_name)) => serial_connection::Entity::find()
                .filter(serial_connection::Column::VmName.eq(vm_name)),
            Some(SerialFilter::VspcId(vspc_id)) => serial_connection::Entity::find()
                .filter(serial_connection::Column::VspcId.eq(vspc_id)),
            Some(SerialFilter::SiteId(site_id)) => serial_connection::Entity::find()
                .filter(serial_connection::Column::SiteId.eq(site_id)),
            Some(SerialFilter::ClusterId(cluster_id)) => serial_connection::Entity::find()
                .filter(serial_connection::Column::ClusterId.eq(cluster_id)),
        };
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 登记虚拟机的串口连接
    pub async fn add_vm_serial_info(&self, req: AddSerialRequest) -> Result<()> {
        serial_connection::ActiveModel {
            connection_id: Set(req.connection_id),
            site_id: Set(req.site_id),
            pod_id: Set(req.pod_id),
            cluster_id: Set(req.cluster_id),
            vm_name: Set(req.vm_name),
            vspc_server_ip: Set(req.vspc_server_ip),
            port: Set(req.port),
            is_connected: Set(req.is_connected),
            vspc_id: Set(req.vspc_id),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(())
    }

    /// 更新虚拟机的串口连接
    pub async fn update_vm_serial(&self, vm_name: &str, dto: UpdateSerialDto) -> Result<()> {
        let conn = serial_connection::Entity::find()
            .filter(serial_connection::Column::VmName.eq(vm_name))
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {} 的串口连接", vm_name)))?;

        let mut active: serial_connection::ActiveModel = conn.into();
        if let Some(ip) = dto.vspc_server_ip {
            active.vspc_server_ip = Set(ip);
        }
        if let Some(port) = dto.port {
            active.port = Set(port);
        }
        if let Some(is_connected) = dto.is_connected {
            active.is_connected = Set(is_connected);
        }
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 删除虚拟机的串口连接
    pub async fn delete_vm_serial(&self, vm_name: &str) -> Result<()> {
        let conn = serial_connection::Entity::find()
            .filter(serial_connection::Column::VmName.eq(vm_name))
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {} 的串口连接", vm_name)))?;

        serial_connection::Entity::delete_by_id(conn.connection_id)
            .exec(&self.db)
            .await
            .map_err(translate_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::mem_store;

    #[tokio::test]
    async fn test_vspc_and_serial_roundtrip() {
        let store = mem_store().await;

        let vspc_id = store
            .add_vspc(CreateVspcDto {
                site_id: "s1".to_string(),
                pod_id: "p1".to_string(),
                cluster_id: "c1".to_string(),
                vspc_server_ip: "10.0.1.2".to_string(),
                is_enable: 1,
            })
            .await
            .unwrap();

        assert_eq!(
            store
                .list_vspc(Some(VspcFilter::SiteId("s1".to_string())))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(store
            .list_vspc(Some(VspcFilter::ClusterId("ghost".to_string())))
            .await
            .unwrap()
            .is_empty());

        store
            .update_vspc(
                &vspc_id,
                UpdateVspcDto {
                    vspc_server_ip: None,
                    is_enable: Some(0),
                },
            )
            .await
            .unwrap();
        assert_eq!(store.get_vspc(&vspc_id).await.unwrap().unwrap().is_enable, 0);

        store
            .add_vm_serial_info(AddSerialRequest {
                connection_id: "conn-1".to_string(),
                site_id: "s1".to_string(),
                pod_id: "p1".to_string(),
                cluster_id: "c1".to_string(),
                vm_name: "v1".to_string(),
                vspc_server_ip: "10.0.1.2".to_string(),
                port: 7001,
                is_connected: 0,
                vspc_id: Some(vspc_id.clone()),
            })
            .await
            .unwrap();

        store
            .update_vm_serial(
                "v1",
                UpdateSerialDto {
                    vspc_server_ip: None,
                    port: None,
                    is_connected: Some(1),
                },
            )
            .await
            .unwrap();
        let conns = store
            .list_vm_from_serial(Some(SerialFilter::VmName("v1".to_string())))
            .await
            .unwrap();
        assert_eq!(conns[0].is_connected, 1);

        store.delete_vm_serial("v1").await.unwrap();
        let err = store.delete_vm_serial("v1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}

/// 虚拟机与操作记录
///
/// add_vm 一次事务写入整棵从属对象树，任何子表失败整体回滚

use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use super::{now, Store};
use crate::error::{translate_err, DbError, Result};
use crate::models::action::{self, ActionFilter, ActionStatus, AddActionRequest};
use crate::models::disk;
use crate::models::flavor_info;
use crate::models::site;
use crate::models::subinterface;
use crate::models::vm::{
    self, AddVmRequest, DeletingVmDto, FlavorView, NicCreated, UpdateVmRequest, VmDetail,
    VmFilter, VmSiteFilter,
};
use crate::models::vm_ipv4;
use crate::models::vm_ipv6;
use crate::models::vm_network_info::{self, AddNicRequest, NicView, UpdateNicDto};
use crate::models::vm_os_info;
use crate::session::Session;

impl Store {
    /// 创建虚拟机：根记录 + 系统信息 + 规格/磁盘 + 网卡/地址，单事务
    ///
    /// 返回每块网卡 (subinterface_id, nic_id) 的对应关系，
    /// 供调用方把请求里的挂载项和落库的网卡对上号
    pub async fn add_vm(&self, req: AddVmRequest) -> Result<Vec<NicCreated>> {
        debug!("落库新虚拟机: {}", req.vm_name);
        let session = Session::begin(&self.db).await?;

        vm::ActiveModel {
            vm_id: Set(req.vm_id.clone()),
            vm_name: Set(req.vm_name),
            processing: Set(None),
            template_id: Set(req.template_id),
            customer_id: Set(req.customer_id),
            site_name: Set(req.site_name),
            pod_name: Set(req.pod_name),
            cluster_name: Set(req.cluster_name),
            datastore_name: Set(req.datastore_name),
            status: Set(req.status),
            create_time: Set(now()),
            update_time: Set(None),
            configure_step: Set(req.configure_step),
            app_id: Set(req.app_id),
        }
        .insert(session.conn())
        .await
        .map_err(translate_err)?;

        vm_os_info::ActiveModel {
            vm_os_id: Set(Uuid::new_v4().to_string()),
            hostname: Set(req.os_info.hostname),
            os_type: Set(req.os_info.os_type),
            os_version: Set(req.os_info.os_version),
            os_bit: Set(req.os_info.os_bit),
            username: Set(req.os_info.username),
            password: Set(req.os_info.password),
            vm_id: Set(Some(req.vm_id.clone())),
        }
        .insert(session.conn())
        .await
        .map_err(translate_err)?;

        let flavor_id = Uuid::new_v4().to_string();
        flavor_info::ActiveModel {
            flavor_id: Set(flavor_id.clone()),
            cpu: Set(req.flavor_info.cpu),
            ram: Set(req.flavor_info.ram),
            vm_id: Set(Some(req.vm_id.clone())),
        }
        .insert(session.conn())
        .await
        .map_err(translate_err)?;

        for d in &req.flavor_info.disks {
            disk::ActiveModel {
                size: Set(d.size),
                is_load: Set(d.is_load),
                flavor_id: Set(Some(flavor_id.clone())),
                ..Default::default()
            }
            .insert(session.conn())
            .await
            .map_err(translate_err)?;
        }

        let mut created = Vec::with_capacity(req.network_info.len());
        for net in req.network_info {
            // 挂载目标必须真实存在，缺失时让整棵树回滚
            subinterface::Entity::find_by_id(&net.subinterface_id)
                .one(session.conn())
                .await
                .map_err(translate_err)?
                .ok_or_else(|| {
                    DbError::NotFound(format!("subinterface {}", net.subinterface_id))
                })?;

            let nic_id = Uuid::new_v4().to_string();
            vm_network_info::ActiveModel {
                nic_id: Set(nic_id.clone()),
                subinterface_id: Set(net.subinterface_id.clone()),
                network_connect: Set(net.network_connect),
                mac: Set(net.mac),
                status: Set(net.status),
                vm_id: Set(Some(req.vm_id.clone())),
            }
            .insert(session.conn())
            .await
            .map_err(translate_err)?;

            if let Some(ipv4) = net.ipv4 {
                vm_ipv4::ActiveModel {
                    ip: Set(ipv4.ip),
                    mask: Set(ipv4.mask),
                    gateway: Set(ipv4.gateway),
                    dns: Set(ipv4.dns),
                    nic_id: Set(Some(nic_id.clone())),
                    ..Default::default()
                }
                .insert(session.conn())
                .await
                .map_err(translate_err)?;
            }
            if let Some(ipv6) = net.ipv6 {
                vm_ipv6::ActiveModel {
                    ip: Set(Some(ipv6.ip)),
                    nic_id: Set(Some(nic_id.clone())),
                    ..Default::default()
                }
                .insert(session.conn())
                .await
                .map_err(translate_err)?;
            }

            created.push(NicCreated {
                subinterface_id: net.subinterface_id,
                nic_id,
            });
        }

        session.commit().await?;
        Ok(created)
    }

    /// 取虚拟机详情，不存在时返回 None
    pub async fn get_vm(&self, vm_id: &str) -> Result<Option<VmDetail>> {
        let Some(vm) = vm::Entity::find_by_id(vm_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
        else {
            return Ok(None);
        };

        let os_info = vm_os_info::Entity::find()
            .filter(vm_os_info::Column::VmId.eq(vm_id))
            .one(&self.db)
            .await
            .map_err(translate_err)?;

        let flavor = match flavor_info::Entity::find()
            .filter(flavor_info::Column::VmId.eq(vm_id))
            .one(&self.db)
            .await
            .map_err(translate_err)?
        {
            Some(f) => {
                let disks = disk::Entity::find()
                    .filter(disk::Column::FlavorId.eq(&f.flavor_id))
                    .all(&self.db)
                    .await
                    .map_err(translate_err)?;
                Some(FlavorView {
                    flavor_id: f.flavor_id,
                    cpu: f.cpu,
                    ram: f.ram,
                    disks,
                })
            }
            None => None,
        };

        let nic_models = vm_network_info::Entity::find()
            .filter(vm_network_info::Column::VmId.eq(vm_id))
            .all(&self.db)
            .await
            .map_err(translate_err)?;
        let mut nics = Vec::with_capacity(nic_models.len());
        for nic in nic_models {
            nics.push(self.assemble_nic_view(nic).await?);
        }

        Ok(Some(VmDetail {
            vm,
            os_info,
            flavor,
            nics,
        }))
    }

    /// 列出虚拟机
    pub async fn list_vm(&self, filter: Option<VmFilter>) -> Result<Vec<vm::Model>> {
        match filter {
            None => vm::Entity::find().all(&self.db).await.map_err(translate_err),
            Some(VmFilter::AppId(app_id)) => vm::Entity::find()
                .filter(vm::Column::AppId.eq(app_id))
                .all(&self.db)
                .await
                .map_err(translate_err),
            Some(VmFilter::SiteStatus { site_id, status }) => {
                let site = site::Entity::find_by_id(&site_id)
                    .one(&self.db)
                    .await
                    .map_err(translate_err)?
                    .ok_or_else(|| DbError::NotFound(format!("site {}", site_id)))?;
                vm::Entity::find()
                    .filter(vm::Column::SiteName.eq(site.site_name))
                    .filter(vm::Column::Status.eq(status))
                    .all(&self.db)
                    .await
                    .map_err(translate_err)
            }
        }
    }

    /// 按站点列出虚拟机，status / configure_step 至少给一个
    pub async fn list_vm_from_site(
        &self,
        site_name: &str,
        filter: VmSiteFilter,
    ) -> Result<Vec<vm::Model>> {
        if filter.status.is_none() && filter.configure_step.is_none() {
            return Err(DbError::InvalidArgument(
                "list_vm_from_site 需要 status 或 configure_step".to_string(),
            ));
        }
        let mut query = vm::Entity::find().filter(vm::Column::SiteName.eq(site_name));
        if let Some(status) = filter.status {
            query = query.filter(vm::Column::Status.eq(status));
        }
        if let Some(step) = filter.configure_step {
            query = query.filter(vm::Column::ConfigureStep.eq(step));
        }
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 列出站点内配置流程已走完的虚拟机（configure_step 为 end 或 deleted）
    pub async fn list_vming_from_site(&self, site_name: &str) -> Result<Vec<vm::Model>> {
        vm::Entity::find()
            .filter(vm::Column::SiteName.eq(site_name))
            .filter(
                Condition::any()
                    .add(vm::Column::ConfigureStep.eq("end"))
                    .add(vm::Column::ConfigureStep.eq("deleted")),
            )
            .all(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 更新虚拟机：规格、状态、配置步骤、新增磁盘、回填网卡 MAC
    pub async fn update_vm(&self, vm_id: &str, req: UpdateVmRequest) -> Result<()> {
        if req.cpu.is_none()
            && req.ram.is_none()
            && req.status.is_none()
            && req.configure_step.is_none()
            && req.disks.is_empty()
            && req.network_info.is_empty()
        {
            return Err(DbError::InvalidArgument("update_vm 的请求为空".to_string()));
        }

        let session = Session::begin(&self.db).await?;

        let vm = vm::Entity::find_by_id(vm_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {}", vm_id)))?;

        let flavor = flavor_info::Entity::find()
            .filter(flavor_info::Column::VmId.eq(vm_id))
            .one(session.conn())
            .await
            .map_err(translate_err)?;

        if req.cpu.is_some() || req.ram.is_some() {
            let flavor = flavor
                .clone()
                .ok_or_else(|| DbError::NotFound(format!("vm {} 没有规格记录", vm_id)))?;
            let mut active: flavor_info::ActiveModel = flavor.into();
            if let Some(cpu) = req.cpu {
                active.cpu = Set(cpu);
            }
            if let Some(ram) = req.ram {
                active.ram = Set(ram);
            }
            active.update(session.conn()).await.map_err(translate_err)?;
        }

        if !req.disks.is_empty() {
            let flavor = flavor
                .ok_or_else(|| DbError::NotFound(format!("vm {} 没有规格记录", vm_id)))?;
            for d in &req.disks {
                disk::ActiveModel {
                    size: Set(d.size),
                    is_load: Set(d.is_load),
                    flavor_id: Set(Some(flavor.flavor_id.clone())),
                    ..Default::default()
                }
                .insert(session.conn())
                .await
                .map_err(translate_err)?;
            }
        }

        if !req.network_info.is_empty() {
            let nics = vm_network_info::Entity::find()
                .filter(vm_network_info::Column::VmId.eq(vm_id))
                .all(session.conn())
                .await
                .map_err(translate_err)?;
            for nic in nics {
                if let Some(mac) = req.network_info.get(&nic.subinterface_id) {
                    let mac = mac.clone();
                    let mut active: vm_network_info::ActiveModel = nic.into();
                    active.mac = Set(Some(mac));
                    active.update(session.conn()).await.map_err(translate_err)?;
                }
            }
        }

        let mut active: vm::ActiveModel = vm.into();
        if let Some(status) = req.status {
            active.status = Set(status);
        }
        if let Some(step) = req.configure_step {
            active.configure_step = Set(step);
        }
        active.update_time = Set(Some(now()));
        active.update(session.conn()).await.map_err(translate_err)?;

        session.commit().await
    }

    /// 推进配置步骤并把待挂载磁盘标记为已挂载
    pub async fn wrap_update_vm(&self, vm_id: &str, configure_step: &str) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        let vm = vm::Entity::find_by_id(vm_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {}", vm_id)))?;

        if let Some(flavor) = flavor_info::Entity::find()
            .filter(flavor_info::Column::VmId.eq(vm_id))
            .one(session.conn())
            .await
            .map_err(translate_err)?
        {
            let disks = disk::Entity::find()
                .filter(disk::Column::FlavorId.eq(&flavor.flavor_id))
                .filter(disk::Column::IsLoad.eq(0))
                .all(session.conn())
                .await
                .map_err(translate_err)?;
            for d in disks {
                let mut active: disk::ActiveModel = d.into();
                active.is_load = Set(1);
                active.update(session.conn()).await.map_err(translate_err)?;
            }
        }

        let mut active: vm::ActiveModel = vm.into();
        active.configure_step = Set(configure_step.to_string());
        active.update_time = Set(Some(now()));
        active.update(session.conn()).await.map_err(translate_err)?;

        session.commit().await
    }

    /// 标记删除虚拟机（软删除：只动 status / configure_step）
    pub async fn deleting_vm(&self, vm_id: &str, dto: DeletingVmDto) -> Result<()> {
        debug!("标记删除虚拟机: {}", vm_id);
        let vm = vm::Entity::find_by_id(vm_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {}", vm_id)))?;

        let mut active: vm::ActiveModel = vm.into();
        if let Some(status) = dto.status {
            active.status = Set(status);
        }
        if let Some(step) = dto.configure_step {
            active.configure_step = Set(step);
        }
        active.update_time = Set(Some(now()));
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    // ==================== 网卡 ====================

    /// 列出网卡，可按应用过滤（该应用名下所有虚拟机的网卡）
    pub async fn list_nic(&self, app_id: Option<&str>) -> Result<Vec<NicView>> {
        let nic_models = match app_id {
            None => vm_network_info::Entity::find()
                .all(&self.db)
                .await
                .map_err(translate_err)?,
            Some(app_id) => {
                let vm_ids: Vec<String> = vm::Entity::find()
                    .filter(vm::Column::AppId.eq(app_id))
                    .all(&self.db)
                    .await
                    .map_err(translate_err)?
                    .into_iter()
                    .map(|v| v.vm_id)
                    .collect();
                if vm_ids.is_empty() {
                    return Ok(Vec::new());
                }
                vm_network_info::Entity::find()
                    .filter(vm_network_info::Column::VmId.is_in(vm_ids))
                    .all(&self.db)
                    .await
                    .map_err(translate_err)?
            }
        };

        let mut views = Vec::with_capacity(nic_models.len());
        for nic in nic_models {
            views.push(self.assemble_nic_view(nic).await?);
        }
        Ok(views)
    }

    /// 列出站点内处于 adding / deleting 的网卡（等待网络侧处理）
    pub async fn list_nicing_from_site(&self, site_name: &str) -> Result<Vec<NicView>> {
        let nics = vm_network_info::Entity::find()
            .filter(
                Condition::any()
                    .add(vm_network_info::Column::Status.eq("adding"))
                    .add(vm_network_info::Column::Status.eq("deleting")),
            )
            .all(&self.db)
            .await
            .map_err(translate_err)?;

        let mut views = Vec::new();
        for nic in nics {
            let Some(vm_id) = nic.vm_id.as_deref() else {
                continue;
            };
            let Some(vm) = vm::Entity::find_by_id(vm_id)
                .one(&self.db)
                .await
                .map_err(translate_err)?
            else {
                continue;
            };
            if vm.site_name == site_name {
                views.push(self.assemble_nic_view(nic).await?);
            }
        }
        Ok(views)
    }

    /// 取网卡，不存在时返回 None
    pub async fn get_nic(&self, nic_id: &str) -> Result<Option<vm_network_info::Model>> {
        vm_network_info::Entity::find_by_id(nic_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 给虚拟机挂一块网卡
    ///
    /// 子接口必须已分配给该虚拟机所属的应用，且同一子接口在一台虚拟机上只挂一次
    pub async fn add_nic(&self, req: AddNicRequest) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        let vm = vm::Entity::find_by_id(&req.vm_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("vm {}", req.vm_id)))?;

        let sub = subinterface::Entity::find_by_id(&req.subinterface_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| {
                DbError::NotFound(format!("subinterface {}", req.subinterface_id))
            })?;

        if sub.app_id.is_none() || vm.app_id != sub.app_id {
            return Err(DbError::UnknownVlan(format!(
                "subinterface {} 不属于虚拟机所在应用",
                req.subinterface_id
            )));
        }

        let existing = vm_network_info::Entity::find()
            .filter(vm_network_info::Column::VmId.eq(&req.vm_id))
            .filter(vm_network_info::Column::SubinterfaceId.eq(&req.subinterface_id))
            .one(session.conn())
            .await
            .map_err(translate_err)?;
        if existing.is_some() {
            return Err(DbError::VlanAlreadyExist(format!(
                "虚拟机 {} 已挂载子接口 {}",
                req.vm_id, req.subinterface_id
            )));
        }

        vm_network_info::ActiveModel {
            nic_id: Set(req.nic_id),
            subinterface_id: Set(req.subinterface_id),
            network_connect: Set(req.network_connect),
            mac: Set(None),
            status: Set(req.status),
            vm_id: Set(Some(req.vm_id)),
        }
        .insert(session.conn())
        .await
        .map_err(translate_err)?;

        session.commit().await
    }

    /// 更新网卡
    pub async fn update_nic(&self, nic_id: &str, dto: UpdateNicDto) -> Result<()> {
        let nic = vm_network_info::Entity::find_by_id(nic_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("nic {}", nic_id)))?;

        let mut active: vm_network_info::ActiveModel = nic.into();
        if let Some(status) = dto.status {
            active.status = Set(Some(status));
        }
        if let Some(mac) = dto.mac {
            active.mac = Set(Some(mac));
        }
        if let Some(network_connect) = dto.network_connect {
            active.network_connect = Set(network_connect);
        }
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 拔掉网卡（物理删除，连同地址记录）
    pub async fn delete_nic(&self, nic_id: &str) -> Result<()> {
        let session = Session::begin(&self.db).await?;

        vm_network_info::Entity::find_by_id(nic_id)
            .one(session.conn())
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("nic {}", nic_id)))?;

        vm_ipv4::Entity::delete_many()
            .filter(vm_ipv4::Column::NicId.eq(nic_id))
            .exec(session.conn())
            .await
            .map_err(translate_err)?;
        vm_ipv6::Entity::delete_many()
            .filter(vm_ipv6::Column::NicId.eq(nic_id))
            .exec(session.conn())
            .await
            .map_err(translate_err)?;
        vm_network_info::Entity::delete_by_id(nic_id)
            .exec(session.conn())
            .await
            .map_err(translate_err)?;

        session.commit().await
    }

    // ==================== 操作记录 ====================

    /// 取操作记录，不存在时返回 None
    pub async fn get_action(&self, action_id: &str) -> Result<Option<action::Model>> {
        action::Entity::find_by_id(action_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 列出操作记录
    ///
    /// 按 VmId 过滤时只看还在处理中的操作，用于幂等判重
    pub async fn list_action(&self, filter: Option<ActionFilter>) -> Result<Vec<action::Model>> {
        let query = match filter {
            None => action::Entity::find(),
            Some(ActionFilter::Action(name)) => {
                action::Entity::find().filter(action::Column::Action.eq(name))
            }
            Some(ActionFilter::Status(status)) => {
                action::Entity::find().filter(action::Column::Status.eq(status))
            }
            Some(ActionFilter::AppId(app_id)) => {
                action::Entity::find().filter(action::Column::AppId.eq(app_id))
            }
            Some(ActionFilter::VmId(vm_id)) => action::Entity::find()
                .filter(action::Column::VmId.eq(vm_id))
                .filter(action::Column::Status.eq(ActionStatus::Processing.as_str())),
        };
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 追加一条操作记录
    pub async fn add_action(&self, req: AddActionRequest) -> Result<()> {
        action::ActiveModel {
            action_id: Set(req.action_id),
            app_id: Set(req.app_id),
            vm_id: Set(req.vm_id),
            nic_id: Set(req.nic_id),
            action: Set(req.action),
            trigger_time: Set(now()),
            status: Set(req.status.as_str().to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(())
    }

    /// 推进操作记录状态
    pub async fn update_action(&self, action_id: &str, status: ActionStatus) -> Result<()> {
        let act = action::Entity::find_by_id(action_id)
            .one(&self.db)
            .await
            .map_err(translate_err)?
            .ok_or_else(|| DbError::NotFound(format!("action {}", action_id)))?;

        let mut active: action::ActiveModel = act.into();
        active.status = Set(status.as_str().to_string());
        active.update(&self.db).await.map_err(translate_err)?;
        Ok(())
    }

    /// 找出站点内某操作/进度组合对应的 (操作, 虚拟机) 配对
    pub async fn list_vm_from_action(
        &self,
        site_name: &str,
        action_name: &str,
        status: &str,
    ) -> Result<Vec<(action::Model, vm::Model)>> {
        let actions = action::Entity::find()
            .filter(action::Column::Action.eq(action_name))
            .filter(action::Column::Status.eq(status))
            .all(&self.db)
            .await
            .map_err(translate_err)?;

        let mut pairs = Vec::new();
        for act in actions {
            let vm = vm::Entity::find_by_id(&act.vm_id)
                .one(&self.db)
                .await
                .map_err(translate_err)?
                .ok_or_else(|| DbError::NotFound(format!("vm {}", act.vm_id)))?;
            if vm.site_name == site_name {
                pairs.push((act, vm));
            }
        }
        Ok(pairs)
    }

    async fn assemble_nic_view(&self, nic: vm_network_info::Model) -> Result<NicView> {
        let ipv4 = vm_ipv4::Entity::find()
            .filter(vm_ipv4::Column::NicId.eq(&nic.nic_id))
            .one(&self.db)
            .await
            .map_err(translate_err)?;
        let ipv6 = vm_ipv6::Entity::find()
            .filter(vm_ipv6::Column::NicId.eq(&nic.nic_id))
            .one(&self.db)
            .await
            .map_err(translate_err)?;
        Ok(NicView {
            nic_id: nic.nic_id,
            subinterface_id: nic.subinterface_id,
            network_connect: nic.network_connect,
            mac: nic.mac,
            status: nic.status,
            vm_id: nic.vm_id,
            ipv4,
            ipv6,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::app::CreateAppDto;
    use crate::models::disk::DiskSpec;
    use crate::models::interface::CreateInterfaceDto;
    use crate::models::pod::CreatePodDto;
    use crate::models::site::CreateSiteDto;
    use crate::models::subinterface::{
        AllocVlanRequest, CreateSubinterfaceDto, SubinterfaceStatus, VlanType,
    };
    use crate::models::vm::{FlavorSpec, NicSpec};
    use crate::models::vm_ipv4::VmIpv4Spec;
    use crate::models::vm_ipv6::VmIpv6Spec;
    use crate::models::vm_os_info::OsInfoSpec;
    use crate::test_util::mem_store;

    /// 站点 + 资源池 + 接口 + 2 个子接口 + 应用，返回已分配的子接口 ID
    async fn seed(store: &Store) -> String {
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
        for i in 0..2 {
            store
                .add_subinterface(CreateSubinterfaceDto {
                    subinterface_name: format!("ge-0/0/1.{}", 100 + i),
                    vlan_id: 100 + i,
                    portgroup_name: format!("pg-{}", i),
                    interface_id: Some(interface_id.clone()),
                })
                .await
                .unwrap();
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

        store
            .alloc_vlan(AllocVlanRequest {
                app_id: "a1".to_string(),
                vlan_type: VlanType::Public,
                qos: 10,
                status: SubinterfaceStatus::Ok,
                sub_net: None,
            })
            .await
            .unwrap()
    }

    fn vm_request(vm_id: &str, subinterface_id: &str) -> AddVmRequest {
        AddVmRequest {
            vm_id: vm_id.to_string(),
            vm_name: format!("{}-name", vm_id),
            template_id: "t1".to_string(),
            customer_id: "cust-1".to_string(),
            site_name: "s1".to_string(),
            pod_name: "p1".to_string(),
            cluster_name: "c1".to_string(),
            datastore_name: "ds1".to_string(),
            status: "creating".to_string(),
            configure_step: "init".to_string(),
            app_id: Some("a1".to_string()),
            os_info: OsInfoSpec {
                hostname: Some("host1".to_string()),
                os_type: "centos".to_string(),
                os_version: "7.9".to_string(),
                os_bit: 64,
                username: "root".to_string(),
                password: "secret".to_string(),
            },
            flavor_info: FlavorSpec {
                cpu: 8,
                ram: 16,
                disks: vec![
                    DiskSpec { size: 100, is_load: 0 },
                    DiskSpec { size: 500, is_load: 0 },
                ],
            },
            network_info: vec![NicSpec {
                subinterface_id: subinterface_id.to_string(),
                status: Some("adding".to_string()),
                network_connect: "connected".to_string(),
                mac: None,
                ipv4: Some(VmIpv4Spec {
                    ip: "172.2.3.10".to_string(),
                    mask: "255.255.255.0".to_string(),
                    gateway: "172.2.3.1".to_string(),
                    dns: "8.8.8.8".to_string(),
                }),
                ipv6: Some(VmIpv6Spec {
                    ip: "fd00::10".to_string(),
                }),
            }],
        }
    }

    #[tokio::test]
    async fn test_add_vm_composite() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;

        let created = store.add_vm(vm_request("v1", &sub_id)).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].subinterface_id, sub_id);

        let detail = store.get_vm("v1").await.unwrap().unwrap();
        assert_eq!(detail.vm.vm_name, "v1-name");
        assert_eq!(detail.os_info.unwrap().os_type, "centos");
        let flavor = detail.flavor.unwrap();
        assert_eq!(flavor.cpu, 8);
        assert_eq!(flavor.disks.len(), 2);
        assert_eq!(detail.nics.len(), 1);
        assert_eq!(detail.nics[0].nic_id, created[0].nic_id);
        assert!(detail.nics[0].ipv4.is_some());
        assert!(detail.nics[0].ipv6.is_some());
    }

    #[tokio::test]
    async fn test_add_vm_rolls_back_whole_graph() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;

        let mut req = vm_request("v1", &sub_id);
        // 第二块网卡指向不存在的子接口，整棵树必须回滚
        req.network_info.push(NicSpec {
            subinterface_id: "ghost".to_string(),
            status: None,
            network_connect: "connected".to_string(),
            mac: None,
            ipv4: None,
            ipv6: None,
        });

        let err = store.add_vm(req).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        assert!(store.get_vm("v1").await.unwrap().is_none());
        assert!(vm_os_info::Entity::find()
            .filter(vm_os_info::Column::VmId.eq("v1"))
            .one(store.conn())
            .await
            .unwrap()
            .is_none());
        assert!(flavor_info::Entity::find()
            .filter(flavor_info::Column::VmId.eq("v1"))
            .one(store.conn())
            .await
            .unwrap()
            .is_none());
        assert!(vm_network_info::Entity::find()
            .filter(vm_network_info::Column::VmId.eq("v1"))
            .all(store.conn())
            .await
            .unwrap()
            .is_empty());
        assert!(disk::Entity::find().all(store.conn()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_vm_and_wrap() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;
        store.add_vm(vm_request("v1", &sub_id)).await.unwrap();

        let err = store
            .update_vm("v1", UpdateVmRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));

        let mut network_info = std::collections::HashMap::new();
        network_info.insert(sub_id.clone(), "52:54:00:12:34:56".to_string());
        store
            .update_vm(
                "v1",
                UpdateVmRequest {
                    cpu: Some(16),
                    ram: None,
                    status: Some("updating".to_string()),
                    configure_step: Some("ip".to_string()),
                    disks: vec![DiskSpec { size: 1000, is_load: 0 }],
                    network_info,
                },
            )
            .await
            .unwrap();

        let detail = store.get_vm("v1").await.unwrap().unwrap();
        assert_eq!(detail.vm.status, "updating");
        let flavor = detail.flavor.unwrap();
        assert_eq!(flavor.cpu, 16);
        assert_eq!(flavor.disks.len(), 3);
        assert_eq!(detail.nics[0].mac.as_deref(), Some("52:54:00:12:34:56"));

        // wrap 之后所有磁盘标记已挂载
        store.wrap_update_vm("v1", "end").await.unwrap();
        let detail = store.get_vm("v1").await.unwrap().unwrap();
        assert_eq!(detail.vm.configure_step, "end");
        assert!(detail
            .flavor
            .unwrap()
            .disks
            .iter()
            .all(|d| d.is_load == 1));
    }

    #[tokio::test]
    async fn test_list_vm_filters() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;
        store.add_vm(vm_request("v1", &sub_id)).await.unwrap();

        assert_eq!(store.list_vm(None).await.unwrap().len(), 1);
        assert_eq!(
            store
                .list_vm(Some(VmFilter::AppId("a1".to_string())))
                .await
                .unwrap()
                .len(),
            1
        );

        let err = store
            .list_vm_from_site("s1", VmSiteFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidArgument(_)));

        let vms = store
            .list_vm_from_site(
                "s1",
                VmSiteFilter {
                    status: Some("creating".to_string()),
                    configure_step: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(vms.len(), 1);

        assert!(store.list_vming_from_site("s1").await.unwrap().is_empty());
        store.wrap_update_vm("v1", "end").await.unwrap();
        assert_eq!(store.list_vming_from_site("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_nic_validations() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;
        store.add_vm(vm_request("v1", &sub_id)).await.unwrap();

        // 同一子接口重复挂载
        let err = store
            .add_nic(AddNicRequest {
                nic_id: "n-dup".to_string(),
                vm_id: "v1".to_string(),
                subinterface_id: sub_id.clone(),
                status: None,
                network_connect: "connected".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::VlanAlreadyExist(_)));

        // 未分配的子接口不能挂载
        let free_sub = store
            .add_subinterface(CreateSubinterfaceDto {
                subinterface_name: "ge-0/0/1.200".to_string(),
                vlan_id: 200,
                portgroup_name: "pg-x".to_string(),
                interface_id: None,
            })
            .await
            .unwrap();
        let err = store
            .add_nic(AddNicRequest {
                nic_id: "n-free".to_string(),
                vm_id: "v1".to_string(),
                subinterface_id: free_sub,
                status: None,
                network_connect: "connected".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownVlan(_)));

        // 正常更新与删除
        let nics = store.list_nic(Some("a1")).await.unwrap();
        assert_eq!(nics.len(), 1);
        let nic_id = nics[0].nic_id.clone();
        store
            .update_nic(
                &nic_id,
                UpdateNicDto {
                    status: Some("ok".to_string()),
                    mac: None,
                    network_connect: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            store.get_nic(&nic_id).await.unwrap().unwrap().status.as_deref(),
            Some("ok")
        );
        store.delete_nic(&nic_id).await.unwrap();
        assert!(store.get_nic(&nic_id).await.unwrap().is_none());
        assert!(store.list_nic(Some("a1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_actions_roundtrip() {
        let store = mem_store().await;
        let sub_id = seed(&store).await;
        store.add_vm(vm_request("v1", &sub_id)).await.unwrap();

        store
            .add_action(AddActionRequest {
                action_id: "act-1".to_string(),
                app_id: "a1".to_string(),
                vm_id: "v1".to_string(),
                nic_id: None,
                action: "start".to_string(),
                status: ActionStatus::Processing,
            })
            .await
            .unwrap();

        // VmId 过滤只看处理中的
        assert_eq!(
            store
                .list_action(Some(ActionFilter::VmId("v1".to_string())))
                .await
                .unwrap()
                .len(),
            1
        );

        let pairs = store
            .list_vm_from_action("s1", "start", "processing")
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1.vm_id, "v1");

        store
            .update_action("act-1", ActionStatus::Done)
            .await
            .unwrap();
        assert!(store
            .list_action(Some(ActionFilter::VmId("v1".to_string())))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store.get_action("act-1").await.unwrap().unwrap().status,
            "done"
        );
    }
}

/// 周期任务
///
/// 独立于总线请求，按固定间隔把数据库里的在途变更对账收尾：
/// 网段 adding -> ok、deleting -> 移除，然后补推每个子接口的主网段；
/// 绑定记录同理。设备侧的实际下发在这里只体现为日志

use std::collections::BTreeSet;
use std::time::Duration;

use store::models::gic_extension::{GicAppFilter, GicExtensionStatus};
use store::models::network_ipv4::{IpStep, UpdateNetworkIpv4Dto};
use store::Store;
use tracing::{debug, error, info};

/// 启动周期任务循环
pub fn start_periodic_tasks(store: Store, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            if let Err(e) = run_once(&store).await {
                error!("周期任务执行失败: {}", e);
            }
        }
    });
}

/// 跑一轮对账
pub async fn run_once(store: &Store) -> store::Result<()> {
    reconcile_networks(store).await?;
    reconcile_gicextensions(store).await?;
    Ok(())
}

/// 网段步进对账
async fn reconcile_networks(store: &Store) -> store::Result<()> {
    let mut touched = BTreeSet::new();

    for sub in store.list_subinterface(None).await? {
        for net in store.list_network_ipv4(&sub.subinterface_id).await? {
            match net.step.as_str() {
                "adding" => {
                    debug!("网段 {} 已在设备侧生效", net.network_num);
                    store
                        .update_network_ipv4(
                            net.id,
                            UpdateNetworkIpv4Dto {
                                step: Some(IpStep::Ok),
                                ..Default::default()
                            },
                        )
                        .await?;
                    touched.insert(sub.subinterface_id.clone());
                }
                "deleting" => {
                    debug!("网段 {} 已从设备侧摘除", net.network_num);
                    store.delete_network_ipv4(net.id).await?;
                    touched.insert(sub.subinterface_id.clone());
                }
                _ => {}
            }
        }
    }

    // 摘掉主网段后要把最早的一条顶上去
    for subinterface_id in &touched {
        store.update_vlan_netlevel(subinterface_id).await?;
    }

    if !touched.is_empty() {
        info!("网段对账完成，涉及 {} 个子接口", touched.len());
    }
    Ok(())
}

/// 绑定记录对账
async fn reconcile_gicextensions(store: &Store) -> store::Result<()> {
    let adding = store
        .list_gic_app(Some(GicAppFilter::Status(
            GicExtensionStatus::Adding.as_str().to_string(),
        )))
        .await?;
    for ext in adding {
        debug!("GIC 绑定 {} 已在设备侧生效", ext.gicextension_id);
        store
            .update_gicextension(&ext.gicextension_id, GicExtensionStatus::Ok.as_str())
            .await?;
    }

    let deleting = store
        .list_gic_app(Some(GicAppFilter::Status(
            GicExtensionStatus::Deleting.as_str().to_string(),
        )))
        .await?;
    for ext in deleting {
        debug!("GIC 绑定 {} 已从设备侧解除", ext.gicextension_id);
        store.delete_gicextension(&ext.gicextension_id).await?;
    }

    Ok(())
}

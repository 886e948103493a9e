/// 集群数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cluster")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cluster_id: String,
    pub cluster_name: String,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub pod_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pod::Entity",
        from = "Column::PodId",
        to = "super::pod::Column::PodId"
    )]
    Pod,
}

impl Related<super::pod::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// get_cluster 支持的查询键
#[derive(Debug, Clone)]
pub enum ClusterKey {
    Id(String),
    Name(String),
}

/// 创建集群 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterDto {
    pub cluster_name: String,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub pod_id: Option<String>,
}

/// 集群视图（带所属资源池名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterView {
    pub cluster_id: String,
    pub cluster_name: String,
    pub total_cpu: i32,
    pub total_ram: i32,
    pub used_cpu: i32,
    pub used_ram: i32,
    pub pod_id: Option<String>,
    pub pod_name: Option<String>,
}

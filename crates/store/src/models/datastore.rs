/// 数据存储数据模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "datastore")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub datastore_id: String,
    pub datastore_name: String,
    pub cluster_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cluster::Entity",
        from = "Column::ClusterId",
        to = "super::cluster::Column::ClusterId"
    )]
    Cluster,
}

impl Related<super::cluster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cluster.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 创建数据存储 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatastoreDto {
    pub datastore_name: String,
    pub cluster_id: Option<String>,
}

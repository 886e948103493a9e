/// 虚拟机模板操作

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::Store;
use crate::error::{translate_err, Result};
use crate::models::template::{self, CreateTemplateDto};

impl Store {
    /// 取模板，不存在时返回 None
    pub async fn get_template(&self, template_id: &str) -> Result<Option<template::Model>> {
        template::Entity::find_by_id(template_id)
            .one(&self.db)
            .await
            .map_err(translate_err)
    }

    /// 列出模板，可按客户过滤
    pub async fn list_template(
        &self,
        customer_id: Option<&str>,
    ) -> Result<Vec<template::Model>> {
        let mut query = template::Entity::find();
        if let Some(customer_id) = customer_id {
            query = query.filter(template::Column::CustomerId.eq(customer_id));
        }
        query.all(&self.db).await.map_err(translate_err)
    }

    /// 登记模板
    pub async fn add_template(&self, dto: CreateTemplateDto) -> Result<String> {
        let template_id = dto.template_id.clone();
        template::ActiveModel {
            template_id: Set(dto.template_id),
            template_name: Set(dto.template_name),
            template_type: Set(dto.template_type),
            os_type: Set(dto.os_type),
            os_version: Set(dto.os_version),
            os_bit: Set(dto.os_bit),
            cpu: Set(dto.cpu),
            ram: Set(dto.ram),
            disk: Set(dto.disk),
            username: Set(dto.username),
            password: Set(dto.password),
            customer_id: Set(dto.customer_id),
            vmware_tool: Set(dto.vmware_tool),
        }
        .insert(&self.db)
        .await
        .map_err(translate_err)?;
        Ok(template_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::mem_store;

    fn dto(id: &str, customer: Option<&str>) -> CreateTemplateDto {
        CreateTemplateDto {
            template_id: id.to_string(),
            template_name: "centos-base".to_string(),
            template_type: "linux".to_string(),
            os_type: "centos".to_string(),
            os_version: "7.9".to_string(),
            os_bit: 64,
            cpu: 4,
            ram: 8,
            disk: 100,
            username: "root".to_string(),
            password: "secret".to_string(),
            customer_id: customer.map(str::to_string),
            vmware_tool: Some(1),
        }
    }

    #[tokio::test]
    async fn test_template_roundtrip() {
        let store = mem_store().await;
        store.add_template(dto("t1", Some("cust-1"))).await.unwrap();
        store.add_template(dto("t2", None)).await.unwrap();

        assert_eq!(store.list_template(None).await.unwrap().len(), 2);
        assert_eq!(store.list_template(Some("cust-1")).await.unwrap().len(), 1);
        assert!(store.get_template("t1").await.unwrap().is_some());
        assert!(store.get_template("ghost").await.unwrap().is_none());
    }
}

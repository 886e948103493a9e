/// 测试辅助：内存 SQLite 上的门面
///
/// 按实体定义建表，所有门面测试共用

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use crate::facade::Store;
use crate::models::*;

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E)
where
    E: sea_orm::EntityTrait,
{
    let stmt = schema.create_table_from_entity(entity);
    db.execute(db.get_database_backend().build(&stmt))
        .await
        .unwrap();
}

/// 建一个带全量 schema 的内存库
///
/// 单连接池：内存库按连接隔离，多连接会各自看到空库
pub async fn mem_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);
    create_table(&db, &schema, zone::Entity).await;
    create_table(&db, &schema, site::Entity).await;
    create_table(&db, &schema, pod::Entity).await;
    create_table(&db, &schema, cluster::Entity).await;
    create_table(&db, &schema, datastore::Entity).await;
    create_table(&db, &schema, template::Entity).await;
    create_table(&db, &schema, route::Entity).await;
    create_table(&db, &schema, interface::Entity).await;
    create_table(&db, &schema, subinterface::Entity).await;
    create_table(&db, &schema, network_ipv4::Entity).await;
    create_table(&db, &schema, network_ipv6::Entity).await;
    create_table(&db, &schema, gic::Entity).await;
    create_table(&db, &schema, gic_extension::Entity).await;
    create_table(&db, &schema, app::Entity).await;
    create_table(&db, &schema, vm::Entity).await;
    create_table(&db, &schema, flavor_info::Entity).await;
    create_table(&db, &schema, disk::Entity).await;
    create_table(&db, &schema, vm_network_info::Entity).await;
    create_table(&db, &schema, vm_ipv4::Entity).await;
    create_table(&db, &schema, vm_ipv6::Entity).await;
    create_table(&db, &schema, vm_os_info::Entity).await;
    create_table(&db, &schema, action::Entity).await;
    create_table(&db, &schema, vspc_info::Entity).await;
    create_table(&db, &schema, serial_connection::Entity).await;

    db
}

/// 建一个空的内存门面
pub async fn mem_store() -> Store {
    Store::new(mem_db().await)
}

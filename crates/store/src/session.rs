/// 会话封装
///
/// 一个 Session 对应一次逻辑事务/一个调用方，不得跨任务共享；
/// 连接池（DatabaseConnection）才是进程级共享的那一层

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::{translate_err, Result};

/// 一次工作单元
///
/// begin 时开启事务，commit/rollback 消耗掉自身；
/// 未提交就离开作用域时事务随 Drop 回滚，任何退出路径都不会泄漏连接
pub struct Session {
    txn: DatabaseTransaction,
}

impl Session {
    /// 从连接池开启一个新事务
    pub async fn begin(db: &DatabaseConnection) -> Result<Self> {
        let txn = db.begin().await.map_err(translate_err)?;
        Ok(Self { txn })
    }

    /// 事务内的执行句柄，供查询与写入使用
    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// 提交事务
    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await.map_err(translate_err)
    }

    /// 显式回滚事务
    pub async fn rollback(self) -> Result<()> {
        self.txn.rollback().await.map_err(translate_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::mem_db;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    use crate::models::zone;

    #[tokio::test]
    async fn test_commit_persists() {
        let db = mem_db().await;
        let session = Session::begin(&db).await.unwrap();

        zone::ActiveModel {
            zone_id: Set("z1".to_string()),
            zone_name: Set("north".to_string()),
        }
        .insert(session.conn())
        .await
        .unwrap();

        session.commit().await.unwrap();

        let found = zone::Entity::find_by_id("z1").one(&db).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let db = mem_db().await;

        {
            let session = Session::begin(&db).await.unwrap();
            zone::ActiveModel {
                zone_id: Set("z2".to_string()),
                zone_name: Set("south".to_string()),
            }
            .insert(session.conn())
            .await
            .unwrap();
            // 不提交，session 随作用域结束回滚
        }

        let found = zone::Entity::find_by_id("z2").one(&db).await.unwrap();
        assert!(found.is_none());
    }
}

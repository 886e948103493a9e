/// 存储层错误类型与底层错误翻译

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// 存储层统一错误类型
///
/// 业务规则类错误（NotAllow*/VlanType/InvalidGic/...）由门面自行产生，
/// 底层数据库错误统一经 [`translate_err`] 翻译后再离开存储层
#[derive(Error, Debug)]
pub enum DbError {
    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("唯一约束冲突: {columns:?}")]
    DuplicateEntry { columns: Vec<String> },

    #[error("事务死锁，操作可整体重试")]
    Deadlock,

    #[error("数据库连接错误: {0}")]
    Connection(String),

    #[error("无效参数: {0}")]
    InvalidArgument(String),

    #[error("校验失败: {0}")]
    Validation(String),

    #[error("当前状态不允许更新: {0}")]
    NotAllowUpdate(String),

    #[error("当前状态不允许删除: {0}")]
    NotAllowDelete(String),

    #[error("子接口类型错误: {0}")]
    VlanType(String),

    #[error("无效的 GIC: {0}")]
    InvalidGic(String),

    #[error("未知的 VLAN: {0}")]
    UnknownVlan(String),

    #[error("VLAN 已绑定: {0}")]
    VlanAlreadyExist(String),

    #[error("资源已耗尽: {0}")]
    ResourceExhausted(String),

    #[error("数据库错误: {source}")]
    Database {
        #[source]
        source: DbErr,
    },
}

/// 存储层统一结果类型
pub type Result<T> = std::result::Result<T, DbError>;

// MySQL 侧报错形如 Duplicate entry 'x' for key 'app.uniq_app0app_id'
static MYSQL_DUP_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"for key '(?:[^'.]+\.)?([^']+)'").unwrap());

// SQLite 侧报错形如 UNIQUE constraint failed: app.app_id, app.site_id
static SQLITE_DUP_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"constraint failed: (.+)").unwrap());

// 连接类驱动错误码（MySQL 网络/认证/超时）
const CONN_ERR_CODES: &[&str] = &["2002", "2003", "2006", "2013", "1040", "1045"];

/// 从唯一约束的报错信息里提取冲突列名
///
/// 约束命名约定 "uniq_<表>0<列1>0<列2>"，不符合约定时退回键名本身
fn parse_duplicate_columns(message: &str) -> Vec<String> {
    if let Some(caps) = SQLITE_DUP_KEY_RE.captures(message) {
        return caps[1]
            .split(", ")
            .map(|col| col.rsplit('.').next().unwrap_or(col).to_string())
            .collect();
    }
    if let Some(caps) = MYSQL_DUP_KEY_RE.captures(message) {
        let key = &caps[1];
        if let Some(rest) = key.strip_prefix("uniq_") {
            let cols: Vec<String> = rest.split('0').skip(1).map(str::to_string).collect();
            if !cols.is_empty() {
                return cols;
            }
        }
        return vec![key.to_string()];
    }
    Vec::new()
}

/// 判断底层错误是否属于连接类（可触发连接池失效/重连）
pub(crate) fn is_connection_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e)) => match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => true,
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.to_string()).unwrap_or_default();
                CONN_ERR_CODES.contains(&code.as_str())
            }
            _ => false,
        },
        DbErr::Conn(_) => true,
        _ => {
            let msg = err.to_string();
            CONN_ERR_CODES.iter().any(|code| msg.contains(code))
        }
    }
}

fn is_deadlock_error(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("1213") || msg.contains("Deadlock") || msg.contains("deadlock")
}

/// 存储边界上唯一的错误翻译函数
///
/// 唯一约束冲突 -> DuplicateEntry（带冲突列），死锁 -> Deadlock，
/// 连接丢失 -> Connection，单行查询落空 -> NotFound，其余包成 Database 并保留原因
pub fn translate_err(err: DbErr) -> DbError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        return DbError::DuplicateEntry {
            columns: parse_duplicate_columns(&message),
        };
    }
    if is_deadlock_error(&err) {
        return DbError::Deadlock;
    }
    if is_connection_error(&err) {
        return DbError::Connection(err.to_string());
    }
    match err {
        DbErr::RecordNotFound(what) => DbError::NotFound(what),
        other => DbError::Database { source: other },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duplicate_columns_sqlite() {
        let cols = parse_duplicate_columns("UNIQUE constraint failed: app.app_id");
        assert_eq!(cols, vec!["app_id".to_string()]);

        let cols =
            parse_duplicate_columns("UNIQUE constraint failed: app.app_id, app.site_id");
        assert_eq!(cols, vec!["app_id".to_string(), "site_id".to_string()]);
    }

    #[test]
    fn test_parse_duplicate_columns_mysql_convention() {
        let cols = parse_duplicate_columns(
            "Duplicate entry 'a1' for key 'subinterface.uniq_subinterface0vlan_id0interface_id'",
        );
        assert_eq!(
            cols,
            vec!["vlan_id".to_string(), "interface_id".to_string()]
        );
    }

    #[test]
    fn test_parse_duplicate_columns_mysql_plain_key() {
        let cols = parse_duplicate_columns("Duplicate entry 'a1' for key 'app.PRIMARY'");
        assert_eq!(cols, vec!["PRIMARY".to_string()]);
    }

    #[test]
    fn test_translate_record_not_found() {
        let err = translate_err(DbErr::RecordNotFound("app a1".to_string()));
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_deadlock_classification() {
        let err = translate_err(DbErr::Custom(
            "(1213, 'Deadlock found when trying to get lock; try restarting transaction')"
                .to_string(),
        ));
        assert!(matches!(err, DbError::Deadlock));
    }

    #[test]
    fn test_connection_classification() {
        let err = translate_err(DbErr::Custom(
            "(2006, 'MySQL server has gone away')".to_string(),
        ));
        assert!(matches!(err, DbError::Connection(_)));
    }
}

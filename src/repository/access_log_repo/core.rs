use crate::domain::access_log::AccessLog;
use crate::domain::types::AccessStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// AccessLogRepository - 访问审计日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AccessLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AccessLogRepository {
    /// 创建新的访问日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入访问日志
    ///
    /// # 返回
    /// - `Ok(id)`: 新日志 id
    /// - `Err(ValidationError)`: 身份字段缺失
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, log: &AccessLog) -> RepositoryResult<i64> {
        log.validate().map_err(RepositoryError::ValidationError)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO access_logs (
                user_id, department_id, operation_id, access_time, report_id,
                ip_address, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                log.user_id,
                log.department_id,
                log.operation_id,
                log.access_time.format(TS_FORMAT).to_string(),
                log.report_id,
                log.ip_address,
                log.status.as_str(),
                log.created_at.format(TS_FORMAT).to_string(),
                log.updated_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 将 pending 日志变更为终态
    ///
    /// # 规则
    /// - 目标状态必须是终态
    /// - 仅当当前状态为 pending 时生效（保证只变更一次）
    ///
    /// # 返回
    /// - `Err(NotFound)`: 日志不存在
    /// - `Err(InvalidStateTransition)`: 已是终态或目标非终态
    pub fn mark_status(&self, id: i64, status: AccessStatus) -> RepositoryResult<()> {
        if !status.is_terminal() {
            return Err(RepositoryError::InvalidStateTransition {
                from: AccessStatus::Pending.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE access_logs
            SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
            params![id, status.as_str(), now_str()],
        )?;

        if rows == 1 {
            return Ok(());
        }

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM access_logs WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match current {
            Some(from) => Err(RepositoryError::InvalidStateTransition {
                from,
                to: status.as_str().to_string(),
            }),
            None => Err(RepositoryError::NotFound {
                entity: "AccessLog".to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// 将早于 cutoff 仍为 pending 的日志置为 cancelled
    ///
    /// # 返回
    /// - Ok(rows): 被取消的条数
    pub fn cancel_stale_pending(&self, older_than: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE access_logs
            SET status = 'cancelled', updated_at = ?2
            WHERE status = 'pending' AND access_time < ?1
            "#,
            params![older_than.format(TS_FORMAT).to_string(), now_str()],
        )?;
        Ok(rows)
    }

    /// 删除早于 cutoff 的日志（保留期清理）
    pub fn purge_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM access_logs WHERE access_time < ?1",
            params![cutoff.format(TS_FORMAT).to_string()],
        )?;
        Ok(rows)
    }
}

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

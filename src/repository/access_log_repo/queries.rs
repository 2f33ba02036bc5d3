use super::core::{AccessLogRepository, TS_FORMAT};
use crate::domain::access_log::{AccessLog, AccessStats};
use crate::domain::types::AccessStatus;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, department_id, operation_id, access_time, report_id,
           ip_address, status, created_at, updated_at
    FROM access_logs
"#;

impl AccessLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 id 查询单条日志
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<AccessLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);

        let log = conn
            .query_row(&sql, params![id], |row| self.map_row(row))
            .optional()?;
        Ok(log)
    }

    /// 查询最近的日志（按 access_time 倒序）
    pub fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<AccessLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY access_time DESC, id DESC LIMIT ?1", SELECT_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![limit], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 查询指定用户在时间窗口内的日志
    pub fn find_by_user(
        &self,
        user_id: i64,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<AccessLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE user_id = ?1 AND access_time BETWEEN ?2 AND ?3 ORDER BY access_time DESC, id DESC LIMIT ?4",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(
                params![
                    user_id,
                    start_time.format(TS_FORMAT).to_string(),
                    end_time.format(TS_FORMAT).to_string(),
                    limit,
                ],
                |row| self.map_row(row),
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 查询指定状态的日志
    pub fn find_by_status(&self, status: AccessStatus, limit: i64) -> RepositoryResult<Vec<AccessLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE status = ?1 ORDER BY access_time DESC, id DESC LIMIT ?2",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![status.as_str(), limit], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 时间窗口内的访问统计（总数 / 失败数）
    pub fn stats_in_range(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> RepositoryResult<AccessStats> {
        let conn = self.get_conn()?;
        let stats = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0)
            FROM access_logs
            WHERE access_time BETWEEN ?1 AND ?2
            "#,
            params![
                start_time.format(TS_FORMAT).to_string(),
                end_time.format(TS_FORMAT).to_string(),
            ],
            |row| {
                Ok(AccessStats {
                    total: row.get(0)?,
                    failed: row.get(1)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// 统计指定状态的日志数量
    pub fn count_by_status(&self, status: AccessStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM access_logs WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 映射数据库行到 AccessLog
    fn map_row(&self, row: &Row) -> SqliteResult<AccessLog> {
        let access_time_str: String = row.get(4)?;
        let status_str: String = row.get(7)?;
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        let status = AccessStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("未知的访问状态: {}", status_str).into(),
            )
        })?;

        Ok(AccessLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            department_id: row.get(2)?,
            operation_id: row.get(3)?,
            access_time: parse_ts(&access_time_str, 4)?,
            report_id: row.get(5)?,
            ip_address: row.get(6)?,
            status,
            created_at: parse_ts(&created_at_str, 8)?,
            updated_at: parse_ts(&updated_at_str, 9)?,
        })
    }
}

fn parse_ts(value: &str, idx: usize) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

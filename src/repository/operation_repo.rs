// ==========================================
// ERP 报表核心 - 操作目录数据仓储
// ==========================================
// 对齐: operations 表
// ==========================================

use crate::domain::operation::Operation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct OperationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OperationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 code 查询操作
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Operation>> {
        let conn = self.get_conn()?;
        let op = conn
            .query_row(
                "SELECT id, code, name, description FROM operations WHERE code = ?1",
                params![code],
                map_row,
            )
            .optional()?;
        Ok(op)
    }

    /// 查询全部操作（按 id 排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Operation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, code, name, description FROM operations ORDER BY id")?;
        let ops = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(ops)
    }
}

fn map_row(row: &Row) -> SqliteResult<Operation> {
    Ok(Operation {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
    })
}

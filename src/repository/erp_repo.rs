// ==========================================
// ERP 报表核心 - ERP 查询执行器（无模式行映射）
// ==========================================
// 职责: 执行参数化查询模板, 返回有序 RawRow 序列
// 约束:
// - 模板只识别 FromDate / ToDate 两个命名占位符（:  @  $ 前缀均可）
// - 模板来自报表元数据（受信内容）, 不做任何其他替换
// - 二进制值一律转为 UTF-8 文本（有损）
// - 每次调用使用独立的短连接, 失败不重试
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::domain::row::{RawRow, ScalarValue};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Statement};
use tracing::debug;

/// 默认的日期参数格式
pub const DEFAULT_DATE_PARAM_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FROM_DATE_PARAMS: [&str; 3] = [":FromDate", "@FromDate", "$FromDate"];
const TO_DATE_PARAMS: [&str; 3] = [":ToDate", "@ToDate", "$ToDate"];

// ==========================================
// QueryParams - 查询参数（已归一化的日期窗口）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl QueryParams {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self { from, to }
    }
}

// ==========================================
// ErpQueryExecutor - 查询执行接口
// ==========================================
pub trait ErpQueryExecutor: Send + Sync {
    /// 执行查询模板
    ///
    /// # 返回
    /// - Ok(rows): 结果行（列顺序与结果集一致）
    /// - Err(QueryExecutionError): 连接或 SQL 失败
    fn execute(&self, template: &str, params: &QueryParams) -> RepositoryResult<Vec<RawRow>>;
}

// ==========================================
// SqliteErpExecutor - 基于 SQLite 的 ERP 查询执行器
// ==========================================
pub struct SqliteErpExecutor {
    db_path: String,
    date_format: String,
}

impl SqliteErpExecutor {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_date_format(db_path, DEFAULT_DATE_PARAM_FORMAT)
    }

    pub fn with_date_format(db_path: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            date_format: date_format.into(),
        }
    }

    /// 打开只读短连接
    fn open(&self) -> RepositoryResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            RepositoryError::QueryExecutionError(format!("无法打开 ERP 数据库 {}: {}", self.db_path, e))
        })?;
        configure_sqlite_connection(&conn).map_err(query_error)?;
        Ok(conn)
    }

    /// 绑定模板中出现的日期占位符（未出现的不绑定）
    fn bind_dates(&self, stmt: &mut Statement<'_>, params: &QueryParams) -> rusqlite::Result<()> {
        let from = params.from.format(&self.date_format).to_string();
        let to = params.to.format(&self.date_format).to_string();

        for name in FROM_DATE_PARAMS {
            if let Some(idx) = stmt.parameter_index(name)? {
                stmt.raw_bind_parameter(idx, from.as_str())?;
            }
        }
        for name in TO_DATE_PARAMS {
            if let Some(idx) = stmt.parameter_index(name)? {
                stmt.raw_bind_parameter(idx, to.as_str())?;
            }
        }
        Ok(())
    }
}

impl ErpQueryExecutor for SqliteErpExecutor {
    fn execute(&self, template: &str, params: &QueryParams) -> RepositoryResult<Vec<RawRow>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(template).map_err(query_error)?;
        self.bind_dates(&mut stmt, params).map_err(query_error)?;

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.raw_query();
        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut mapped = RawRow::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                let value = row.get_ref(idx).map_err(query_error)?;
                mapped.insert(name.clone(), scalar_from_value_ref(value));
            }
            result.push(mapped);
        }

        debug!(rows = result.len(), columns = names.len(), "ERP 查询完成");
        Ok(result)
    }
}

/// SQLite 值 → ScalarValue
///
/// - INTEGER → Integer（保留 64 位精度）
/// - REAL → Number
/// - TEXT / BLOB → Text（按 UTF-8 有损解码）
/// - NULL → Null
pub fn scalar_from_value_ref(value: ValueRef<'_>) -> ScalarValue {
    match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(i) => ScalarValue::Integer(i),
        ValueRef::Real(f) => ScalarValue::Number(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            ScalarValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn query_error(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::QueryExecutionError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn setup_erp_db() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE sales (id INTEGER, name TEXT, amount REAL, note BLOB, sold_at TEXT);
            INSERT INTO sales VALUES (1, 'alpha', 10.5, CAST('abc' AS BLOB), '2025-01-10 08:00:00');
            INSERT INTO sales VALUES (2, 'beta', NULL, NULL, '2025-02-10 08:00:00');
            "#,
        )
        .unwrap();
        file
    }

    fn window(from: (i32, u32, u32), to: (i32, u32, u32)) -> QueryParams {
        QueryParams::new(
            NaiveDate::from_ymd_opt(from.0, from.1, from.2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(to.0, to.1, to.2)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        )
    }

    #[test]
    fn test_execute_maps_rows_in_column_order() {
        let db = setup_erp_db();
        let executor = SqliteErpExecutor::new(db.path().to_str().unwrap());

        let rows = executor
            .execute(
                "SELECT name, id, amount, note FROM sales WHERE sold_at BETWEEN :FromDate AND @ToDate",
                &window((2025, 1, 1), (2025, 1, 31)),
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "id", "amount", "note"]);
        assert_eq!(rows[0]["name"], ScalarValue::from("alpha"));
        assert_eq!(rows[0]["id"], ScalarValue::Integer(1));
        assert_eq!(rows[0]["amount"], ScalarValue::Number(10.5));
        assert_eq!(rows[0]["note"], ScalarValue::from("abc"));
    }

    #[test]
    fn test_execute_without_placeholders_passes_nulls_through() {
        let db = setup_erp_db();
        let executor = SqliteErpExecutor::new(db.path().to_str().unwrap());

        let rows = executor
            .execute(
                "SELECT amount, note FROM sales WHERE id = 2",
                &window((2025, 1, 1), (2025, 1, 31)),
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0]["amount"].is_null());
        assert!(rows[0]["note"].is_null());
    }

    #[test]
    fn test_execute_reports_sql_failure() {
        let db = setup_erp_db();
        let executor = SqliteErpExecutor::new(db.path().to_str().unwrap());

        let err = executor
            .execute("SELECT * FROM missing_table", &window((2025, 1, 1), (2025, 1, 2)))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::QueryExecutionError(_)));
    }

    #[test]
    fn test_blob_value_becomes_text() {
        let bytes = b"hello".to_vec();
        assert_eq!(
            scalar_from_value_ref(ValueRef::Blob(&bytes)),
            ScalarValue::from("hello")
        );
        assert_eq!(scalar_from_value_ref(ValueRef::Integer(3)), ScalarValue::Integer(3));
        assert_eq!(
            scalar_from_value_ref(ValueRef::Integer(9_007_199_254_740_993)),
            ScalarValue::Integer(9_007_199_254_740_993)
        );
    }
}

// ==========================================
// ERP 报表核心 - 报表定义数据仓储
// ==========================================
// 对齐: reports / report_columns 表
// 红线: Repository 不做业务逻辑, 只做数据映射
// 红线: 定义与列的写入必须在同一事务内完成
// ==========================================

use crate::domain::report::{NewReport, NewReportColumn, ReportColumn, ReportDefinition, ReportUpdate};
use crate::domain::types::ColumnType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ReportRepository - 报表定义仓储
// ==========================================
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    /// 创建新的报表定义仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建报表定义（定义 + 全部列, 全部成功或全部回滚）
    ///
    /// # 返回
    /// - Ok(id): 新报表 id
    pub fn create(&self, report: &NewReport) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = now_str();

        tx.execute(
            r#"
            INSERT INTO reports (
                report_type, report_name, department_id, query_statement,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![
                report.report_type,
                report.report_name,
                report.department_id,
                report.query_statement,
                now,
            ],
        )?;
        let report_id = tx.last_insert_rowid();

        insert_columns(&tx, report_id, &report.columns)?;

        tx.commit()?;
        Ok(report_id)
    }

    /// 更新报表定义
    ///
    /// # 规则
    /// - 报表不存在 → NotFound
    /// - 标量字段: Some 覆盖, None 保持
    /// - 列: 删除全部旧列后插入新列（整体替换, 不合并）
    pub fn update(&self, report_id: i64, update: &ReportUpdate) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM reports WHERE id = ?1", params![report_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "Report".to_string(),
                id: report_id.to_string(),
            });
        }

        tx.execute(
            r#"
            UPDATE reports SET
                report_type = COALESCE(?2, report_type),
                report_name = COALESCE(?3, report_name),
                department_id = COALESCE(?4, department_id),
                query_statement = COALESCE(?5, query_statement),
                updated_at = ?6
            WHERE id = ?1
            "#,
            params![
                report_id,
                update.report_type,
                update.report_name,
                update.department_id,
                update.query_statement,
                now_str(),
            ],
        )?;

        tx.execute("DELETE FROM report_columns WHERE report_id = ?1", params![report_id])?;
        insert_columns(&tx, report_id, &update.columns)?;

        tx.commit()?;
        Ok(())
    }

    /// 删除报表定义及其全部列
    pub fn delete(&self, report_id: i64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM report_columns WHERE report_id = ?1", params![report_id])?;
        let rows = tx.execute("DELETE FROM reports WHERE id = ?1", params![report_id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Report".to_string(),
                id: report_id.to_string(),
            });
        }

        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 id 查询报表定义（含有序列）
    pub fn find_by_id(&self, report_id: i64) -> RepositoryResult<Option<ReportDefinition>> {
        let conn = self.get_conn()?;

        let report = conn
            .query_row(
                r#"
                SELECT id, report_type, report_name, department_id, query_statement,
                       created_at, updated_at
                FROM reports
                WHERE id = ?1
                "#,
                params![report_id],
                map_report_row,
            )
            .optional()?;

        match report {
            Some(mut report) => {
                report.columns = load_columns(&conn, report_id)?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }

    /// 查询全部报表定义（可按部门过滤）
    pub fn find_all(&self, department_id: Option<&str>) -> RepositoryResult<Vec<ReportDefinition>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, report_type, report_name, department_id, query_statement,
                   created_at, updated_at
            FROM reports
            WHERE (?1 IS NULL OR department_id = ?1)
            ORDER BY id
            "#,
        )?;

        let mut reports = stmt
            .query_map(params![department_id], map_report_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        for report in reports.iter_mut() {
            report.columns = load_columns(&conn, report.id)?;
        }

        Ok(reports)
    }

    /// 统计报表数量（可按部门过滤）
    pub fn count(&self, department_id: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE (?1 IS NULL OR department_id = ?1)",
            params![department_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 查询报表的列（按 num, id 排序）
    pub fn find_columns(&self, report_id: i64) -> RepositoryResult<Vec<ReportColumn>> {
        let conn = self.get_conn()?;
        Ok(load_columns(&conn, report_id)?)
    }
}

// ==========================================
// 内部辅助函数
// ==========================================

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

fn insert_columns(tx: &Transaction<'_>, report_id: i64, columns: &[NewReportColumn]) -> SqliteResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO report_columns (report_id, title, code, type, num) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for col in columns {
        stmt.execute(params![report_id, col.title, col.code, col.column_type, col.num])?;
    }
    Ok(())
}

fn load_columns(conn: &Connection, report_id: i64) -> SqliteResult<Vec<ReportColumn>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, report_id, title, code, type, num
        FROM report_columns
        WHERE report_id = ?1
        ORDER BY num, id
        "#,
    )?;

    let columns = stmt
        .query_map(params![report_id], |row| {
            let type_str: String = row.get(4)?;
            Ok(ReportColumn {
                id: row.get(0)?,
                report_id: row.get(1)?,
                title: row.get(2)?,
                code: row.get(3)?,
                column_type: ColumnType::parse_lenient(&type_str),
                num: row.get(5)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(columns)
}

fn map_report_row(row: &Row) -> SqliteResult<ReportDefinition> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(ReportDefinition {
        id: row.get(0)?,
        report_type: row.get(1)?,
        report_name: row.get(2)?,
        department_id: row.get(3)?,
        query_statement: row.get(4)?,
        columns: Vec::new(),
        created_at: parse_ts(&created_at_str, 5)?,
        updated_at: parse_ts(&updated_at_str, 6)?,
    })
}

fn parse_ts(value: &str, idx: usize) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> ReportRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ReportRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn make_report(name: &str, dept: &str, codes: &[&str]) -> NewReport {
        NewReport {
            report_type: "sales".to_string(),
            report_name: name.to_string(),
            department_id: dept.to_string(),
            query_statement: "SELECT 1 AS A".to_string(),
            columns: codes
                .iter()
                .enumerate()
                .map(|(i, code)| NewReportColumn::new(code, code, ColumnType::Text, i as i64 + 1))
                .collect(),
        }
    }

    #[test]
    fn test_create_and_find_by_id() {
        let repo = setup_repo();
        let id = repo.create(&make_report("Monthly", "10", &["A", "B"])).unwrap();

        let report = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(report.report_name, "Monthly");
        assert_eq!(report.department_id, "10");
        let codes: Vec<&str> = report.columns.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
        assert!(repo.find_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_create_is_atomic_on_duplicate_code() {
        let repo = setup_repo();
        let result = repo.create(&make_report("Dup", "10", &["A", "A"]));

        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
        assert_eq!(repo.count(None).unwrap(), 0);
    }

    #[test]
    fn test_columns_ordered_by_num_then_id() {
        let repo = setup_repo();
        let mut report = make_report("Ordered", "10", &[]);
        report.columns = vec![
            NewReportColumn::new("Third", "C", ColumnType::Number, 2),
            NewReportColumn::new("First", "A", ColumnType::Date, 1),
            NewReportColumn::new("Second", "B", ColumnType::Text, 1),
        ];
        let id = repo.create(&report).unwrap();

        let columns = repo.find_columns(id).unwrap();
        let titles: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        assert_eq!(columns[2].column_type, ColumnType::Number);
    }

    #[test]
    fn test_update_replaces_columns_wholesale() {
        let repo = setup_repo();
        let id = repo.create(&make_report("Old", "10", &["X", "Y"])).unwrap();

        let update = ReportUpdate {
            report_name: Some("New".to_string()),
            columns: vec![NewReportColumn::new("Zed", "Z", ColumnType::Text, 1)],
            ..Default::default()
        };
        repo.update(id, &update).unwrap();

        let report = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(report.report_name, "New");
        assert_eq!(report.report_type, "sales");
        let codes: Vec<&str> = report.columns.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["Z"]);
    }

    #[test]
    fn test_update_and_delete_missing_report() {
        let repo = setup_repo();
        assert!(matches!(
            repo.update(99, &ReportUpdate::default()),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(99), Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_delete_and_department_filter() {
        let repo = setup_repo();
        let a = repo.create(&make_report("A", "10", &["A"])).unwrap();
        repo.create(&make_report("B", "20", &["B"])).unwrap();

        assert_eq!(repo.count(None).unwrap(), 2);
        assert_eq!(repo.count(Some("20")).unwrap(), 1);
        assert_eq!(repo.find_all(Some("10")).unwrap().len(), 1);

        repo.delete(a).unwrap();
        assert_eq!(repo.count(None).unwrap(), 1);
        assert!(repo.find_columns(a).unwrap().is_empty());
    }
}

// ==========================================
// ERP 报表核心 - 报表 API
// ==========================================
// 职责:
// 1. 报表查询 / 导出（经访问审计装饰器包裹）
// 2. 报表定义维护（新建 / 更新 / 删除 / 查询）
// 流程: 校验 report_id → 审计(pending) → 日期窗口归一化 → 读取定义
//       → ERP 查询 → (导出) → 审计(success / failed)
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::api::dto::{ExportFile, ReportResult};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::access_log::CallerContext;
use crate::domain::report::{NewReport, NewReportColumn, ReportDefinition, ReportUpdate};
use crate::domain::types::{AccessOperation, ColumnType};
use crate::engine::audit::AccessAuditor;
use crate::engine::date_range::DateRangePolicy;
use crate::export::{self, XLSX_CONTENT_TYPE};
use crate::repository::erp_repo::{ErpQueryExecutor, QueryParams};
use crate::repository::report_repo::ReportRepository;

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    report_repo: Arc<ReportRepository>,
    executor: Arc<dyn ErpQueryExecutor>,
    auditor: Arc<AccessAuditor>,
    date_policy: DateRangePolicy,
}

impl ReportApi {
    /// 创建新的 ReportApi 实例
    ///
    /// # 参数
    /// - report_repo: 报表定义仓储
    /// - executor: ERP 查询执行器
    /// - auditor: 访问审计装饰器
    /// - date_policy: 日期窗口策略
    pub fn new(
        report_repo: Arc<ReportRepository>,
        executor: Arc<dyn ErpQueryExecutor>,
        auditor: Arc<AccessAuditor>,
        date_policy: DateRangePolicy,
    ) -> Self {
        Self {
            report_repo,
            executor,
            auditor,
            date_policy,
        }
    }

    // ==========================================
    // 报表查询 / 导出
    // ==========================================

    /// 查询报表数据
    ///
    /// # 返回
    /// - Ok(ReportResult): 列定义 + 数据行
    /// - Err(InvalidInput): report_id 非法（不写审计）
    /// - Err(InvalidDateRange / DateRangeTooLarge / NotFound / NoColumnsFound / QueryExecutionError)
    pub fn get_report(
        &self,
        report_id: i64,
        from_date: Option<NaiveDateTime>,
        to_date: Option<NaiveDateTime>,
        caller: &CallerContext,
    ) -> ApiResult<ReportResult> {
        validate_report_id(report_id)?;
        info!(report_id, user_id = caller.user_id, "查询报表");

        let result = self.auditor.audited(AccessOperation::View, report_id, caller, || -> ApiResult<ReportResult> {
            let (from, to) = self.date_policy.normalize(from_date, to_date)?;
            self.fetch_report_data(report_id, from, to)
        })?;

        info!(report_id, rows = result.data.len(), "报表查询完成");
        Ok(result)
    }

    /// 导出报表为 XLSX
    pub fn export_report(
        &self,
        report_id: i64,
        from_date: Option<NaiveDateTime>,
        to_date: Option<NaiveDateTime>,
        caller: &CallerContext,
    ) -> ApiResult<ExportFile> {
        validate_report_id(report_id)?;
        info!(report_id, user_id = caller.user_id, "导出报表");

        let file = self.auditor.audited(AccessOperation::Export, report_id, caller, || -> ApiResult<ExportFile> {
            let (from, to) = self.date_policy.normalize(from_date, to_date)?;
            let result = self.fetch_report_data(report_id, from, to)?;

            let content = export::render_report(
                &result.report_name,
                from,
                to,
                &result.columns,
                &result.data,
            )?;

            Ok(ExportFile {
                file_name: export::report_file_name(&result.report_name, from, to),
                report_name: result.report_name,
                content_type: XLSX_CONTENT_TYPE.to_string(),
                size_bytes: content.len(),
                content,
                generated_at: Local::now().naive_local(),
            })
        })?;

        info!(report_id, file_name = %file.file_name, size = file.size_bytes, "报表导出完成");
        Ok(file)
    }

    /// 读取定义并执行查询
    fn fetch_report_data(
        &self,
        report_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ApiResult<ReportResult> {
        let report = self.load_definition(report_id)?;
        if !report.is_executable() {
            return Err(ApiError::NoColumnsFound(report_id));
        }

        let data = if report.has_query() {
            self.executor
                .execute(&report.query_statement, &QueryParams::new(from, to))?
        } else {
            debug!(report_id, "查询模板为空, 返回空数据");
            Vec::new()
        };

        Ok(ReportResult {
            report_id,
            report_type: report.report_type,
            report_name: report.report_name,
            from_date: from,
            to_date: to,
            columns: report.columns,
            data,
        })
    }

    fn load_definition(&self, report_id: i64) -> ApiResult<ReportDefinition> {
        self.report_repo
            .find_by_id(report_id)?
            .ok_or_else(|| ApiError::NotFound(format!("报表(id={})不存在", report_id)))
    }

    // ==========================================
    // 报表定义维护
    // ==========================================

    /// 新建报表定义
    ///
    /// # 返回
    /// - Ok(id): 新报表 id
    pub fn create_report(&self, request: NewReport) -> ApiResult<i64> {
        if request.report_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("report_name 不能为空".to_string()));
        }
        if request.query_statement.trim().is_empty() {
            return Err(ApiError::InvalidInput("query_statement 不能为空".to_string()));
        }

        let report = NewReport {
            columns: normalize_columns(&request.columns)?,
            ..request
        };

        let id = self.report_repo.create(&report)?;
        info!(report_id = id, report_name = %report.report_name, columns = report.columns.len(), "报表定义已创建");
        Ok(id)
    }

    /// 更新报表定义（列整体替换）
    pub fn update_report(&self, report_id: i64, request: ReportUpdate) -> ApiResult<()> {
        validate_report_id(report_id)?;
        if matches!(&request.report_name, Some(name) if name.trim().is_empty()) {
            return Err(ApiError::InvalidInput("report_name 不能为空".to_string()));
        }

        let update = ReportUpdate {
            columns: normalize_columns(&request.columns)?,
            ..request
        };

        self.report_repo.update(report_id, &update)?;
        info!(report_id, columns = update.columns.len(), "报表定义已更新");
        Ok(())
    }

    /// 删除报表定义
    pub fn delete_report(&self, report_id: i64) -> ApiResult<()> {
        validate_report_id(report_id)?;
        self.report_repo.delete(report_id)?;
        info!(report_id, "报表定义已删除");
        Ok(())
    }

    /// 查询单个报表定义
    pub fn get_report_definition(&self, report_id: i64) -> ApiResult<ReportDefinition> {
        validate_report_id(report_id)?;
        self.load_definition(report_id)
    }

    /// 查询报表定义列表（可按部门过滤）
    pub fn list_report_definitions(&self, department_id: Option<&str>) -> ApiResult<Vec<ReportDefinition>> {
        Ok(self.report_repo.find_all(normalize_department(department_id))?)
    }

    /// 统计报表数量（可按部门过滤）
    pub fn count_reports(&self, department_id: Option<&str>) -> ApiResult<i64> {
        Ok(self.report_repo.count(normalize_department(department_id))?)
    }
}

// ==========================================
// 校验辅助函数
// ==========================================

fn validate_report_id(report_id: i64) -> ApiResult<()> {
    if report_id <= 0 {
        return Err(ApiError::InvalidInput(format!("无效的报表ID: {}", report_id)));
    }
    Ok(())
}

fn normalize_department(department_id: Option<&str>) -> Option<&str> {
    department_id.map(str::trim).filter(|d| !d.is_empty())
}

/// 校验并规范化列定义
///
/// - title / code 去空白后不能为空
/// - code 在同一报表内唯一
/// - type 必须是 text / number / date（规范化为小写名）
fn normalize_columns(columns: &[NewReportColumn]) -> ApiResult<Vec<NewReportColumn>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(columns.len());

    for (idx, col) in columns.iter().enumerate() {
        let title = col.title.trim();
        let code = col.code.trim();
        if title.is_empty() || code.is_empty() {
            return Err(ApiError::InvalidInput(format!("第{}列的 title / code 不能为空", idx + 1)));
        }
        if !seen.insert(code.to_string()) {
            return Err(ApiError::InvalidInput(format!("列编码重复: {}", code)));
        }
        let column_type = ColumnType::parse(&col.column_type).ok_or_else(|| {
            ApiError::InvalidInput(format!("列 {} 的类型无效: {}", code, col.column_type))
        })?;

        normalized.push(NewReportColumn::new(title, code, column_type, col.num));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_columns() {
        let columns = vec![
            NewReportColumn {
                title: " Amount ".to_string(),
                code: "AMT".to_string(),
                column_type: "Numeric".to_string(),
                num: 1,
            },
            NewReportColumn::new("Day", "DAY", ColumnType::Date, 2),
        ];
        let normalized = normalize_columns(&columns).unwrap();
        assert_eq!(normalized[0].title, "Amount");
        assert_eq!(normalized[0].column_type, "number");
    }

    #[test]
    fn test_normalize_columns_rejects_bad_input() {
        let dup = vec![
            NewReportColumn::new("A", "X", ColumnType::Text, 1),
            NewReportColumn::new("B", "X", ColumnType::Text, 2),
        ];
        assert!(matches!(normalize_columns(&dup), Err(ApiError::InvalidInput(_))));

        let bad_type = vec![NewReportColumn {
            title: "A".to_string(),
            code: "A".to_string(),
            column_type: "money".to_string(),
            num: 1,
        }];
        assert!(matches!(normalize_columns(&bad_type), Err(ApiError::InvalidInput(_))));

        let blank = vec![NewReportColumn::new(" ", "A", ColumnType::Text, 1)];
        assert!(normalize_columns(&blank).is_err());
    }

    #[test]
    fn test_validate_report_id() {
        assert!(validate_report_id(1).is_ok());
        assert!(validate_report_id(0).is_err());
        assert!(validate_report_id(-3).is_err());
    }
}

// ==========================================
// ERP 报表核心 - 销售预测 API
// ==========================================
// 流程: 审计(pending, report_id=0) → 日期窗口归一化 → 固定模板查询
//       → 解码 / 分组 → (导出) → 审计(success / failed)
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::api::dto::ExportFile;
use crate::api::error::ApiResult;
use crate::domain::access_log::CallerContext;
use crate::domain::forecast::CombinedForecast;
use crate::domain::types::AccessOperation;
use crate::engine::audit::AccessAuditor;
use crate::engine::date_range::DateRangePolicy;
use crate::engine::forecast_grouping::ForecastGroupingEngine;
use crate::export::{self, forecast_sheet::FORECAST_SHEET_NAME, XLSX_CONTENT_TYPE};
use crate::repository::erp_repo::QueryParams;
use crate::repository::forecast_repo::ForecastRepository;

/// 预测报表在审计日志中的 report_id
pub const FORECAST_REPORT_ID: i64 = 0;

pub struct ForecastApi {
    forecast_repo: Arc<ForecastRepository>,
    grouping_engine: ForecastGroupingEngine,
    auditor: Arc<AccessAuditor>,
    date_policy: DateRangePolicy,
}

impl ForecastApi {
    pub fn new(
        forecast_repo: Arc<ForecastRepository>,
        auditor: Arc<AccessAuditor>,
        date_policy: DateRangePolicy,
    ) -> Self {
        Self {
            forecast_repo,
            grouping_engine: ForecastGroupingEngine::new(),
            auditor,
            date_policy,
        }
    }

    /// 查询分组后的销售预测
    pub fn get_forecast(
        &self,
        from_date: Option<NaiveDateTime>,
        to_date: Option<NaiveDateTime>,
        caller: &CallerContext,
    ) -> ApiResult<Vec<CombinedForecast>> {
        info!(user_id = caller.user_id, "查询销售预测");

        let groups = self.auditor.audited(
            AccessOperation::View,
            FORECAST_REPORT_ID,
            caller,
            || -> ApiResult<Vec<CombinedForecast>> {
                let (from, to) = self.date_policy.normalize(from_date, to_date)?;
                self.fetch_grouped(from, to)
            },
        )?;

        info!(groups = groups.len(), "销售预测查询完成");
        Ok(groups)
    }

    /// 导出销售预测为 XLSX
    pub fn export_forecast(
        &self,
        from_date: Option<NaiveDateTime>,
        to_date: Option<NaiveDateTime>,
        caller: &CallerContext,
    ) -> ApiResult<ExportFile> {
        info!(user_id = caller.user_id, "导出销售预测");

        let file = self.auditor.audited(
            AccessOperation::Export,
            FORECAST_REPORT_ID,
            caller,
            || -> ApiResult<ExportFile> {
                let (from, to) = self.date_policy.normalize(from_date, to_date)?;
                let groups = self.fetch_grouped(from, to)?;
                let content = export::render_forecast(&groups, from, to)?;

                Ok(ExportFile {
                    report_name: FORECAST_SHEET_NAME.to_string(),
                    file_name: export::forecast_file_name(from, to),
                    content_type: XLSX_CONTENT_TYPE.to_string(),
                    size_bytes: content.len(),
                    content,
                    generated_at: Local::now().naive_local(),
                })
            },
        )?;

        info!(file_name = %file.file_name, size = file.size_bytes, "销售预测导出完成");
        Ok(file)
    }

    fn fetch_grouped(&self, from: NaiveDateTime, to: NaiveDateTime) -> ApiResult<Vec<CombinedForecast>> {
        let records = self.forecast_repo.fetch_records(&QueryParams::new(from, to))?;
        Ok(self.grouping_engine.group(records))
    }
}

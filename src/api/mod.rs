// ==========================================
// ERP 报表核心 - API 层
// ==========================================
// 职责: 对传输层暴露报表 / 预测 / 审计接口
// ==========================================

pub mod audit_api;
pub mod dto;
pub mod error;
pub mod forecast_api;
pub mod report_api;

pub use audit_api::AuditApi;
pub use dto::{ExportFile, ReportResult};
pub use error::{ApiError, ApiResult};
pub use forecast_api::ForecastApi;
pub use report_api::ReportApi;

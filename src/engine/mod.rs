// ==========================================
// ERP 报表核心 - 引擎层
// ==========================================
// 职责: 实现业务规则（日期窗口 / 预测分组 / 访问审计 / 操作缓存）
// 红线: Engine 不拼 SQL
// ==========================================

pub mod audit;
pub mod date_range;
pub mod forecast_grouping;
pub mod operation_cache;

// 重导出核心引擎
pub use audit::AccessAuditor;
pub use date_range::{DateRangeError, DateRangePolicy, DEFAULT_RANGE_DAYS, MAX_RANGE_DAYS};
pub use forecast_grouping::ForecastGroupingEngine;
pub use operation_cache::OperationCache;

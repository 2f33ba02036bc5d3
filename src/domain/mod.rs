// ==========================================
// ERP 报表核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、解码规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod access_log;
pub mod forecast;
pub mod operation;
pub mod report;
pub mod row;
pub mod types;

// 重导出核心类型
pub use access_log::{AccessLog, AccessStats, CallerContext};
pub use forecast::{CombinedForecast, ForecastDetail, ForecastHeader, ForecastRecord};
pub use operation::Operation;
pub use report::{NewReport, NewReportColumn, ReportColumn, ReportDefinition, ReportUpdate};
pub use row::{RawRow, ScalarValue};
pub use types::{AccessOperation, AccessStatus, ColumnType};

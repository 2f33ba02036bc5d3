// ==========================================
// ERP 报表核心 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 元数据查询全部参数化; ERP 模板只绑定 FromDate / ToDate
// ==========================================

pub mod access_log_repo;
pub mod erp_repo;
pub mod error;
pub mod forecast_repo;
pub mod operation_repo;
pub mod report_repo;

// 重导出核心仓储
pub use access_log_repo::AccessLogRepository;
pub use erp_repo::{ErpQueryExecutor, QueryParams, SqliteErpExecutor};
pub use error::{RepositoryError, RepositoryResult};
pub use forecast_repo::ForecastRepository;
pub use operation_repo::OperationRepository;
pub use report_repo::ReportRepository;

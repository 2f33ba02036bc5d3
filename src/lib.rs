// ==========================================
// ERP 报表核心 - 核心库
// ==========================================
// 职责: 动态报表 / 销售预测查询、访问审计、Excel 导出
// 技术栈: Rust + SQLite (rusqlite) + rust_xlsxwriter
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 元数据 / 审计 / ERP 查询
pub mod repository;

// 引擎层 - 日期窗口 / 预测分组 / 访问审计
pub mod engine;

// 导出层 - XLSX 渲染
pub mod export;

// 配置层 - 进程配置与运行期参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 对象组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AccessOperation, AccessStatus, ColumnType};

// 领域实体
pub use domain::{
    AccessLog, CallerContext, CombinedForecast, ForecastDetail, ForecastHeader, RawRow,
    ReportColumn, ReportDefinition, ScalarValue,
};

// 引擎
pub use engine::{AccessAuditor, DateRangePolicy, ForecastGroupingEngine, OperationCache};

// API
pub use api::{ApiError, ApiResult, AuditApi, ExportFile, ForecastApi, ReportApi, ReportResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "ERP 报表核心";

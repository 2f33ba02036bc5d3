// ==========================================
// ERP 报表核心 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换各层错误为用户可理解的错误消息
// 分类:
// - 客户端错误: 输入非法 / 日期窗口非法 / 资源不存在 / 报表无列
// - 服务端错误: ERP 查询失败 / 导出失败 / 元数据库失败
// ==========================================

use crate::engine::date_range::DateRangeError;
use crate::export::ExportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验错误（客户端, 不重试）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效的日期范围: {0}")]
    InvalidDateRange(String),

    #[error("日期范围过大: {days} 天 (上限 {max_days} 天)")]
    DateRangeTooLarge { days: i64, max_days: i64 },

    // ==========================================
    // 资源错误（客户端）
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("报表没有配置任何列: report_id={0}")]
    NoColumnsFound(i64),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 服务端错误
    // ==========================================
    #[error("ERP 查询执行失败: {0}")]
    QueryExecutionError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),
}

impl ApiError {
    /// 是否为客户端错误（调用方可修正输入, 不应重试）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_)
                | ApiError::InvalidDateRange(_)
                | ApiError::DateRangeTooLarge { .. }
                | ApiError::NotFound(_)
                | ApiError::NoColumnsFound(_)
                | ApiError::InvalidStateTransition { .. }
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::QueryExecutionError(msg) => ApiError::QueryExecutionError(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
        }
    }
}

// ==========================================
// 从引擎 / 导出错误转换
// ==========================================
impl From<DateRangeError> for ApiError {
    fn from(err: DateRangeError) -> Self {
        match err {
            DateRangeError::InvalidDateRange { .. } | DateRangeError::WindowOutOfRange { .. } => {
                ApiError::InvalidDateRange(err.to_string())
            }
            DateRangeError::DateRangeTooLarge { days, max_days } => {
                ApiError::DateRangeTooLarge { days, max_days }
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ERP 报表核心 - 领域类型定义
// ==========================================
// 职责: 报表列类型、访问日志状态、操作类型
// 序列化格式与数据库存储一致（小写字符串 / 整数 ID）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 报表列类型 (Column Type)
// ==========================================
// 决定导出时的单元格写入方式与对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,   // 文本（左对齐）
    Number, // 数值（右对齐, 0.00）
    Date,   // 预格式化日期文本（居中）
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }

    /// 严格解析（用于入参校验）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Some(ColumnType::Text),
            "number" | "numeric" => Some(ColumnType::Number),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }

    /// 宽松解析（用于读取存量数据，未知值按文本处理）
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or(ColumnType::Text)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 访问日志状态 (Access Status)
// ==========================================
// 状态机: pending → success | failed | cancelled（仅一次）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl AccessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::Pending => "pending",
            AccessStatus::Success => "success",
            AccessStatus::Failed => "failed",
            AccessStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(AccessStatus::Pending),
            "success" => Some(AccessStatus::Success),
            "failed" => Some(AccessStatus::Failed),
            "cancelled" => Some(AccessStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AccessStatus::Pending)
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 访问操作类型 (Access Operation)
// ==========================================
// 与 operations 表种子数据对齐: 1=REPORT_VIEW, 2=REPORT_EXPORT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessOperation {
    View,
    Export,
}

impl AccessOperation {
    pub fn id(&self) -> i64 {
        match self {
            AccessOperation::View => 1,
            AccessOperation::Export => 2,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AccessOperation::View => "REPORT_VIEW",
            AccessOperation::Export => "REPORT_EXPORT",
        }
    }
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

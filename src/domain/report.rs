// ==========================================
// ERP 报表核心 - 报表定义领域模型
// ==========================================
// 报表定义 = 参数化查询模板（占位符 FromDate / ToDate）+ 有序输出列
// 红线: 至少 1 列才可执行; 列编码在同一报表内唯一; 列随更新整体替换
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::ColumnType;

// ==========================================
// ReportColumn - 报表输出列
// ==========================================
// 对齐: report_columns 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportColumn {
    pub id: i64,
    pub report_id: i64,
    pub title: String,            // 表头标题
    pub code: String,             // 源字段编码（RawRow 的 key）
    #[serde(rename = "type")]
    pub column_type: ColumnType,  // 声明类型
    pub num: i64,                 // 序号（决定输出顺序）
}

// ==========================================
// ReportDefinition - 报表定义
// ==========================================
// 对齐: reports 表 + report_columns（按 num 排序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub id: i64,
    pub report_type: String,
    pub report_name: String,
    pub department_id: String,    // 部门范围
    pub query_statement: String,  // 查询模板（受信内容）
    pub columns: Vec<ReportColumn>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ReportDefinition {
    /// 是否可执行（至少一列）
    pub fn is_executable(&self) -> bool {
        !self.columns.is_empty()
    }

    /// 查询模板是否为空（空模板按“无数据”执行）
    pub fn has_query(&self) -> bool {
        !self.query_statement.trim().is_empty()
    }
}

// ==========================================
// NewReportColumn - 新建/替换列入参
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReportColumn {
    pub title: String,
    pub code: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub num: i64,
}

impl NewReportColumn {
    pub fn new(title: &str, code: &str, column_type: ColumnType, num: i64) -> Self {
        Self {
            title: title.to_string(),
            code: code.to_string(),
            column_type: column_type.as_str().to_string(),
            num,
        }
    }
}

// ==========================================
// NewReport - 新建报表入参
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub report_type: String,
    pub report_name: String,
    pub department_id: String,
    pub query_statement: String,
    pub columns: Vec<NewReportColumn>,
}

// ==========================================
// ReportUpdate - 更新报表入参
// ==========================================
// 标量字段可选（None = 保持不变）; columns 为完整替换集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    pub report_type: Option<String>,
    pub report_name: Option<String>,
    pub department_id: Option<String>,
    pub query_statement: Option<String>,
    pub columns: Vec<NewReportColumn>,
}

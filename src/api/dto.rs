// ==========================================
// ERP 报表核心 - API 数据传输对象
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::report::ReportColumn;
use crate::domain::row::RawRow;

/// 报表查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub report_id: i64,
    pub report_type: String,
    pub report_name: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
    pub columns: Vec<ReportColumn>,
    pub data: Vec<RawRow>,
}

/// 导出文件
///
/// content 为完整 XLSX 字节; content_type 供传输层设置响应头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub report_name: String,
    pub file_name: String,
    pub content_type: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub content: Vec<u8>,
    pub size_bytes: usize,
    pub generated_at: NaiveDateTime,
}

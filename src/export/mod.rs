// ==========================================
// ERP 报表核心 - 表格导出引擎
// ==========================================
// 两种渲染模式, 均输出单个内存中的 XLSX（字节序列）:
// - 通用报表: 标题横幅 + 表头 + 按列编码投影的数据行
// - 销售预测: 标题横幅 + 每组（组头 / 订单明细 / 预测排程）
// 红线: 任何表格/样式构建错误都是致命的, 不输出残缺文件
// ==========================================

pub mod forecast_sheet;
pub mod report_sheet;
pub mod styles;

use chrono::NaiveDateTime;
use thiserror::Error;

pub use forecast_sheet::render_forecast;
pub use report_sheet::render_report;

/// 文件名中的日期格式
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// XLSX 的 MIME 类型（供传输层使用）
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("表格构建失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("导出参数无效: {0}")]
    InvalidInput(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// 通用报表文件名: <名称(空格→_, /→-)>_<from>_to_<to>.xlsx
pub fn report_file_name(report_name: &str, from: NaiveDateTime, to: NaiveDateTime) -> String {
    let safe_name = report_name.replace(' ', "_").replace('/', "-");
    format!(
        "{}_{}_to_{}.xlsx",
        safe_name,
        from.format(FILE_DATE_FORMAT),
        to.format(FILE_DATE_FORMAT)
    )
}

/// 预测报表文件名: Forecast_Report_<from>_to_<to>.xlsx
pub fn forecast_file_name(from: NaiveDateTime, to: NaiveDateTime) -> String {
    format!(
        "Forecast_Report_{}_to_{}.xlsx",
        from.format(FILE_DATE_FORMAT),
        to.format(FILE_DATE_FORMAT)
    )
}

/// 工作表名称（Excel 限制: ≤31 字符, 不含 []:*?/\ ）
pub(crate) fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    if trimmed.is_empty() {
        "Report".to_string()
    } else {
        trimmed.to_string()
    }
}

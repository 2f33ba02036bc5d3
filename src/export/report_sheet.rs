// ==========================================
// ERP 报表核心 - 通用报表导出
// ==========================================
// 版式:
// - 第 1 行: 标题横幅 "<名称> (<from> to <to>)", 跨全部列合并（单列时为普通单元格）
// - 第 2 行: 表头（列标题）
// - 之后: 每个输入行一行, 按列编码投影; 未声明的键忽略; 缺失/NULL 留空
// 列类型: number → 数值右对齐 0.00; date → 文本居中; text → 文本左对齐
// ==========================================

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::domain::report::ReportColumn;
use crate::domain::row::{RawRow, ScalarValue};
use crate::domain::types::ColumnType;
use crate::export::styles::{column_width, SheetStyles, TITLE_ROW_HEIGHT};
use crate::export::{sheet_name, ExportError, ExportResult, FILE_DATE_FORMAT};

const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

/// 渲染通用报表
///
/// # 返回
/// - Ok(bytes): XLSX 文件内容
/// - Err(InvalidInput): 没有任何列
pub fn render_report(
    report_name: &str,
    from: NaiveDateTime,
    to: NaiveDateTime,
    columns: &[ReportColumn],
    rows: &[RawRow],
) -> ExportResult<Vec<u8>> {
    if columns.is_empty() {
        return Err(ExportError::InvalidInput("报表没有任何列".to_string()));
    }
    let last_col = u16::try_from(columns.len() - 1)
        .map_err(|_| ExportError::InvalidInput(format!("列数过多: {}", columns.len())))?;

    let styles = SheetStyles::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(report_name))?;

    // ===== 标题横幅 =====
    let title = format!(
        "{} ({} to {})",
        report_name,
        from.format(FILE_DATE_FORMAT),
        to.format(FILE_DATE_FORMAT)
    );
    if last_col > 0 {
        worksheet.merge_range(0, 0, 0, last_col, &title, &styles.title)?;
    } else {
        worksheet.write_string_with_format(0, 0, &title, &styles.title)?;
    }
    worksheet.set_row_height(0, TITLE_ROW_HEIGHT)?;

    // ===== 表头 =====
    for (col_idx, column) in columns.iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string_with_format(HEADER_ROW, col, &column.title, &styles.section_header)?;
        worksheet.set_column_width(col, column_width(col))?;
    }

    // ===== 数据行 =====
    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = FIRST_DATA_ROW + row_idx as u32;
        for (col_idx, column) in columns.iter().enumerate() {
            let value = match row.get(&column.code) {
                Some(value) if !value.is_null() => value,
                _ => continue,
            };
            write_value(worksheet, excel_row, col_idx as u16, column.column_type, value, &styles)?;
        }
    }

    debug!(columns = columns.len(), rows = rows.len(), "通用报表渲染完成");
    Ok(workbook.save_to_buffer()?)
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    column_type: ColumnType,
    value: &ScalarValue,
    styles: &SheetStyles,
) -> ExportResult<()> {
    match column_type {
        ColumnType::Number => match value.as_f64() {
            Some(n) => {
                worksheet.write_number_with_format(row, col, n, &styles.number)?;
            }
            None => write_text(worksheet, row, col, &value.to_text(), &styles.number)?,
        },
        ColumnType::Date => write_text(worksheet, row, col, &value.to_text(), &styles.date)?,
        ColumnType::Text => write_text(worksheet, row, col, &value.to_text(), &styles.text)?,
    }
    Ok(())
}

/// 写文本单元格（空串写为带格式的空白单元格）
pub(crate) fn write_text(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> ExportResult<()> {
    if text.is_empty() {
        worksheet.write_blank(row, col, format)?;
    } else {
        worksheet.write_string_with_format(row, col, text, format)?;
    }
    Ok(())
}

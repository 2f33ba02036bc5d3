// ==========================================
// ERP 报表核心 - 销售预测导出
// ==========================================
// 版式:
// - 标题 "FORECAST REPORT (<from> to <to>)" 合并 A:J, 之后空一行
// - 每组:
//   组头 "Group N - Order: <key>" 合并 A:J
//   "ORDER DETAILS" 合并 A:J + 10 列表头 + 订单行, 之后空一行
//   "FORECAST SCHEDULE (<n> records)" 合并 A:H + 8 列表头 + 排程行, 之后空两行
// - 没有表头记录的组跳过（组号仍按输入序号计）
// ==========================================

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::domain::forecast::{CombinedForecast, ForecastDetail, ForecastHeader};
use crate::domain::row::parse_finite;
use crate::export::report_sheet::write_text;
use crate::export::styles::{
    column_width, SheetStyles, COLUMN_WIDTHS, GROUP_ROW_HEIGHT, TITLE_ROW_HEIGHT,
};
use crate::export::{ExportResult, FILE_DATE_FORMAT};

pub const FORECAST_SHEET_NAME: &str = "Forecast Report";

/// 订单明细表头（A..J）
pub const ORDER_HEADERS: [&str; 10] = [
    "Đơn hàng",
    "Mã KH",
    "Tên KH",
    "Mã Sản Phẩm",
    "Tên Sản Phẩm",
    "Quy cách",
    "Số lượng đặt",
    "Số lượng đã giao",
    "Đơn giá",
    "Ngày dự định giao",
];

/// 预测排程表头（A..H）
pub const SCHEDULE_HEADERS: [&str; 8] = [
    "Mã dự đoán",
    "Tên KH",
    "Mã Sản Phẩm",
    "Tên Sản Phẩm",
    "Quy cách",
    "Số lượng đặt",
    "Đơn giá",
    "Ngày",
];

const LAST_ORDER_COL: u16 = 9; // J
const LAST_SCHEDULE_COL: u16 = 7; // H

/// 单元格种类
#[derive(Debug, Clone, Copy)]
enum CellKind {
    Text,
    Number,
    Date,
}

const ORDER_KINDS: [CellKind; 10] = [
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Number,
    CellKind::Number,
    CellKind::Number,
    CellKind::Date,
];

const SCHEDULE_KINDS: [CellKind; 8] = [
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Text,
    CellKind::Number,
    CellKind::Number,
    CellKind::Date,
];

/// 渲染预测报表
pub fn render_forecast(
    groups: &[CombinedForecast],
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> ExportResult<Vec<u8>> {
    let styles = SheetStyles::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(FORECAST_SHEET_NAME)?;

    // ===== 标题 =====
    let title = format!(
        "FORECAST REPORT ({} to {})",
        from.format(FILE_DATE_FORMAT),
        to.format(FILE_DATE_FORMAT)
    );
    worksheet.merge_range(0, 0, 0, LAST_ORDER_COL, &title, &styles.title)?;
    worksheet.set_row_height(0, TITLE_ROW_HEIGHT)?;
    let mut current_row: u32 = 2;

    // ===== 分组 =====
    let mut rendered = 0usize;
    for (group_idx, group) in groups.iter().enumerate() {
        let Some(order_key) = group.group_key() else {
            continue;
        };

        // --- 组头 ---
        let group_title = format!("Group {} - Order: {}", group_idx + 1, order_key);
        worksheet.merge_range(current_row, 0, current_row, LAST_ORDER_COL, &group_title, &styles.group_header)?;
        worksheet.set_row_height(current_row, GROUP_ROW_HEIGHT)?;
        current_row += 1;

        // --- 订单明细 ---
        worksheet.merge_range(
            current_row,
            0,
            current_row,
            LAST_ORDER_COL,
            "ORDER DETAILS",
            &styles.section_header,
        )?;
        current_row += 1;
        write_headers(worksheet, current_row, &ORDER_HEADERS, &styles.section_header)?;
        current_row += 1;

        for header in &group.headers {
            write_record(worksheet, current_row, &header_cells(header), &ORDER_KINDS, &styles)?;
            current_row += 1;
        }
        current_row += 1;

        // --- 预测排程 ---
        if !group.details.is_empty() {
            let schedule_title = format!("FORECAST SCHEDULE ({} records)", group.details.len());
            worksheet.merge_range(
                current_row,
                0,
                current_row,
                LAST_SCHEDULE_COL,
                &schedule_title,
                &styles.schedule_header,
            )?;
            current_row += 1;
            write_headers(worksheet, current_row, &SCHEDULE_HEADERS, &styles.schedule_header)?;
            current_row += 1;

            for detail in &group.details {
                write_record(worksheet, current_row, &detail_cells(detail), &SCHEDULE_KINDS, &styles)?;
                current_row += 1;
            }
            current_row += 2;
        }

        rendered += 1;
    }

    for col in 0..COLUMN_WIDTHS.len() as u16 {
        worksheet.set_column_width(col, column_width(col))?;
    }

    debug!(groups = groups.len(), rendered, rows = current_row, "预测报表渲染完成");
    Ok(workbook.save_to_buffer()?)
}

fn header_cells(header: &ForecastHeader) -> [&str; 10] {
    [
        &header.order_id,
        &header.customer_code,
        &header.customer_name,
        &header.item_code,
        &header.item_name,
        &header.specification,
        &header.order_qty,
        &header.delivered_qty,
        &header.unit_price,
        &header.planned_delivery_date,
    ]
}

fn detail_cells(detail: &ForecastDetail) -> [&str; 8] {
    [
        &detail.forecast_id,
        &detail.customer_name,
        &detail.item_code,
        &detail.item_name,
        &detail.specification,
        &detail.forecast_qty,
        &detail.unit_price,
        &detail.forecast_date,
    ]
}

fn write_headers(worksheet: &mut Worksheet, row: u32, titles: &[&str], format: &Format) -> ExportResult<()> {
    for (col, title) in titles.iter().enumerate() {
        worksheet.write_string_with_format(row, col as u16, *title, format)?;
    }
    Ok(())
}

fn write_record(
    worksheet: &mut Worksheet,
    row: u32,
    cells: &[&str],
    kinds: &[CellKind],
    styles: &SheetStyles,
) -> ExportResult<()> {
    for (col, (value, kind)) in cells.iter().zip(kinds).enumerate() {
        let col = col as u16;
        match kind {
            CellKind::Text => write_text(worksheet, row, col, value, &styles.text)?,
            CellKind::Date => write_text(worksheet, row, col, value, &styles.date)?,
            CellKind::Number => match parse_finite(value) {
                Some(n) => {
                    worksheet.write_number_with_format(row, col, n, &styles.number)?;
                }
                None => write_text(worksheet, row, col, value, &styles.number)?,
            },
        }
    }
    Ok(())
}

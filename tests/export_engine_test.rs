// ==========================================
// 表格导出引擎测试
// ==========================================
// 测试目标: 生成的 XLSX 回读（calamine）后版式与取值正确
// ==========================================


use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use erp_reporting::domain::{
    ColumnType, CombinedForecast, ForecastDetail, ForecastHeader, RawRow, ReportColumn, ScalarValue,
};
use erp_reporting::export::forecast_sheet::{FORECAST_SHEET_NAME, ORDER_HEADERS, SCHEDULE_HEADERS};
use erp_reporting::export::{render_forecast, render_report, ExportError};
use test_helpers::at;

// ==========================================
// 测试辅助函数
// ==========================================

fn read_sheet(bytes: Vec<u8>, sheet: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("invalid xlsx");
    workbook.worksheet_range(sheet).expect("sheet missing")
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("Expected string at ({}, {}), got {:?}", row, col, other),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(n)) => *n,
        Some(Data::Int(n)) => *n as f64,
        other => panic!("Expected number at ({}, {}), got {:?}", row, col, other),
    }
}

fn is_empty(range: &Range<Data>, row: u32, col: u32) -> bool {
    matches!(range.get_value((row, col)), None | Some(Data::Empty))
}

fn column(id: i64, title: &str, code: &str, column_type: ColumnType) -> ReportColumn {
    ReportColumn {
        id,
        report_id: 1,
        title: title.to_string(),
        code: code.to_string(),
        column_type,
        num: id,
    }
}

fn row(pairs: &[(&str, ScalarValue)]) -> RawRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn header(order_id: &str, item: &str, qty: &str, price: &str) -> ForecastHeader {
    ForecastHeader {
        order_id: order_id.to_string(),
        customer_code: "C001".to_string(),
        customer_name: "Acme Co".to_string(),
        item_code: item.to_string(),
        item_name: format!("Widget {}", item),
        specification: "10x10".to_string(),
        order_qty: qty.to_string(),
        delivered_qty: "0".to_string(),
        unit_price: price.to_string(),
        planned_delivery_date: "20/03/2025".to_string(),
    }
}

fn detail(forecast_id: &str, item: &str, qty: &str) -> ForecastDetail {
    ForecastDetail {
        forecast_id: forecast_id.to_string(),
        customer_name: "Acme Co".to_string(),
        item_code: item.to_string(),
        item_name: format!("Widget {}", item),
        specification: "10x10".to_string(),
        forecast_qty: qty.to_string(),
        unit_price: "12.5".to_string(),
        forecast_date: "01/04/2025".to_string(),
    }
}

// ==========================================
// 通用报表
// ==========================================

#[test]
fn test_report_sheet_layout() {
    let columns = vec![
        column(1, "Alpha", "a", ColumnType::Text),
        column(2, "Beta", "b", ColumnType::Number),
    ];
    let rows = vec![
        row(&[("a", "x".into()), ("b", ScalarValue::Number(1.5)), ("zzz", "ignored".into())]),
        row(&[("a", ScalarValue::Null), ("b", "7".into())]),
        row(&[("b", "n/a".into())]),
    ];

    let bytes = render_report(
        "Demo",
        at(2025, 3, 1, 0, 0, 0),
        at(2025, 3, 31, 23, 59, 59),
        &columns,
        &rows,
    )
    .expect("render failed");
    let range = read_sheet(bytes, "Demo");

    assert_eq!(text(&range, 0, 0), "Demo (2025-03-01 to 2025-03-31)");
    assert_eq!(text(&range, 1, 0), "Alpha");
    assert_eq!(text(&range, 1, 1), "Beta");

    assert_eq!(text(&range, 2, 0), "x");
    assert_eq!(number(&range, 2, 1), 1.5);
    // 未声明的字段不输出
    assert!(is_empty(&range, 2, 2));

    assert!(is_empty(&range, 3, 0));
    assert_eq!(number(&range, 3, 1), 7.0);

    // 数值列中无法解析的值按文本输出
    assert_eq!(text(&range, 4, 1), "n/a");
    assert!(is_empty(&range, 5, 0));
}

#[test]
fn test_report_sheet_with_no_rows_keeps_header() {
    let columns = vec![column(1, "Only", "only", ColumnType::Date)];

    let bytes = render_report("Single", at(2025, 1, 1, 0, 0, 0), at(2025, 1, 2, 0, 0, 0), &columns, &[])
        .expect("render failed");
    let range = read_sheet(bytes, "Single");

    assert_eq!(text(&range, 0, 0), "Single (2025-01-01 to 2025-01-02)");
    assert_eq!(text(&range, 1, 0), "Only");
    assert!(is_empty(&range, 2, 0));
}

#[test]
fn test_report_sheet_writes_non_finite_numbers_as_text() {
    let columns = vec![column(1, "Value", "v", ColumnType::Number)];
    let rows = vec![
        row(&[("v", "inf".into())]),
        row(&[("v", "NaN".into())]),
        row(&[("v", ScalarValue::Number(f64::INFINITY))]),
        row(&[("v", ScalarValue::Integer(42))]),
    ];

    let bytes = render_report("Edge", at(2025, 1, 1, 0, 0, 0), at(2025, 1, 2, 0, 0, 0), &columns, &rows)
        .expect("render failed");
    let range = read_sheet(bytes, "Edge");

    assert_eq!(text(&range, 2, 0), "inf");
    assert_eq!(text(&range, 3, 0), "NaN");
    assert_eq!(text(&range, 4, 0), "inf");
    assert_eq!(number(&range, 5, 0), 42.0);
}

#[test]
fn test_report_sheet_requires_columns() {
    let err = render_report("Empty", at(2025, 1, 1, 0, 0, 0), at(2025, 1, 2, 0, 0, 0), &[], &[]).unwrap_err();
    assert!(matches!(err, ExportError::InvalidInput(_)));
}

// ==========================================
// 销售预测
// ==========================================

#[test]
fn test_forecast_sheet_layout() {
    let groups = vec![
        // 无表头的组跳过, 但占用组号
        CombinedForecast {
            headers: vec![],
            details: vec![detail("FC09", "ITEM-Z", "1")],
        },
        CombinedForecast {
            headers: vec![
                header("220-0001-0001", "ITEM-A", "100", "12.5"),
                header("220-0002-0001", "ITEM-A", "30", ""),
            ],
            details: vec![detail("FC01", "ITEM-A", "80"), detail("FC02", "ITEM-A", "20")],
        },
        CombinedForecast {
            headers: vec![header("220-0001-0002", "ITEM-B", "50", "8")],
            details: vec![detail("FC03", "ITEM-B", "5")],
        },
    ];

    let bytes = render_forecast(&groups, at(2025, 3, 1, 0, 0, 0), at(2025, 3, 31, 23, 59, 59))
        .expect("render failed");
    let range = read_sheet(bytes, FORECAST_SHEET_NAME);

    assert_eq!(text(&range, 0, 0), "FORECAST REPORT (2025-03-01 to 2025-03-31)");
    assert!(is_empty(&range, 1, 0));

    // --- 第 2 组 ---
    assert_eq!(text(&range, 2, 0), "Group 2 - Order: ITEM-A");
    assert_eq!(text(&range, 3, 0), "ORDER DETAILS");
    for (col, title) in ORDER_HEADERS.iter().enumerate() {
        assert_eq!(text(&range, 4, col as u32), *title);
    }
    assert_eq!(text(&range, 5, 0), "220-0001-0001");
    assert_eq!(number(&range, 5, 6), 100.0);
    assert_eq!(number(&range, 5, 8), 12.5);
    assert_eq!(text(&range, 5, 9), "20/03/2025");
    assert_eq!(text(&range, 6, 0), "220-0002-0001");
    assert!(is_empty(&range, 6, 8));

    assert!(is_empty(&range, 7, 0));
    assert_eq!(text(&range, 8, 0), "FORECAST SCHEDULE (2 records)");
    for (col, title) in SCHEDULE_HEADERS.iter().enumerate() {
        assert_eq!(text(&range, 9, col as u32), *title);
    }
    assert_eq!(text(&range, 10, 0), "FC01");
    assert_eq!(number(&range, 10, 5), 80.0);
    assert_eq!(text(&range, 10, 7), "01/04/2025");
    assert_eq!(text(&range, 11, 0), "FC02");

    // --- 第 3 组（排程后空两行）---
    assert!(is_empty(&range, 12, 0));
    assert!(is_empty(&range, 13, 0));
    assert_eq!(text(&range, 14, 0), "Group 3 - Order: ITEM-B");
    assert!(is_empty(&range, 18, 0));
    assert_eq!(text(&range, 19, 0), "FORECAST SCHEDULE (1 records)");
}

#[test]
fn test_forecast_sheet_writes_non_finite_numbers_as_text() {
    let groups = vec![CombinedForecast {
        headers: vec![header("220-0001-0001", "ITEM-A", "infinity", "NaN")],
        details: vec![detail("FC01", "ITEM-A", "-inf")],
    }];

    let bytes = render_forecast(&groups, at(2025, 3, 1, 0, 0, 0), at(2025, 3, 31, 0, 0, 0))
        .expect("render failed");
    let range = read_sheet(bytes, FORECAST_SHEET_NAME);

    assert_eq!(text(&range, 2, 0), "Group 1 - Order: ITEM-A");
    assert_eq!(text(&range, 5, 6), "infinity");
    assert_eq!(number(&range, 5, 7), 0.0);
    assert_eq!(text(&range, 5, 8), "NaN");
    assert_eq!(text(&range, 9, 5), "-inf");
}

#[test]
fn test_forecast_sheet_without_groups_has_only_title() {
    let bytes = render_forecast(&[], at(2025, 3, 1, 0, 0, 0), at(2025, 3, 7, 0, 0, 0)).expect("render failed");
    let range = read_sheet(bytes, FORECAST_SHEET_NAME);

    assert_eq!(text(&range, 0, 0), "FORECAST REPORT (2025-03-01 to 2025-03-07)");
    assert!(is_empty(&range, 2, 0));
}

// ==========================================
// ERP 报表核心 - 导出样式
// ==========================================

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

/// 固定列宽（A..J）
pub const COLUMN_WIDTHS: [f64; 10] = [20.0, 20.0, 30.0, 20.0, 30.0, 25.0, 15.0, 18.0, 15.0, 18.0];

/// 超出固定列宽表的列使用的宽度
pub const DEFAULT_COLUMN_WIDTH: f64 = 18.0;

pub const TITLE_ROW_HEIGHT: f64 = 30.0;
pub const GROUP_ROW_HEIGHT: f64 = 25.0;

/// 2 位小数的数值格式
pub const NUMBER_FORMAT: &str = "0.00";

pub fn column_width(col: u16) -> f64 {
    COLUMN_WIDTHS
        .get(col as usize)
        .copied()
        .unwrap_or(DEFAULT_COLUMN_WIDTH)
}

// ==========================================
// SheetStyles - 一次导出使用的全部格式
// ==========================================
#[derive(Debug, Clone)]
pub struct SheetStyles {
    pub title: Format,
    pub group_header: Format,
    pub section_header: Format,
    pub schedule_header: Format,
    pub text: Format,
    pub number: Format,
    pub date: Format,
}

impl SheetStyles {
    pub fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x1F4E78))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Medium),
            group_header: Format::new()
                .set_bold()
                .set_font_size(12)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x4472C4))
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Medium),
            section_header: header_format(0xD9E1F2),
            schedule_header: header_format(0xE2EFDA),
            text: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter),
            number: Format::new()
                .set_align(FormatAlign::Right)
                .set_align(FormatAlign::VerticalCenter)
                .set_num_format(NUMBER_FORMAT),
            date: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
        }
    }
}

impl Default for SheetStyles {
    fn default() -> Self {
        Self::new()
    }
}

fn header_format(fill: u32) -> Format {
    Format::new()
        .set_bold()
        .set_font_size(10)
        .set_font_color(Color::Black)
        .set_background_color(Color::RGB(fill))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

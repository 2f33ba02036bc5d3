// ==========================================
// ERP 报表核心 - 无模式行 (RawRow)
// ==========================================
// ERP 查询结果的列在编译期未知:
// - 单元值用标签联合 ScalarValue 表达
// - 一行 = 有序的 列名 → ScalarValue 映射（顺序与结果集一致）
// ==========================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元值
///
/// JSON 序列化为原生值（null / bool / number / string）
///
/// 整数单独保存为 Integer, 超过 2^53 的值不丢精度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

/// 一行查询结果
pub type RawRow = IndexMap<String, ScalarValue>;

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// 是否为“空”（NULL 或去空白后为空串）
    pub fn is_blank(&self) -> bool {
        match self {
            ScalarValue::Null => true,
            ScalarValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为文本（NULL → 空串，整数值不带小数部分）
    pub fn to_text(&self) -> String {
        match self {
            ScalarValue::Null => String::new(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Integer(i) => i.to_string(),
            ScalarValue::Number(n) => format_number(*n),
            ScalarValue::Text(s) => s.clone(),
        }
    }

    /// 尝试转为有限数值（文本会按 trim 后解析）
    ///
    /// "inf" / "NaN" 之类的非有限值返回 None
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            ScalarValue::Integer(i) => *i as f64,
            ScalarValue::Number(n) => *n,
            ScalarValue::Text(s) => parse_finite(s)?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

/// 解析有限浮点数（trim 后）
pub fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Integer(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ScalarValue::Null)
    }
}

/// 读取行内字段的文本值（缺失 / NULL → 空串）
pub fn text_field(row: &RawRow, key: &str) -> String {
    row.get(key).map(ScalarValue::to_text).unwrap_or_default()
}

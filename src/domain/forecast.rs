// ==========================================
// ERP 报表核心 - 销售预测领域模型
// ==========================================
// 预测查询 = 订单明细流 UNION ALL 预测排程流（扁平化到同一行形状）
// 查询返回后立即解码为 Header / Detail 两种显式变体,
// 扁平行形状不再向后传递
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::row::{text_field, RawRow};

// ==========================================
// ForecastHeader - 订单明细（表头记录）
// ==========================================
// JSON 字段名保持 ERP 别名（TD01..TD08）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastHeader {
    #[serde(rename = "TD01")]
    pub order_id: String,              // 单别-单号-序号
    #[serde(rename = "MKH")]
    pub customer_code: String,
    #[serde(rename = "KH01")]
    pub customer_name: String,
    #[serde(rename = "TD02")]
    pub item_code: String,             // 品号（分组键）
    #[serde(rename = "TD03")]
    pub item_name: String,
    #[serde(rename = "TD04")]
    pub specification: String,
    #[serde(rename = "TD05")]
    pub order_qty: String,
    #[serde(rename = "TD06")]
    pub delivered_qty: String,
    #[serde(rename = "TD07")]
    pub unit_price: String,
    #[serde(rename = "TD08")]
    pub planned_delivery_date: String, // dd/mm/yyyy
}

impl ForecastHeader {
    /// 分组键
    pub fn group_key(&self) -> &str {
        &self.item_code
    }
}

// ==========================================
// ForecastDetail - 预测排程（明细记录）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDetail {
    #[serde(rename = "TD09")]
    pub forecast_id: String,           // 预测单号
    #[serde(rename = "KH02")]
    pub customer_name: String,
    #[serde(rename = "TD10")]
    pub item_code: String,             // 品号（关联键）
    #[serde(rename = "TD11")]
    pub item_name: String,
    #[serde(rename = "TD12")]
    pub specification: String,
    #[serde(rename = "TD13")]
    pub forecast_qty: String,
    #[serde(rename = "TD14")]
    pub unit_price: String,
    #[serde(rename = "TD15")]
    pub forecast_date: String,         // dd/mm/yyyy
}

impl ForecastDetail {
    /// 关联键
    ///
    /// 注意: 按 item_code 关联而不是按自然标识 forecast_id,
    /// 与线上行为保持一致
    pub fn join_key(&self) -> &str {
        &self.item_code
    }
}

// ==========================================
// ForecastRecord - 解码后的单行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastRecord {
    Header(ForecastHeader),
    Detail(ForecastDetail),
}

impl ForecastRecord {
    /// 解码扁平行
    ///
    /// # 规则
    /// - TD01 非空串 → Header（仅空白也算非空）
    /// - 否则 TD09 非空串 → Detail
    /// - 否则 → None（丢弃）
    pub fn decode(row: &RawRow) -> Option<Self> {
        let order_id = text_field(row, "TD01");
        if !order_id.is_empty() {
            return Some(ForecastRecord::Header(ForecastHeader {
                order_id,
                customer_code: text_field(row, "MKH"),
                customer_name: text_field(row, "KH01"),
                item_code: text_field(row, "TD02"),
                item_name: text_field(row, "TD03"),
                specification: text_field(row, "TD04"),
                order_qty: text_field(row, "TD05"),
                delivered_qty: text_field(row, "TD06"),
                unit_price: text_field(row, "TD07"),
                planned_delivery_date: text_field(row, "TD08"),
            }));
        }

        let forecast_id = text_field(row, "TD09");
        if !forecast_id.is_empty() {
            return Some(ForecastRecord::Detail(ForecastDetail {
                forecast_id,
                customer_name: text_field(row, "KH02"),
                item_code: text_field(row, "TD10"),
                item_name: text_field(row, "TD11"),
                specification: text_field(row, "TD12"),
                forecast_qty: text_field(row, "TD13"),
                unit_price: text_field(row, "TD14"),
                forecast_date: text_field(row, "TD15"),
            }));
        }

        None
    }
}

// ==========================================
// CombinedForecast - 分组结果
// ==========================================
// 明细为空的分组不会输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedForecast {
    #[serde(rename = "columns")]
    pub headers: Vec<ForecastHeader>,
    pub details: Vec<ForecastDetail>,
}

impl CombinedForecast {
    /// 分组键（取第一条表头记录的品号）
    pub fn group_key(&self) -> Option<&str> {
        self.headers.first().map(ForecastHeader::group_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::ScalarValue;

    fn row(pairs: &[(&str, ScalarValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_decode_header_takes_precedence() {
        let r = row(&[
            ("TD01", "SO-001-0001".into()),
            ("TD02", "ITEM-A".into()),
            ("TD05", ScalarValue::Number(10.0)),
            ("TD09", "FC-1".into()),
        ]);

        match ForecastRecord::decode(&r) {
            Some(ForecastRecord::Header(h)) => {
                assert_eq!(h.order_id, "SO-001-0001");
                assert_eq!(h.item_code, "ITEM-A");
                assert_eq!(h.order_qty, "10");
            }
            other => panic!("Expected Header, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_detail_and_drop() {
        let detail = row(&[
            ("TD01", ScalarValue::Null),
            ("TD09", "FC-1".into()),
            ("TD10", "ITEM-A".into()),
        ]);
        assert!(matches!(
            ForecastRecord::decode(&detail),
            Some(ForecastRecord::Detail(d)) if d.join_key() == "ITEM-A"
        ));

        let empty = row(&[
            ("TD01", "".into()),
            ("TD09", ScalarValue::Null),
            ("TD10", "ITEM-A".into()),
        ]);
        assert_eq!(ForecastRecord::decode(&empty), None);
    }

    #[test]
    fn test_whitespace_ids_still_classify() {
        let header = row(&[("TD01", "  ".into()), ("TD09", "FC-1".into())]);
        assert!(matches!(
            ForecastRecord::decode(&header),
            Some(ForecastRecord::Header(h)) if h.order_id == "  "
        ));

        let detail = row(&[("TD01", ScalarValue::Null), ("TD09", " ".into())]);
        assert!(matches!(ForecastRecord::decode(&detail), Some(ForecastRecord::Detail(_))));
    }
}

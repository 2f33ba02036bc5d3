// ==========================================
// ERP 报表核心 - 预测分组引擎
// ==========================================
// 输入: 已解码的 ForecastRecord 序列（Header / Detail 交错）
// 输出: 按品号分组的 CombinedForecast 列表
// 规则:
// 1. Header 按 item_code（TD02）分桶, 首次出现时建桶
// 2. Detail 按自身 item_code（TD10）分桶
// 3. 用 Header 的分组键查找 Detail 桶并挂接
// 4. 挂接后明细为空的分组丢弃
// 顺序: 分组按键首次出现顺序; 组内保持输入顺序
// 红线: 分组本身不报错, 未匹配的行静默丢弃（debug 计数）
// ==========================================

use crate::domain::forecast::{CombinedForecast, ForecastDetail, ForecastRecord};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ForecastGroupingEngine - 预测分组引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ForecastGroupingEngine;

impl ForecastGroupingEngine {
    pub fn new() -> Self {
        Self
    }

    /// 分组并挂接明细
    pub fn group(&self, records: Vec<ForecastRecord>) -> Vec<CombinedForecast> {
        let mut groups: IndexMap<String, CombinedForecast> = IndexMap::new();
        let mut details_by_key: HashMap<String, Vec<ForecastDetail>> = HashMap::new();
        let mut detail_count = 0usize;

        for record in records {
            match record {
                ForecastRecord::Header(header) => {
                    groups
                        .entry(header.item_code.clone())
                        .or_default()
                        .headers
                        .push(header);
                }
                ForecastRecord::Detail(detail) => {
                    detail_count += 1;
                    details_by_key
                        .entry(detail.item_code.clone())
                        .or_default()
                        .push(detail);
                }
            }
        }

        let group_count = groups.len();
        let mut attached_details = 0usize;

        let combined: Vec<CombinedForecast> = groups
            .into_iter()
            .filter_map(|(key, mut group)| {
                group.details = details_by_key.remove(&key).unwrap_or_default();
                if group.details.is_empty() {
                    return None;
                }
                attached_details += group.details.len();
                Some(group)
            })
            .collect();

        debug!(
            groups = group_count,
            kept = combined.len(),
            dropped_groups = group_count - combined.len(),
            unmatched_details = detail_count - attached_details,
            "预测分组完成"
        );

        combined
    }
}

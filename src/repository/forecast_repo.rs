// ==========================================
// ERP 报表核心 - 销售预测数据仓储
// ==========================================
// 固定查询模板:
// - TD 流: 销售订单明细 COPTD（关联 COPTC 订单头 / COPMA 客户）,
//          按订单日期 TC039 过滤 [FromDate, ToDate]
// - MF 流: 预测排程 COPMF（关联 COPME 预测头 / COPMA 客户）
// 两流 UNION ALL 扁平化为同一行形状, 按 TD01, TD02 排序
// ==========================================

use std::sync::Arc;

use crate::domain::forecast::ForecastRecord;
use crate::repository::erp_repo::{ErpQueryExecutor, QueryParams};
use crate::repository::error::RepositoryResult;
use tracing::debug;

/// 预测查询模板（SQLite 方言）
pub const FORECAST_QUERY: &str = r#"
WITH TD AS (
    SELECT
        TRIM(TD001) || '-' || TRIM(TD002) || '-' || TRIM(TD003) AS TD01,
        TC004 AS MKH,
        MA002 AS KH01,
        TD004 AS TD02,
        TD005 AS TD03,
        TD006 AS TD04,
        TD008 AS TD05,
        TD009 AS TD06,
        TD011 AS TD07,
        strftime('%d/%m/%Y', TD013) AS TD08
    FROM COPTD
    LEFT JOIN COPTC ON TC001 = TD001 AND TC002 = TD002
    LEFT JOIN COPMA ON MA001 = TC004
    WHERE TC039 >= :FromDate AND TC039 <= :ToDate
),
MF AS (
    SELECT
        TRIM(MF001) AS TD09,
        MA002 AS KH02,
        MF003 AS TD10,
        MF004 AS TD11,
        MF005 AS TD12,
        MF008 AS TD13,
        MF012 AS TD14,
        CASE
            WHEN date(MF006) IS NOT NULL THEN strftime('%d/%m/%Y', MF006)
            ELSE NULL
        END AS TD15
    FROM COPMF
    LEFT JOIN COPME ON ME001 = MF001
    LEFT JOIN COPMA ON MA001 = ME002
)
SELECT
    TD01, MKH, KH01, TD02, TD03, TD04, TD05, TD06, TD07, TD08,
    NULL AS TD09, NULL AS KH02, NULL AS TD10, NULL AS TD11,
    NULL AS TD12, NULL AS TD13, NULL AS TD14, NULL AS TD15
FROM TD
UNION ALL
SELECT
    NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL,
    TD09, KH02, TD10, TD11, TD12, TD13, TD14, TD15
FROM MF
ORDER BY TD01, TD02
"#;

// ==========================================
// ForecastRepository - 预测查询仓储
// ==========================================
pub struct ForecastRepository {
    executor: Arc<dyn ErpQueryExecutor>,
}

impl ForecastRepository {
    pub fn new(executor: Arc<dyn ErpQueryExecutor>) -> Self {
        Self { executor }
    }

    /// 执行预测查询并立即解码为 Header / Detail
    ///
    /// 两个标识字段都为空的行被丢弃（仅记录 debug 日志）
    pub fn fetch_records(&self, params: &QueryParams) -> RepositoryResult<Vec<ForecastRecord>> {
        let rows = self.executor.execute(FORECAST_QUERY, params)?;
        let total = rows.len();

        let records: Vec<ForecastRecord> = rows.iter().filter_map(ForecastRecord::decode).collect();

        debug!(
            rows = total,
            decoded = records.len(),
            dropped = total - records.len(),
            "预测行解码完成"
        );
        Ok(records)
    }
}

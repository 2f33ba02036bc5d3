// ==========================================
// ERP 报表核心 - 配置管理器
// ==========================================
// 职责: 运行期可调参数的读取与写入
// 存储: config_kv 表 (scope_id='global')
// 规则: 缺失或非法值回退到默认值并告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::date_range::{DateRangePolicy, DEFAULT_RANGE_DAYS, MAX_RANGE_DAYS};
use crate::repository::erp_repo::DEFAULT_DATE_PARAM_FORMAT;
use chrono::format::{Item, StrftimeItems};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 窗口天数配置上限（约 100 年）
pub const RANGE_DAYS_CEILING: i64 = 36_500;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 元数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取全部 global 配置（按 key 排序）
    pub fn get_all_global(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global'")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut config = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config.insert(key, value);
        }
        Ok(config)
    }

    // ===== 报表查询窗口 =====

    /// 默认查询窗口天数（report.default_range_days）
    pub fn get_default_range_days(&self) -> i64 {
        self.get_positive_days(config_keys::DEFAULT_RANGE_DAYS, DEFAULT_RANGE_DAYS)
    }

    /// 最大查询跨度天数（report.max_range_days）
    pub fn get_max_range_days(&self) -> i64 {
        self.get_positive_days(config_keys::MAX_RANGE_DAYS, MAX_RANGE_DAYS)
    }

    /// 组装日期窗口策略
    ///
    /// 默认窗口大于最大跨度时, 默认窗口收敛到最大跨度
    pub fn date_range_policy(&self) -> DateRangePolicy {
        let default_days = self.get_default_range_days();
        let max_days = self.get_max_range_days();

        if default_days > max_days {
            warn!(default_days, max_days, "默认查询窗口大于最大跨度, 使用最大跨度");
            return DateRangePolicy::new(max_days, max_days);
        }
        DateRangePolicy::new(default_days, max_days)
    }

    // ===== ERP 查询参数 =====

    /// ERP 日期参数格式（erp.date_param_format, strftime 语法）
    pub fn get_erp_date_param_format(&self) -> String {
        match self.read_value(config_keys::ERP_DATE_PARAM_FORMAT) {
            Some(fmt) if is_valid_strftime(&fmt) => fmt,
            Some(fmt) => {
                warn!(key = config_keys::ERP_DATE_PARAM_FORMAT, value = %fmt, "日期格式非法, 使用默认值");
                DEFAULT_DATE_PARAM_FORMAT.to_string()
            }
            None => DEFAULT_DATE_PARAM_FORMAT.to_string(),
        }
    }

    // ===== 内部方法 =====

    /// 读取配置, 读取失败视为缺失（告警）
    fn read_value(&self, key: &str) -> Option<String> {
        match self.get_global_config_value(key) {
            Ok(value) => value.map(|v| v.trim().to_string()),
            Err(e) => {
                warn!(key, error = %e, "配置读取失败, 使用默认值");
                None
            }
        }
    }

    fn get_positive_days(&self, key: &str, default: i64) -> i64 {
        let Some(raw) = self.read_value(key) else {
            return default;
        };

        match raw.parse::<i64>() {
            Ok(days) if (1..=RANGE_DAYS_CEILING).contains(&days) => days,
            _ => {
                warn!(key, value = %raw, default, "配置值非法, 使用默认值");
                default
            }
        }
    }
}

fn is_valid_strftime(fmt: &str) -> bool {
    !fmt.is_empty() && !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 报表查询窗口
    pub const DEFAULT_RANGE_DAYS: &str = "report.default_range_days";
    pub const MAX_RANGE_DAYS: &str = "report.max_range_days";

    // ERP 查询
    pub const ERP_DATE_PARAM_FORMAT: &str = "erp.date_param_format";
}

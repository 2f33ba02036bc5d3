// ==========================================
// ERP 报表核心 - 进程级配置
// ==========================================
// 元数据库路径: ERP_REPORTING_DB_PATH, 缺省为用户数据目录
// ERP 数据库路径: ERP_REPORTING_ERP_DB_PATH, 缺省为 ./erp.db
// ==========================================

use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ERP_REPORTING_DB_PATH";
pub const ERP_DB_PATH_ENV: &str = "ERP_REPORTING_ERP_DB_PATH";

const DB_FILE_NAME: &str = "erp_reporting.db";
const DEFAULT_ERP_DB_PATH: &str = "./erp.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 元数据库（报表定义 / 审计日志 / config_kv）
    pub db_path: String,
    /// ERP 数据库（只读查询）
    pub erp_db_path: String,
}

impl AppConfig {
    pub fn new(db_path: impl Into<String>, erp_db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            erp_db_path: erp_db_path.into(),
        }
    }

    /// 从环境变量加载
    pub fn from_env() -> Self {
        Self {
            db_path: get_default_db_path(),
            erp_db_path: env_path(ERP_DB_PATH_ENV).unwrap_or_else(|| DEFAULT_ERP_DB_PATH.to_string()),
        }
    }
}

/// 元数据库默认路径
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Some(path) = env_path(DB_PATH_ENV) {
        return path;
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("erp-reporting-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("erp-reporting");
        }

        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&path).is_ok() {
            path = path.join(DB_FILE_NAME);
        } else {
            path = PathBuf::from(format!("./{}", DB_FILE_NAME));
        }
    }

    path.to_string_lossy().to_string()
}

fn env_path(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

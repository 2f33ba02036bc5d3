// ==========================================
// ERP 报表核心 - 配置层
// ==========================================
// 职责: 进程级路径配置 + 运行期可调参数
// 存储: 环境变量 / config_kv 表
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出核心配置
pub use app_config::{get_default_db_path, AppConfig};
pub use config_manager::{config_keys, ConfigManager};

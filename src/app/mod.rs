// ==========================================
// ERP 报表核心 - 应用层
// ==========================================
// 职责: 组装各层对象, 供二进制入口或外部传输层使用
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
pub use crate::config::get_default_db_path;

// ==========================================
// ERP 报表核心 - 操作目录
// ==========================================
// 对齐: operations 表（code 唯一）
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

// ==========================================
// ERP 报表核心 - 访问审计日志领域模型
// ==========================================
// 红线: 每次报表/预测的查询与导出都必须尝试留痕
// 状态机: 创建时 pending, 之后仅变更一次到终态
// 对齐: access_logs 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AccessOperation, AccessStatus};

// ==========================================
// CallerContext - 已认证的调用方身份
// ==========================================
// 由身份协作方提供（令牌校验不在本核心内）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user_id: i64,
    pub department_id: i64,
    pub ip_address: String,
}

impl CallerContext {
    pub fn new(user_id: i64, department_id: i64, ip_address: impl Into<String>) -> Self {
        Self {
            user_id,
            department_id,
            ip_address: ip_address.into(),
        }
    }
}

// ==========================================
// AccessLog - 访问审计条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    pub id: i64,                   // 插入前为 0
    pub user_id: i64,
    pub department_id: i64,
    pub operation_id: i64,         // 1=查看, 2=导出
    pub access_time: NaiveDateTime,
    pub report_id: i64,            // 预测报表为 0
    pub ip_address: Option<String>,
    pub status: AccessStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AccessLog {
    /// 创建 pending 状态的新条目
    pub fn pending(caller: &CallerContext, operation: AccessOperation, report_id: i64) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let ip = caller.ip_address.trim();
        Self {
            id: 0,
            user_id: caller.user_id,
            department_id: caller.department_id,
            operation_id: operation.id(),
            access_time: now,
            report_id,
            ip_address: if ip.is_empty() { None } else { Some(ip.to_string()) },
            status: AccessStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// 必填字段校验
    ///
    /// # 返回
    /// - Ok(()): 可写入
    /// - Err(String): 缺失字段说明
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id <= 0 {
            return Err("user_id 必填".to_string());
        }
        if self.department_id <= 0 {
            return Err("department_id 必填".to_string());
        }
        if self.operation_id <= 0 {
            return Err("operation_id 必填".to_string());
        }
        Ok(())
    }
}

// ==========================================
// AccessStats - 时间窗口内的访问统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStats {
    pub total: i64,
    pub failed: i64,
}

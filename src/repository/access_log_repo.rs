// ==========================================
// ERP 报表核心 - 访问审计日志数据仓储
// ==========================================
// 对齐: access_logs 表
// 红线: 状态只允许 pending → 终态 变更一次
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use self::core::AccessLogRepository;

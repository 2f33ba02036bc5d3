// ==========================================
// ERP 报表核心 - 访问审计装饰器
// ==========================================
// 包裹每一次报表/预测的查询与导出:
// (a) 写入 pending 日志（失败只告警, 被包裹操作照常执行）
// (b) 执行被包裹操作
// (c) 成功 → success, 失败 → failed（状态更新失败只记录日志, 不上抛）
// 红线: 审计是尽力而为的, 永远不阻塞业务流量
// ==========================================

use std::fmt::Display;
use std::sync::Arc;

use crate::domain::access_log::{AccessLog, CallerContext};
use crate::domain::types::{AccessOperation, AccessStatus};
use crate::repository::access_log_repo::AccessLogRepository;
use tracing::{error, info_span, warn};
use uuid::Uuid;

// ==========================================
// AccessAuditor - 访问审计装饰器
// ==========================================
pub struct AccessAuditor {
    log_repo: Arc<AccessLogRepository>,
}

impl AccessAuditor {
    pub fn new(log_repo: Arc<AccessLogRepository>) -> Self {
        Self { log_repo }
    }

    /// 在审计范围内执行操作
    ///
    /// # 参数
    /// - `operation`: 查看 / 导出
    /// - `report_id`: 报表 id（预测为 0）
    /// - `caller`: 已认证的调用方
    /// - `f`: 被包裹的操作
    ///
    /// # 返回
    /// 被包裹操作的原始结果（错误原样返回）
    pub fn audited<T, E, F>(
        &self,
        operation: AccessOperation,
        report_id: i64,
        caller: &CallerContext,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "audited",
            %request_id,
            operation = operation.code(),
            user_id = caller.user_id,
            report_id
        );
        let _guard = span.enter();

        let log_id = self.open_entry(operation, report_id, caller);

        let result = f();

        let status = match &result {
            Ok(_) => AccessStatus::Success,
            Err(e) => {
                warn!(error = %e, "受审计操作失败");
                AccessStatus::Failed
            }
        };

        if let Some(log_id) = log_id {
            self.close_entry(log_id, status);
        }

        result
    }

    /// 写入 pending 日志
    ///
    /// 失败返回 None（仅告警）
    fn open_entry(&self, operation: AccessOperation, report_id: i64, caller: &CallerContext) -> Option<i64> {
        let entry = AccessLog::pending(caller, operation, report_id);
        match self.log_repo.insert(&entry) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "访问日志写入失败, 继续执行");
                None
            }
        }
    }

    /// 更新为终态（失败只记录日志）
    fn close_entry(&self, log_id: i64, status: AccessStatus) {
        if let Err(e) = self.log_repo.mark_status(log_id, status) {
            error!(log_id, status = status.as_str(), error = %e, "访问日志状态更新失败");
        }
    }
}

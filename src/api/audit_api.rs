// ==========================================
// ERP 报表核心 - 审计 API
// ==========================================
// 职责:
// 1. 操作目录查询（经 OperationCache）
// 2. 访问日志查询 / 统计
// 3. 维护: 取消滞留 pending / 保留期清理（不在请求链路中调用）
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::access_log::{AccessLog, AccessStats};
use crate::domain::operation::Operation;
use crate::domain::types::AccessStatus;
use crate::engine::date_range::ensure_ordered;
use crate::engine::operation_cache::OperationCache;
use crate::repository::access_log_repo::AccessLogRepository;
use crate::repository::operation_repo::OperationRepository;

/// 日志查询条数上限
pub const MAX_LOG_LIMIT: i64 = 100;

pub struct AuditApi {
    operation_repo: Arc<OperationRepository>,
    operation_cache: Arc<OperationCache>,
    log_repo: Arc<AccessLogRepository>,
}

impl AuditApi {
    pub fn new(
        operation_repo: Arc<OperationRepository>,
        operation_cache: Arc<OperationCache>,
        log_repo: Arc<AccessLogRepository>,
    ) -> Self {
        Self {
            operation_repo,
            operation_cache,
            log_repo,
        }
    }

    // ==========================================
    // 操作目录
    // ==========================================

    /// 列出全部操作（按 id 排序）
    pub fn list_operations(&self) -> ApiResult<Vec<Operation>> {
        Ok(self.operation_repo.find_all()?)
    }

    /// 按 code 查询操作
    ///
    /// 先查缓存; 未命中时读库并回填
    pub fn get_operation_by_code(&self, code: &str) -> ApiResult<Operation> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::InvalidInput("操作 code 不能为空".to_string()));
        }

        if let Some(op) = self.operation_cache.get(code) {
            debug!(code, "操作缓存命中");
            return Ok(op);
        }

        let op = self
            .operation_repo
            .find_by_code(code)?
            .ok_or_else(|| ApiError::NotFound(format!("操作(code={})不存在", code)))?;
        self.operation_cache.set(op.clone());
        Ok(op)
    }

    /// 显式清空操作缓存
    pub fn clear_operation_cache(&self) {
        self.operation_cache.clear();
        info!("操作缓存已清空");
    }

    // ==========================================
    // 访问日志查询
    // ==========================================

    pub fn get_log(&self, id: i64) -> ApiResult<AccessLog> {
        self.log_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("访问日志(id={})不存在", id)))
    }

    /// 最近的访问日志（limit 收敛到 1..=100）
    pub fn recent_logs(&self, limit: i64) -> ApiResult<Vec<AccessLog>> {
        Ok(self.log_repo.find_recent(clamp_limit(limit))?)
    }

    /// 指定用户在时间窗口内的访问日志
    pub fn logs_by_user(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
        limit: i64,
    ) -> ApiResult<Vec<AccessLog>> {
        if user_id <= 0 {
            return Err(ApiError::InvalidInput(format!("无效的用户ID: {}", user_id)));
        }
        ensure_ordered(from, to)?;
        Ok(self.log_repo.find_by_user(user_id, from, to, clamp_limit(limit))?)
    }

    /// 指定状态的访问日志
    pub fn logs_by_status(&self, status: &str, limit: i64) -> ApiResult<Vec<AccessLog>> {
        let status = AccessStatus::parse(status)
            .ok_or_else(|| ApiError::InvalidInput(format!("无效的访问状态: {}", status)))?;
        Ok(self.log_repo.find_by_status(status, clamp_limit(limit))?)
    }

    /// 时间窗口内的访问统计
    pub fn access_stats(&self, from: NaiveDateTime, to: NaiveDateTime) -> ApiResult<AccessStats> {
        ensure_ordered(from, to)?;
        Ok(self.log_repo.stats_in_range(from, to)?)
    }

    // ==========================================
    // 维护
    // ==========================================

    /// 将早于 cutoff 仍为 pending 的日志置为 cancelled
    pub fn cancel_stale_pending(&self, older_than: NaiveDateTime) -> ApiResult<usize> {
        let rows = self.log_repo.cancel_stale_pending(older_than)?;
        info!(rows, %older_than, "滞留 pending 日志已取消");
        Ok(rows)
    }

    /// 删除早于 cutoff 的访问日志
    pub fn purge_logs_before(&self, cutoff: NaiveDateTime) -> ApiResult<usize> {
        let rows = self.log_repo.purge_before(cutoff)?;
        info!(rows, %cutoff, "访问日志保留期清理完成");
        Ok(rows)
    }
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LOG_LIMIT)
}

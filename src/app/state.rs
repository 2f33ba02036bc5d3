// ==========================================
// ERP 报表核心 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AuditApi, ForecastApi, ReportApi};
use crate::config::{AppConfig, ConfigManager};
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{AccessAuditor, OperationCache};
use crate::repository::{
    AccessLogRepository, ErpQueryExecutor, ForecastRepository, OperationRepository,
    ReportRepository, SqliteErpExecutor,
};

/// 应用状态
///
/// 包含所有API实例和共享资源（API 对象均为 Send + Sync, 通过 Arc 共享）
pub struct AppState {
    /// 元数据库路径
    pub db_path: String,
    /// ERP 数据库路径
    pub erp_db_path: String,
    /// 报表API
    pub report_api: Arc<ReportApi>,
    /// 销售预测API
    pub forecast_api: Arc<ForecastApi>,
    /// 审计API
    pub audit_api: Arc<AuditApi>,
    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 按进程级配置创建 AppState
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let erp_db_path = config.erp_db_path.clone();
        Self::with_executor(config, move |date_format| {
            let executor: Arc<dyn ErpQueryExecutor> =
                Arc::new(SqliteErpExecutor::with_date_format(erp_db_path, date_format));
            executor
        })
    }

    /// 使用自定义 ERP 执行器创建 AppState
    ///
    /// # 参数
    /// - make_executor: 以配置的日期参数格式构造执行器
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开元数据库并初始化 schema
    /// 2. 读取 config_kv 运行期参数
    /// 3. 初始化所有Repository / Engine / API
    pub fn with_executor<F>(config: AppConfig, make_executor: F) -> Result<Self, String>
    where
        F: FnOnce(String) -> Arc<dyn ErpQueryExecutor>,
    {
        tracing::info!(
            "初始化AppState，元数据库: {}, ERP数据库: {}",
            config.db_path,
            config.erp_db_path
        );

        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let date_policy = config_manager.date_range_policy();
        let executor = make_executor(config_manager.get_erp_date_param_format());

        // ==========================================
        // Repository层
        // ==========================================
        let report_repo = Arc::new(ReportRepository::new(conn.clone()));
        let access_log_repo = Arc::new(AccessLogRepository::new(conn.clone()));
        let operation_repo = Arc::new(OperationRepository::new(conn.clone()));
        let forecast_repo = Arc::new(ForecastRepository::new(executor.clone()));

        // ==========================================
        // Engine层
        // ==========================================
        let auditor = Arc::new(AccessAuditor::new(access_log_repo.clone()));
        let operation_cache = Arc::new(OperationCache::new());

        // ==========================================
        // API层
        // ==========================================
        let report_api = Arc::new(ReportApi::new(
            report_repo,
            executor,
            auditor.clone(),
            date_policy,
        ));
        let forecast_api = Arc::new(ForecastApi::new(forecast_repo, auditor, date_policy));
        let audit_api = Arc::new(AuditApi::new(operation_repo, operation_cache, access_log_repo));

        tracing::info!(
            default_range_days = date_policy.default_range_days(),
            max_range_days = date_policy.max_range_days(),
            "AppState初始化完成"
        );

        Ok(Self {
            db_path: config.db_path,
            erp_db_path: config.erp_db_path,
            report_api,
            forecast_api,
            audit_api,
            config_manager,
        })
    }
}

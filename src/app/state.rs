// ==========================================
// 椅子配车调度服务 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享资源（连接、仓储、配置、引擎）
// ==========================================

use std::sync::{Arc, Mutex};

use crate::config::config_manager::ConfigManager;
use crate::engine::{ChairDistanceTracker, DispatchTrigger, MatchingConfig, MatchingEngine};
use crate::repository::{ChairLocationRepository, SqliteDispatchRepository};

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 生效的匹配配置
    pub matching_config: MatchingConfig,

    /// 匹配引擎
    pub matching_engine: Arc<MatchingEngine<SqliteDispatchRepository>>,

    /// 累计距离查询（带缓存）
    pub distance_tracker: Arc<ChairDistanceTracker>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 步骤
    /// 1. 打开连接并建表
    /// 2. 读取配置
    /// 3. 组装仓储与引擎
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let matching_config = MatchingConfig::load(config_manager.as_ref())
            .await
            .map_err(|e| format!("读取匹配配置失败: {}", e))?;

        match config_manager.get_config_snapshot() {
            Ok(snapshot) => tracing::info!(config = %snapshot, "配置快照"),
            Err(e) => tracing::warn!(error = %e, "读取配置快照失败"),
        }

        let dispatch_repo = Arc::new(SqliteDispatchRepository::from_connection(conn.clone()));
        let matching_engine = Arc::new(MatchingEngine::new(
            dispatch_repo,
            matching_config.clone(),
        ));

        let location_repo = Arc::new(ChairLocationRepository::from_connection(conn));
        let distance_tracker = Arc::new(ChairDistanceTracker::new(
            location_repo,
            matching_config.distance_cache_ttl,
        ));

        Ok(Self {
            db_path,
            config_manager,
            matching_config,
            matching_engine,
            distance_tracker,
        })
    }

    /// 创建调度触发器
    pub fn dispatch_trigger(&self) -> DispatchTrigger<SqliteDispatchRepository> {
        DispatchTrigger::new(self.matching_engine.clone())
    }
}

/// 获取默认数据库路径
///
/// 优先级：
/// 1. 环境变量 RIDE_DISPATCH_DB_PATH
/// 2. 用户数据目录下 ride-dispatch/ride_dispatch.db
/// 3. 当前目录 ./ride_dispatch.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("RIDE_DISPATCH_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./ride_dispatch.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("ride-dispatch");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("ride_dispatch.db");
        }
    }

    path.to_string_lossy().to_string()
}

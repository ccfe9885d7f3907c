// ==========================================
// 椅子配车调度服务 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::dispatch_config_trait::DispatchConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取 u64 配置，缺失或无法解析时返回默认值
    fn get_u64_or_default(&self, key: &str, default: u64) -> ConfigResult<u64> {
        let value = self.get_config_value(key)?;
        Ok(value
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(default))
    }

    /// 获取所有配置的快照（JSON格式，按 key 排序）
    ///
    /// # 用途
    /// - 启动时记录生效配置
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// DispatchConfigReader trait 实现
// ==========================================
#[async_trait]
impl DispatchConfigReader for ConfigManager {
    async fn get_max_match_distance(&self) -> ConfigResult<u64> {
        self.get_u64_or_default(config_keys::MAX_MATCH_DISTANCE, defaults::MAX_MATCH_DISTANCE)
    }

    async fn get_matching_interval_ms(&self) -> ConfigResult<u64> {
        let value = self.get_u64_or_default(
            config_keys::MATCHING_INTERVAL_MS,
            defaults::MATCHING_INTERVAL_MS,
        )?;
        // interval 不能为 0
        Ok(value.max(1))
    }

    async fn get_distance_cache_ttl_secs(&self) -> ConfigResult<u64> {
        self.get_u64_or_default(
            config_keys::DISTANCE_CACHE_TTL_SECS,
            defaults::DISTANCE_CACHE_TTL_SECS,
        )
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 匹配
    pub const MAX_MATCH_DISTANCE: &str = "max_match_distance";
    pub const MATCHING_INTERVAL_MS: &str = "matching_interval_ms";

    // 缓存
    pub const DISTANCE_CACHE_TTL_SECS: &str = "distance_cache_ttl_secs";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const MAX_MATCH_DISTANCE: u64 = 400;
    pub const MATCHING_INTERVAL_MS: u64 = 500;
    pub const DISTANCE_CACHE_TTL_SECS: u64 = 60;
}

// ==========================================
// 椅子配车调度服务 - 调度配置读取 Trait
// ==========================================
// 职责: 定义匹配引擎/调度触发器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// DispatchConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DispatchConfigReader: Send + Sync {
    /// 获取最大匹配距离（曼哈顿距离）
    ///
    /// 最近椅子的距离严格大于该值时，本周期跳过该乘车
    ///
    /// # 默认值
    /// - 400
    async fn get_max_match_distance(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取匹配周期间隔（毫秒）
    ///
    /// # 默认值
    /// - 500
    async fn get_matching_interval_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取累计行驶距离缓存 TTL（秒）
    ///
    /// # 默认值
    /// - 60
    async fn get_distance_cache_ttl_secs(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;
}

use crate::config::DispatchConfigReader;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

// ==========================================
// Assignment - 单次成功分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub ride_id: String,
    pub chair_id: String,
    pub distance: u64, // 上车点到椅子当前位置的曼哈顿距离
}

// ==========================================
// MatchResult - 匹配周期结果
// ==========================================
/// 无候选时 matched_count == 0，不视为错误
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_count: usize,          // 成功分配数
    pub assignments: Vec<Assignment>,  // 分配明细（处理顺序）
    pub skipped_out_of_range: usize,   // 最近椅子超出最大匹配距离
    pub conflicts: usize,              // 条件写入被拒（并发认领）
    pub write_failures: usize,         // 条件写入报错
    pub elapsed_ms: u64,               // 耗时(毫秒)
}

impl MatchResult {
    /// 空结果（无乘车或无椅子）
    pub fn no_op() -> Self {
        Self::default()
    }

    /// 本周期没有任何分配、跳过、冲突或写入失败
    pub fn is_no_op(&self) -> bool {
        self.matched_count == 0
            && self.skipped_out_of_range == 0
            && self.conflicts == 0
            && self.write_failures == 0
    }
}

// ==========================================
// MatchingConfig - 匹配配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingConfig {
    pub max_match_distance: u64,      // 最大匹配距离: 400
    pub interval: Duration,           // 周期间隔: 500ms
    pub distance_cache_ttl: Duration, // 累计距离缓存 TTL: 60s
}

impl Default for MatchingConfig {
    fn default() -> Self {
        use crate::config::defaults;
        Self {
            max_match_distance: defaults::MAX_MATCH_DISTANCE,
            interval: Duration::from_millis(defaults::MATCHING_INTERVAL_MS),
            distance_cache_ttl: Duration::from_secs(defaults::DISTANCE_CACHE_TTL_SECS),
        }
    }
}

impl MatchingConfig {
    /// 从配置读取器加载
    pub async fn load<C>(reader: &C) -> Result<Self, Box<dyn Error + Send + Sync>>
    where
        C: DispatchConfigReader + ?Sized,
    {
        Ok(Self {
            max_match_distance: reader.get_max_match_distance().await?,
            interval: Duration::from_millis(reader.get_matching_interval_ms().await?),
            distance_cache_ttl: Duration::from_secs(reader.get_distance_cache_ttl_secs().await?),
        })
    }

    pub fn with_max_match_distance(mut self, max_match_distance: u64) -> Self {
        self.max_match_distance = max_match_distance;
        self
    }
}

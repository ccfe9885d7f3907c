// ==========================================
// 椅子配车调度服务 - 累计行驶距离缓存
// ==========================================
// 职责: 按椅子缓存累计行驶距离（位置轨迹相邻采样的曼哈顿距离之和）
// 过期: 显式 TTL，读到的值最多比真实值陈旧 ttl
// ==========================================

use crate::domain::types::Coordinate;
use crate::engine::distance::path_length;
use crate::repository::{ChairLocationRepository, RepositoryResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// ==========================================
// TtlCache - 带 TTL 的键值缓存
// ==========================================
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // 持锁线程 panic 后条目仍完整（只有整条插入/删除），取回内部值继续使用
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("距离缓存锁已中毒，恢复后继续使用");
            poisoned.into_inner()
        })
    }

    /// 读取未过期的缓存值
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        self.lock_entries()
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// 写入缓存值，过期时间 = now + ttl
    pub fn insert_at(&self, key: &str, value: V, now: Instant) {
        self.lock_entries().insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// 命中则返回缓存值，否则调用 loader 并写回
    ///
    /// loader 执行期间不持有锁；loader 失败时不写入缓存
    pub fn get_or_load_at<E, F>(&self, key: &str, now: Instant, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get_at(key, now) {
            return Ok(value);
        }
        let value = loader()?;
        self.insert_at(key, value.clone(), now);
        Ok(value)
    }

    pub fn get_or_load<E, F>(&self, key: &str, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.get_or_load_at(key, Instant::now(), loader)
    }

    pub fn invalidate(&self, key: &str) {
        self.lock_entries().remove(key);
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }
}

// ==========================================
// ChairDistanceTracker - 累计行驶距离查询
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChairDistanceSummary {
    pub total_distance: u64,
    pub updated_at: Option<DateTime<Utc>>, // 最新采样时间，无采样为 None
}

pub struct ChairDistanceTracker {
    location_repo: Arc<ChairLocationRepository>,
    cache: TtlCache<ChairDistanceSummary>,
}

impl ChairDistanceTracker {
    pub fn new(location_repo: Arc<ChairLocationRepository>, ttl: Duration) -> Self {
        Self {
            location_repo,
            cache: TtlCache::new(ttl),
        }
    }

    /// 查询椅子累计行驶距离（优先读缓存）
    pub fn total_distance(&self, chair_id: &str) -> RepositoryResult<ChairDistanceSummary> {
        self.cache.get_or_load(chair_id, || {
            debug!(chair_id, "累计距离缓存未命中，重新计算");
            let locations = self.location_repo.list_for_chair(chair_id)?;
            let points: Vec<Coordinate> = locations.iter().map(|l| l.position).collect();
            Ok(ChairDistanceSummary {
                total_distance: path_length(&points),
                updated_at: locations.last().map(|l| l.created_at),
            })
        })
    }

    /// 椅子上报新位置后调用，下次查询强制重算
    pub fn invalidate(&self, chair_id: &str) {
        self.cache.invalidate(chair_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_cache_hit_within_ttl() {
        let cache: TtlCache<u64> = TtlCache::new(Duration::from_secs(60));
        let loads = Cell::new(0);
        let now = Instant::now();
        let load = || -> Result<u64, ()> {
            loads.set(loads.get() + 1);
            Ok(42)
        };

        assert_eq!(cache.get_or_load_at("c1", now, load), Ok(42));
        assert_eq!(
            cache.get_or_load_at("c1", now + Duration::from_secs(59), || -> Result<u64, ()> {
                Ok(0)
            }),
            Ok(42)
        );
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn test_cache_reloads_after_ttl() {
        let cache: TtlCache<u64> = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("c1", 1, now);

        assert_eq!(cache.get_at("c1", now + Duration::from_secs(60)), None);
        let value = cache
            .get_or_load_at("c1", now + Duration::from_secs(61), || -> Result<u64, ()> { Ok(2) })
            .unwrap();
        assert_eq!(value, 2);
    }

    #[test]
    fn test_zero_ttl_never_serves_cached_value() {
        let cache: TtlCache<u64> = TtlCache::new(Duration::ZERO);
        let now = Instant::now();
        cache.insert_at("c1", 7, now);
        assert_eq!(cache.get_at("c1", now), None);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache: TtlCache<u64> = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();

        let err = cache.get_or_load_at("c1", now, || Err::<u64, &str>("boom"));
        assert_eq!(err, Err("boom"));
        assert_eq!(cache.get_at("c1", now), None);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache: TtlCache<u64> = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("c1", 1, now);
        cache.insert_at("c2", 2, now);

        cache.invalidate("c1");
        assert_eq!(cache.get_at("c1", now), None);
        assert_eq!(cache.get_at("c2", now), Some(2));

        cache.clear();
        assert_eq!(cache.get_at("c2", now), None);
    }

    #[test]
    fn test_poisoned_lock_keeps_serving() {
        let cache: Arc<TtlCache<u64>> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let now = Instant::now();
        cache.insert_at("c1", 1, now);

        let holder = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.entries.lock().unwrap();
            panic!("持锁线程崩溃");
        })
        .join();
        assert!(cache.entries.is_poisoned());

        assert_eq!(cache.get_at("c1", now), Some(1));
        cache.insert_at("c2", 2, now);
        assert_eq!(cache.get_at("c2", now), Some(2));
        cache.invalidate("c1");
        assert_eq!(cache.get_at("c1", now), None);
    }
}

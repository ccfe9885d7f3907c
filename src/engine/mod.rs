// ==========================================
// 椅子配车调度服务 - 引擎层
// ==========================================
// 职责: 距离评估、乘车-椅子匹配、周期调度
// 红线: Engine 不拼 SQL，只依赖 DispatchRepository trait
// ==========================================

pub mod distance;
pub mod distance_cache;
pub mod matching;
pub mod trigger;
pub mod types;

// 重导出核心引擎
pub use distance::{manhattan_distance, path_length};
pub use distance_cache::{ChairDistanceSummary, ChairDistanceTracker, TtlCache};
pub use matching::{select_nearest, MatchingEngine};
pub use trigger::{DispatchTrigger, TriggerStats};
pub use types::{Assignment, MatchResult, MatchingConfig};

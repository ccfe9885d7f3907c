// ==========================================
// 椅子配车调度服务 - 领域模型层
// ==========================================
// 职责: 定义乘车、椅子、位置与状态等领域实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod chair;
pub mod ride;
pub mod types;

// 重导出核心类型
pub use chair::{Chair, ChairLocation, EligibleChair};
pub use ride::{Ride, RideStatusRecord};
pub use types::{Coordinate, RideStatus};

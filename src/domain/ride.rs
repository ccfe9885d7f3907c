// ==========================================
// 椅子配车调度服务 - 乘车领域模型
// ==========================================
// 对齐: rides / ride_statuses 表
// 红线: chair_id 非空的乘车视为已认领，匹配引擎不得重新分配
// ==========================================

use crate::domain::types::{Coordinate, RideStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Ride - 乘车请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: String,
    pub user_id: String,

    // ===== 行程坐标 =====
    pub pickup: Coordinate,
    pub destination: Coordinate,

    // ===== 分配 =====
    pub chair_id: Option<String>, // null 表示尚未匹配

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    /// 创建新的待匹配乘车请求
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        pickup: Coordinate,
        destination: Coordinate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            pickup,
            destination,
            chair_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// 是否已被认领
    pub fn is_claimed(&self) -> bool {
        self.chair_id.is_some()
    }
}

// ==========================================
// RideStatusRecord - 乘车状态历史
// ==========================================
// 只追加，不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideStatusRecord {
    pub id: String,
    pub ride_id: String,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// 椅子配车调度服务 - 椅子领域模型
// ==========================================
// 对齐: chairs / chair_locations 表
// 当前位置: chair_locations 中 created_at 最大的一条
// ==========================================

use crate::domain::types::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Chair - 椅子
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chair {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub model: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chair {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        name: impl Into<String>,
        model: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            model: model.into(),
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }
}

// ==========================================
// ChairLocation - 位置采样
// ==========================================
// 只追加
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairLocation {
    pub id: String,
    pub chair_id: String,
    pub position: Coordinate,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// EligibleChair - 可参与匹配的椅子
// ==========================================
// 由 EligibleChairs 查询产生：活跃 + 无未完成乘车 + 存在位置采样
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleChair {
    pub chair_id: String,
    pub position: Coordinate,
}

impl EligibleChair {
    pub fn new(chair_id: impl Into<String>, position: Coordinate) -> Self {
        Self {
            chair_id: chair_id.into(),
            position,
        }
    }
}

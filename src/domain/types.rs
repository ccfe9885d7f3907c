// ==========================================
// 椅子配车调度服务 - 领域类型定义
// ==========================================
// 坐标: 整数网格坐标 (与 chair_locations 表一致)
// 状态: ride_statuses 表中的乘车状态流转
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 坐标 (Coordinate)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: i32,
    pub longitude: i32,
}

impl Coordinate {
    pub fn new(latitude: i32, longitude: i32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ==========================================
// 乘车状态 (Ride Status)
// ==========================================
// 流转: MATCHING → ENROUTE → PICKUP → CARRYING → ARRIVED → COMPLETED
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Matching,  // 等待匹配
    Enroute,   // 椅子前往上车点
    Pickup,    // 已到达上车点
    Carrying,  // 载客中
    Arrived,   // 已到达目的地
    Completed, // 已完成 (终态)
}

impl RideStatus {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RideStatus::Matching => "MATCHING",
            RideStatus::Enroute => "ENROUTE",
            RideStatus::Pickup => "PICKUP",
            RideStatus::Carrying => "CARRYING",
            RideStatus::Arrived => "ARRIVED",
            RideStatus::Completed => "COMPLETED",
        }
    }

    /// 从数据库字符串解析，未知值返回 None
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "MATCHING" => Some(RideStatus::Matching),
            "ENROUTE" => Some(RideStatus::Enroute),
            "PICKUP" => Some(RideStatus::Pickup),
            "CARRYING" => Some(RideStatus::Carrying),
            "ARRIVED" => Some(RideStatus::Arrived),
            "COMPLETED" => Some(RideStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 椅子配车调度服务 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 周期性匹配待分配乘车与空闲椅子
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 匹配规则与调度
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Chair, ChairLocation, Coordinate, EligibleChair, Ride, RideStatus, RideStatusRecord,
};

// 引擎
pub use engine::{DispatchTrigger, MatchResult, MatchingConfig, MatchingEngine};

// 仓储
pub use repository::{
    DispatchRepository, RepositoryError, RepositoryResult, SqliteDispatchRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "椅子配车调度服务";

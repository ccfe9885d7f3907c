// ==========================================
// 椅子配车调度服务 - 配置层
// ==========================================
// 职责: 调度配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dispatch_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
pub use dispatch_config_trait::DispatchConfigReader;

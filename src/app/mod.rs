// ==========================================
// 椅子配车调度服务 - 应用层
// ==========================================
// 职责: 组装仓储、配置与引擎，供可执行文件使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};

// ==========================================
// 椅子配车调度服务 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod chair_location_repo;
pub mod chair_repo;
mod codec;
pub mod dispatch_repo;
pub mod error;
pub mod ride_repo;

// 重导出核心仓储
pub use chair_location_repo::ChairLocationRepository;
pub use chair_repo::ChairRepository;
pub use dispatch_repo::{DispatchRepository, SqliteDispatchRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use ride_repo::RideRepository;

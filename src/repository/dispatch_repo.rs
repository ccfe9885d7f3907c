// ==========================================
// 椅子配车调度服务 - 匹配引擎数据访问接口
// ==========================================
// 说明: Repository 层定义 trait，Engine 只依赖 trait
// 实现者: SqliteDispatchRepository（rides / chairs / chair_locations 表）
// ==========================================

use crate::domain::chair::EligibleChair;
use crate::domain::ride::Ride;
use crate::repository::chair_repo::ChairRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ride_repo::RideRepository;
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// DispatchRepository Trait
// ==========================================
pub trait DispatchRepository: Send + Sync {
    /// 所有未分配椅子的乘车，按 created_at 升序
    ///
    /// 顺序是公平性保证（先到先服务），实现不得打乱
    fn unmatched_rides(&self) -> RepositoryResult<Vec<Ride>>;

    /// 可参与匹配的椅子及其当前位置
    ///
    /// 返回顺序即平局时的优先顺序；无位置采样的椅子不得出现
    fn eligible_chairs(&self) -> RepositoryResult<Vec<EligibleChair>>;

    /// 条件写入：仅当乘车仍未分配且椅子仍可用时写入
    ///
    /// # 返回
    /// - Ok(true): 写入成功
    /// - Ok(false): 条件不满足（并发冲突，非错误）
    fn try_assign_chair(&self, ride_id: &str, chair_id: &str) -> RepositoryResult<bool>;
}

impl<T: DispatchRepository + ?Sized> DispatchRepository for Arc<T> {
    fn unmatched_rides(&self) -> RepositoryResult<Vec<Ride>> {
        (**self).unmatched_rides()
    }

    fn eligible_chairs(&self) -> RepositoryResult<Vec<EligibleChair>> {
        (**self).eligible_chairs()
    }

    fn try_assign_chair(&self, ride_id: &str, chair_id: &str) -> RepositoryResult<bool> {
        (**self).try_assign_chair(ride_id, chair_id)
    }
}

// ==========================================
// SqliteDispatchRepository
// ==========================================
/// 聚合 RideRepository + ChairRepository，共享同一连接
pub struct SqliteDispatchRepository {
    ride_repo: RideRepository,
    chair_repo: ChairRepository,
}

impl SqliteDispatchRepository {
    /// 打开独立连接
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            ride_repo: RideRepository::from_connection(conn.clone()),
            chair_repo: ChairRepository::from_connection(conn),
        }
    }

    pub fn ride_repo(&self) -> &RideRepository {
        &self.ride_repo
    }

    pub fn chair_repo(&self) -> &ChairRepository {
        &self.chair_repo
    }
}

impl DispatchRepository for SqliteDispatchRepository {
    fn unmatched_rides(&self) -> RepositoryResult<Vec<Ride>> {
        self.ride_repo.find_unmatched()
    }

    fn eligible_chairs(&self) -> RepositoryResult<Vec<EligibleChair>> {
        self.chair_repo.find_eligible()
    }

    fn try_assign_chair(&self, ride_id: &str, chair_id: &str) -> RepositoryResult<bool> {
        self.ride_repo.try_assign_chair(ride_id, chair_id, Utc::now())
    }
}

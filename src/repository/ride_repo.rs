// ==========================================
// 椅子配车调度服务 - 乘车数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 分配写入必须带条件 (chair_id IS NULL)，禁止无条件覆盖
// ==========================================

use crate::db::format_ts;
use crate::domain::ride::{Ride, RideStatusRecord};
use crate::domain::types::{Coordinate, RideStatus};
use crate::repository::codec::ts_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{
    params, Connection, OptionalExtension, Result as SqliteResult, Row, TransactionBehavior,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const RIDE_COLUMNS: &str = r#"
    id, user_id, chair_id,
    pickup_latitude, pickup_longitude,
    destination_latitude, destination_longitude,
    created_at, updated_at
"#;

// ==========================================
// RideRepository - 乘车仓储
// ==========================================
/// 职责: 管理 rides / ride_statuses 表
pub struct RideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RideRepository {
    /// 创建新的 RideRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建乘车请求，并写入初始状态 MATCHING
    pub fn create(&self, ride: &Ride) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO rides (
                id, user_id, chair_id,
                pickup_latitude, pickup_longitude,
                destination_latitude, destination_longitude,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                ride.id,
                ride.user_id,
                ride.chair_id,
                ride.pickup.latitude,
                ride.pickup.longitude,
                ride.destination.latitude,
                ride.destination.longitude,
                format_ts(&ride.created_at),
                format_ts(&ride.updated_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO ride_statuses (id, ride_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                ride.id,
                RideStatus::Matching.to_db_str(),
                format_ts(&ride.created_at),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, ride_id: &str) -> RepositoryResult<Option<Ride>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM rides WHERE id = ?1", RIDE_COLUMNS);
        let ride = conn
            .query_row(&sql, params![ride_id], map_ride_row)
            .optional()?;
        Ok(ride)
    }

    /// 查询所有未匹配乘车
    ///
    /// # 返回
    /// - 按 created_at 升序（最早的请求先服务），同一时刻按 id 升序
    pub fn find_unmatched(&self) -> RepositoryResult<Vec<Ride>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM rides WHERE chair_id IS NULL ORDER BY created_at ASC, id ASC",
            RIDE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rides = stmt
            .query_map([], map_ride_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rides)
    }

    /// 查询某椅子被分配过的全部乘车
    pub fn find_by_chair(&self, chair_id: &str) -> RepositoryResult<Vec<Ride>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM rides WHERE chair_id = ?1 ORDER BY created_at ASC, id ASC",
            RIDE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rides = stmt
            .query_map(params![chair_id], map_ride_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rides)
    }

    /// 条件分配椅子 (compare-and-swap)
    ///
    /// # 条件
    /// - 乘车仍未分配 (chair_id IS NULL)
    /// - 椅子处于活跃状态
    /// - 椅子没有未完成的乘车（提交时重新校验，防止并发周期重复认领同一椅子）
    ///
    /// 单条 UPDATE 语句执行，SQLite 写入串行化保证原子性
    ///
    /// # 返回
    /// - Ok(true): 分配成功
    /// - Ok(false): 条件不满足（已被其它写入者认领）
    /// - Err: 数据库错误
    pub fn try_assign_chair(
        &self,
        ride_id: &str,
        chair_id: &str,
        now: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE: 开始即持有写锁，多个写入者在 busy_timeout 内排队
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let rows_affected = tx.execute(
            r#"
            UPDATE rides
               SET chair_id = ?1, updated_at = ?3
             WHERE id = ?2
               AND chair_id IS NULL
               AND EXISTS (
                   SELECT 1 FROM chairs c WHERE c.id = ?1 AND c.is_active = 1
               )
               AND NOT EXISTS (
                   SELECT 1 FROM rides busy
                    WHERE busy.chair_id = ?1
                      AND NOT EXISTS (
                          SELECT 1 FROM ride_statuses s
                           WHERE s.ride_id = busy.id AND s.status = ?4
                      )
               )
            "#,
            params![
                chair_id,
                ride_id,
                format_ts(&now),
                RideStatus::Completed.to_db_str(),
            ],
        )?;
        tx.commit()?;
        Ok(rows_affected == 1)
    }

    /// 追加状态记录
    pub fn append_status(
        &self,
        ride_id: &str,
        status: RideStatus,
        at: DateTime<Utc>,
    ) -> RepositoryResult<RideStatusRecord> {
        let record = RideStatusRecord {
            id: Uuid::new_v4().to_string(),
            ride_id: ride_id.to_string(),
            status,
            created_at: at,
        };
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO ride_statuses (id, ride_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.ride_id,
                record.status.to_db_str(),
                format_ts(&record.created_at),
            ],
        )?;
        Ok(record)
    }

    /// 查询状态历史（按时间升序）
    pub fn list_statuses(&self, ride_id: &str) -> RepositoryResult<Vec<RideStatusRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, ride_id, status, created_at
            FROM ride_statuses
            WHERE ride_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![ride_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    ts_column(row, 3)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, ride_id, status, created_at)| {
                let status = RideStatus::from_db_str(&status).ok_or_else(|| {
                    RepositoryError::FieldValueError {
                        field: "ride_statuses.status".to_string(),
                        message: format!("unknown status {}", status),
                    }
                })?;
                Ok(RideStatusRecord {
                    id,
                    ride_id,
                    status,
                    created_at,
                })
            })
            .collect()
    }

    /// 乘车是否已完成（已记录 COMPLETED）
    pub fn is_completed(&self, ride_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let done: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM ride_statuses WHERE ride_id = ?1 AND status = ?2)",
            params![ride_id, RideStatus::Completed.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(done)
    }
}

fn map_ride_row(row: &Row<'_>) -> SqliteResult<Ride> {
    Ok(Ride {
        id: row.get(0)?,
        user_id: row.get(1)?,
        chair_id: row.get(2)?,
        pickup: Coordinate::new(row.get(3)?, row.get(4)?),
        destination: Coordinate::new(row.get(5)?, row.get(6)?),
        created_at: ts_column(row, 7)?,
        updated_at: ts_column(row, 8)?,
    })
}

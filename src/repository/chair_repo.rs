// ==========================================
// 椅子配车调度服务 - 椅子数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::format_ts;
use crate::domain::chair::{Chair, EligibleChair};
use crate::domain::types::{Coordinate, RideStatus};
use crate::repository::codec::{bool_column, ts_column};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// ChairRepository - 椅子仓储
// ==========================================
/// 职责: 管理 chairs 表，并提供可匹配椅子查询
pub struct ChairRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChairRepository {
    /// 创建新的 ChairRepository 实例
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

    /// 注册椅子
    pub fn create(&self, chair: &Chair) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO chairs (id, owner_id, name, model, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                chair.id,
                chair.owner_id,
                chair.name,
                chair.model,
                chair.is_active,
                format_ts(&chair.created_at),
                format_ts(&chair.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, chair_id: &str) -> RepositoryResult<Option<Chair>> {
        let conn = self.get_conn()?;
        let chair = conn
            .query_row(
                r#"
                SELECT id, owner_id, name, model, is_active, created_at, updated_at
                FROM chairs
                WHERE id = ?1
                "#,
                params![chair_id],
                |row| {
                    Ok(Chair {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        name: row.get(2)?,
                        model: row.get(3)?,
                        is_active: bool_column(row, 4)?,
                        created_at: ts_column(row, 5)?,
                        updated_at: ts_column(row, 6)?,
                    })
                },
            )
            .optional()?;
        Ok(chair)
    }

    /// 切换活跃状态
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: chair_id 不存在
    pub fn set_active(
        &self,
        chair_id: &str,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            "UPDATE chairs SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active, format_ts(&now), chair_id],
        )?;
        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Chair".to_string(),
                id: chair_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询可参与匹配的椅子
    ///
    /// # 条件
    /// - is_active = 1
    /// - 没有未完成的乘车（分配过的乘车都已记录 COMPLETED；从未分配过视为可用）
    /// - 至少存在一条位置采样（当前位置取 created_at 最大者，同一时刻取后写入者）
    ///
    /// # 返回
    /// - 按 chairs.created_at, id 升序，保证“先出现者优先”的平局规则可复现
    pub fn find_eligible(&self) -> RepositoryResult<Vec<EligibleChair>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, cl.latitude, cl.longitude
            FROM chairs c
            INNER JOIN chair_locations cl ON cl.id = (
                SELECT l.id FROM chair_locations l
                 WHERE l.chair_id = c.id
                 ORDER BY l.created_at DESC, l.rowid DESC
                 LIMIT 1
            )
            WHERE c.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM rides r
                   WHERE r.chair_id = c.id
                     AND NOT EXISTS (
                         SELECT 1 FROM ride_statuses s
                          WHERE s.ride_id = r.id AND s.status = ?1
                     )
              )
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )?;

        let chairs = stmt
            .query_map(params![RideStatus::Completed.to_db_str()], |row| {
                Ok(EligibleChair {
                    chair_id: row.get(0)?,
                    position: Coordinate::new(row.get(1)?, row.get(2)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(chairs)
    }
}

// ==========================================
// 椅子配车调度服务 - 椅子位置仓储
// ==========================================
// 红线: 只追加，不修改/删除采样
// ==========================================

use crate::db::format_ts;
use crate::domain::chair::ChairLocation;
use crate::domain::types::Coordinate;
use crate::repository::codec::ts_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 职责: 管理 chair_locations 表
pub struct ChairLocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChairLocationRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加位置采样
    pub fn append(
        &self,
        chair_id: &str,
        position: Coordinate,
        at: DateTime<Utc>,
    ) -> RepositoryResult<ChairLocation> {
        let location = ChairLocation {
            id: Uuid::new_v4().to_string(),
            chair_id: chair_id.to_string(),
            position,
            created_at: at,
        };
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO chair_locations (id, chair_id, latitude, longitude, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                location.id,
                location.chair_id,
                location.position.latitude,
                location.position.longitude,
                format_ts(&location.created_at),
            ],
        )?;
        Ok(location)
    }

    /// 当前位置（created_at 最大的采样），无采样返回 None
    pub fn find_latest(&self, chair_id: &str) -> RepositoryResult<Option<ChairLocation>> {
        let conn = self.get_conn()?;
        let latest = conn
            .query_row(
                r#"
                SELECT id, chair_id, latitude, longitude, created_at
                FROM chair_locations
                WHERE chair_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT 1
                "#,
                params![chair_id],
                map_location_row,
            )
            .optional()?;
        Ok(latest)
    }

    /// 全部采样（按时间升序）
    pub fn list_for_chair(&self, chair_id: &str) -> RepositoryResult<Vec<ChairLocation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, chair_id, latitude, longitude, created_at
            FROM chair_locations
            WHERE chair_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;
        let locations = stmt
            .query_map(params![chair_id], map_location_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(locations)
    }
}

fn map_location_row(row: &Row<'_>) -> SqliteResult<ChairLocation> {
    Ok(ChairLocation {
        id: row.get(0)?,
        chair_id: row.get(1)?,
        position: Coordinate::new(row.get(2)?, row.get(3)?),
        created_at: ts_column(row, 4)?,
    })
}

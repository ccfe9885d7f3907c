// ==========================================
// 椅子配车调度服务 - 行字段解码
// ==========================================
// 职责: 各仓储共用的列读取辅助
// ==========================================

use crate::db::parse_ts;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// 读取时间戳列，格式不合法时返回 FromSqlConversionFailure
pub(crate) fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", raw).into(),
        )
    })
}

/// 读取布尔列 (INTEGER 0/1)
pub(crate) fn bool_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    let v: i64 = row.get(idx)?;
    Ok(v != 0)
}

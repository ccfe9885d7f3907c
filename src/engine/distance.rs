// ==========================================
// 椅子配车调度服务 - 距离评估
// ==========================================
// 曼哈顿距离: |Δlat| + |Δlon|，作为行驶成本的近似值（非测地距离）
// 纯函数，无失败路径
// ==========================================

use crate::domain::types::Coordinate;

/// 两点间曼哈顿距离
///
/// 以 i64 计算差值，任意 i32 输入都不会溢出
pub fn manhattan_distance(a: Coordinate, b: Coordinate) -> u64 {
    let d_lat = (i64::from(a.latitude) - i64::from(b.latitude)).unsigned_abs();
    let d_lon = (i64::from(a.longitude) - i64::from(b.longitude)).unsigned_abs();
    d_lat + d_lon
}

/// 轨迹总长度：相邻采样点曼哈顿距离之和
pub fn path_length(points: &[Coordinate]) -> u64 {
    points
        .windows(2)
        .map(|pair| manhattan_distance(pair[0], pair[1]))
        .sum()
}

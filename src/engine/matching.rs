// ==========================================
// 椅子配车调度服务 - 匹配引擎
// ==========================================
// 流程 (单次周期):
// 1. 读取未匹配乘车 (created_at 升序)，为空即返回
// 2. 读取可用椅子，为空即返回
// 3. 按乘车顺序贪心选取最近椅子 (平局取先出现者)
//    - 超出最大匹配距离: 本周期跳过
//    - 否则条件写入，并把椅子移出工作集
// 4. 单条写入失败不影响后续乘车
// ==========================================
// 红线: 不直接拼 SQL，只通过 DispatchRepository 访问数据
// 红线: 同一周期内一把椅子最多尝试认领一次
// ==========================================

use crate::domain::chair::EligibleChair;
use crate::domain::types::Coordinate;
use crate::engine::distance::manhattan_distance;
use crate::engine::types::{Assignment, MatchResult, MatchingConfig};
use crate::perf::PerfGuard;
use crate::repository::{DispatchRepository, RepositoryResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// MatchingEngine - 匹配引擎
// ==========================================
pub struct MatchingEngine<R>
where
    R: DispatchRepository,
{
    repo: Arc<R>,
    config: MatchingConfig,
}

impl<R> MatchingEngine<R>
where
    R: DispatchRepository,
{
    /// 创建新的匹配引擎
    ///
    /// # 参数
    /// - repo: 数据访问接口
    /// - config: 匹配配置
    pub fn new(repo: Arc<R>, config: MatchingConfig) -> Self {
        Self { repo, config }
    }

    /// 使用默认配置创建
    pub fn with_default_config(repo: Arc<R>) -> Self {
        Self::new(repo, MatchingConfig::default())
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// 执行一次匹配周期
    ///
    /// # 返回
    /// - Ok(MatchResult): 本周期结果，无候选时 matched_count == 0
    /// - Err: 读取乘车或椅子失败（本周期不写入任何数据）
    #[instrument(skip(self), fields(max_match_distance = self.config.max_match_distance))]
    pub fn run_matching_cycle(&self) -> RepositoryResult<MatchResult> {
        let perf = PerfGuard::new("matching_cycle");

        let rides = self.repo.unmatched_rides()?;
        if rides.is_empty() {
            debug!("无待匹配乘车，跳过本周期");
            return Ok(MatchResult::no_op());
        }

        let mut available = self.repo.eligible_chairs()?;
        if available.is_empty() {
            debug!(rides_count = rides.len(), "无可用椅子，跳过本周期");
            return Ok(MatchResult::no_op());
        }

        let rides_count = rides.len();
        let chairs_count = available.len();
        let mut result = MatchResult::no_op();

        for ride in rides {
            if available.is_empty() {
                debug!("工作集椅子已用尽，剩余乘车留待下个周期");
                break;
            }

            // 已认领的乘车永不重新分配
            if ride.is_claimed() {
                debug!(ride_id = %ride.id, "乘车已被认领，跳过");
                continue;
            }

            let Some((idx, distance)) = select_nearest(ride.pickup, &available) else {
                continue;
            };

            if distance > self.config.max_match_distance {
                debug!(
                    ride_id = %ride.id,
                    nearest_distance = distance,
                    "最近椅子超出最大匹配距离，本周期跳过"
                );
                result.skipped_out_of_range += 1;
                continue;
            }

            // 无论写入结果如何，该椅子本周期不再参与匹配
            let chair = available.remove(idx);

            match self.repo.try_assign_chair(&ride.id, &chair.chair_id) {
                Ok(true) => {
                    debug!(
                        ride_id = %ride.id,
                        chair_id = %chair.chair_id,
                        distance,
                        "分配成功"
                    );
                    result.assignments.push(Assignment {
                        ride_id: ride.id,
                        chair_id: chair.chair_id,
                        distance,
                    });
                }
                Ok(false) => {
                    debug!(
                        ride_id = %ride.id,
                        chair_id = %chair.chair_id,
                        "条件写入被拒（已被并发认领），留待下个周期"
                    );
                    result.conflicts += 1;
                }
                Err(e) => {
                    warn!(
                        ride_id = %ride.id,
                        chair_id = %chair.chair_id,
                        error = %e,
                        "分配写入失败，留待下个周期"
                    );
                    result.write_failures += 1;
                }
            }
        }

        result.matched_count = result.assignments.len();
        result.elapsed_ms = perf.elapsed_ms();

        info!(
            rides_count,
            chairs_count,
            matched_count = result.matched_count,
            skipped_out_of_range = result.skipped_out_of_range,
            conflicts = result.conflicts,
            write_failures = result.write_failures,
            elapsed_ms = result.elapsed_ms,
            sql_count = perf.sql_count(),
            "匹配周期完成"
        );

        Ok(result)
    }
}

/// 选取距离上车点最近的椅子
///
/// # 返回
/// - Some((index, distance)): 最小距离的椅子下标；平局时取下标最小者
/// - None: chairs 为空
pub fn select_nearest(pickup: Coordinate, chairs: &[EligibleChair]) -> Option<(usize, u64)> {
    let mut best: Option<(usize, u64)> = None;

    for (idx, chair) in chairs.iter().enumerate() {
        let distance = manhattan_distance(pickup, chair.position);
        match best {
            None => best = Some((idx, distance)),
            // 严格小于才替换，保证先出现者赢得平局
            Some((_, best_distance)) if distance < best_distance => best = Some((idx, distance)),
            _ => {}
        }
    }

    best
}

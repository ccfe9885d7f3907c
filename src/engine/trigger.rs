// ==========================================
// 椅子配车调度服务 - 调度触发器
// ==========================================
// 职责: 按固定间隔调用匹配引擎 (poll-and-reconcile)
// 说明: SQLite 仓储是同步的，每个周期在 blocking 线程池执行
// 说明: 多个触发器（多进程）可能同时运行，安全性由条件写入保证
// ==========================================

use crate::engine::matching::MatchingEngine;
use crate::engine::types::MatchResult;
use crate::repository::{DispatchRepository, RepositoryError, RepositoryResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// 最小周期间隔，tokio interval 不接受 0
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// 触发器运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub total_matched: u64,
}

pub struct DispatchTrigger<R>
where
    R: DispatchRepository + 'static,
{
    engine: Arc<MatchingEngine<R>>,
    interval: Duration,
}

impl<R> DispatchTrigger<R>
where
    R: DispatchRepository + 'static,
{
    /// 间隔取自引擎配置，不足 1ms 按 1ms 处理
    pub fn new(engine: Arc<MatchingEngine<R>>) -> Self {
        let interval = engine.config().interval.max(MIN_INTERVAL);
        Self { engine, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 执行单个匹配周期
    pub async fn run_once(&self) -> RepositoryResult<MatchResult> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.run_matching_cycle())
            .await
            .map_err(|e| {
                RepositoryError::Other(anyhow::anyhow!("匹配周期任务异常: {}", e))
            })?
    }

    /// 循环执行，直到 shutdown 变为 true 或发送端被丢弃
    ///
    /// 周期失败只记录日志，下一个周期从头重试
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> TriggerStats {
        let mut stats = TriggerStats::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.interval.as_millis() as u64, "调度触发器启动");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    stats.cycles += 1;
                    match self.run_once().await {
                        Ok(result) => {
                            stats.total_matched += result.matched_count as u64;
                        }
                        Err(e) => {
                            stats.failed_cycles += 1;
                            warn!(error = %e, "匹配周期失败，等待下个周期重试");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            cycles = stats.cycles,
            failed_cycles = stats.failed_cycles,
            total_matched = stats.total_matched,
            "调度触发器停止"
        );
        stats
    }
}

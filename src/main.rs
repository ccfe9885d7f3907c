// ==========================================
// 椅子配车调度服务 - 主入口
// ==========================================
// 启动匹配触发器，Ctrl-C 退出
// 环境变量:
// - RIDE_DISPATCH_DB_PATH: 数据库路径
// - RIDE_DISPATCH_LOG_FORMAT=json: JSON 日志
// - RUST_LOG: 日志级别
// ==========================================

use anyhow::Context;
use ride_dispatch::app::{get_default_db_path, AppState};
use ride_dispatch::logging;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("RIDE_DISPATCH_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", ride_dispatch::APP_NAME);
    tracing::info!("系统版本: {}", ride_dispatch::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .await
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let trigger = app_state.dispatch_trigger();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = tokio::spawn(async move { trigger.run(shutdown_rx).await });

    tokio::signal::ctrl_c()
        .await
        .context("监听 Ctrl-C 失败")?;
    tracing::info!("收到退出信号，等待当前周期结束");

    // 接收端已退出时发送失败，忽略即可
    let _ = shutdown_tx.send(true);
    let stats = worker.await.context("调度任务异常退出")?;

    tracing::info!(
        cycles = stats.cycles,
        total_matched = stats.total_matched,
        "服务已退出"
    );
    Ok(())
}

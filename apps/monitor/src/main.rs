//! 家庭状态监视器：采集 -> 规整 -> 邮箱 -> 渲染。

mod ingest;
mod render;

use domain::{SystemClock, WallClock};
use monitor_config::AppConfig;
use monitor_pipeline::{DispatchConfig, Dispatcher, Layout, Mailbox};
use monitor_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();
    info!(target: "monitor", "initialization_started");

    let clock = wall_clock(&config);
    let (mailbox, receiver) = Mailbox::bounded(config.mailbox_capacity);

    // 两个生产者：MQTT 回调上下文与周期时钟
    let _ingest = ingest::spawn_ingest(&config, mailbox.clone(), Arc::clone(&clock));
    let _clock = ingest::spawn_clock(&config, mailbox, clock);

    info!(target: "monitor", "initialization_completed");

    // 主任务即唯一消费者
    let dispatcher = Dispatcher::new(
        receiver,
        render::LogRenderer::default(),
        DispatchConfig {
            idle_timeout: Duration::from_secs(config.idle_timeout_seconds),
            layout: Layout::default(),
        },
    );
    dispatcher.run().await;
    Ok(())
}

/// 墙钟：配置了固定 UTC 偏移时使用偏移，否则跟随系统时区。
fn wall_clock(config: &AppConfig) -> Arc<dyn WallClock> {
    let clock = config
        .utc_offset_minutes
        .and_then(SystemClock::with_offset_minutes)
        .unwrap_or_default();
    Arc::new(clock)
}

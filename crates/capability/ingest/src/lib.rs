//! 采集源：MQTT 报文与周期时钟节拍。

mod clock;
mod mqtt;

pub use clock::ClockSource;
pub use mqtt::{MqttSource, MqttSourceConfig};

use async_trait::async_trait;
use domain::RawEvent;

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("handler error: {0}")]
    Handler(String),
    #[error("source error: {0}")]
    Source(String),
}

/// 传输链路状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkState {
    pub network_up: bool,
    pub broker_connected: bool,
}

/// RawEvent 处理器。
///
/// 采集源保证同一处理器不会被并发调用，因此以 `&mut self` 接收事件；
/// 实现必须立即返回，不得等待下游消费者。
pub trait RawEventHandler: Send {
    fn handle(&mut self, event: RawEvent) -> Result<(), IngestError>;

    /// 链路状态变化通知。
    fn link_changed(&mut self, _link: LinkState) {}
}

/// 采集源抽象。
#[async_trait]
pub trait Source: Send + Sync {
    async fn run(&self, handler: Box<dyn RawEventHandler>) -> Result<(), IngestError>;
}

/// 占位源（采集关闭时使用）。
#[derive(Debug, Default)]
pub struct NoopSource;

#[async_trait]
impl Source for NoopSource {
    async fn run(&self, _handler: Box<dyn RawEventHandler>) -> Result<(), IngestError> {
        Ok(())
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

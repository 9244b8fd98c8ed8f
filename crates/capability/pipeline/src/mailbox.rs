//! 有界事件邮箱：多生产者 / 单消费者。
//!
//! 发送端从不阻塞：邮箱已满时直接丢弃最新的测量并返回 `false`。
//! 接收端带超时阻塞，超时返回 `Ok(None)`，供消费者输出空闲信号。

use crate::PipelineError;
use domain::Measurement;
use monitor_telemetry::{record_mailbox_dropped, record_measurement_emitted};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// 邮箱最小容量。
pub const MIN_CAPACITY: usize = 10;

/// 邮箱构造入口。
pub struct Mailbox;

impl Mailbox {
    /// 创建有界邮箱；容量不足 [`MIN_CAPACITY`] 时按最小值创建。
    pub fn bounded(capacity: usize) -> (MailboxSender, MailboxReceiver) {
        let capacity = capacity.max(MIN_CAPACITY);
        let (tx, rx) = mpsc::channel(capacity);
        (
            MailboxSender { tx },
            MailboxReceiver { rx, capacity },
        )
    }
}

/// 生产者句柄，可克隆给多个采集上下文。
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<Measurement>,
}

impl MailboxSender {
    /// 非阻塞投递；邮箱满或已关闭时丢弃并返回 `false`。
    pub fn try_send(&self, measurement: Measurement) -> bool {
        let kind = measurement.kind();
        match self.tx.try_send(measurement) {
            Ok(()) => {
                record_measurement_emitted();
                true
            }
            Err(TrySendError::Full(_)) => {
                record_mailbox_dropped();
                debug!(target: "monitor.pipeline", kind = kind.as_str(), "mailbox_full_dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                record_mailbox_dropped();
                debug!(target: "monitor.pipeline", kind = kind.as_str(), "mailbox_closed_dropped");
                false
            }
        }
    }
}

/// 唯一消费者句柄。
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Measurement>,
    capacity: usize,
}

impl MailboxReceiver {
    /// 等待下一条测量，最多 `timeout`。
    ///
    /// 超时返回 `Ok(None)`；所有发送端都已释放且邮箱为空时返回 `Closed`。
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Measurement>, PipelineError> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(measurement)) => Ok(Some(measurement)),
            Ok(None) => Err(PipelineError::Closed),
            Err(_) => Ok(None),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前排队数量。
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

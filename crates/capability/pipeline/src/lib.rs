//! 采集上下文与渲染上下文之间的投递：有界邮箱 + 分发循环。

pub mod dispatch;
pub mod mailbox;

pub use dispatch::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, DispatchConfig, Dispatcher, INDICATOR_HEIGHT, Layout, Position,
    Renderer,
};
pub use mailbox::{MIN_CAPACITY, Mailbox, MailboxReceiver, MailboxSender};

/// 投递错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("mailbox closed")]
    Closed,
}

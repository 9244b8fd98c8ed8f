//! 日志初始化与计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub raw_events: u64,
    pub classified: u64,
    pub unmatched: u64,
    pub invalid_payload: u64,
    pub measurements_emitted: u64,
    pub mailbox_dropped: u64,
    pub rendered: u64,
    pub idle_timeouts: u64,
    pub link_changes: u64,
}

/// 进程级计数指标。
pub struct TelemetryMetrics {
    raw_events: AtomicU64,
    classified: AtomicU64,
    unmatched: AtomicU64,
    invalid_payload: AtomicU64,
    measurements_emitted: AtomicU64,
    mailbox_dropped: AtomicU64,
    rendered: AtomicU64,
    idle_timeouts: AtomicU64,
    link_changes: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            raw_events: AtomicU64::new(0),
            classified: AtomicU64::new(0),
            unmatched: AtomicU64::new(0),
            invalid_payload: AtomicU64::new(0),
            measurements_emitted: AtomicU64::new(0),
            mailbox_dropped: AtomicU64::new(0),
            rendered: AtomicU64::new(0),
            idle_timeouts: AtomicU64::new(0),
            link_changes: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            raw_events: self.raw_events.load(Ordering::Relaxed),
            classified: self.classified.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            invalid_payload: self.invalid_payload.load(Ordering::Relaxed),
            measurements_emitted: self.measurements_emitted.load(Ordering::Relaxed),
            mailbox_dropped: self.mailbox_dropped.load(Ordering::Relaxed),
            rendered: self.rendered.load(Ordering::Relaxed),
            idle_timeouts: self.idle_timeouts.load(Ordering::Relaxed),
            link_changes: self.link_changes.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 以 debug 级别输出当前计数快照，并返回该快照。
pub fn report_metrics() -> MetricsSnapshot {
    let snapshot = metrics().snapshot();
    debug!(
        target: "monitor.telemetry",
        raw_events = snapshot.raw_events,
        classified = snapshot.classified,
        unmatched = snapshot.unmatched,
        invalid_payload = snapshot.invalid_payload,
        measurements_emitted = snapshot.measurements_emitted,
        mailbox_dropped = snapshot.mailbox_dropped,
        rendered = snapshot.rendered,
        idle_timeouts = snapshot.idle_timeouts,
        link_changes = snapshot.link_changes,
        "metrics_snapshot"
    );
    snapshot
}

/// 记录收到的原始报文次数。
pub fn record_raw_event() {
    metrics().raw_events.fetch_add(1, Ordering::Relaxed);
}

/// 记录命中规则的报文次数。
pub fn record_classified() {
    metrics().classified.fetch_add(1, Ordering::Relaxed);
}

/// 记录未命中任何规则的报文次数。
pub fn record_unmatched() {
    metrics().unmatched.fetch_add(1, Ordering::Relaxed);
}

/// 记录无法解析的报文次数。
pub fn record_invalid_payload() {
    metrics().invalid_payload.fetch_add(1, Ordering::Relaxed);
}

/// 记录成功投入邮箱的测量数。
pub fn record_measurement_emitted() {
    metrics().measurements_emitted.fetch_add(1, Ordering::Relaxed);
}

/// 记录邮箱已满（或已关闭）导致丢弃的测量数。
pub fn record_mailbox_dropped() {
    metrics().mailbox_dropped.fetch_add(1, Ordering::Relaxed);
}

/// 记录渲染次数。
pub fn record_rendered() {
    metrics().rendered.fetch_add(1, Ordering::Relaxed);
}

/// 记录分发循环空闲超时次数。
pub fn record_idle_timeout() {
    metrics().idle_timeouts.fetch_add(1, Ordering::Relaxed);
}

/// 记录链路状态变化次数。
pub fn record_link_change() {
    metrics().link_changes.fetch_add(1, Ordering::Relaxed);
}

//! 渲染分发循环：邮箱的唯一消费者。
//!
//! 两个状态交替：等待（带超时阻塞在邮箱上）与处理（同步调用渲染器）。
//! 每条测量恰好渲染一次，顺序与出队顺序一致。

use crate::PipelineError;
use crate::mailbox::MailboxReceiver;
use domain::{ClockTime, Connectivity, IndicatorKind, IndicatorState, Measurement, Price, PriceKind};
use monitor_telemetry::{record_idle_timeout, record_rendered, report_metrics};
use std::time::Duration;
use tracing::{debug, info};

/// 屏幕尺寸（像素）。
pub const DISPLAY_WIDTH: u16 = 480;
pub const DISPLAY_HEIGHT: u16 = 320;
/// 指示灯条高度。
pub const INDICATOR_HEIGHT: u16 = 33;

/// 屏幕坐标（左上角为原点）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

/// 渲染器（外部协作方）：每类测量一个入口，附带该元素的屏幕位置。
///
/// 调用发生在分发循环所在的任务上，允许短暂阻塞，但不会影响生产者。
pub trait Renderer: Send {
    fn connectivity(&mut self, state: Connectivity, position: Option<Position>);
    fn temperature(&mut self, celsius: f64, position: Option<Position>);
    fn level(&mut self, level: i64, position: Option<Position>);
    fn indicator(&mut self, kind: IndicatorKind, state: IndicatorState, position: Option<Position>);
    fn time(&mut self, time: ClockTime, position: Option<Position>);
    fn price(&mut self, kind: PriceKind, price: Price, position: Option<Position>);
}

/// 屏幕布局：顶部状态图标与时钟、中部读数与电价、底部指示灯条。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// 网络 / 时间同步 / broker 三个图标的起点（顶部居中）。
    pub connectivity: Position,
    /// 时钟块左上角（小时位；分钟位在其右侧 260 像素）。
    pub time: Position,
    pub temperature: Position,
    pub level: Position,
    pub price: Position,
    pub average_price: Position,
    pub indicator_row: u16,
    pub indicator_spacing: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            connectivity: Position {
                x: DISPLAY_WIDTH / 2 - 30,
                y: 0,
            },
            time: Position { x: 10, y: 20 },
            temperature: Position { x: 10, y: 170 },
            level: Position { x: 160, y: 170 },
            price: Position { x: 10, y: 230 },
            average_price: Position { x: 250, y: 230 },
            indicator_row: DISPLAY_HEIGHT - INDICATOR_HEIGHT,
            indicator_spacing: DISPLAY_WIDTH / IndicatorKind::ALL.len() as u16,
        }
    }
}

impl Layout {
    pub fn indicator(&self, kind: IndicatorKind) -> Position {
        Position {
            x: kind.slot() as u16 * self.indicator_spacing,
            y: self.indicator_row,
        }
    }
}

/// 分发循环参数。
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    pub idle_timeout: Duration,
    pub layout: Layout,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(10),
            layout: Layout::default(),
        }
    }
}

/// 分发器：持有邮箱接收端与渲染器。
pub struct Dispatcher<R> {
    receiver: MailboxReceiver,
    renderer: R,
    config: DispatchConfig,
}

impl<R: Renderer> Dispatcher<R> {
    pub fn new(receiver: MailboxReceiver, renderer: R, config: DispatchConfig) -> Self {
        Self {
            receiver,
            renderer,
            config,
        }
    }

    /// 主循环：直到所有发送端都被释放才返回，并交还渲染器。
    pub async fn run(mut self) -> R {
        info!(
            target: "monitor.pipeline",
            capacity = self.receiver.capacity(),
            idle_timeout_ms = self.config.idle_timeout.as_millis() as u64,
            "dispatch_loop_started"
        );
        loop {
            match self.receiver.recv_timeout(self.config.idle_timeout).await {
                Ok(Some(measurement)) => self.dispatch(measurement),
                Ok(None) => {
                    record_idle_timeout();
                    info!(target: "monitor.pipeline", "dispatch_idle");
                    report_metrics();
                }
                Err(PipelineError::Closed) => {
                    info!(target: "monitor.pipeline", "dispatch_loop_stopped");
                    return self.renderer;
                }
            }
        }
    }

    /// 渲染一条测量。
    pub fn dispatch(&mut self, measurement: Measurement) {
        debug!(
            target: "monitor.pipeline",
            kind = measurement.kind().as_str(),
            "measurement_received"
        );
        let layout = self.config.layout;
        match measurement {
            Measurement::Connectivity(state) => {
                self.renderer.connectivity(state, Some(layout.connectivity))
            }
            Measurement::Temperature(celsius) => {
                self.renderer.temperature(celsius, Some(layout.temperature))
            }
            Measurement::Level(level) => self.renderer.level(level, Some(layout.level)),
            Measurement::CarHeater(state) => self.indicator(IndicatorKind::CarHeater, state),
            Measurement::OilBurner(state) => self.indicator(IndicatorKind::OilBurner, state),
            Measurement::StockHeater(state) => self.indicator(IndicatorKind::StockHeater, state),
            Measurement::SolarHeater(state) => self.indicator(IndicatorKind::SolarHeater, state),
            Measurement::Door(state) => self.indicator(IndicatorKind::Door, state),
            Measurement::Flood(state) => self.indicator(IndicatorKind::Flood, state),
            Measurement::Time(time) => self.renderer.time(time, Some(layout.time)),
            Measurement::Price(price) => {
                self.renderer.price(PriceKind::Current, price, Some(layout.price))
            }
            Measurement::AveragePrice(price) => {
                let position = Some(layout.average_price);
                self.renderer.price(PriceKind::Average, price, position)
            }
        }
        record_rendered();
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// 指示灯按通道落到底部指示灯条的固定槽位。
    fn indicator(&mut self, kind: IndicatorKind, state: IndicatorState) {
        let position = self.config.layout.indicator(kind);
        self.renderer.indicator(kind, state, Some(position));
    }
}

//! 日志渲染器：把每次绘制落到结构化日志上，屏幕驱动接入前的默认实现。

use domain::{ClockTime, Connectivity, IndicatorKind, IndicatorState, Price, PriceKind};
use monitor_pipeline::{Position, Renderer};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn connectivity(&mut self, state: Connectivity, position: Option<Position>) {
        info!(
            target: "monitor.render",
            network_up = state.network_up,
            time_synced = state.time_synced,
            broker_connected = state.broker_connected,
            position = ?position,
            "draw_connectivity"
        );
    }

    fn temperature(&mut self, celsius: f64, position: Option<Position>) {
        info!(
            target: "monitor.render",
            value = %two_decimals(celsius),
            position = ?position,
            "draw_temperature"
        );
    }

    fn level(&mut self, level: i64, position: Option<Position>) {
        info!(target: "monitor.render", level, position = ?position, "draw_level");
    }

    fn indicator(&mut self, kind: IndicatorKind, state: IndicatorState, position: Option<Position>) {
        info!(
            target: "monitor.render",
            kind = ?kind,
            state = state.as_str(),
            position = ?position,
            "draw_indicator"
        );
    }

    fn time(&mut self, time: ClockTime, position: Option<Position>) {
        info!(
            target: "monitor.render",
            time = %format!("{:02}:{:02}", time.hour, time.minute),
            position = ?position,
            "draw_time"
        );
    }

    fn price(&mut self, kind: PriceKind, price: Price, position: Option<Position>) {
        info!(
            target: "monitor.render",
            kind = ?kind,
            amount = %two_decimals(price.amount),
            level = price.level.as_str(),
            position = ?position,
            "draw_price"
        );
    }
}

/// 屏幕上的定点显示：整数部分与两位小数分开绘制。
fn split_hundredths(value: f64) -> (bool, u64, u64) {
    // 先取整到百分位，避免 0.29 * 100 截断成 28。
    let cents = (value.abs() * 100.0).round() as u64;
    (value < 0.0 && cents > 0, cents / 100, cents % 100)
}

fn two_decimals(value: f64) -> String {
    let (negative, whole, fract) = split_hundredths(value);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{whole}.{fract:02}")
}

use domain::{ClockTime, WallClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// 周期时钟：按固定间隔读取墙钟并回调。
///
/// 错过的节拍直接跳过，不补发。
#[derive(Clone)]
pub struct ClockSource {
    period: Duration,
    clock: Arc<dyn WallClock>,
}

impl ClockSource {
    pub fn new(period: Duration, clock: Arc<dyn WallClock>) -> Self {
        Self { period, clock }
    }

    /// 读取一次当前时间。
    pub fn read(&self) -> ClockTime {
        ClockTime::from(&self.clock.now())
    }

    /// 永久运行；首个节拍立即触发。
    pub async fn run<F>(&self, mut on_tick: F)
    where
        F: FnMut(ClockTime) + Send,
    {
        info!(target: "monitor.ingest", period_ms = self.period.as_millis() as u64, "clock_started");
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            on_tick(self.read());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::FixedClock;
    use std::sync::Mutex;

    fn fixed() -> Arc<dyn WallClock> {
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(6, 45, 30))
            .expect("datetime");
        Arc::new(FixedClock(at))
    }

    #[test]
    fn read_splits_wall_clock() {
        let source = ClockSource::new(Duration::from_secs(5), fixed());
        assert_eq!(
            source.read(),
            ClockTime {
                hour: 6,
                minute: 45,
                second: 30
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_fixed_period() {
        let source = ClockSource::new(Duration::from_secs(5), fixed());
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        let task = tokio::spawn(async move {
            source
                .run(move |time| {
                    if let Ok(mut ticks) = sink.lock() {
                        ticks.push(time);
                    }
                })
                .await;
        });

        tokio::time::sleep(Duration::from_millis(12_500)).await;
        task.abort();
        let count = ticks.lock().map(|ticks| ticks.len()).unwrap_or_default();
        // t = 0, 5, 10 秒。
        assert_eq!(count, 3);
    }
}

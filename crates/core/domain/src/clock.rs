//! 墙钟抽象：时钟节拍与“今天是星期几”都从这里读取。

use chrono::{FixedOffset, Local, NaiveDateTime, Utc};

/// 本地墙钟。
pub trait WallClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// 系统时钟：默认使用进程时区，可指定固定 UTC 偏移。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }

    /// 以分钟为单位构造固定偏移；超出 ±24h 时返回 None。
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self {
            offset: Some(offset),
        })
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// 固定时钟（用于测试或回放）。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl WallClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

//! RawEvent -> Measurement 的规整：解析、分类、按规则处理。
//!
//! [`Normalizer`] 独占门磁/漏水标志与上次观测值，只能通过 `&mut self`
//! 修改，因此同一时刻只有一个调用方（MQTT 回调上下文）在读写这些状态。

pub mod classify;
pub mod decode;
pub mod flags;
pub mod rules;

pub use classify::{Rule, RuleId, RuleMatch, RuleTable, RuleTableConfig};
pub use decode::Decoded;
pub use flags::FlagAggregator;
pub use rules::{LastValues, POWER_THRESHOLD_W, RuleSettings};

use chrono::Datelike;
use domain::{Measurement, RawEvent, WallClock};
use rules::RuleContext;
use std::sync::Arc;

/// 规整化错误。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// 命中规则后的输出（可能为空）。
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub rule: RuleId,
    pub measurements: Vec<Measurement>,
}

/// 规整器：规则表 + 聚合状态。
pub struct Normalizer {
    table: RuleTable,
    settings: RuleSettings,
    flags: FlagAggregator,
    last: LastValues,
    clock: Arc<dyn WallClock>,
}

impl Normalizer {
    pub fn new(table: RuleTable, settings: RuleSettings, clock: Arc<dyn WallClock>) -> Self {
        Self {
            table,
            settings,
            flags: FlagAggregator::new(),
            last: LastValues::default(),
            clock,
        }
    }

    /// 处理一条原始报文。
    ///
    /// - topic 为空或未命中任何规则：`Ok(None)`
    /// - 报文不是合法 JSON：`Err(InvalidPayload)`
    pub fn normalize(&mut self, event: &RawEvent) -> Result<Option<Normalized>, NormalizeError> {
        if event.topic.is_empty() {
            return Ok(None);
        }
        let tree: serde_json::Value = serde_json::from_slice(&event.payload)
            .map_err(|err| NormalizeError::InvalidPayload(err.to_string()))?;
        let Some(rule) = self.table.classify(&event.topic, decode::str_field(&tree, "id")) else {
            return Ok(None);
        };
        let mut ctx = RuleContext {
            settings: &self.settings,
            flags: &mut self.flags,
            last: &mut self.last,
            today: self.clock.now().weekday(),
        };
        let measurements = rules::apply(rule, &tree, &mut ctx);
        Ok(Some(Normalized { rule, measurements }))
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn flags(&self) -> &FlagAggregator {
        &self.flags
    }

    pub fn last_values(&self) -> &LastValues {
        &self.last
    }
}

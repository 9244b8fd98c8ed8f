//! 采集链路装配模块
//!
//! 把采集源（MQTT、周期时钟）、规整器与事件邮箱组装在一起：
//! 采集回调上下文只做解析、分类与非阻塞投递，渲染留给主任务。

use domain::{Connectivity, Measurement, RawEvent, WallClock};
use monitor_config::AppConfig;
use monitor_ingest::{
    ClockSource, IngestError, LinkState, MqttSource, MqttSourceConfig, NoopSource,
    RawEventHandler, Source,
};
use monitor_normalize::{Normalizer, RuleSettings, RuleTable, RuleTableConfig};
use monitor_pipeline::MailboxSender;
use monitor_telemetry::{
    record_classified, record_invalid_payload, record_link_change, record_raw_event,
    record_unmatched,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 流水线处理器
///
/// 实现 `RawEventHandler`，连接规整器与事件邮箱。
/// 标志位与上次取值都由规整器持有，只在这里被修改。
struct PipelineHandler {
    /// 规整器：分类 + 规则处理
    normalizer: Normalizer,
    /// 邮箱发送端（满则丢弃）
    mailbox: MailboxSender,
    /// 最近一次上报的连接状态
    connectivity: Connectivity,
}

impl PipelineHandler {
    fn new(normalizer: Normalizer, mailbox: MailboxSender, time_synced: bool) -> Self {
        Self {
            normalizer,
            mailbox,
            connectivity: Connectivity {
                network_up: false,
                time_synced,
                broker_connected: false,
            },
        }
    }

    /// 投递当前连接状态（启动时用于绘制初始状态）。
    fn publish_connectivity(&self) -> bool {
        self.mailbox
            .try_send(Measurement::Connectivity(self.connectivity))
    }
}

impl RawEventHandler for PipelineHandler {
    fn handle(&mut self, event: RawEvent) -> Result<(), IngestError> {
        record_raw_event();
        debug!(
            target: "monitor.ingest",
            topic = %event.topic,
            payload_size = event.payload.len(),
            received_at_ms = event.received_at_ms,
            "raw_event_received"
        );

        // 报文不合法：计数后交给采集源记录告警
        let normalized = self.normalizer.normalize(&event).map_err(|err| {
            record_invalid_payload();
            IngestError::Handler(err.to_string())
        })?;

        let Some(normalized) = normalized else {
            record_unmatched();
            debug!(target: "monitor.ingest", topic = %event.topic, "normalize_skipped");
            return Ok(());
        };

        record_classified();
        for measurement in normalized.measurements {
            let delivered = self.mailbox.try_send(measurement);
            debug!(
                target: "monitor.ingest",
                rule = normalized.rule.0,
                kind = measurement.kind().as_str(),
                delivered,
                "measurement_forwarded"
            );
        }
        Ok(())
    }

    fn link_changed(&mut self, link: LinkState) {
        record_link_change();
        let next = Connectivity {
            network_up: link.network_up,
            time_synced: self.connectivity.time_synced,
            broker_connected: link.broker_connected,
        };
        if next == self.connectivity {
            return;
        }
        self.connectivity = next;
        info!(
            target: "monitor.ingest",
            network_up = next.network_up,
            broker_connected = next.broker_connected,
            "connectivity_changed"
        );
        self.publish_connectivity();
    }
}

/// 按配置构造规整器（标准规则表 + 设备名）。
fn build_normalizer(config: &AppConfig, clock: Arc<dyn WallClock>) -> Normalizer {
    let table = RuleTable::standard(&RuleTableConfig {
        home_prefix: config.home_topic_prefix.clone(),
        sensor_prefix: config.sensor_topic_prefix.clone(),
        door_sensors: config.door_sensors.clone(),
        leak_sensors: config.leak_sensors.clone(),
    });
    let settings = RuleSettings {
        temperature_sensor: config.temperature_sensor.clone(),
        car_heater_device: config.car_heater_device.clone(),
        heating_relay_device: config.heating_relay_device.clone(),
    };
    Normalizer::new(table, settings, clock)
}

/// 启动采集任务
///
/// 先投递一次初始连接状态，再根据配置选择 MQTT 源或空操作源。
pub fn spawn_ingest(
    config: &AppConfig,
    mailbox: MailboxSender,
    clock: Arc<dyn WallClock>,
) -> tokio::task::JoinHandle<()> {
    let normalizer = build_normalizer(config, clock);
    info!(
        target: "monitor.ingest",
        rules = normalizer.table().rules().len(),
        "rule_table_loaded"
    );
    let handler = PipelineHandler::new(normalizer, mailbox, config.time_synced);
    handler.publish_connectivity();

    let source: Arc<dyn Source> = if config.ingest_enabled {
        let mqtt_config = MqttSourceConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topics: config.mqtt_topics.clone(),
        };
        info!(
            "ingest source: mqtt {}:{} topics={:?}",
            mqtt_config.host, mqtt_config.port, mqtt_config.topics
        );
        Arc::new(MqttSource::new(mqtt_config))
    } else {
        info!("ingest source: noop (MONITOR_INGEST=off)");
        Arc::new(NoopSource)
    };

    tokio::spawn(async move {
        if let Err(err) = source.run(Box::new(handler)).await {
            warn!("ingest stopped: {}", err);
        }
    })
}

/// 启动周期时钟任务：每个节拍投递一条时间测量。
pub fn spawn_clock(
    config: &AppConfig,
    mailbox: MailboxSender,
    clock: Arc<dyn WallClock>,
) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(config.clock_interval_seconds);
    let source = ClockSource::new(period, clock);
    tokio::spawn(async move {
        source
            .run(move |time| {
                mailbox.try_send(Measurement::Time(time));
            })
            .await;
    })
}

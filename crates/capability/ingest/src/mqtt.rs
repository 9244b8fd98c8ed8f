use crate::{IngestError, LinkState, RawEventHandler, Source, now_epoch_ms};
use async_trait::async_trait;
use domain::RawEvent;
use rumqttc::{AsyncClient, ConnectionError, Event, MqttOptions, Packet, QoS};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 请求通道在订阅数之外预留的容量。
const REQUEST_HEADROOM: usize = 10;

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 订阅的 topic 过滤器（可含通配符）。
    pub topics: Vec<String>,
}

/// MQTT 采集源。
///
/// 每次 ConnAck 后重新订阅；事件循环出错时等待 1 秒再继续 poll，
/// 由 rumqttc 负责重连。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }

    fn options(&self) -> MqttOptions {
        let client_id = format!("monitor-{}", uuid::Uuid::new_v4().simple());
        let mut options =
            MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }
        options
    }
}

#[async_trait]
impl Source for MqttSource {
    async fn run(&self, mut handler: Box<dyn RawEventHandler>) -> Result<(), IngestError> {
        let capacity = request_capacity(self.config.topics.len());
        let (client, mut eventloop) = AsyncClient::new(self.options(), capacity);
        let mut link = LinkState::default();
        // 上次未能送入请求通道的订阅，下一轮 poll 之前重试。
        let mut pending: Vec<String> = Vec::new();

        loop {
            if link.broker_connected && !pending.is_empty() {
                pending = subscribe_topics(&client, &pending);
            }
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(
                        target: "monitor.ingest",
                        host = %self.config.host,
                        port = self.config.port,
                        "mqtt_connected"
                    );
                    pending = subscribe_topics(&client, &self.config.topics);
                    let next = LinkState {
                        network_up: true,
                        broker_connected: true,
                    };
                    update_link(&mut link, next, handler.as_mut());
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let event =
                        RawEvent::new(publish.topic, publish.payload.to_vec(), now_epoch_ms());
                    if let Err(err) = handler.handle(event) {
                        warn!(target: "monitor.ingest", error = %err, "raw_event_handler_failed");
                    }
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!(target: "monitor.ingest", "mqtt_disconnected");
                    let next = LinkState {
                        network_up: link.network_up,
                        broker_connected: false,
                    };
                    update_link(&mut link, next, handler.as_mut());
                }
                Ok(other) => {
                    debug!(target: "monitor.ingest", event = ?other, "mqtt_event");
                }
                Err(err) => {
                    warn!(target: "monitor.ingest", error = %err, "mqtt_eventloop_error");
                    let next = link_after_error(&err);
                    update_link(&mut link, next, handler.as_mut());
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// 请求通道容量：一次 ConnAck 的全部订阅之外再留出余量。
fn request_capacity(topics: usize) -> usize {
    topics + REQUEST_HEADROOM
}

/// 非阻塞地发出订阅，返回未能送入请求通道的 topic。
///
/// 在事件循环内不能 await 请求通道；失败只记告警，不中断采集。
fn subscribe_topics(client: &AsyncClient, topics: &[String]) -> Vec<String> {
    let mut failed = Vec::new();
    for topic in topics {
        match client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
            Ok(()) => {
                info!(target: "monitor.ingest", topic = %topic, "mqtt_subscribe_sent");
            }
            Err(err) => {
                warn!(
                    target: "monitor.ingest",
                    topic = %topic,
                    error = %err,
                    "mqtt_subscribe_deferred"
                );
                failed.push(topic.clone());
            }
        }
    }
    failed
}

fn update_link(current: &mut LinkState, next: LinkState, handler: &mut dyn RawEventHandler) {
    if *current != next {
        *current = next;
        handler.link_changed(next);
    }
}

/// 传输层错误视为网络不可用；其它错误只说明 broker 会话断开。
fn link_after_error(err: &ConnectionError) -> LinkState {
    let network_up = !matches!(err, ConnectionError::Io(_) | ConnectionError::NetworkTimeout);
    LinkState {
        network_up,
        broker_connected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        links: Vec<LinkState>,
    }

    impl RawEventHandler for Recorder {
        fn handle(&mut self, _event: RawEvent) -> Result<(), IngestError> {
            Ok(())
        }

        fn link_changed(&mut self, link: LinkState) {
            self.links.push(link);
        }
    }

    fn source_with_topics(count: usize) -> MqttSource {
        MqttSource::new(MqttSourceConfig {
            host: "127.0.0.1".to_string(),
            port: 1883,
            username: None,
            password: None,
            topics: (0..count).map(|index| format!("t/{index}")).collect(),
        })
    }

    #[tokio::test]
    async fn many_topics_fit_request_channel() {
        let source = source_with_topics(12);
        let capacity = request_capacity(source.config().topics.len());
        // 事件循环不 poll，模拟 ConnAck 处理期间的一次性订阅。
        let (client, _eventloop) = AsyncClient::new(source.options(), capacity);
        assert!(subscribe_topics(&client, &source.config().topics).is_empty());
    }

    #[tokio::test]
    async fn full_request_channel_defers_instead_of_failing() {
        let source = source_with_topics(12);
        let (client, _eventloop) = AsyncClient::new(source.options(), 10);
        let failed = subscribe_topics(&client, &source.config().topics);
        assert_eq!(failed, vec!["t/10".to_string(), "t/11".to_string()]);
    }

    #[test]
    fn link_changes_are_reported_once() {
        let mut recorder = Recorder { links: Vec::new() };
        let mut link = LinkState::default();
        let up = LinkState {
            network_up: true,
            broker_connected: true,
        };
        update_link(&mut link, up, &mut recorder);
        update_link(&mut link, up, &mut recorder);
        update_link(&mut link, LinkState::default(), &mut recorder);
        assert_eq!(recorder.links, vec![up, LinkState::default()]);
    }

    #[test]
    fn io_error_means_network_down() {
        let io = ConnectionError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(link_after_error(&io), LinkState::default());
        assert_eq!(
            link_after_error(&ConnectionError::RequestsDone),
            LinkState {
                network_up: true,
                broker_connected: false
            }
        );
    }

    #[test]
    fn options_use_configured_broker() {
        let source = MqttSource::new(MqttSourceConfig {
            host: "broker.local".to_string(),
            port: 1884,
            username: None,
            password: None,
            topics: vec!["home/#".to_string()],
        });
        let options = source.options();
        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1884));
        assert!(options.client_id().starts_with("monitor-"));
    }
}

use domain::{
    ClockTime, Connectivity, IndicatorKind, IndicatorState, Measurement, Price, PriceKind,
    PriceLevel,
};
use monitor_pipeline::{
    DispatchConfig, Dispatcher, INDICATOR_HEIGHT, Layout, Mailbox, Position, Renderer,
};
use monitor_telemetry::metrics;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Connectivity(Connectivity, Option<Position>),
    Temperature(f64, Option<Position>),
    Level(i64, Option<Position>),
    Indicator(IndicatorKind, IndicatorState, Option<Position>),
    Time(ClockTime, Option<Position>),
    Price(PriceKind, Price, Option<Position>),
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl Renderer for RecordingRenderer {
    fn connectivity(&mut self, state: Connectivity, position: Option<Position>) {
        self.calls.push(Call::Connectivity(state, position));
    }

    fn temperature(&mut self, celsius: f64, position: Option<Position>) {
        self.calls.push(Call::Temperature(celsius, position));
    }

    fn level(&mut self, level: i64, position: Option<Position>) {
        self.calls.push(Call::Level(level, position));
    }

    fn indicator(&mut self, kind: IndicatorKind, state: IndicatorState, position: Option<Position>) {
        self.calls.push(Call::Indicator(kind, state, position));
    }

    fn time(&mut self, time: ClockTime, position: Option<Position>) {
        self.calls.push(Call::Time(time, position));
    }

    fn price(&mut self, kind: PriceKind, price: Price, position: Option<Position>) {
        self.calls.push(Call::Price(kind, price, position));
    }
}

#[tokio::test]
async fn run_renders_in_dequeue_order_and_stops_when_closed() {
    let (tx, rx) = Mailbox::bounded(16);
    let producer = tx.clone();
    let time = ClockTime {
        hour: 7,
        minute: 30,
        second: 5,
    };
    assert!(producer.try_send(Measurement::Time(time)));
    assert!(tx.try_send(Measurement::Temperature(21.5)));
    assert!(producer.try_send(Measurement::Door(IndicatorState::On)));
    drop(tx);
    drop(producer);

    let dispatcher = Dispatcher::new(rx, RecordingRenderer::default(), DispatchConfig::default());
    let renderer = dispatcher.run().await;
    let layout = Layout::default();
    assert_eq!(
        renderer.calls,
        vec![
            Call::Time(time, Some(layout.time)),
            Call::Temperature(21.5, Some(layout.temperature)),
            Call::Indicator(
                IndicatorKind::Door,
                IndicatorState::On,
                Some(layout.indicator(IndicatorKind::Door))
            ),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn idle_timeout_keeps_waiting() {
    let before = metrics().snapshot().idle_timeouts;
    let (tx, rx) = Mailbox::bounded(10);
    let config = DispatchConfig {
        idle_timeout: Duration::from_millis(100),
        layout: Layout::default(),
    };
    let handle = tokio::spawn(Dispatcher::new(rx, RecordingRenderer::default(), config).run());

    // 先空转若干个超时周期（100 / 200 / 300 ms），再投递。
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(tx.try_send(Measurement::Level(3)));
    drop(tx);

    let renderer = handle.await.expect("dispatcher task");
    let layout = Layout::default();
    assert_eq!(renderer.calls, vec![Call::Level(3, Some(layout.level))]);
    assert!(metrics().snapshot().idle_timeouts >= before + 3);
}

#[test]
fn prices_go_to_their_positions() {
    let (_tx, rx) = Mailbox::bounded(10);
    let layout = Layout::default();
    let mut dispatcher = Dispatcher::new(rx, RecordingRenderer::default(), DispatchConfig::default());
    let current = Price {
        amount: 0.12,
        level: PriceLevel::Low,
    };
    let average = Price {
        amount: 0.09,
        level: PriceLevel::Normal,
    };
    dispatcher.dispatch(Measurement::Price(current));
    dispatcher.dispatch(Measurement::AveragePrice(average));
    assert_eq!(
        dispatcher.renderer().calls,
        vec![
            Call::Price(PriceKind::Current, current, Some(layout.price)),
            Call::Price(PriceKind::Average, average, Some(layout.average_price)),
        ]
    );
}

#[test]
fn every_indicator_has_its_own_slot() {
    let (_tx, rx) = Mailbox::bounded(10);
    let mut dispatcher = Dispatcher::new(rx, RecordingRenderer::default(), DispatchConfig::default());
    for kind in IndicatorKind::ALL {
        dispatcher.dispatch(Measurement::indicator(kind, IndicatorState::Connected));
    }
    let positions: Vec<Position> = dispatcher
        .renderer()
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Indicator(_, _, Some(position)) => Some(*position),
            _ => None,
        })
        .collect();
    let xs: Vec<u16> = positions.iter().map(|position| position.x).collect();
    assert_eq!(xs, vec![0, 80, 160, 240, 320, 400]);
    assert!(positions.iter().all(|position| position.y == 320 - INDICATOR_HEIGHT));
    assert_eq!(INDICATOR_HEIGHT, 33);
}

#[test]
fn readings_and_status_use_fixed_positions() {
    let (_tx, rx) = Mailbox::bounded(10);
    let mut dispatcher = Dispatcher::new(rx, RecordingRenderer::default(), DispatchConfig::default());
    let state = Connectivity {
        network_up: true,
        time_synced: false,
        broker_connected: true,
    };
    dispatcher.dispatch(Measurement::Connectivity(state));
    dispatcher.dispatch(Measurement::Level(120));
    dispatcher.dispatch(Measurement::Temperature(-4.5));
    assert_eq!(
        dispatcher.renderer().calls,
        vec![
            Call::Connectivity(state, Some(Position { x: 210, y: 0 })),
            Call::Level(120, Some(Position { x: 160, y: 170 })),
            Call::Temperature(-4.5, Some(Position { x: 10, y: 170 })),
        ]
    );
}

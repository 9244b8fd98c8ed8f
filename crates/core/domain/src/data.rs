/// 传输层输入的原始报文。
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub topic: String,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}

impl RawEvent {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>, received_at_ms: i64) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            received_at_ms,
        }
    }
}

/// 三态指示灯：关 / 开 / 接通（带负载）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    #[default]
    Off,
    On,
    Connected,
}

impl IndicatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorState::Off => "off",
            IndicatorState::On => "on",
            IndicatorState::Connected => "connected",
        }
    }
}

/// 电价等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceLevel {
    Low,
    #[default]
    Normal,
    High,
}

impl PriceLevel {
    /// 解析电价等级字符串，未识别的值一律视为 Normal。
    pub fn parse(value: &str) -> Self {
        match value {
            "low" => PriceLevel::Low,
            "high" => PriceLevel::High,
            _ => PriceLevel::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Low => "low",
            PriceLevel::Normal => "normal",
            PriceLevel::High => "high",
        }
    }
}

/// 电价（含税，货币单位）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price {
    pub amount: f64,
    pub level: PriceLevel,
}

/// 网络 / 时间同步 / broker 连接状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Connectivity {
    pub network_up: bool,
    pub time_synced: bool,
    pub broker_connected: bool,
}

/// 墙钟时间（时 0-23，分 0-59，秒 0-59）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl<T: chrono::Timelike> From<&T> for ClockTime {
    fn from(time: &T) -> Self {
        // Timelike 保证各分量在自然范围内，可安全截断为 u8。
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second().min(59) as u8,
        }
    }
}

/// 指示灯类测量所属的通道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    CarHeater,
    OilBurner,
    StockHeater,
    SolarHeater,
    Door,
    Flood,
}

impl IndicatorKind {
    /// 屏幕底部指示灯条的槽位顺序。
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::CarHeater,
        IndicatorKind::OilBurner,
        IndicatorKind::StockHeater,
        IndicatorKind::SolarHeater,
        IndicatorKind::Door,
        IndicatorKind::Flood,
    ];

    pub fn slot(&self) -> usize {
        match self {
            IndicatorKind::CarHeater => 0,
            IndicatorKind::OilBurner => 1,
            IndicatorKind::StockHeater => 2,
            IndicatorKind::SolarHeater => 3,
            IndicatorKind::Door => 4,
            IndicatorKind::Flood => 5,
        }
    }
}

/// 电价类测量的种类（当前价 / 当日均价）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Current,
    Average,
}

/// 测量标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Connectivity,
    Temperature,
    Level,
    CarHeater,
    OilBurner,
    StockHeater,
    SolarHeater,
    Door,
    Flood,
    Time,
    Price,
    AveragePrice,
}

impl MeasurementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Connectivity => "connectivity",
            MeasurementKind::Temperature => "temperature",
            MeasurementKind::Level => "level",
            MeasurementKind::CarHeater => "car_heater",
            MeasurementKind::OilBurner => "oil_burner",
            MeasurementKind::StockHeater => "stock_heater",
            MeasurementKind::SolarHeater => "solar_heater",
            MeasurementKind::Door => "door",
            MeasurementKind::Flood => "flood",
            MeasurementKind::Time => "time",
            MeasurementKind::Price => "price",
            MeasurementKind::AveragePrice => "average_price",
        }
    }
}

/// 已分类、已解码、可直接渲染的测量事件。
///
/// 每个变体只携带自身标签对应的载荷。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Connectivity(Connectivity),
    Temperature(f64),
    Level(i64),
    CarHeater(IndicatorState),
    OilBurner(IndicatorState),
    StockHeater(IndicatorState),
    SolarHeater(IndicatorState),
    Door(IndicatorState),
    Flood(IndicatorState),
    Time(ClockTime),
    Price(Price),
    AveragePrice(Price),
}

impl Measurement {
    /// 按通道构造指示灯测量。
    pub fn indicator(kind: IndicatorKind, state: IndicatorState) -> Self {
        match kind {
            IndicatorKind::CarHeater => Measurement::CarHeater(state),
            IndicatorKind::OilBurner => Measurement::OilBurner(state),
            IndicatorKind::StockHeater => Measurement::StockHeater(state),
            IndicatorKind::SolarHeater => Measurement::SolarHeater(state),
            IndicatorKind::Door => Measurement::Door(state),
            IndicatorKind::Flood => Measurement::Flood(state),
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Connectivity(_) => MeasurementKind::Connectivity,
            Measurement::Temperature(_) => MeasurementKind::Temperature,
            Measurement::Level(_) => MeasurementKind::Level,
            Measurement::CarHeater(_) => MeasurementKind::CarHeater,
            Measurement::OilBurner(_) => MeasurementKind::OilBurner,
            Measurement::StockHeater(_) => MeasurementKind::StockHeater,
            Measurement::SolarHeater(_) => MeasurementKind::SolarHeater,
            Measurement::Door(_) => MeasurementKind::Door,
            Measurement::Flood(_) => MeasurementKind::Flood,
            Measurement::Time(_) => MeasurementKind::Time,
            Measurement::Price(_) => MeasurementKind::Price,
            Measurement::AveragePrice(_) => MeasurementKind::AveragePrice,
        }
    }
}

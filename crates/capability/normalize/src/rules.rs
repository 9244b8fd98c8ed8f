//! 规则处理：每个规则编号对应一个处理函数，把解码后的字段变成测量事件。

use crate::classify::RuleId;
use crate::decode::{bool_field, float_field, int_field, str_field};
use crate::flags::FlagAggregator;
use chrono::Weekday;
use domain::{IndicatorKind, IndicatorState, Measurement, Price, PriceLevel};
use serde_json::Value;
use tracing::debug;

/// 功率阈值（W）：超过视为负载接通。
pub const POWER_THRESHOLD_W: f64 = 10.0;

/// 规则处理所需的设备 / 传感器名称。
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub temperature_sensor: String,
    pub car_heater_device: String,
    pub heating_relay_device: String,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            temperature_sensor: "ntc".to_string(),
            car_heater_device: "shellyplus1pm".to_string(),
            heating_relay_device: "shellypro4pm".to_string(),
        }
    }
}

/// 上次观测值（变化检测的比较基准）。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastValues {
    pub level: Option<i64>,
    pub temperature: Option<f64>,
}

/// 一次规则处理的上下文。
pub struct RuleContext<'a> {
    pub settings: &'a RuleSettings,
    pub flags: &'a mut FlagAggregator,
    pub last: &'a mut LastValues,
    pub today: Weekday,
}

/// 执行规则；未知编号静默忽略。
pub fn apply(rule: RuleId, tree: &Value, ctx: &mut RuleContext<'_>) -> Vec<Measurement> {
    match rule {
        RuleId::THERMOSTAT_LEVEL => thermostat_level(tree, ctx.last),
        RuleId::TEMPERATURE => temperature(tree, ctx.settings, ctx.last),
        RuleId::RELAY => relay(tree, ctx.settings),
        RuleId::DOOR_A | RuleId::DOOR_B | RuleId::DOOR_C | RuleId::DOOR_D => {
            let bit = (rule.0 - RuleId::DOOR_A.0) as u8;
            let state = ctx.flags.door_event(bit, bool_field(tree, "contact"));
            vec![Measurement::Door(state)]
        }
        RuleId::FLOOD_A | RuleId::FLOOD_B | RuleId::FLOOD_C => {
            let bit = (rule.0 - RuleId::FLOOD_A.0) as u8;
            let state = ctx.flags.flood_event(bit, bool_field(tree, "water_leak"));
            vec![Measurement::Flood(state)]
        }
        RuleId::PRICE => price(tree),
        RuleId::AVERAGE_PRICE => average_price(tree, ctx.today),
        other => {
            debug!(target: "monitor.normalize", rule = other.0, "rule_unhandled");
            Vec::new()
        }
    }
}

fn thermostat_level(tree: &Value, last: &mut LastValues) -> Vec<Measurement> {
    let Some(level) = int_field(tree, "value", last.level) else {
        return Vec::new();
    };
    last.level = Some(level.value);
    if level.changed {
        vec![Measurement::Level(level.value)]
    } else {
        Vec::new()
    }
}

fn temperature(tree: &Value, settings: &RuleSettings, last: &mut LastValues) -> Vec<Measurement> {
    if str_field(tree, "sensor") != Some(settings.temperature_sensor.as_str()) {
        return Vec::new();
    }
    let Some(value) = float_field(tree, "value", last.temperature) else {
        return Vec::new();
    };
    last.temperature = Some(value.value);
    if value.changed {
        vec![Measurement::Temperature(value.value)]
    } else {
        Vec::new()
    }
}

fn relay(tree: &Value, settings: &RuleSettings) -> Vec<Measurement> {
    let Some(device) = str_field(tree, "device") else {
        return Vec::new();
    };
    if device == settings.car_heater_device {
        car_heater(tree)
    } else if device == settings.heating_relay_device {
        heating_relay(tree)
    } else {
        debug!(target: "monitor.normalize", device, "relay_device_ignored");
        Vec::new()
    }
}

/// 车辆加热器：关 / 开（待机）/ 接通（功率超过阈值）。
fn car_heater(tree: &Value) -> Vec<Measurement> {
    if !bool_field(tree, "state").unwrap_or(false) {
        return vec![Measurement::CarHeater(IndicatorState::Off)];
    }
    let Some(power) = float_field(tree, "power", None) else {
        return Vec::new();
    };
    let state = if power.value > POWER_THRESHOLD_W {
        IndicatorState::Connected
    } else {
        IndicatorState::On
    };
    vec![Measurement::CarHeater(state)]
}

/// 供暖继电器：contact 选择通道，state 决定接通或关闭。
fn heating_relay(tree: &Value) -> Vec<Measurement> {
    let Some(contact) = int_field(tree, "contact", None) else {
        return Vec::new();
    };
    let kind = match contact.value {
        0 => IndicatorKind::SolarHeater,
        1 => IndicatorKind::StockHeater,
        2 => IndicatorKind::OilBurner,
        // 3 号触点未接线。
        _ => return Vec::new(),
    };
    let state = if bool_field(tree, "state").unwrap_or(false) {
        IndicatorState::Connected
    } else {
        IndicatorState::Off
    };
    vec![Measurement::indicator(kind, state)]
}

fn price_level(tree: &Value) -> PriceLevel {
    str_field(tree, "pricestate")
        .map(PriceLevel::parse)
        .unwrap_or_default()
}

fn price(tree: &Value) -> Vec<Measurement> {
    let level = price_level(tree);
    let Some(amount) = float_field(tree, "price", None) else {
        return Vec::new();
    };
    vec![Measurement::Price(Price {
        amount: amount.value,
        level,
    })]
}

/// 当日均价：广播包含每一天，只渲染 weekday 等于今天的那条（0 = 周日）。
///
/// 均价没有等级，pricestate 即使出现也不采用。
fn average_price(tree: &Value, today: Weekday) -> Vec<Measurement> {
    let Some(weekday) = int_field(tree, "weekday", None) else {
        return Vec::new();
    };
    if weekday.value != i64::from(today.num_days_from_sunday()) {
        return Vec::new();
    }
    let Some(avg) = float_field(tree, "avg", None) else {
        return Vec::new();
    };
    vec![Measurement::AveragePrice(Price {
        amount: avg.value,
        level: PriceLevel::Normal,
    })]
}

//! 应用运行配置加载。

use std::env;

/// 门磁传感器数量（门标志位宽）。
pub const DOOR_SENSOR_COUNT: usize = 4;
/// 漏水传感器数量（漏水标志位宽）。
pub const LEAK_SENSOR_COUNT: usize = 3;
/// 事件邮箱的最小容量。
pub const MIN_MAILBOX_CAPACITY: usize = 10;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topics: Vec<String>,
    pub home_topic_prefix: String,
    pub sensor_topic_prefix: String,
    pub door_sensors: Vec<String>,
    pub leak_sensors: Vec<String>,
    pub temperature_sensor: String,
    pub car_heater_device: String,
    pub heating_relay_device: String,
    pub mailbox_capacity: usize,
    pub clock_interval_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub utc_offset_minutes: Option<i32>,
    pub time_synced: bool,
    pub ingest_enabled: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mqtt_host = env::var("MONITOR_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("MONITOR_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("MONITOR_MQTT_USERNAME");
        let mqtt_password = read_optional("MONITOR_MQTT_PASSWORD");
        let home_topic_prefix = read_prefix("MONITOR_HOME_TOPIC_PREFIX", "home/kallio");
        let sensor_topic_prefix = read_prefix("MONITOR_SENSOR_TOPIC_PREFIX", "zigbee2mqtt");
        let mqtt_topics = read_list("MONITOR_MQTT_TOPICS").unwrap_or_else(|| {
            vec![
                format!("{}/#", home_topic_prefix),
                format!("{}/#", sensor_topic_prefix),
            ]
        });
        let door_sensors = read_list_exact(
            "MONITOR_DOOR_SENSORS",
            &["door_front", "door_back", "door_garage", "door_terrace"],
            DOOR_SENSOR_COUNT,
        )?;
        let leak_sensors = read_list_exact(
            "MONITOR_LEAK_SENSORS",
            &["leak_kitchen", "leak_bathroom", "leak_laundry"],
            LEAK_SENSOR_COUNT,
        )?;
        let temperature_sensor =
            env::var("MONITOR_TEMPERATURE_SENSOR").unwrap_or_else(|_| "ntc".to_string());
        let car_heater_device =
            env::var("MONITOR_CAR_HEATER_DEVICE").unwrap_or_else(|_| "shellyplus1pm".to_string());
        let heating_relay_device = env::var("MONITOR_HEATING_RELAY_DEVICE")
            .unwrap_or_else(|_| "shellypro4pm".to_string());
        let mailbox_capacity = read_usize_with_default("MONITOR_MAILBOX_CAPACITY", 10)?;
        if mailbox_capacity < MIN_MAILBOX_CAPACITY {
            return Err(ConfigError::Invalid(
                "MONITOR_MAILBOX_CAPACITY".to_string(),
                mailbox_capacity.to_string(),
            ));
        }
        let clock_interval_seconds = read_positive_u64("MONITOR_CLOCK_INTERVAL_SECONDS", 5)?;
        let idle_timeout_seconds = read_positive_u64("MONITOR_IDLE_TIMEOUT_SECONDS", 10)?;
        let utc_offset_minutes = read_utc_offset("MONITOR_UTC_OFFSET_MINUTES")?;
        let time_synced = read_bool_with_default("MONITOR_TIME_SYNCED", true);
        let ingest_enabled = read_bool_with_default("MONITOR_INGEST", true);

        Ok(Self {
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topics,
            home_topic_prefix,
            sensor_topic_prefix,
            door_sensors,
            leak_sensors,
            temperature_sensor,
            car_heater_device,
            heating_relay_device,
            mailbox_capacity,
            clock_interval_seconds,
            idle_timeout_seconds,
            utc_offset_minutes,
            time_synced,
            ingest_enabled,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 读取必须大于 0 的 u64（周期、超时）。
fn read_positive_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_utc_offset(key: &str) -> Result<Option<i32>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => match value.parse::<i32>() {
            Ok(minutes) if minutes.abs() < 24 * 60 => Ok(Some(minutes)),
            _ => Err(ConfigError::Invalid(key.to_string(), value)),
        },
        Err(_) => Ok(None),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// topic 前缀去掉首尾的 `/`。
fn read_prefix(key: &str, default: &str) -> String {
    let value = read_optional(key).unwrap_or_else(|| default.to_string());
    value.trim_matches('/').to_string()
}

fn read_list(key: &str) -> Option<Vec<String>> {
    let value = read_optional(key)?;
    let items = split_list(&value);
    if items.is_empty() { None } else { Some(items) }
}

fn read_list_exact(key: &str, default: &[&str], count: usize) -> Result<Vec<String>, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(default.iter().map(|item| item.to_string()).collect());
    };
    let items = split_list(&value);
    if items.len() != count {
        return Err(ConfigError::Invalid(key.to_string(), value));
    }
    Ok(items)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::split_list;

    #[test]
    fn split_list_trims_and_skips_empty() {
        assert_eq!(
            split_list(" a, b ,,c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(split_list(" , ").is_empty());
    }
}

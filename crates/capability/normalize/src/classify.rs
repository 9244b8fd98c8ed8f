//! Topic 分类：把 (topic, id 字段) 映射到规则编号。
//!
//! 规则表按声明顺序线性扫描，首个命中者生效。两条规则同时命中同一报文时
//! 结果完全取决于表内顺序，运行时不做冲突检查。

/// 规则编号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u16);

impl RuleId {
    pub const THERMOSTAT_LEVEL: RuleId = RuleId(1);
    pub const TEMPERATURE: RuleId = RuleId(2);
    pub const RELAY: RuleId = RuleId(3);
    pub const DOOR_A: RuleId = RuleId(10);
    pub const DOOR_B: RuleId = RuleId(11);
    pub const DOOR_C: RuleId = RuleId(12);
    pub const DOOR_D: RuleId = RuleId(13);
    pub const FLOOD_A: RuleId = RuleId(20);
    pub const FLOOD_B: RuleId = RuleId(21);
    pub const FLOOD_C: RuleId = RuleId(22);
    pub const PRICE: RuleId = RuleId(30);
    pub const AVERAGE_PRICE: RuleId = RuleId(31);

    pub const DOORS: [RuleId; 4] = [
        RuleId::DOOR_A,
        RuleId::DOOR_B,
        RuleId::DOOR_C,
        RuleId::DOOR_D,
    ];
    pub const FLOODS: [RuleId; 3] = [RuleId::FLOOD_A, RuleId::FLOOD_B, RuleId::FLOOD_C];
}

/// 主前缀下按 `id` 字段匹配的报文标识。
pub const THERMOSTAT_ID: &str = "thermostat";
pub const TEMPERATURE_ID: &str = "temperature";
pub const RELAY_ID: &str = "relay";
pub const PRICE_ID: &str = "price";
pub const PRICE_STAT_ID: &str = "pricestat";

/// 规则的匹配方式：二者只取其一。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    /// topic 以 `base/sub` 开头即命中。
    SubTopic(String),
    /// topic 以 `base` 开头且 `id` 字段等于给定值才命中。
    MessageId(String),
}

/// 规则表条目。
#[derive(Debug, Clone)]
pub struct Rule {
    pub base_topic: String,
    pub matcher: RuleMatch,
    pub id: RuleId,
    prefix: String,
}

impl Rule {
    pub fn message_id(
        base_topic: impl Into<String>,
        message_id: impl Into<String>,
        id: RuleId,
    ) -> Self {
        let base_topic = base_topic.into();
        Self {
            prefix: base_topic.clone(),
            base_topic,
            matcher: RuleMatch::MessageId(message_id.into()),
            id,
        }
    }

    pub fn sub_topic(
        base_topic: impl Into<String>,
        sub_topic: impl Into<String>,
        id: RuleId,
    ) -> Self {
        let base_topic = base_topic.into();
        let sub_topic = sub_topic.into();
        Self {
            prefix: format!("{}/{}", base_topic, sub_topic),
            base_topic,
            matcher: RuleMatch::SubTopic(sub_topic),
            id,
        }
    }

    pub fn matches(&self, topic: &str, message_id: Option<&str>) -> bool {
        if !topic.starts_with(&self.prefix) {
            return false;
        }
        match &self.matcher {
            RuleMatch::SubTopic(_) => true,
            RuleMatch::MessageId(expected) => message_id == Some(expected.as_str()),
        }
    }
}

/// 生产规则表所需的前缀与传感器子 topic。
#[derive(Debug, Clone)]
pub struct RuleTableConfig {
    pub home_prefix: String,
    pub sensor_prefix: String,
    pub door_sensors: Vec<String>,
    pub leak_sensors: Vec<String>,
}

/// 不可变规则表，启动时构建一次。
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// 标准规则表：先是主前缀下按 id 匹配的规则，再是传感器子 topic 规则。
    ///
    /// 门磁与漏水传感器依次分配 `DOOR_A..` / `FLOOD_A..`，多出的名称被忽略。
    pub fn standard(config: &RuleTableConfig) -> Self {
        let home = config.home_prefix.as_str();
        let sensors = config.sensor_prefix.as_str();
        let mut rules = vec![
            Rule::message_id(home, THERMOSTAT_ID, RuleId::THERMOSTAT_LEVEL),
            Rule::message_id(home, TEMPERATURE_ID, RuleId::TEMPERATURE),
            Rule::message_id(home, RELAY_ID, RuleId::RELAY),
            Rule::message_id(home, PRICE_ID, RuleId::PRICE),
            Rule::message_id(home, PRICE_STAT_ID, RuleId::AVERAGE_PRICE),
        ];
        rules.extend(
            config
                .door_sensors
                .iter()
                .zip(RuleId::DOORS)
                .map(|(name, id)| Rule::sub_topic(sensors, name.as_str(), id)),
        );
        rules.extend(
            config
                .leak_sensors
                .iter()
                .zip(RuleId::FLOODS)
                .map(|(name, id)| Rule::sub_topic(sensors, name.as_str(), id)),
        );
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 返回首个命中规则的编号；topic 为空时直接视为未命中。
    pub fn classify(&self, topic: &str, message_id: Option<&str>) -> Option<RuleId> {
        if topic.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(topic, message_id))
            .map(|rule| rule.id)
    }
}

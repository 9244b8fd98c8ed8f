//! 字段解码：按字段名从报文字段树中取值。
//!
//! 数值字段同时与调用方给出的上次观测值比较，返回是否变化。
//! 字段缺失或类型不符只记 debug 日志并返回 `None`，不视为错误。

use serde_json::Value;
use tracing::debug;

/// 解码结果：新值与“是否与上次不同”。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub changed: bool,
}

fn field<'a>(tree: &'a Value, name: &str) -> Option<&'a Value> {
    let item = tree.get(name);
    if item.is_none() {
        debug!(target: "monitor.normalize", field = name, "field_missing");
    }
    item
}

fn wrong_type(name: &str, expected: &'static str) {
    debug!(target: "monitor.normalize", field = name, expected, "field_wrong_type");
}

/// 读取字符串字段。
pub fn str_field<'a>(tree: &'a Value, name: &str) -> Option<&'a str> {
    let value = field(tree, name)?.as_str();
    if value.is_none() {
        wrong_type(name, "string");
    }
    value
}

/// 读取布尔字段，只接受 JSON 原生 true/false。
pub fn bool_field(tree: &Value, name: &str) -> Option<bool> {
    let value = field(tree, name)?.as_bool();
    if value.is_none() {
        wrong_type(name, "bool");
    }
    value
}

/// 读取整数字段；浮点数按截断取整。
pub fn int_field(tree: &Value, name: &str, previous: Option<i64>) -> Option<Decoded<i64>> {
    let item = field(tree, name)?;
    let value = match item.as_i64() {
        Some(value) => value,
        None => match item.as_f64() {
            Some(value) => value as i64,
            None => {
                wrong_type(name, "number");
                return None;
            }
        },
    };
    let changed = previous != Some(value);
    if !changed {
        debug!(target: "monitor.normalize", field = name, value, "field_unchanged");
    }
    Some(Decoded { value, changed })
}

/// 读取浮点字段；与上次值按位比较，不做容差。
pub fn float_field(tree: &Value, name: &str, previous: Option<f64>) -> Option<Decoded<f64>> {
    let Some(value) = field(tree, name)?.as_f64() else {
        wrong_type(name, "number");
        return None;
    };
    let changed = previous.is_none_or(|previous| previous.to_bits() != value.to_bits());
    if !changed {
        debug!(target: "monitor.normalize", field = name, value, "field_unchanged");
    }
    Some(Decoded { value, changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_field_reports_change_against_previous() {
        let tree = json!({ "value": 21 });
        assert_eq!(
            int_field(&tree, "value", Some(21)),
            Some(Decoded {
                value: 21,
                changed: false
            })
        );
        assert_eq!(
            int_field(&tree, "value", Some(20)),
            Some(Decoded {
                value: 21,
                changed: true
            })
        );
        assert_eq!(
            int_field(&tree, "value", None),
            Some(Decoded {
                value: 21,
                changed: true
            })
        );
    }

    #[test]
    fn int_field_truncates_float() {
        let tree = json!({ "value": 21.9 });
        assert_eq!(int_field(&tree, "value", None).map(|d| d.value), Some(21));
    }

    #[test]
    fn float_field_uses_exact_equality() {
        let tree = json!({ "value": 0.1 });
        let same = float_field(&tree, "value", Some(0.1)).expect("present");
        assert!(!same.changed);
        let near = float_field(&tree, "value", Some(0.1 + f64::EPSILON)).expect("present");
        assert!(near.changed);
        assert_eq!(near.value, 0.1);
    }

    #[test]
    fn float_field_accepts_integer_json() {
        let tree = json!({ "power": 15 });
        assert_eq!(float_field(&tree, "power", None).map(|d| d.value), Some(15.0));
    }

    #[test]
    fn missing_or_mistyped_fields_are_absent() {
        let tree = json!({ "value": "warm", "state": 1, "id": 7 });
        assert!(int_field(&tree, "value", None).is_none());
        assert!(float_field(&tree, "missing", None).is_none());
        assert!(bool_field(&tree, "state").is_none());
        assert!(str_field(&tree, "id").is_none());
    }

    #[test]
    fn bool_field_reads_native_booleans() {
        let tree = json!({ "on": true, "off": false, "text": "true" });
        assert_eq!(bool_field(&tree, "on"), Some(true));
        assert_eq!(bool_field(&tree, "off"), Some(false));
        assert_eq!(bool_field(&tree, "text"), None);
    }

    #[test]
    fn non_object_tree_has_no_fields() {
        let tree = json!([1, 2, 3]);
        assert!(str_field(&tree, "id").is_none());
    }
}

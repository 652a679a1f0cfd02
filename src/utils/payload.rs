//! 异构 webhook 载荷的字段提取
//!
//! 上游系统的载荷结构并不固定，同一个字段可能出现在不同位置。
//! 每个字段对应一组按优先级排列的点分路径，取第一个能解析出
//! 非空字符串或数字的路径。

use serde_json::Value;

/// 一个字段的提取规则
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub paths: &'static [&'static str],
}

impl FieldRule {
    /// 按顺序尝试每条路径，返回第一个命中的值
    pub fn extract(&self, doc: &Value) -> Option<String> {
        self.paths
            .iter()
            .find_map(|path| lookup_path(doc, path).and_then(scalar_to_string))
    }
}

pub const CONTACT_ID_RULE: FieldRule = FieldRule {
    name: "contactId",
    paths: &[
        "contact_id",
        "contactId",
        "contact.id",
        "contact.contact_id",
        "appointment.contact_id",
        "appointment.contactId",
        "data.contact_id",
        "data.contactId",
        "data.contact.id",
    ],
};

pub const APPOINTMENT_ID_RULE: FieldRule = FieldRule {
    name: "appointmentId",
    paths: &[
        "appointment_id",
        "appointmentId",
        "appointment.id",
        "data.appointment_id",
        "data.appointmentId",
        "data.appointment.id",
        "id",
    ],
};

/// 沿点分路径查找，路径上任何一段不是对象都视为未命中
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// 标量转字符串：非空字符串（去除首尾空白）或数字，其余为 None
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_snake_case() {
        let doc = json!({"contact_id": 42, "appointment_id": "apt-1"});
        assert_eq!(CONTACT_ID_RULE.extract(&doc).as_deref(), Some("42"));
        assert_eq!(APPOINTMENT_ID_RULE.extract(&doc).as_deref(), Some("apt-1"));
    }

    #[test]
    fn test_nested_shapes() {
        let doc = json!({
            "type": "AppointmentCreate",
            "appointment": {"id": "apt-9", "contactId": "c-77"}
        });
        assert_eq!(CONTACT_ID_RULE.extract(&doc).as_deref(), Some("c-77"));
        assert_eq!(APPOINTMENT_ID_RULE.extract(&doc).as_deref(), Some("apt-9"));

        let doc = json!({"data": {"contact": {"id": 5}, "appointment": {"id": 6}}});
        assert_eq!(CONTACT_ID_RULE.extract(&doc).as_deref(), Some("5"));
        assert_eq!(APPOINTMENT_ID_RULE.extract(&doc).as_deref(), Some("6"));
    }

    #[test]
    fn test_priority_order_wins() {
        let doc = json!({"contactId": "second", "contact_id": "first"});
        assert_eq!(CONTACT_ID_RULE.extract(&doc).as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_and_non_scalar_values_are_skipped() {
        let doc = json!({
            "contact_id": "   ",
            "contactId": null,
            "contact": {"id": ["x"]},
            "data": {"contact_id": "fallback"}
        });
        assert_eq!(CONTACT_ID_RULE.extract(&doc).as_deref(), Some("fallback"));
    }

    #[test]
    fn test_missing_everywhere() {
        assert!(CONTACT_ID_RULE.extract(&json!({"foo": 1})).is_none());
        assert!(CONTACT_ID_RULE.extract(&json!([1, 2])).is_none());
        assert!(CONTACT_ID_RULE.extract(&Value::Null).is_none());
    }

    #[test]
    fn test_lookup_path_stops_at_non_object() {
        let doc = json!({"contact": "plain-string"});
        assert!(lookup_path(&doc, "contact.id").is_none());
        assert_eq!(lookup_path(&doc, "contact"), Some(&json!("plain-string")));
    }
}

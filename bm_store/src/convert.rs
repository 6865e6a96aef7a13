//! Conversions between DynamoDB attribute values and JSON.
//!
//! The reuse copy-forward and the generic check evaluation work on rows as
//! attribute-name/value maps rather than typed records, so the boundary
//! between `AttributeValue` and `serde_json::Value` lives here.

use crate::Record;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use types::millis;

pub fn attr_to_json(attr: &AttributeValue) -> serde_json::Value {
    match attr {
        AttributeValue::S(s) => serde_json::Value::String(s.clone()),
        AttributeValue::N(n) => {
            // Prefer integers so TTLs and counters survive the round trip
            // without picking up a fractional representation.
            if let Ok(i) = n.parse::<i64>() {
                serde_json::Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            } else {
                serde_json::Value::Null
            }
        }
        AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
        AttributeValue::L(list) => serde_json::Value::Array(
            list.iter().map(attr_to_json).collect(),
        ),
        AttributeValue::M(map) => serde_json::Value::Object(
            map.iter().map(|(k, v)| (k.clone(), attr_to_json(v))).collect(),
        ),
        AttributeValue::Ss(ss) => serde_json::Value::Array(
            ss.iter()
                .cloned()
                .map(serde_json::Value::String)
                .collect(),
        ),
        _ => serde_json::Value::Null,
    }
}

pub fn json_to_attr(value: &serde_json::Value) -> AttributeValue {
    match value {
        serde_json::Value::String(s) => AttributeValue::S(s.clone()),
        serde_json::Value::Number(n) => AttributeValue::N(n.to_string()),
        serde_json::Value::Bool(b) => AttributeValue::Bool(*b),
        serde_json::Value::Array(a) => {
            AttributeValue::L(a.iter().map(json_to_attr).collect())
        }
        serde_json::Value::Object(o) => AttributeValue::M(
            o.iter().map(|(k, v)| (k.clone(), json_to_attr(v))).collect(),
        ),
        serde_json::Value::Null => AttributeValue::Null(true),
    }
}

pub fn item_to_record(item: &HashMap<String, AttributeValue>) -> Record {
    item.iter().map(|(k, v)| (k.clone(), attr_to_json(v))).collect()
}

pub fn record_to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record.iter().map(|(k, v)| (k.clone(), json_to_attr(v))).collect()
}

/// A numeric attribute holding decimal seconds, rendered from milliseconds.
///
/// The loop-position index relies on string-exact equality of this
/// attribute, so both writes and query conditions must build it here.
#[must_use]
pub fn decimal_seconds(ms: i64) -> AttributeValue {
    AttributeValue::N(millis::to_decimal_string(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_prefer_integer_representation() {
        assert_eq!(
            attr_to_json(&AttributeValue::N("1700000000".to_string())),
            serde_json::json!(1_700_000_000_i64)
        );
        assert_eq!(
            attr_to_json(&AttributeValue::N("254.3".to_string())),
            serde_json::json!(254.3)
        );
    }

    #[test]
    fn record_round_trip_is_stable() {
        let item = HashMap::from([
            ("Stream_ID".to_string(), AttributeValue::S("test_1".into())),
            ("Finished".to_string(), AttributeValue::Bool(true)),
            (
                "Start_Time_Sec_In_Loop".to_string(),
                AttributeValue::N("254.3".into()),
            ),
        ]);

        let round_tripped = record_to_item(&item_to_record(&item));
        assert_eq!(round_tripped, item);
    }

    #[test]
    fn decimal_seconds_matches_index_representation() {
        assert_eq!(decimal_seconds(254_300), AttributeValue::N("254.3".into()));
        assert_eq!(decimal_seconds(70_000), AttributeValue::N("70".into()));
    }
}

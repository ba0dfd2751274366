//! Value conversion between attributes and API payloads
//!
//! Attributes map onto the payload through their `provider_name`, a dotted
//! path such as `properties.enablePurge`. Blocks map their fields the same
//! way, relative to the block's own object.

use std::collections::HashMap;

use azrm_core::resource::Value;
use azrm_core::schema::{AttributeType, ResourceSchema};
use serde_json::Value as JsonValue;

/// Normalize a location for the API ("West Europe" -> "westeurope")
pub fn normalize_location(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Look up a dotted path in a JSON value
pub fn get_path<'a>(json: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(json, |current, key| current.get(key))
}

/// Set a dotted path in a JSON object, creating intermediate objects
pub fn set_path(object: &mut serde_json::Map<String, JsonValue>, path: &str, value: JsonValue) {
    match path.split_once('.') {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
            if !child.is_object() {
                *child = JsonValue::Object(serde_json::Map::new());
            }
            if let JsonValue::Object(child) = child {
                set_path(child, rest, value);
            }
        }
    }
}

/// Convert an attribute value to its payload representation
pub fn value_to_json(attr_type: &AttributeType, value: &Value) -> JsonValue {
    match (attr_type, value) {
        (AttributeType::Block(fields), Value::Map(map)) => {
            let mut object = serde_json::Map::new();
            for field in fields {
                if let Some(v) = map.get(&field.name) {
                    let path = field.provider_name.as_deref().unwrap_or(&field.name);
                    set_path(&mut object, path, value_to_json(&field.attr_type, v));
                }
            }
            JsonValue::Object(object)
        }
        (AttributeType::List(inner), Value::List(items)) => {
            JsonValue::Array(items.iter().map(|v| value_to_json(inner, v)).collect())
        }
        (AttributeType::Map(inner), Value::Map(map)) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(inner, v)))
                .collect(),
        ),
        (AttributeType::Custom { base, .. }, v) => value_to_json(base, v),
        _ => value.to_json(),
    }
}

/// Convert a payload value back to an attribute value
///
/// Returns `None` for `null` and for blocks without any known field.
pub fn json_to_value(attr_type: &AttributeType, json: &JsonValue) -> Option<Value> {
    match (attr_type, json) {
        (AttributeType::Block(fields), JsonValue::Object(_)) => {
            let map: HashMap<String, Value> = fields
                .iter()
                .filter_map(|field| {
                    let path = field.provider_name.as_deref().unwrap_or(&field.name);
                    let v = get_path(json, path)?;
                    json_to_value(&field.attr_type, v).map(|v| (field.name.clone(), v))
                })
                .collect();
            if map.is_empty() {
                None
            } else {
                Some(Value::Map(map))
            }
        }
        (AttributeType::List(inner), JsonValue::Array(items)) => Some(Value::List(
            items.iter().filter_map(|v| json_to_value(inner, v)).collect(),
        )),
        (AttributeType::Map(inner), JsonValue::Object(object)) => Some(Value::Map(
            object
                .iter()
                .filter_map(|(k, v)| json_to_value(inner, v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        (AttributeType::Custom { base, .. }, v) => json_to_value(base, v),
        _ => Value::from_json(json),
    }
}

/// Build the payload from every attribute that has a `provider_name`
pub fn expand_attributes(
    schema: &ResourceSchema,
    attributes: &HashMap<String, Value>,
) -> serde_json::Map<String, JsonValue> {
    let mut payload = serde_json::Map::new();
    for attr in schema.sorted_attributes() {
        if let Some(path) = &attr.provider_name
            && let Some(value) = attributes.get(&attr.name)
        {
            set_path(&mut payload, path, value_to_json(&attr.attr_type, value));
        }
    }
    payload
}

/// Read every attribute that has a `provider_name` from the payload
///
/// Sensitive attributes are never read back.
pub fn flatten_attributes(
    schema: &ResourceSchema,
    payload: &JsonValue,
) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();
    for attr in schema.sorted_attributes() {
        if attr.sensitive {
            continue;
        }
        if let Some(path) = &attr.provider_name
            && let Some(json) = get_path(payload, path)
            && let Some(value) = json_to_value(&attr.attr_type, json)
        {
            attributes.insert(attr.name.clone(), value);
        }
    }
    attributes
}

/// Build the `identity` payload object from an identity block
///
/// User-assigned identities are sent as a map keyed by identity ID.
pub fn expand_identity(block: &HashMap<String, Value>) -> JsonValue {
    let kind = block
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("UserAssigned");
    let mut identity = serde_json::Map::new();
    identity.insert("type".to_string(), JsonValue::String(kind.to_string()));

    let ids: serde_json::Map<String, JsonValue> = block
        .get("identity_ids")
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(|id| (id.to_string(), JsonValue::Object(serde_json::Map::new())))
        .collect();
    if !ids.is_empty() {
        identity.insert("userAssignedIdentities".to_string(), JsonValue::Object(ids));
    }
    JsonValue::Object(identity)
}

/// Read an `identity` payload object back into an identity block
pub fn flatten_identity(identity: &JsonValue) -> Option<Value> {
    let mut block = HashMap::new();
    match identity.get("type").and_then(JsonValue::as_str) {
        Some("None") | None => return None,
        Some(kind) => {
            block.insert("type".to_string(), Value::string(kind));
        }
    }
    if let Some(ids) = identity
        .get("userAssignedIdentities")
        .and_then(JsonValue::as_object)
    {
        let mut ids: Vec<&String> = ids.keys().collect();
        ids.sort();
        block.insert(
            "identity_ids".to_string(),
            Value::List(ids.into_iter().map(Value::string).collect()),
        );
    }
    for (field, key) in [("principal_id", "principalId"), ("tenant_id", "tenantId")] {
        if let Some(value) = identity.get(key).and_then(JsonValue::as_str) {
            block.insert(field.to_string(), Value::string(value));
        }
    }
    Some(Value::Map(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::schema::AttributeSchema;
    use serde_json::json;

    fn storage_block() -> AttributeType {
        AttributeType::Block(vec![
            AttributeSchema::new("id", AttributeType::String).with_provider_name("id"),
            AttributeSchema::new("identity_id", AttributeType::String)
                .with_provider_name("identity.userAssignedIdentity"),
        ])
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("eastus2"), "eastus2");
    }

    #[test]
    fn set_and_get_nested_paths() {
        let mut object = serde_json::Map::new();
        set_path(&mut object, "properties.enablePurge", json!(true));
        set_path(&mut object, "properties.engineType", json!("V2"));
        set_path(&mut object, "location", json!("westeurope"));
        let json = JsonValue::Object(object);
        assert_eq!(
            json,
            json!({"location": "westeurope", "properties": {"enablePurge": true, "engineType": "V2"}})
        );
        assert_eq!(get_path(&json, "properties.engineType"), Some(&json!("V2")));
        assert_eq!(get_path(&json, "properties.missing"), None);
    }

    #[test]
    fn blocks_use_field_paths() {
        let value = Value::Map(HashMap::from([
            ("id".to_string(), Value::string("/subscriptions/s/storage")),
            ("identity_id".to_string(), Value::string("/subscriptions/s/identity")),
        ]));
        let json = value_to_json(&storage_block(), &value);
        assert_eq!(
            json,
            json!({"id": "/subscriptions/s/storage", "identity": {"userAssignedIdentity": "/subscriptions/s/identity"}})
        );
        assert_eq!(json_to_value(&storage_block(), &json), Some(value));
    }

    #[test]
    fn empty_block_reads_as_absent() {
        assert_eq!(json_to_value(&storage_block(), &json!({"other": 1})), None);
        assert_eq!(json_to_value(&storage_block(), &JsonValue::Null), None);
    }

    #[test]
    fn expand_and_flatten_follow_provider_names() {
        let schema = ResourceSchema::new("test")
            .attribute(AttributeSchema::new("name", AttributeType::String))
            .attribute(
                AttributeSchema::new("purge_enabled", AttributeType::Bool)
                    .with_provider_name("properties.enablePurge"),
            )
            .attribute(
                AttributeSchema::new("password", AttributeType::String)
                    .sensitive()
                    .with_provider_name("properties.password"),
            );
        let attributes = HashMap::from([
            ("name".to_string(), Value::string("ignored")),
            ("purge_enabled".to_string(), Value::Bool(true)),
            ("password".to_string(), Value::string("secret")),
        ]);
        let payload = JsonValue::Object(expand_attributes(&schema, &attributes));
        assert_eq!(
            payload,
            json!({"properties": {"enablePurge": true, "password": "secret"}})
        );

        let read = flatten_attributes(&schema, &payload);
        assert_eq!(
            read,
            HashMap::from([("purge_enabled".to_string(), Value::Bool(true))])
        );
    }

    #[test]
    fn identity_round_trip() {
        let block = HashMap::from([
            ("type".to_string(), Value::string("SystemAssigned, UserAssigned")),
            (
                "identity_ids".to_string(),
                Value::List(vec![Value::string("/subscriptions/s/identity")]),
            ),
        ]);
        let json = expand_identity(&block);
        assert_eq!(
            json,
            json!({
                "type": "SystemAssigned, UserAssigned",
                "userAssignedIdentities": {"/subscriptions/s/identity": {}}
            })
        );

        let mut returned = json.clone();
        returned["principalId"] = json!("11111111-1111-1111-1111-111111111111");
        let Some(Value::Map(read)) = flatten_identity(&returned) else {
            panic!("identity should be read back");
        };
        assert_eq!(read.get("type"), block.get("type"));
        assert_eq!(read.get("identity_ids"), block.get("identity_ids"));
        assert_eq!(
            read.get("principal_id"),
            Some(&Value::string("11111111-1111-1111-1111-111111111111"))
        );
    }

    #[test]
    fn system_assigned_identity_has_no_id_map() {
        let block = HashMap::from([("type".to_string(), Value::string("SystemAssigned"))]);
        assert_eq!(expand_identity(&block), json!({"type": "SystemAssigned"}));
        assert_eq!(flatten_identity(&json!({"type": "None"})), None);
    }
}

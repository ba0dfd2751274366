//! Management-plane client trait and an in-memory implementation

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by a management-plane client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The addressed resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The payload was rejected
    #[error("Bad request for {id}: {message}")]
    BadRequest { id: String, message: String },

    /// The resource does not support the requested action
    #[error("Unsupported action {action:?} on {id}")]
    UnsupportedAction { id: String, action: String },

    /// Transport failure
    #[error("Request failed: {0}")]
    Request(String),
}

impl ClientError {
    pub fn bad_request(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Result type for client calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Calls into the management plane, addressed by formatted resource ID
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Fetch a resource; `None` when it does not exist
    async fn get(&self, id: &str) -> ClientResult<Option<JsonValue>>;

    /// Create or replace a resource and return its stored representation
    async fn create_or_update(&self, id: &str, payload: JsonValue) -> ClientResult<JsonValue>;

    /// Delete a resource. Deleting a missing resource succeeds.
    async fn delete(&self, id: &str) -> ClientResult<()>;

    /// Invoke a resource action (e.g. `listLanguageExtensions`)
    async fn invoke_action(
        &self,
        id: &str,
        action: &str,
        body: JsonValue,
    ) -> ClientResult<JsonValue>;
}

pub const LIST_LANGUAGE_EXTENSIONS: &str = "listLanguageExtensions";
pub const ADD_LANGUAGE_EXTENSIONS: &str = "addLanguageExtensions";
pub const REMOVE_LANGUAGE_EXTENSIONS: &str = "removeLanguageExtensions";

const LANGUAGE_EXTENSIONS_PATH: [&str; 3] = ["properties", "languageExtensions", "value"];

/// Client backed by a map of payloads, keyed by lower-cased resource ID
///
/// Resource IDs are case-insensitive on the wire, so lookups ignore casing
/// while stored payloads keep the ID they were written with.
#[derive(Debug, Default)]
pub struct InMemoryClient {
    resources: RwLock<HashMap<String, JsonValue>>,
    calls: RwLock<Vec<String>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource without recording a call
    pub async fn insert(&self, id: &str, payload: JsonValue) {
        let stored = stored_payload(id, payload);
        self.resources.write().await.insert(key(id), stored);
    }

    /// Current payload of a resource
    pub async fn payload(&self, id: &str) -> Option<JsonValue> {
        self.resources.read().await.get(&key(id)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Calls made so far, as `"<operation> <id>"`
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, operation: &str, id: &str) {
        self.calls.write().await.push(format!("{} {}", operation, id));
    }
}

fn key(id: &str) -> String {
    id.to_ascii_lowercase()
}

fn stored_payload(id: &str, payload: JsonValue) -> JsonValue {
    let mut payload = match payload {
        JsonValue::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    let name = id.rsplit('/').next().unwrap_or_default();
    payload.insert("id".to_string(), json!(id));
    payload.insert("name".to_string(), json!(name));
    JsonValue::Object(payload)
}

fn extension_names(body: &JsonValue) -> Vec<String> {
    body.get("value")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("languageExtensionName"))
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn extensions_body(names: &[String]) -> JsonValue {
    let items: Vec<JsonValue> = names
        .iter()
        .map(|name| json!({ "languageExtensionName": name }))
        .collect();
    json!({ "value": items })
}

fn stored_extensions(payload: &JsonValue) -> Vec<String> {
    payload
        .get(LANGUAGE_EXTENSIONS_PATH[0])
        .and_then(|p| p.get(LANGUAGE_EXTENSIONS_PATH[1]))
        .map(extension_names)
        .unwrap_or_default()
}

fn store_extensions(payload: &mut JsonValue, names: &[String]) {
    if !payload.is_object() {
        *payload = json!({});
    }
    let properties = &mut payload[LANGUAGE_EXTENSIONS_PATH[0]];
    if !properties.is_object() {
        *properties = json!({});
    }
    properties[LANGUAGE_EXTENSIONS_PATH[1]] = extensions_body(names);
}

#[async_trait]
impl ManagementClient for InMemoryClient {
    async fn get(&self, id: &str) -> ClientResult<Option<JsonValue>> {
        self.record("GET", id).await;
        Ok(self.resources.read().await.get(&key(id)).cloned())
    }

    async fn create_or_update(&self, id: &str, payload: JsonValue) -> ClientResult<JsonValue> {
        self.record("PUT", id).await;
        if !payload.is_object() {
            return Err(ClientError::bad_request(id, "payload must be a JSON object"));
        }
        let mut stored = stored_payload(id, payload);
        let mut resources = self.resources.write().await;
        // Language extensions are only changed through actions
        if let Some(existing) = resources.get(&key(id)) {
            let current = stored_extensions(existing);
            store_extensions(&mut stored, &current);
        }
        resources.insert(key(id), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.record("DELETE", id).await;
        self.resources.write().await.remove(&key(id));
        Ok(())
    }

    async fn invoke_action(
        &self,
        id: &str,
        action: &str,
        body: JsonValue,
    ) -> ClientResult<JsonValue> {
        self.record(&format!("POST {}", action), id).await;
        let mut resources = self.resources.write().await;
        let payload = resources
            .get_mut(&key(id))
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;

        let mut current = stored_extensions(payload);
        match action {
            LIST_LANGUAGE_EXTENSIONS => return Ok(extensions_body(&current)),
            ADD_LANGUAGE_EXTENSIONS => {
                for name in extension_names(&body) {
                    if !current.contains(&name) {
                        current.push(name);
                    }
                }
            }
            REMOVE_LANGUAGE_EXTENSIONS => {
                let removed = extension_names(&body);
                current.retain(|name| !removed.contains(name));
            }
            _ => {
                return Err(ClientError::UnsupportedAction {
                    id: id.to_string(),
                    action: action.to_string(),
                });
            }
        }
        store_extensions(payload, &current);
        Ok(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER_ID: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Kusto/clusters/kustocluster";

    #[tokio::test]
    async fn get_is_case_insensitive() {
        let client = InMemoryClient::new();
        client
            .create_or_update(CLUSTER_ID, json!({"location": "westeurope"}))
            .await
            .unwrap();

        let upper = CLUSTER_ID.to_ascii_uppercase();
        let payload = client.get(&upper).await.unwrap().unwrap();
        assert_eq!(payload["id"], json!(CLUSTER_ID));
        assert_eq!(payload["name"], json!("kustocluster"));
        assert_eq!(payload["location"], json!("westeurope"));
    }

    #[tokio::test]
    async fn delete_removes_and_is_idempotent() {
        let client = InMemoryClient::new();
        client.insert(CLUSTER_ID, json!({})).await;
        client.delete(CLUSTER_ID).await.unwrap();
        client.delete(CLUSTER_ID).await.unwrap();
        assert!(client.get(CLUSTER_ID).await.unwrap().is_none());
        assert_eq!(
            client.calls().await,
            vec![
                format!("DELETE {}", CLUSTER_ID),
                format!("DELETE {}", CLUSTER_ID),
                format!("GET {}", CLUSTER_ID),
            ]
        );
    }

    #[tokio::test]
    async fn language_extension_actions() {
        let client = InMemoryClient::new();
        client.insert(CLUSTER_ID, json!({"properties": {}})).await;

        client
            .invoke_action(
                CLUSTER_ID,
                ADD_LANGUAGE_EXTENSIONS,
                extensions_body(&["PYTHON".to_string(), "R".to_string()]),
            )
            .await
            .unwrap();
        client
            .invoke_action(
                CLUSTER_ID,
                REMOVE_LANGUAGE_EXTENSIONS,
                extensions_body(&["PYTHON".to_string()]),
            )
            .await
            .unwrap();

        let listed = client
            .invoke_action(CLUSTER_ID, LIST_LANGUAGE_EXTENSIONS, JsonValue::Null)
            .await
            .unwrap();
        assert_eq!(extension_names(&listed), vec!["R".to_string()]);
    }

    #[tokio::test]
    async fn put_keeps_language_extensions() {
        let client = InMemoryClient::new();
        client
            .insert(
                CLUSTER_ID,
                json!({"properties": {"languageExtensions": {"value": [{"languageExtensionName": "R"}]}}}),
            )
            .await;
        let stored = client
            .create_or_update(CLUSTER_ID, json!({"properties": {"enablePurge": true}}))
            .await
            .unwrap();
        assert_eq!(stored_extensions(&stored), vec!["R".to_string()]);
        assert_eq!(stored["properties"]["enablePurge"], json!(true));
    }

    #[tokio::test]
    async fn actions_on_missing_resource_fail() {
        let client = InMemoryClient::new();
        let err = client
            .invoke_action(CLUSTER_ID, LIST_LANGUAGE_EXTENSIONS, JsonValue::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));

        client.insert(CLUSTER_ID, json!({})).await;
        let err = client
            .invoke_action(CLUSTER_ID, "stop", JsonValue::Null)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Unsupported action \"stop\" on {}", CLUSTER_ID)
        );
    }

    #[tokio::test]
    async fn rejects_non_object_payload() {
        let client = InMemoryClient::new();
        let err = client
            .create_or_update(CLUSTER_ID, json!([1, 2]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::BadRequest { .. }));
        assert!(client.is_empty().await);
    }
}

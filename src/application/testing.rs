//! In-memory `AdminApi` used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::repos::{AdminApi, ApiError, CategorySource, ServerQuery};
use crate::domain::content::ContentKind;

#[derive(Default)]
pub struct MemoryApi {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    categories: Vec<Value>,
    failing_ids: HashSet<String>,
    fail_fetch: bool,
    fetch_delay: Option<Duration>,
    fetches: AtomicUsize,
    queries: Mutex<Vec<ServerQuery>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, collection: &str, items: Value) -> Self {
        let items = match items {
            Value::Array(items) => items,
            other => vec![other],
        };
        self.collections
            .lock()
            .expect("collections lock")
            .insert(collection.to_string(), items);
        self
    }

    pub fn with_categories(mut self, categories: Value) -> Self {
        if let Value::Array(items) = categories {
            self.categories = items;
        }
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn last_query(&self) -> Option<ServerQuery> {
        self.queries.lock().expect("queries lock").last().cloned()
    }

    pub fn ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .lock()
            .expect("collections lock")
            .get(collection)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").map(render_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn item(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .lock()
            .expect("collections lock")
            .get(collection)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item.get("id").map(render_id).as_deref() == Some(id))
                    .cloned()
            })
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check(&self, id: &str) -> Result<(), ApiError> {
        if self.failing_ids.contains(id) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("refused {id}"),
            });
        }
        Ok(())
    }

    fn with_item<F>(&self, kind: ContentKind, id: &str, apply: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut Value),
    {
        let mut collections = self.collections.lock().expect("collections lock");
        let item = collections
            .get_mut(kind.collection())
            .and_then(|items| {
                items
                    .iter_mut()
                    .find(|item| item.get("id").map(render_id).as_deref() == Some(id))
            })
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            })?;
        apply(item);
        Ok(())
    }
}

fn render_id(value: &Value) -> String {
    match value {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl AdminApi for MemoryApi {
    async fn fetch_collection(
        &self,
        kind: ContentKind,
        query: &ServerQuery,
    ) -> Result<Value, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.clone());
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }

        let collections = self.collections.lock().expect("collections lock");
        let mut body = serde_json::Map::new();
        if let Some(items) = collections.get(kind.collection()) {
            body.insert(kind.collection().to_string(), Value::Array(items.clone()));
        }
        Ok(Value::Object(body))
    }

    async fn patch_item(&self, kind: ContentKind, id: &str, patch: Value) -> Result<(), ApiError> {
        self.record(format!("PATCH {kind}/{id} {patch}"));
        self.check(id)?;
        self.with_item(kind, id, |item| {
            if let (Value::Object(target), Value::Object(fields)) = (item, patch) {
                target.extend(fields);
            }
        })
    }

    async fn replace_item(
        &self,
        kind: ContentKind,
        id: &str,
        record: Value,
    ) -> Result<Value, ApiError> {
        self.record(format!("PUT {kind}/{id}"));
        self.check(id)?;
        let stored = record.clone();
        self.with_item(kind, id, |item| *item = stored)?;
        Ok(record)
    }

    async fn toggle_publish(&self, kind: ContentKind, id: &str) -> Result<(), ApiError> {
        self.record(format!("POST {kind}/{id}/publish"));
        self.check(id)?;
        self.with_item(kind, id, |item| {
            let next = if item["status"] == "published" {
                "draft"
            } else {
                "published"
            };
            item["status"] = Value::from(next);
        })
    }

    async fn delete_item(&self, kind: ContentKind, id: &str) -> Result<(), ApiError> {
        self.record(format!("DELETE {kind}/{id}"));
        self.check(id)?;
        let mut collections = self.collections.lock().expect("collections lock");
        if let Some(items) = collections.get_mut(kind.collection()) {
            items.retain(|item| item.get("id").map(render_id).as_deref() != Some(id));
        }
        Ok(())
    }

    async fn fetch_categories(&self, source: CategorySource) -> Result<Value, ApiError> {
        self.record(format!("GET {}", source.segments().join("/")));
        Ok(json!({ "categories": self.categories }))
    }
}

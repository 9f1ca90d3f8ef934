//! Collection loading under a cancellation scope.
//!
//! A [`CancelScope`] belongs to whatever consumes the loaded data. Tokens
//! handed to in-flight loads observe the scope; once it is cancelled or
//! dropped, pending loads resolve to [`LoadOutcome::Cancelled`] and their
//! results are discarded.

use std::collections::HashSet;
use std::sync::Arc;

use hackerthink_api_types::{Category, decode_collection};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::application::listing::Clock;
use crate::application::repos::{AdminApi, ApiError, CategorySource, ServerQuery};
use crate::domain::content::ContentItem;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to decode `{collection}`: {message}")]
    Decode {
        collection: &'static str,
        message: String,
    },
    #[error("duplicate identifier `{id}` in `{collection}`")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },
}

/// Owner side of a cancellation scope. Dropping it cancels every token.
#[derive(Debug)]
pub struct CancelScope {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// A cloneable handle that can cancel the scope from another task.
    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.tx),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the owning scope is cancelled or gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: T,
    pub fetched_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome<T> {
    Loaded(Loaded<T>),
    Cancelled,
}

impl<T> LoadOutcome<T> {
    pub fn into_loaded(self) -> Option<Loaded<T>> {
        match self {
            LoadOutcome::Loaded(loaded) => Some(loaded),
            LoadOutcome::Cancelled => None,
        }
    }
}

#[derive(Clone)]
pub struct CollectionLoader {
    api: Arc<dyn AdminApi>,
    clock: Clock,
}

impl CollectionLoader {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self {
            api,
            clock: Clock::System,
        }
    }

    /// Stamp `fetched_at` from `clock` instead of the system time.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn api(&self) -> &Arc<dyn AdminApi> {
        &self.api
    }

    /// Fetch and decode the full collection for `T`.
    pub async fn load<T: ContentItem>(
        &self,
        query: &ServerQuery,
        token: &CancelToken,
    ) -> Result<LoadOutcome<Vec<T>>, LoadError> {
        let collection = T::KIND.collection();
        if token.is_cancelled() {
            return Ok(LoadOutcome::Cancelled);
        }

        let fetch = async {
            let body = self.api.fetch_collection(T::KIND, query).await?;
            let items: Vec<T> =
                decode_collection(body, collection).map_err(|err| LoadError::Decode {
                    collection,
                    message: err.to_string(),
                })?;
            ensure_unique_ids(collection, &items)?;
            Ok::<_, LoadError>(items)
        };

        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(collection, "discarding load for cancelled scope");
                Ok(LoadOutcome::Cancelled)
            }
            result = fetch => {
                let items = result?;
                info!(collection, count = items.len(), "collection loaded");
                Ok(LoadOutcome::Loaded(Loaded {
                    items,
                    fetched_at: self.clock.now(),
                }))
            }
        }
    }

    pub async fn load_categories(
        &self,
        source: CategorySource,
    ) -> Result<Vec<Category>, LoadError> {
        let body = self.api.fetch_categories(source).await?;
        decode_collection(body, "categories").map_err(|err| LoadError::Decode {
            collection: "categories",
            message: err.to_string(),
        })
    }
}

fn ensure_unique_ids<T: ContentItem>(
    collection: &'static str,
    items: &[T],
) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(LoadError::DuplicateId {
                collection,
                id: item.id().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hackerthink_api_types::Interview;
    use serde_json::json;

    use super::*;
    use crate::application::testing::MemoryApi;

    fn loader(api: MemoryApi) -> CollectionLoader {
        CollectionLoader::new(Arc::new(api))
    }

    #[tokio::test]
    async fn load_decodes_envelope() {
        let api = MemoryApi::new().with_collection(
            "interviews",
            json!([
                { "id": "1", "title": "AI Trends", "status": "published" },
                { "id": 2, "title": "Cloud Basics", "status": "draft" }
            ]),
        );
        let scope = CancelScope::new();
        let outcome = loader(api)
            .load::<Interview>(&ServerQuery::default(), &scope.token())
            .await
            .expect("loaded");

        let loaded = outcome.into_loaded().expect("not cancelled");
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[1].id, "2");
    }

    #[tokio::test]
    async fn fetched_at_follows_the_clock() {
        let at = time::macros::datetime!(2024-06-10 09:00:00 UTC);
        let scope = CancelScope::new();
        let outcome = loader(MemoryApi::new())
            .with_clock(Clock::Fixed(at))
            .load::<Interview>(&ServerQuery::default(), &scope.token())
            .await
            .expect("loaded");
        assert_eq!(outcome.into_loaded().expect("loaded").fetched_at, at);
    }

    #[tokio::test]
    async fn missing_collection_loads_empty() {
        let scope = CancelScope::new();
        let outcome = loader(MemoryApi::new())
            .load::<Interview>(&ServerQuery::default(), &scope.token())
            .await
            .expect("loaded");
        assert!(outcome.into_loaded().expect("loaded").items.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let api = MemoryApi::new().with_collection(
            "interviews",
            json!([
                { "id": "1", "title": "A", "status": "draft" },
                { "id": "1", "title": "B", "status": "draft" }
            ]),
        );
        let scope = CancelScope::new();
        let err = loader(api)
            .load::<Interview>(&ServerQuery::default(), &scope.token())
            .await
            .expect_err("duplicate");
        assert!(matches!(err, LoadError::DuplicateId { id, .. } if id == "1"));
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_api_error() {
        let api = MemoryApi::new().failing_fetch();
        let scope = CancelScope::new();
        let err = loader(api)
            .load::<Interview>(&ServerQuery::default(), &scope.token())
            .await
            .expect_err("fetch fails");
        assert!(matches!(err, LoadError::Api(ApiError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn cancelled_scope_discards_in_flight_load() {
        let api = MemoryApi::new()
            .with_collection("interviews", json!([]))
            .with_fetch_delay(Duration::from_secs(30));
        let loader = loader(api);
        let scope = CancelScope::new();
        let token = scope.token();

        let task = tokio::spawn(async move {
            loader
                .load::<Interview>(&ServerQuery::default(), &token)
                .await
        });
        tokio::task::yield_now().await;
        drop(scope);

        let outcome = task.await.expect("join").expect("no error");
        assert!(matches!(outcome, LoadOutcome::Cancelled));
    }

    #[tokio::test]
    async fn handle_cancels_from_elsewhere() {
        let scope = CancelScope::new();
        let token = scope.token();
        let handle = scope.handle();
        assert!(!token.is_cancelled());

        handle.cancel();
        token.cancelled().await;
        assert!(scope.is_cancelled());
    }
}

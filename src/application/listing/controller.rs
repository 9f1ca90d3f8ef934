//! Drives one [`AdminListView`] against the admin API.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use hackerthink_api_types::Category;
use tracing::{error, info, warn};
use url::Url;

use crate::application::error::Banner;
use crate::application::loader::{CancelHandle, CancelScope, CollectionLoader, LoadOutcome};
use crate::application::repos::{AdminApi, CategorySource, ServerQuery};
use crate::domain::content::ContentItem;

use super::ListError;
use super::bulk::{BulkAction, BulkReport, execute_bulk};
use super::pagination::PageSize;
use super::rows::{DeleteClick, edit_route, public_url, toggle_request};
use super::view::{AdminListView, Clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: PageSize,
    pub timezone: Tz,
    pub refetch_after: Duration,
    pub clock: Clock,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::DEFAULT,
            timezone: Tz::UTC,
            refetch_after: Duration::from_secs(300),
            clock: Clock::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Loaded { count: usize },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    Armed,
    Deleted,
}

pub struct ListController<T: ContentItem> {
    loader: CollectionLoader,
    view: AdminListView<T>,
    scope: CancelScope,
    server_query: ServerQuery,
    refetch_after: Duration,
}

impl<T: ContentItem> ListController<T> {
    pub fn new(api: Arc<dyn AdminApi>, options: ListOptions) -> Self {
        Self {
            loader: CollectionLoader::new(api).with_clock(options.clock),
            view: AdminListView::new(options.page_size, options.timezone).with_clock(options.clock),
            scope: CancelScope::new(),
            server_query: ServerQuery::default(),
            refetch_after: options.refetch_after,
        }
    }

    pub fn view(&self) -> &AdminListView<T> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut AdminListView<T> {
        &mut self.view
    }

    fn api(&self) -> &dyn AdminApi {
        self.loader.api().as_ref()
    }

    /// Forward `search`/`status`/`category` to kinds whose endpoint honours them.
    pub fn set_server_query(&mut self, query: ServerQuery) -> Result<(), ListError> {
        if !query.is_empty() && !T::KIND.supports_server_filters() {
            return Err(ListError::ServerFiltersUnsupported { kind: T::KIND });
        }
        self.server_query = query;
        Ok(())
    }

    /// Handle that abandons in-flight loads, e.g. from a signal handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.scope.handle()
    }

    pub async fn refresh(&mut self) -> Result<Refresh, ListError> {
        let token = self.scope.token();
        let collection = T::KIND.collection();
        match self.loader.load::<T>(&self.server_query, &token).await {
            Ok(LoadOutcome::Loaded(loaded)) => {
                let count = loaded.items.len();
                self.view.replace_items(loaded.items, loaded.fetched_at);
                self.view.clear_banner();
                Ok(Refresh::Loaded { count })
            }
            Ok(LoadOutcome::Cancelled) => Ok(Refresh::Cancelled),
            Err(err) => {
                error!(collection, error = %err, "failed to load collection");
                self.view.set_banner(Banner::fetch_failed(collection));
                Err(err.into())
            }
        }
    }

    /// Load the collection and category options concurrently.
    pub async fn refresh_with_categories(
        &mut self,
        source: CategorySource,
    ) -> Result<Refresh, ListError> {
        let token = self.scope.token();
        let collection = T::KIND.collection();
        let (items, categories) = tokio::join!(
            self.loader.load::<T>(&self.server_query, &token),
            self.loader.load_categories(source),
        );

        let categories: Vec<Category> = match categories {
            Ok(categories) => categories,
            Err(err) => {
                error!(error = %err, "failed to load categories");
                self.view.set_banner(Banner::fetch_failed("categories"));
                return Err(err.into());
            }
        };

        match items {
            Ok(LoadOutcome::Loaded(loaded)) => {
                let count = loaded.items.len();
                self.view.replace_items(loaded.items, loaded.fetched_at);
                self.view.set_category_options(categories);
                self.view.clear_banner();
                Ok(Refresh::Loaded { count })
            }
            Ok(LoadOutcome::Cancelled) => Ok(Refresh::Cancelled),
            Err(err) => {
                error!(collection, error = %err, "failed to load collection");
                self.view.set_banner(Banner::fetch_failed(collection));
                Err(err.into())
            }
        }
    }

    /// Whether regaining focus should trigger a refetch.
    pub fn on_focus(&self) -> bool {
        self.view.is_stale(self.refetch_after)
    }

    pub async fn refresh_if_stale(&mut self) -> Result<Option<Refresh>, ListError> {
        if !self.on_focus() {
            return Ok(None);
        }
        self.refresh().await.map(Some)
    }

    async fn resync(&mut self) {
        if let Err(err) = self.refresh().await {
            warn!(collection = T::KIND.collection(), error = %err, "refetch after action failed");
        }
    }

    /// Apply `action` to the selection. Success clears it; either way the
    /// collection is refetched.
    pub async fn apply_bulk(&mut self, action: BulkAction) -> Result<BulkReport, ListError> {
        self.view.cancel_delete();
        let ids = self.view.selection().to_vec();
        let result = execute_bulk(self.api(), T::KIND, action, &ids).await;
        match result {
            Ok(report) => {
                info!(message = %report.message(), "bulk action finished");
                self.view.clear_selection();
                self.resync().await;
                Ok(report)
            }
            Err(err) => {
                let message = match &err {
                    ListError::Bulk(bulk) => bulk.message(),
                    ListError::EmptySelection => {
                        format!("Select at least one {}", T::KIND.noun(1))
                    }
                    other => other.to_string(),
                };
                let remote = matches!(err, ListError::Bulk(_));
                if remote {
                    self.resync().await;
                }
                self.view.set_banner(Banner::action_failed(message));
                Err(err)
            }
        }
    }

    /// Flip the published state of one row, optimistically.
    pub async fn toggle_publish(&mut self, id: &str) -> Result<bool, ListError> {
        self.view.cancel_delete();
        let was_published = self
            .view
            .find(id)
            .map(T::is_published)
            .ok_or_else(|| ListError::UnknownItem { id: id.to_string() })?;
        let request = toggle_request(T::KIND, was_published).map_err(|source| ListError::Action {
            action: "toggle",
            id: id.to_string(),
            source,
        })?;

        self.view.patch_local(id, !was_published);
        let result = request.send(self.api(), T::KIND, id).await;
        match result {
            Ok(()) => {
                self.resync().await;
                Ok(!was_published)
            }
            Err(source) => {
                self.view.patch_local(id, was_published);
                self.view.set_banner(Banner::action_failed(format!(
                    "Failed to update {}",
                    T::KIND.noun(1)
                )));
                Err(ListError::Action {
                    action: "toggle",
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    /// First click arms the row; a second click on the same row deletes it.
    pub async fn click_delete(&mut self, id: &str) -> Result<DeleteStep, ListError> {
        match self.view.click_delete(id)? {
            DeleteClick::Armed => Ok(DeleteStep::Armed),
            DeleteClick::Confirmed => {
                let result = self.api().delete_item(T::KIND, id).await;
                match result {
                    Ok(()) => {
                        self.view.remove_local(id);
                        self.resync().await;
                        Ok(DeleteStep::Deleted)
                    }
                    Err(source) => {
                        self.view.set_banner(Banner::action_failed(format!(
                            "Failed to delete {}",
                            T::KIND.noun(1)
                        )));
                        Err(ListError::Action {
                            action: "delete",
                            id: id.to_string(),
                            source,
                        })
                    }
                }
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.view.cancel_delete();
    }

    pub fn edit_route(&self, id: &str) -> Result<String, ListError> {
        self.view
            .find(id)
            .map(|item| edit_route(T::KIND, item.id()))
            .ok_or_else(|| ListError::UnknownItem { id: id.to_string() })
    }

    pub fn public_url(&self, site: &Url, id: &str) -> Result<Url, ListError> {
        let item = self
            .view
            .find(id)
            .ok_or_else(|| ListError::UnknownItem { id: id.to_string() })?;
        public_url(site, item).ok_or_else(|| ListError::NotPublished { id: id.to_string() })
    }
}

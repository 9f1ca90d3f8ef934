//! Bulk actions over the current selection.
//!
//! Every selected id gets its own request and all of them are issued at
//! once. The outcome is all-or-nothing: a single failed request marks the
//! whole action failed, although the other requests still run to completion.

use std::fmt;
use std::str::FromStr;

use futures::future::join_all;
use hackerthink_api_types::{ActivePatch, StatusPatch};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{AdminApi, ApiError};
use crate::domain::content::ContentKind;

use super::ListError;
use super::schema::schema_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Publish,
    Unpublish,
    Archive,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Publish => "publish",
            BulkAction::Unpublish => "unpublish",
            BulkAction::Archive => "archive",
            BulkAction::Delete => "delete",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BulkAction::Publish => "Publish",
            BulkAction::Unpublish => "Unpublish",
            BulkAction::Archive => "Archive",
            BulkAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action.trim().to_ascii_lowercase().as_str() {
            "publish" => Ok(Self::Publish),
            "unpublish" | "draft" => Ok(Self::Unpublish),
            "archive" => Ok(Self::Archive),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unsupported bulk action `{other}`")),
        }
    }
}

/// One per-item request against the admin API.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ItemRequest {
    Patch(Value),
    TogglePublish,
    Delete,
}

impl ItemRequest {
    /// Partial update setting the published state for `kind`.
    pub(crate) fn set_published(kind: ContentKind, published: bool) -> Result<Self, ApiError> {
        let body = match kind {
            ContentKind::Tutorials => serde_json::to_value(ActivePatch {
                is_active: published,
            }),
            _ => serde_json::to_value(StatusPatch {
                status: if published { "published" } else { "draft" },
            }),
        };
        body.map(ItemRequest::Patch).map_err(ApiError::encode)
    }

    pub(crate) fn for_action(kind: ContentKind, action: BulkAction) -> Result<Self, ApiError> {
        match action {
            BulkAction::Publish => Self::set_published(kind, true),
            BulkAction::Unpublish => Self::set_published(kind, false),
            BulkAction::Archive => serde_json::to_value(StatusPatch { status: "archived" })
                .map(ItemRequest::Patch)
                .map_err(ApiError::encode),
            BulkAction::Delete => Ok(ItemRequest::Delete),
        }
    }

    pub(crate) async fn send(
        &self,
        api: &dyn AdminApi,
        kind: ContentKind,
        id: &str,
    ) -> Result<(), ApiError> {
        match self {
            ItemRequest::Patch(body) => api.patch_item(kind, id, body.clone()).await,
            ItemRequest::TogglePublish => api.toggle_publish(kind, id).await,
            ItemRequest::Delete => api.delete_item(kind, id).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub kind: ContentKind,
    pub action: BulkAction,
    pub affected: usize,
}

impl BulkReport {
    pub fn message(&self) -> String {
        format!(
            "{} applied to {} {}",
            self.action.label(),
            self.affected,
            self.kind.noun(self.affected)
        )
    }
}

#[derive(Debug, Error)]
#[error("{action} failed for {failed} of {attempted} {kind}: {first}")]
pub struct BulkError {
    pub kind: ContentKind,
    pub action: BulkAction,
    pub attempted: usize,
    pub failed: usize,
    #[source]
    pub first: ApiError,
}

impl BulkError {
    /// Banner text; does not say which items failed.
    pub fn message(&self) -> String {
        format!(
            "Failed to {} selected {}",
            self.action.as_str(),
            self.kind.noun(self.attempted)
        )
    }
}

/// Issue `action` for every id concurrently and wait for all of them.
pub async fn execute_bulk(
    api: &dyn AdminApi,
    kind: ContentKind,
    action: BulkAction,
    ids: &[String],
) -> Result<BulkReport, ListError> {
    if !schema_for(kind).supports_action(action) {
        return Err(ListError::UnsupportedAction { kind, action });
    }
    if ids.is_empty() {
        return Err(ListError::EmptySelection);
    }

    let request = ItemRequest::for_action(kind, action).map_err(|source| BulkError {
        kind,
        action,
        attempted: ids.len(),
        failed: ids.len(),
        first: source,
    })?;

    let results = join_all(ids.iter().map(|id| {
        let request = &request;
        async move {
            let result = request.send(api, kind, id).await;
            if let Err(err) = &result {
                warn!(%kind, %action, id = %id, error = %err, "bulk sub-request failed");
            }
            result
        }
    }))
    .await;

    let attempted = results.len();
    let mut failures = results.into_iter().filter_map(Result::err);
    match failures.next() {
        None => {
            info!(%kind, %action, count = attempted, "bulk action applied");
            Ok(BulkReport {
                kind,
                action,
                affected: attempted,
            })
        }
        Some(first) => Err(BulkError {
            kind,
            action,
            attempted,
            failed: 1 + failures.count(),
            first,
        }
        .into()),
    }
}

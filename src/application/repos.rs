//! The REST seam: everything the admin pipeline asks of the backend.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::content::ContentKind;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("invalid request url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode(err.to_string())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query parameters the collection endpoint may honour server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

impl ServerQuery {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.status.is_none() && self.category.is_none()
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
    }
}

/// Which endpoint populates category options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySource {
    #[default]
    Admin,
    Taxonomy,
}

impl CategorySource {
    pub fn segments(self) -> &'static [&'static str] {
        match self {
            CategorySource::Admin => &["categories"],
            CategorySource::Taxonomy => &["taxonomy", "categories"],
        }
    }
}

/// Admin REST endpoints under `/api/admin`. Bodies stay as raw JSON so the
/// trait is object safe; typed decoding happens in the loader.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `GET /{collection}`.
    async fn fetch_collection(
        &self,
        kind: ContentKind,
        query: &ServerQuery,
    ) -> Result<Value, ApiError>;

    /// `PATCH /{collection}/{id}` with a partial body.
    async fn patch_item(&self, kind: ContentKind, id: &str, patch: Value) -> Result<(), ApiError>;

    /// `PUT /{collection}/{id}` with a full record; returns the server's body.
    async fn replace_item(
        &self,
        kind: ContentKind,
        id: &str,
        record: Value,
    ) -> Result<Value, ApiError>;

    /// `POST /{collection}/{id}/publish`.
    async fn toggle_publish(&self, kind: ContentKind, id: &str) -> Result<(), ApiError>;

    /// `DELETE /{collection}/{id}`.
    async fn delete_item(&self, kind: ContentKind, id: &str) -> Result<(), ApiError>;

    /// `GET /categories` or `GET /taxonomy/categories`.
    async fn fetch_categories(&self, source: CategorySource) -> Result<Value, ApiError>;
}

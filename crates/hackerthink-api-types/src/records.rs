//! Collection records as served by `/api/admin/{collection}`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::lenient;

/// Publication lifecycle shared by interviews and news items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Draft,
    Published,
    Scheduled,
}

impl PublicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
            PublicationStatus::Scheduled => "scheduled",
        }
    }
}

/// Product lifecycle; products are archived rather than scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Published,
    Archived,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Published => "published",
            ProductStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub status: PublicationStatus,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub view_count: Option<u64>,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "lenient::timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub status: PublicationStatus,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub view_count: Option<u64>,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "lenient::timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ProductStatus,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order_index: Option<i64>,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "lenient::timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub sections_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub lessons_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order_index: Option<i64>,
    #[serde(default, with = "lenient::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "lenient::timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

//! Content kinds managed by the admin panel and uniform field access over them.

use std::fmt;
use std::str::FromStr;

use hackerthink_api_types::{
    Interview, NewsItem, Product, ProductStatus, PublicationStatus, Tutorial,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use super::error::DomainError;

/// The four collections exposed under `/api/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Interviews,
    News,
    Products,
    Tutorials,
}

/// How a row-level publish toggle reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishToggle {
    /// `POST /{id}/publish`; the server flips the state.
    Endpoint,
    /// `PATCH {"status": ...}`.
    StatusField,
    /// `PATCH {"is_active": ...}`.
    ActiveFlag,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Interviews,
        ContentKind::News,
        ContentKind::Products,
        ContentKind::Tutorials,
    ];

    /// Path segment and response envelope key.
    pub fn collection(self) -> &'static str {
        match self {
            ContentKind::Interviews => "interviews",
            ContentKind::News => "news",
            ContentKind::Products => "products",
            ContentKind::Tutorials => "tutorials",
        }
    }

    pub fn noun(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (ContentKind::Interviews, true) => "interview",
            (ContentKind::Interviews, false) => "interviews",
            (ContentKind::News, true) => "news item",
            (ContentKind::News, false) => "news items",
            (ContentKind::Products, true) => "product",
            (ContentKind::Products, false) => "products",
            (ContentKind::Tutorials, true) => "tutorial",
            (ContentKind::Tutorials, false) => "tutorials",
        }
    }

    pub fn publish_toggle(self) -> PublishToggle {
        match self {
            ContentKind::Interviews => PublishToggle::Endpoint,
            ContentKind::News | ContentKind::Products => PublishToggle::StatusField,
            ContentKind::Tutorials => PublishToggle::ActiveFlag,
        }
    }

    /// Whether the collection endpoint honours `search`/`status`/`category` query params.
    pub fn supports_server_filters(self) -> bool {
        matches!(self, ContentKind::Tutorials)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Fields that list pipelines can search, filter or order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Title,
    Slug,
    Excerpt,
    Status,
    AuthorName,
    GuestName,
    CategoryName,
    Tags,
    Type,
    CreatedAt,
    UpdatedAt,
    Rating,
    ViewCount,
    OrderIndex,
    SectionsCount,
    LessonsCount,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Title => "title",
            FieldKey::Slug => "slug",
            FieldKey::Excerpt => "excerpt",
            FieldKey::Status => "status",
            FieldKey::AuthorName => "author_name",
            FieldKey::GuestName => "guest_name",
            FieldKey::CategoryName => "category_name",
            FieldKey::Tags => "tags",
            FieldKey::Type => "type",
            FieldKey::CreatedAt => "created_at",
            FieldKey::UpdatedAt => "updated_at",
            FieldKey::Rating => "rating",
            FieldKey::ViewCount => "view_count",
            FieldKey::OrderIndex => "order_index",
            FieldKey::SectionsCount => "sections_count",
            FieldKey::LessonsCount => "lessons_count",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = match value.trim().to_ascii_lowercase().as_str() {
            "title" | "name" => FieldKey::Title,
            "slug" => FieldKey::Slug,
            "excerpt" | "description" => FieldKey::Excerpt,
            "status" => FieldKey::Status,
            "author_name" | "author" => FieldKey::AuthorName,
            "guest_name" | "guest" => FieldKey::GuestName,
            "category_name" | "category" => FieldKey::CategoryName,
            "tags" => FieldKey::Tags,
            "type" | "difficulty" => FieldKey::Type,
            "created_at" => FieldKey::CreatedAt,
            "updated_at" => FieldKey::UpdatedAt,
            "rating" => FieldKey::Rating,
            "view_count" | "views" => FieldKey::ViewCount,
            "order_index" | "order" => FieldKey::OrderIndex,
            "sections_count" => FieldKey::SectionsCount,
            "lessons_count" => FieldKey::LessonsCount,
            other => return Err(DomainError::UnknownField(other.to_string())),
        };
        Ok(key)
    }
}

/// A borrowed view of one field on one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Number(f64),
    Timestamp(OffsetDateTime),
    Missing,
}

impl<'a> FieldValue<'a> {
    fn text(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
    }

    fn count(value: Option<u64>) -> Self {
        value.map_or(FieldValue::Missing, |v| FieldValue::Number(v as f64))
    }

    fn integer(value: Option<i64>) -> Self {
        value.map_or(FieldValue::Missing, |v| FieldValue::Number(v as f64))
    }

    fn timestamp(value: Option<OffsetDateTime>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Timestamp)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

/// A record managed by one admin list page.
pub trait ContentItem: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: ContentKind;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn slug(&self) -> &str;
    fn field(&self, key: FieldKey) -> FieldValue<'_>;
    /// Status as shown in filters; one value of a fixed per-kind set.
    fn status_key(&self) -> &'static str;
    fn is_published(&self) -> bool;
    fn set_published(&mut self, published: bool);
    fn set_slug(&mut self, slug: String);
}

fn publication_status(published: bool) -> PublicationStatus {
    if published {
        PublicationStatus::Published
    } else {
        PublicationStatus::Draft
    }
}

impl ContentItem for Interview {
    const KIND: ContentKind = ContentKind::Interviews;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn field(&self, key: FieldKey) -> FieldValue<'_> {
        match key {
            FieldKey::Title => FieldValue::Text(&self.title),
            FieldKey::Slug => FieldValue::Text(&self.slug),
            FieldKey::Excerpt => FieldValue::text(&self.excerpt),
            FieldKey::Status => FieldValue::Text(self.status_key()),
            FieldKey::GuestName => FieldValue::text(&self.guest_name),
            FieldKey::CategoryName => FieldValue::text(&self.category_name),
            FieldKey::Tags => FieldValue::List(&self.tags),
            FieldKey::ViewCount => FieldValue::count(self.view_count),
            FieldKey::CreatedAt => FieldValue::timestamp(self.created_at),
            FieldKey::UpdatedAt => FieldValue::timestamp(self.updated_at),
            _ => FieldValue::Missing,
        }
    }

    fn status_key(&self) -> &'static str {
        self.status.as_str()
    }

    fn is_published(&self) -> bool {
        self.status == PublicationStatus::Published
    }

    fn set_published(&mut self, published: bool) {
        self.status = publication_status(published);
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

impl ContentItem for NewsItem {
    const KIND: ContentKind = ContentKind::News;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn field(&self, key: FieldKey) -> FieldValue<'_> {
        match key {
            FieldKey::Title => FieldValue::Text(&self.title),
            FieldKey::Slug => FieldValue::Text(&self.slug),
            FieldKey::Excerpt => FieldValue::text(&self.excerpt),
            FieldKey::Status => FieldValue::Text(self.status_key()),
            FieldKey::AuthorName => FieldValue::text(&self.author_name),
            FieldKey::CategoryName => FieldValue::text(&self.category_name),
            FieldKey::Tags => FieldValue::List(&self.tags),
            FieldKey::ViewCount => FieldValue::count(self.view_count),
            FieldKey::CreatedAt => FieldValue::timestamp(self.created_at),
            FieldKey::UpdatedAt => FieldValue::timestamp(self.updated_at),
            _ => FieldValue::Missing,
        }
    }

    fn status_key(&self) -> &'static str {
        self.status.as_str()
    }

    fn is_published(&self) -> bool {
        self.status == PublicationStatus::Published
    }

    fn set_published(&mut self, published: bool) {
        self.status = publication_status(published);
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

impl ContentItem for Product {
    const KIND: ContentKind = ContentKind::Products;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn field(&self, key: FieldKey) -> FieldValue<'_> {
        match key {
            FieldKey::Title => FieldValue::Text(&self.name),
            FieldKey::Slug => FieldValue::Text(&self.slug),
            FieldKey::Excerpt => FieldValue::text(&self.description),
            FieldKey::Status => FieldValue::Text(self.status_key()),
            FieldKey::CategoryName => FieldValue::text(&self.category_name),
            FieldKey::Type => FieldValue::text(&self.product_type),
            FieldKey::Tags => FieldValue::List(&self.tags),
            FieldKey::Rating => self.rating.map_or(FieldValue::Missing, FieldValue::Number),
            FieldKey::ViewCount => FieldValue::count(self.view_count),
            FieldKey::OrderIndex => FieldValue::integer(self.order_index),
            FieldKey::CreatedAt => FieldValue::timestamp(self.created_at),
            FieldKey::UpdatedAt => FieldValue::timestamp(self.updated_at),
            _ => FieldValue::Missing,
        }
    }

    fn status_key(&self) -> &'static str {
        self.status.as_str()
    }

    fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    fn set_published(&mut self, published: bool) {
        self.status = if published {
            ProductStatus::Published
        } else {
            ProductStatus::Draft
        };
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

impl ContentItem for Tutorial {
    const KIND: ContentKind = ContentKind::Tutorials;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn field(&self, key: FieldKey) -> FieldValue<'_> {
        match key {
            FieldKey::Title => FieldValue::Text(&self.title),
            FieldKey::Slug => FieldValue::Text(&self.slug),
            FieldKey::Excerpt => FieldValue::text(&self.description),
            FieldKey::Status => FieldValue::Text(self.status_key()),
            FieldKey::AuthorName => FieldValue::text(&self.author_name),
            FieldKey::CategoryName => FieldValue::text(&self.category_name),
            FieldKey::Type => FieldValue::text(&self.difficulty),
            FieldKey::Tags => FieldValue::List(&self.tags),
            FieldKey::SectionsCount => FieldValue::count(self.sections_count),
            FieldKey::LessonsCount => FieldValue::count(self.lessons_count),
            FieldKey::ViewCount => FieldValue::count(self.view_count),
            FieldKey::OrderIndex => FieldValue::integer(self.order_index),
            FieldKey::CreatedAt => FieldValue::timestamp(self.created_at),
            FieldKey::UpdatedAt => FieldValue::timestamp(self.updated_at),
            _ => FieldValue::Missing,
        }
    }

    fn status_key(&self) -> &'static str {
        if self.is_active { "active" } else { "inactive" }
    }

    fn is_published(&self) -> bool {
        self.is_active
    }

    fn set_published(&mut self, published: bool) {
        self.is_active = published;
    }

    fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_accept_aliases() {
        assert_eq!("name".parse::<FieldKey>().expect("alias"), FieldKey::Title);
        assert_eq!("guest".parse::<FieldKey>().expect("alias"), FieldKey::GuestName);
        assert_eq!(
            "Created_At".parse::<FieldKey>().expect("case-insensitive"),
            FieldKey::CreatedAt
        );
        assert!(matches!(
            "colour".parse::<FieldKey>(),
            Err(DomainError::UnknownField(field)) if field == "colour"
        ));
    }

    #[test]
    fn tutorial_status_follows_active_flag() {
        let mut tutorial: Tutorial = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Fine-tuning",
            "is_active": false
        }))
        .expect("tutorial");
        assert_eq!(tutorial.status_key(), "inactive");

        tutorial.set_published(true);
        assert!(tutorial.is_published());
        assert_eq!(tutorial.field(FieldKey::Status), FieldValue::Text("active"));
    }

    #[test]
    fn products_expose_name_as_title() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Vector Studio",
            "status": "draft",
            "order_index": "3"
        }))
        .expect("product");
        assert_eq!(product.field(FieldKey::Title), FieldValue::Text("Vector Studio"));
        assert_eq!(product.field(FieldKey::OrderIndex), FieldValue::Number(3.0));
        assert!(product.field(FieldKey::GuestName).is_missing());
    }
}

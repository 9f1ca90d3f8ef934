//! The admin list pipeline: filter, sort, paginate, select, act.

pub mod bulk;
pub mod controller;
pub mod filter;
pub mod pagination;
pub mod rows;
pub mod schema;
pub mod selection;
pub mod sort;
pub mod view;

use thiserror::Error;

use crate::application::loader::LoadError;
use crate::application::repos::ApiError;
use crate::domain::content::{ContentKind, FieldKey};

pub use bulk::{BulkAction, BulkError, BulkReport};
pub use controller::{DeleteStep, ListController, ListOptions, Refresh};
pub use filter::{DatePreset, DateRange, FilterCriteria};
pub use pagination::{PAGE_SIZE_PRESETS, PageSize};
pub use sort::{SortDirection, SortSpec};
pub use view::{AdminListView, Clock, PageView};

#[derive(Debug, Error)]
pub enum ListError {
    #[error("`{field}` cannot be used as a {usage} for {kind}")]
    UnsupportedField {
        kind: ContentKind,
        field: FieldKey,
        usage: &'static str,
    },
    #[error("{kind} do not support date-range filtering")]
    UnsupportedDateRange { kind: ContentKind },
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("page size {0} is not one of 10, 20, 30, 50, 100, 500")]
    InvalidPageSize(usize),
    #[error("page size must be a number, got `{0}`")]
    UnparsablePageSize(String),
    #[error("{action} is not available for {kind}")]
    UnsupportedAction {
        kind: ContentKind,
        action: BulkAction,
    },
    #[error("{kind} do not accept server-side filters")]
    ServerFiltersUnsupported { kind: ContentKind },
    #[error("select at least one item")]
    EmptySelection,
    #[error("`{id}` is not on the current page")]
    NotVisible { id: String },
    #[error("`{id}` is not in the loaded collection")]
    UnknownItem { id: String },
    #[error("`{id}` is not published")]
    NotPublished { id: String },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Bulk(#[from] BulkError),
    #[error("failed to {action} `{id}`: {source}")]
    Action {
        action: &'static str,
        id: String,
        #[source]
        source: ApiError,
    },
}

//! Declarative per-kind field descriptors driving the list pipeline.

use crate::domain::content::{ContentKind, FieldKey};

use super::bulk::BulkAction;
use super::sort::{SortDirection, SortSpec};

/// How values of a sortable field compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    Text,
    Numeric,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: FieldKey,
    pub searchable: bool,
    pub exact: bool,
    pub date_range: bool,
    pub sort: Option<SortKind>,
}

impl FieldDescriptor {
    const fn new(key: FieldKey) -> Self {
        Self {
            key,
            searchable: false,
            exact: false,
            date_range: false,
            sort: None,
        }
    }

    const fn searchable(self) -> Self {
        Self {
            searchable: true,
            ..self
        }
    }

    const fn exact(self) -> Self {
        Self {
            exact: true,
            ..self
        }
    }

    const fn date_range(self) -> Self {
        Self {
            date_range: true,
            ..self
        }
    }

    const fn sortable(self, kind: SortKind) -> Self {
        Self {
            sort: Some(kind),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct ListSchema {
    pub kind: ContentKind,
    pub fields: &'static [FieldDescriptor],
    pub default_sort: SortSpec,
    pub bulk_actions: &'static [BulkAction],
}

impl ListSchema {
    pub fn descriptor(&self, key: FieldKey) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn search_fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields
            .iter()
            .filter(|field| field.searchable)
            .map(|field| field.key)
    }

    pub fn supports_exact(&self, key: FieldKey) -> bool {
        self.descriptor(key).is_some_and(|field| field.exact)
    }

    pub fn sort_kind(&self, key: FieldKey) -> Option<SortKind> {
        self.descriptor(key).and_then(|field| field.sort)
    }

    pub fn sortable_fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields
            .iter()
            .filter(|field| field.sort.is_some())
            .map(|field| field.key)
    }

    pub fn date_field(&self) -> Option<FieldKey> {
        self.fields
            .iter()
            .find(|field| field.date_range)
            .map(|field| field.key)
    }

    pub fn supports_action(&self, action: BulkAction) -> bool {
        self.bulk_actions.contains(&action)
    }
}

const NEWEST_FIRST: SortSpec = SortSpec {
    field: FieldKey::CreatedAt,
    direction: SortDirection::Desc,
};

const PUBLISH_ACTIONS: &[BulkAction] = &[
    BulkAction::Publish,
    BulkAction::Unpublish,
    BulkAction::Delete,
];

static INTERVIEWS: ListSchema = ListSchema {
    kind: ContentKind::Interviews,
    fields: &[
        FieldDescriptor::new(FieldKey::Title)
            .searchable()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Slug).searchable(),
        FieldDescriptor::new(FieldKey::Excerpt).searchable(),
        FieldDescriptor::new(FieldKey::Status).exact(),
        FieldDescriptor::new(FieldKey::GuestName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::CategoryName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Tags).searchable(),
        FieldDescriptor::new(FieldKey::ViewCount).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::CreatedAt).sortable(SortKind::Timestamp),
        FieldDescriptor::new(FieldKey::UpdatedAt).sortable(SortKind::Timestamp),
    ],
    default_sort: NEWEST_FIRST,
    bulk_actions: PUBLISH_ACTIONS,
};

static NEWS: ListSchema = ListSchema {
    kind: ContentKind::News,
    fields: &[
        FieldDescriptor::new(FieldKey::Title)
            .searchable()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Slug).searchable(),
        FieldDescriptor::new(FieldKey::Excerpt).searchable(),
        FieldDescriptor::new(FieldKey::Status).exact(),
        FieldDescriptor::new(FieldKey::AuthorName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::CategoryName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Tags).searchable(),
        FieldDescriptor::new(FieldKey::ViewCount).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::CreatedAt)
            .date_range()
            .sortable(SortKind::Timestamp),
        FieldDescriptor::new(FieldKey::UpdatedAt).sortable(SortKind::Timestamp),
    ],
    default_sort: NEWEST_FIRST,
    bulk_actions: PUBLISH_ACTIONS,
};

static PRODUCTS: ListSchema = ListSchema {
    kind: ContentKind::Products,
    fields: &[
        FieldDescriptor::new(FieldKey::Title)
            .searchable()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Slug).searchable(),
        FieldDescriptor::new(FieldKey::Excerpt).searchable(),
        FieldDescriptor::new(FieldKey::Status).exact(),
        FieldDescriptor::new(FieldKey::CategoryName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Type).exact(),
        FieldDescriptor::new(FieldKey::Tags).searchable(),
        FieldDescriptor::new(FieldKey::Rating).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::ViewCount).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::OrderIndex).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::CreatedAt).sortable(SortKind::Timestamp),
        FieldDescriptor::new(FieldKey::UpdatedAt).sortable(SortKind::Timestamp),
    ],
    default_sort: NEWEST_FIRST,
    bulk_actions: &[
        BulkAction::Publish,
        BulkAction::Unpublish,
        BulkAction::Archive,
        BulkAction::Delete,
    ],
};

static TUTORIALS: ListSchema = ListSchema {
    kind: ContentKind::Tutorials,
    fields: &[
        FieldDescriptor::new(FieldKey::Title)
            .searchable()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Slug).searchable(),
        FieldDescriptor::new(FieldKey::Excerpt).searchable(),
        FieldDescriptor::new(FieldKey::Status).exact(),
        FieldDescriptor::new(FieldKey::AuthorName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::CategoryName)
            .searchable()
            .exact()
            .sortable(SortKind::Text),
        FieldDescriptor::new(FieldKey::Type).exact(),
        FieldDescriptor::new(FieldKey::Tags).searchable(),
        FieldDescriptor::new(FieldKey::ViewCount).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::OrderIndex).sortable(SortKind::Numeric),
        FieldDescriptor::new(FieldKey::CreatedAt).sortable(SortKind::Timestamp),
        FieldDescriptor::new(FieldKey::UpdatedAt).sortable(SortKind::Timestamp),
    ],
    default_sort: NEWEST_FIRST,
    bulk_actions: PUBLISH_ACTIONS,
};

pub fn schema_for(kind: ContentKind) -> &'static ListSchema {
    match kind {
        ContentKind::Interviews => &INTERVIEWS,
        ContentKind::News => &NEWS,
        ContentKind::Products => &PRODUCTS,
        ContentKind::Tutorials => &TUTORIALS,
    }
}

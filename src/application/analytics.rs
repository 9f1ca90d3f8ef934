//! Summary counters shown above each list.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::content::{ContentItem, ContentKind, FieldKey, FieldValue};
use crate::util::timezone::local_year_month;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub published: usize,
    pub created_this_month: usize,
    pub total_views: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sections: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<u64>,
}

impl CollectionStats {
    /// "This month" is the calendar month of `now` in `tz`.
    pub fn compute<T: ContentItem>(items: &[T], now: OffsetDateTime, tz: Tz) -> Self {
        let current_month = local_year_month(now, tz);
        let mut by_status = BTreeMap::new();
        let mut published = 0;
        let mut created_this_month = 0;

        for item in items {
            *by_status.entry(item.status_key()).or_insert(0) += 1;
            if item.is_published() {
                published += 1;
            }
            if let FieldValue::Timestamp(created) = item.field(FieldKey::CreatedAt)
                && local_year_month(created, tz) == current_month
            {
                created_this_month += 1;
            }
        }

        let tutorials = T::KIND == ContentKind::Tutorials;
        Self {
            total: items.len(),
            by_status,
            published,
            created_this_month,
            total_views: sum(items, FieldKey::ViewCount),
            total_sections: tutorials.then(|| sum(items, FieldKey::SectionsCount)),
            total_lessons: tutorials.then(|| sum(items, FieldKey::LessonsCount)),
        }
    }
}

fn sum<T: ContentItem>(items: &[T], key: FieldKey) -> u64 {
    items
        .iter()
        .filter_map(|item| match item.field(key) {
            FieldValue::Number(value) if value.is_finite() && value > 0.0 => Some(value as u64),
            _ => None,
        })
        .sum()
}

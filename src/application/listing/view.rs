//! State of one admin list page and the pure pipeline over it.
//!
//! The pipeline runs in a fixed order on every read: filter the loaded
//! collection, sort the survivors, then cut out the current page. Stored
//! items are never reordered or mutated by the pipeline itself.

use std::time::Duration;

use chrono_tz::Tz;
use hackerthink_api_types::Category;
use serde::Serialize;
use time::OffsetDateTime;

use crate::application::analytics::CollectionStats;
use crate::application::error::Banner;
use crate::domain::content::{ContentItem, FieldKey};

use super::ListError;
use super::filter::{DateRange, FilterCriteria, FilterEngine};
use super::pagination::{PageSize, page_bounds, page_window, total_pages};
use super::rows::{DeleteClick, DeleteConfirm};
use super::schema::{ListSchema, schema_for};
use super::selection::Selection;
use super::sort::{SortEngine, SortSpec};

/// Source of "now" for date presets and staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(OffsetDateTime),
}

impl Clock {
    pub fn now(self) -> OffsetDateTime {
        match self {
            Clock::System => OffsetDateTime::now_utc(),
            Clock::Fixed(at) => at,
        }
    }
}

/// One rendered page of the pipeline.
#[derive(Debug, Serialize)]
pub struct PageView<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub window: Vec<usize>,
}

impl<T: ContentItem> PageView<'_, T> {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id()).collect()
    }
}

pub struct AdminListView<T: ContentItem> {
    schema: &'static ListSchema,
    tz: Tz,
    clock: Clock,
    items: Vec<T>,
    criteria: FilterCriteria,
    sort: SortSpec,
    page_size: PageSize,
    page: usize,
    selection: Selection,
    confirm: DeleteConfirm,
    banner: Option<Banner>,
    last_updated: Option<OffsetDateTime>,
    category_options: Vec<Category>,
}

impl<T: ContentItem> AdminListView<T> {
    pub fn new(page_size: PageSize, tz: Tz) -> Self {
        let schema = schema_for(T::KIND);
        Self {
            schema,
            tz,
            clock: Clock::System,
            items: Vec::new(),
            criteria: FilterCriteria::default(),
            sort: schema.default_sort,
            page_size,
            page: 1,
            selection: Selection::default(),
            confirm: DeleteConfirm::default(),
            banner: None,
            last_updated: None,
            category_options: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &'static ListSchema {
        self.schema
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn armed_delete(&self) -> Option<&str> {
        self.confirm.armed()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        self.last_updated
    }

    pub fn category_options(&self) -> &[Category] {
        &self.category_options
    }

    /// Install a freshly loaded collection.
    pub fn replace_items(&mut self, items: Vec<T>, fetched_at: OffsetDateTime) {
        self.items = items;
        self.last_updated = Some(fetched_at);
        let items = &self.items;
        self.selection
            .retain(|id| items.iter().any(|item| item.id() == id));
        if self
            .confirm
            .armed()
            .is_some_and(|id| !items.iter().any(|item| item.id() == id))
        {
            self.confirm.cancel();
        }
    }

    pub fn set_category_options(&mut self, categories: Vec<Category>) {
        self.category_options = categories;
    }

    pub fn set_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn is_stale(&self, threshold: Duration) -> bool {
        let Some(last_updated) = self.last_updated else {
            return true;
        };
        let age = self.now() - last_updated;
        !age.is_negative() && age.unsigned_abs() >= threshold
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.set_search(term);
        self.reset_to_first_page();
    }

    pub fn set_filter(
        &mut self,
        field: FieldKey,
        value: impl Into<String>,
    ) -> Result<(), ListError> {
        let mut criteria = self.criteria.clone();
        criteria.set_exact(field, value);
        self.set_criteria(criteria)
    }

    pub fn set_date_range(&mut self, range: DateRange) -> Result<(), ListError> {
        let mut criteria = self.criteria.clone();
        criteria.set_date_range(range);
        self.set_criteria(criteria)
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> Result<(), ListError> {
        FilterEngine::new(self.schema, self.tz).validate(&criteria)?;
        self.criteria = criteria;
        self.reset_to_first_page();
        Ok(())
    }

    /// Reorders without leaving the current page.
    pub fn set_sort(&mut self, sort: SortSpec) -> Result<(), ListError> {
        SortEngine::new(self.schema).validate(sort)?;
        self.sort = sort;
        self.selection.clear();
        self.confirm.cancel();
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.reset_to_first_page();
    }

    /// Move to `page`, clamped to the pages that exist.
    pub fn set_page(&mut self, page: usize) -> Result<usize, ListError> {
        let filtered = self.filtered()?.len();
        let last = total_pages(filtered, self.page_size).max(1);
        let page = page.clamp(1, last);
        if page != self.page {
            self.page = page;
            self.selection.clear();
            self.confirm.cancel();
        }
        Ok(page)
    }

    fn reset_to_first_page(&mut self) {
        self.page = 1;
        self.selection.clear();
        self.confirm.cancel();
    }

    /// Filtered and sorted items, before pagination.
    pub fn filtered(&self) -> Result<Vec<&T>, ListError> {
        let mut matched =
            FilterEngine::new(self.schema, self.tz).apply(&self.items, &self.criteria, self.now())?;
        SortEngine::new(self.schema).apply(&mut matched, self.sort)?;
        Ok(matched)
    }

    /// The current page. A page past the end shows the last page.
    pub fn visible(&self) -> Result<PageView<'_, T>, ListError> {
        let mut matched = self.filtered()?;
        let total_items = matched.len();
        let pages = total_pages(total_items, self.page_size);
        let page = self.page.clamp(1, pages.max(1));
        let bounds = page_bounds(total_items, self.page_size, page);
        matched.truncate(bounds.end);
        let items = matched.split_off(bounds.start);
        Ok(PageView {
            items,
            page,
            page_size: self.page_size.get(),
            total_items,
            total_pages: pages,
            window: page_window(page, pages),
        })
    }

    pub fn visible_ids(&self) -> Result<Vec<String>, ListError> {
        Ok(self
            .visible()?
            .items
            .iter()
            .map(|item| item.id().to_string())
            .collect())
    }

    fn ensure_visible(&self, id: &str) -> Result<(), ListError> {
        if self.visible_ids()?.iter().any(|visible| visible == id) {
            Ok(())
        } else {
            Err(ListError::NotVisible { id: id.to_string() })
        }
    }

    /// Selecting rows counts as a click elsewhere and disarms a pending delete.
    pub fn toggle_selected(&mut self, id: &str) -> Result<bool, ListError> {
        self.ensure_visible(id)?;
        self.confirm.cancel();
        Ok(self.selection.toggle(id))
    }

    pub fn toggle_select_all(&mut self) -> Result<(), ListError> {
        let visible = self.visible_ids()?;
        self.confirm.cancel();
        self.selection.toggle_all(visible.iter().map(String::as_str));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn click_delete(&mut self, id: &str) -> Result<DeleteClick, ListError> {
        self.ensure_visible(id)?;
        Ok(self.confirm.click(id))
    }

    pub fn cancel_delete(&mut self) {
        self.confirm.cancel();
    }

    /// Set the local published state; returns the previous one.
    pub fn patch_local(&mut self, id: &str, published: bool) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id() == id)?;
        let previous = item.is_published();
        item.set_published(published);
        Some(previous)
    }

    pub fn remove_local(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        self.selection.retain(|selected| selected != id);
        Some(self.items.remove(index))
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats::compute(&self.items, self.now(), self.tz)
    }
}

#[cfg(test)]
mod tests {
    use hackerthink_api_types::{Interview, NewsItem};
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::application::listing::filter::DatePreset;
    use crate::application::listing::sort::SortDirection;

    const NOW: OffsetDateTime = datetime!(2024-06-10 09:00:00 UTC);

    fn numbered(count: usize) -> Vec<Interview> {
        (1..=count)
            .map(|n| {
                serde_json::from_value(json!({
                    "id": n.to_string(),
                    "title": format!("Interview {n:02}"),
                    "status": if n % 2 == 0 { "published" } else { "draft" },
                    "created_at": format!("2024-01-{n:02}T00:00:00Z"),
                }))
                .expect("interview")
            })
            .collect()
    }

    fn view(items: Vec<Interview>) -> AdminListView<Interview> {
        let mut view = AdminListView::new(PageSize::DEFAULT, Tz::UTC).with_clock(Clock::Fixed(NOW));
        view.replace_items(items, NOW);
        view
    }

    #[test]
    fn second_page_holds_the_remainder() {
        let mut view = view(numbered(12));
        view.set_sort(SortSpec::new(FieldKey::Title, SortDirection::Asc))
            .expect("sortable");

        let first = view.visible().expect("page");
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.window, [1, 2]);

        assert_eq!(view.set_page(2).expect("page"), 2);
        assert_eq!(view.visible().expect("page").ids(), ["11", "12"]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let view = view(numbered(3));
        assert_eq!(view.visible().expect("page").ids(), ["3", "2", "1"]);
    }

    #[test]
    fn set_page_clamps_to_existing_pages() {
        let mut view = view(numbered(12));
        assert_eq!(view.set_page(9).expect("page"), 2);
        assert_eq!(view.set_page(0).expect("page"), 1);
    }

    #[test]
    fn filter_change_resets_page_and_selection() {
        let mut view = view(numbered(12));
        view.set_page(2).expect("page");
        let id = view.visible_ids().expect("ids")[0].clone();
        view.toggle_selected(&id).expect("visible");

        view.set_filter(FieldKey::Status, "published").expect("filter");
        assert_eq!(view.page(), 1);
        assert!(view.selection().is_empty());
        assert_eq!(view.visible().expect("page").total_items, 6);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut view = view(numbered(12));
        view.set_page(2).expect("page");
        view.set_page_size(PageSize::new(20).expect("preset"));
        assert_eq!(view.page(), 1);
        assert_eq!(view.visible().expect("page").total_pages, 1);
    }

    #[test]
    fn selection_is_scoped_to_the_visible_page() {
        let mut view = view(numbered(12));
        view.toggle_select_all().expect("select");
        assert_eq!(view.selection().len(), 10);

        let hidden = view
            .filtered()
            .expect("filtered")
            .last()
            .map(|item| item.id().to_string())
            .expect("item");
        assert!(matches!(
            view.toggle_selected(&hidden),
            Err(ListError::NotVisible { .. })
        ));

        view.set_page(2).expect("page");
        assert!(view.selection().is_empty());
    }

    #[test]
    fn refetch_drops_vanished_selection() {
        let mut view = view(numbered(3));
        view.toggle_selected("2").expect("visible");
        view.toggle_selected("3").expect("visible");
        let remaining: Vec<Interview> = numbered(3)
            .into_iter()
            .filter(|item| item.id != "2")
            .collect();

        view.replace_items(remaining, NOW);
        assert_eq!(view.selection().to_vec(), ["3"]);
    }

    #[test]
    fn date_presets_are_rejected_for_interviews() {
        let mut view = view(numbered(3));
        assert!(matches!(
            view.set_date_range(DateRange::Preset(DatePreset::Today)),
            Err(ListError::UnsupportedDateRange { .. })
        ));
        assert!(view.criteria().is_empty());
    }

    #[test]
    fn news_presets_use_the_pinned_clock() {
        let items: Vec<NewsItem> = serde_json::from_value(json!([
            { "id": "a", "title": "Recent", "status": "published", "created_at": "2024-06-09T00:00:00Z" },
            { "id": "b", "title": "Old", "status": "published", "created_at": "2024-05-01T00:00:00Z" }
        ]))
        .expect("news");
        let mut view = AdminListView::<NewsItem>::new(PageSize::DEFAULT, Tz::UTC)
            .with_clock(Clock::Fixed(NOW));
        view.replace_items(items, NOW);
        view.set_date_range(DateRange::Preset(DatePreset::Last7Days))
            .expect("news supports dates");
        assert_eq!(view.visible().expect("page").ids(), ["a"]);
    }

    #[test]
    fn staleness_follows_the_threshold() {
        let mut view = AdminListView::<Interview>::new(PageSize::DEFAULT, Tz::UTC)
            .with_clock(Clock::Fixed(NOW));
        assert!(view.is_stale(Duration::from_secs(60)));

        view.replace_items(Vec::new(), NOW - time::Duration::seconds(30));
        assert!(!view.is_stale(Duration::from_secs(60)));
        assert!(view.is_stale(Duration::from_secs(30)));
    }

    #[test]
    fn optimistic_patch_reports_previous_state() {
        let mut view = view(numbered(2));
        assert_eq!(view.patch_local("1", true), Some(false));
        assert!(view.find("1").expect("item").is_published());
        assert_eq!(view.patch_local("missing", true), None);
    }
}

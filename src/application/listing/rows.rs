use url::Url;

use crate::application::repos::ApiError;
use crate::domain::content::{ContentItem, ContentKind, PublishToggle};

use super::bulk::ItemRequest;

/// Result of clicking a row's delete button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteClick {
    /// First click; the row now asks for confirmation.
    Armed,
    /// Second click on the armed row.
    Confirmed,
}

/// Two-step delete confirmation; at most one row is armed at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirm {
    armed: Option<String>,
}

impl DeleteConfirm {
    pub fn click(&mut self, id: &str) -> DeleteClick {
        if self.armed.as_deref() == Some(id) {
            self.armed = None;
            DeleteClick::Confirmed
        } else {
            self.armed = Some(id.to_string());
            DeleteClick::Armed
        }
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn armed(&self) -> Option<&str> {
        self.armed.as_deref()
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.armed.as_deref() == Some(id)
    }
}

pub fn edit_route(kind: ContentKind, id: &str) -> String {
    format!("/admin/{}/{}/edit", kind.collection(), id)
}

/// Public page of a published item, `{site}/{collection}/{slug}`.
pub fn public_url<T: ContentItem>(site: &Url, item: &T) -> Option<Url> {
    if !item.is_published() || item.slug().is_empty() {
        return None;
    }
    let mut url = site.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend([T::KIND.collection(), item.slug()]);
    Some(url)
}

/// Request that moves an item out of its current published state.
pub(crate) fn toggle_request(kind: ContentKind, published: bool) -> Result<ItemRequest, ApiError> {
    match kind.publish_toggle() {
        PublishToggle::Endpoint => Ok(ItemRequest::TogglePublish),
        PublishToggle::StatusField | PublishToggle::ActiveFlag => {
            ItemRequest::set_published(kind, !published)
        }
    }
}

#[cfg(test)]
mod tests {
    use hackerthink_api_types::{Interview, Tutorial};
    use serde_json::json;

    use super::*;

    #[test]
    fn second_click_on_the_same_row_confirms() {
        let mut confirm = DeleteConfirm::default();
        assert_eq!(confirm.click("a"), DeleteClick::Armed);
        assert!(confirm.is_armed("a"));
        assert_eq!(confirm.click("a"), DeleteClick::Confirmed);
        assert_eq!(confirm.armed(), None);
    }

    #[test]
    fn clicking_another_row_moves_the_arm() {
        let mut confirm = DeleteConfirm::default();
        confirm.click("a");
        assert_eq!(confirm.click("b"), DeleteClick::Armed);
        assert!(!confirm.is_armed("a"));
        confirm.cancel();
        assert_eq!(confirm.armed(), None);
    }

    #[test]
    fn view_url_requires_publication() {
        let site = Url::parse("https://hackerthink.example/").expect("url");
        let mut interview: Interview = serde_json::from_value(json!({
            "id": "1",
            "title": "AI Trends",
            "slug": "ai-trends",
            "status": "draft"
        }))
        .expect("interview");
        assert_eq!(public_url(&site, &interview), None);

        interview.set_published(true);
        assert_eq!(
            public_url(&site, &interview).map(String::from),
            Some("https://hackerthink.example/interviews/ai-trends".to_string())
        );
    }

    #[test]
    fn edit_route_never_depends_on_status() {
        assert_eq!(edit_route(ContentKind::Products, "p9"), "/admin/products/p9/edit");
    }

    #[test]
    fn toggle_strategy_follows_kind() {
        assert_eq!(
            toggle_request(ContentKind::Interviews, true).expect("request"),
            ItemRequest::TogglePublish
        );
        assert_eq!(
            toggle_request(ContentKind::News, true).expect("request"),
            ItemRequest::Patch(json!({ "status": "draft" }))
        );
        let tutorial: Tutorial = serde_json::from_value(json!({
            "id": "t", "title": "T", "is_active": "0"
        }))
        .expect("tutorial");
        assert_eq!(
            toggle_request(ContentKind::Tutorials, tutorial.is_published()).expect("request"),
            ItemRequest::Patch(json!({ "is_active": true }))
        );
    }
}

use std::collections::BTreeSet;

/// Ids checked on the visible page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id; returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Select exactly `visible`, or clear when all of it is already selected.
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: BTreeSet<String> = visible.into_iter().map(str::to_string).collect();
        if !visible.is_empty() && self.ids == visible {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    pub fn all_selected<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut visible = visible.into_iter().peekable();
        visible.peek().is_some() && visible.all(|id| self.ids.contains(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Drop ids that are no longer present.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.ids.retain(|id| keep(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert!(selection.is_selected("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_all_selects_exactly_the_visible_page() {
        let mut selection = Selection::new();
        selection.toggle("stale");
        selection.toggle_all(["a", "b", "c"]);
        assert_eq!(selection.to_vec(), ["a", "b", "c"]);
        assert!(selection.all_selected(["a", "b", "c"]));

        selection.toggle_all(["a", "b", "c"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn partial_selection_expands_to_all() {
        let mut selection = Selection::new();
        selection.toggle("b");
        selection.toggle_all(["a", "b"]);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let mut selection = Selection::new();
        assert!(!selection.all_selected(std::iter::empty()));
        selection.toggle_all(std::iter::empty());
        assert!(selection.is_empty());
    }
}

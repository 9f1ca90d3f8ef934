use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ListError;

pub const PAGE_SIZE_PRESETS: [usize; 6] = [10, 20, 30, 50, 100, 500];

/// Page numbers shown around the current page.
const WINDOW: usize = 5;

/// A page size drawn from [`PAGE_SIZE_PRESETS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(10);

    pub fn new(size: usize) -> Result<Self, ListError> {
        if PAGE_SIZE_PRESETS.contains(&size) {
            Ok(Self(size))
        } else {
            Err(ListError::InvalidPageSize(size))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PageSize {
    type Error = ListError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl FromStr for PageSize {
    type Err = ListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let size = value
            .trim()
            .parse::<usize>()
            .map_err(|_| ListError::UnparsablePageSize(value.trim().to_string()))?;
        Self::new(size)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn total_pages(total_items: usize, size: PageSize) -> usize {
    total_items.div_ceil(size.get())
}

/// Index range of 1-based `page`; empty past the end.
pub fn page_bounds(total_items: usize, size: PageSize, page: usize) -> Range<usize> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(size.get()).min(total_items);
    let end = page.saturating_mul(size.get()).min(total_items);
    start..end
}

pub fn paginate<T>(items: &[T], size: PageSize, page: usize) -> &[T] {
    &items[page_bounds(items.len(), size, page)]
}

/// At most five page numbers centred on `current`, clamped to `1..=total_pages`.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let half = WINDOW / 2;
    let (start, end) = if total_pages <= WINDOW {
        (1, total_pages)
    } else if current <= half + 1 {
        (1, WINDOW)
    } else if current + half >= total_pages {
        (total_pages + 1 - WINDOW, total_pages)
    } else {
        (current - half, current + half)
    };
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: usize) -> PageSize {
        PageSize::new(value).expect("preset size")
    }

    #[test]
    fn twelve_items_split_into_ten_and_two() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(total_pages(items.len(), size(10)), 2);
        assert_eq!(paginate(&items, size(10), 1), &items[..10]);
        assert_eq!(paginate(&items, size(10), 2), &[11, 12]);
        assert!(paginate(&items, size(10), 3).is_empty());
    }

    #[test]
    fn empty_collection_has_no_pages() {
        assert_eq!(total_pages(0, PageSize::DEFAULT), 0);
        assert!(page_window(1, 0).is_empty());
        assert!(paginate::<u8>(&[], PageSize::DEFAULT, 1).is_empty());
    }

    #[test]
    fn page_sizes_are_limited_to_presets() {
        assert!(matches!(PageSize::new(25), Err(ListError::InvalidPageSize(25))));
        assert_eq!("500".parse::<PageSize>().expect("preset").get(), 500);
        assert!("ten".parse::<PageSize>().is_err());
    }

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(page_window(1, 3), [1, 2, 3]);
        assert_eq!(page_window(1, 10), [1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 10), [1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10), [4, 5, 6, 7, 8]);
        assert_eq!(page_window(9, 10), [6, 7, 8, 9, 10]);
        assert_eq!(page_window(10, 10), [6, 7, 8, 9, 10]);
        assert_eq!(page_window(42, 10), [6, 7, 8, 9, 10]);
    }
}

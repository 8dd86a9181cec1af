//! Page-number pagination shared by every listing.
//!
//! Page numbers come straight from the `page` query parameter, so parsing is
//! forgiving: anything that is not an integer means the first page and
//! anything out of range is clamped to the nearest page that exists.

use serde::Serialize;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Slices ordered collections into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    /// A zero page size is treated as one item per page.
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `total` items. An empty collection still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve the requested page against a collection of `total` items.
    pub fn window(&self, total: u64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = match requested.map(parse_page) {
            Some(RequestedPage::Number(n)) if n < 1 => 1,
            Some(RequestedPage::Number(n)) => (n as u64).min(num_pages),
            Some(RequestedPage::TooLarge) => num_pages,
            Some(RequestedPage::Invalid) | None => 1,
        };
        let offset = (number - 1) * self.per_page;
        let len = total.saturating_sub(offset).min(self.per_page);

        PageWindow {
            number,
            num_pages,
            count: total,
            offset,
            len,
        }
    }

    /// Slice an already loaded, already ordered collection.
    pub fn paginate<T>(&self, items: Vec<T>, requested: Option<&str>) -> Page<T> {
        let window = self.window(items.len() as u64, requested);
        let items = items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.len as usize)
            .collect();
        Page { items, window }
    }
}

enum RequestedPage {
    Number(i64),
    /// All digits, but past what fits in an `i64`.
    TooLarge,
    Invalid,
}

fn parse_page(raw: &str) -> RequestedPage {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return RequestedPage::Number(n);
    }
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        RequestedPage::TooLarge
    } else {
        // Includes negative overflow, which lands on the first page anyway.
        RequestedPage::Invalid
    }
}

/// Position of one page within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-based page number actually served.
    pub number: u64,
    pub num_pages: u64,
    /// Total items across all pages.
    pub count: u64,
    pub offset: u64,
    /// Items on this page.
    pub len: u64,
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// Limit to use when fetching this page from storage.
    pub fn limit(&self) -> u64 {
        self.len
    }
}

/// One page of items plus its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let paginator = Paginator::default();
        let items: Vec<u32> = (0..13).collect();

        let first = paginator.paginate(items.clone(), None);
        assert_eq!(first.len(), 10);
        assert_eq!(first.window.num_pages, 2);
        assert!(first.window.has_next());
        assert!(!first.window.has_previous());

        let second = paginator.paginate(items, Some("2"));
        assert_eq!(second.items, vec![10, 11, 12]);
        assert_eq!(second.window.previous_page_number(), Some(1));
        assert_eq!(second.window.next_page_number(), None);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let paginator = Paginator::default();

        let past_end = paginator.window(13, Some("99"));
        assert_eq!(past_end.number, 2);
        assert_eq!(past_end.offset, 10);
        assert_eq!(past_end.len, 3);

        let before_start = paginator.window(13, Some("-4"));
        assert_eq!(before_start.number, 1);

        let zero = paginator.window(13, Some("0"));
        assert_eq!(zero.number, 1);
    }

    #[test]
    fn test_huge_page_number_is_last_page() {
        let paginator = Paginator::default();

        let huge = paginator.window(13, Some("99999999999999999999"));
        assert_eq!(huge.number, 2);
        assert_eq!(huge.len, 3);

        let signed = paginator.window(13, Some("+99999999999999999999"));
        assert_eq!(signed.number, 2);

        let huge_negative = paginator.window(13, Some("-99999999999999999999"));
        assert_eq!(huge_negative.number, 1);
    }

    #[test]
    fn test_non_numeric_is_first_page() {
        let paginator = Paginator::default();
        for raw in ["abc", "", "2.5", "1e3"] {
            let window = paginator.window(25, Some(raw));
            assert_eq!(window.number, 1, "page {raw:?}");
            assert_eq!(window.len, 10);
        }
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = Paginator::default().paginate(Vec::<u8>::new(), Some("3"));
        assert!(page.is_empty());
        assert_eq!(page.window.number, 1);
        assert_eq!(page.window.num_pages, 1);
        assert!(!page.window.has_other_pages());
    }

    #[test]
    fn test_exact_multiple() {
        let window = Paginator::default().window(20, Some("2"));
        assert_eq!(window.num_pages, 2);
        assert_eq!(window.len, 10);
        assert!(!window.has_next());
    }
}

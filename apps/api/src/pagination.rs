use serde::{Deserialize, Serialize};

/// Page size for public and jobseeker job browsing.
pub const PER_PAGE_BROWSE: i64 = 9;
/// Page size for admin and employer listings.
pub const PER_PAGE_MANAGE: i64 = 10;

/// Raw pagination query parameters. `page` is accepted as a string so a
/// malformed value falls back to page 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Resolved page number: defaults to 1, and any unparseable or
    /// non-positive value also resolves to 1. Out-of-range pages are not an
    /// error; they produce an empty result set downstream.
    pub fn number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// Row offset for a 1-based page number.
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page - 1) * per_page
}

/// A resolved page of results, echoing the pagination context so the
/// presentation layer can render page controls without re-deriving anything.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Page {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(|s| s.to_string()),
        }
    }

    #[test]
    fn missing_page_defaults_to_one() {
        assert_eq!(query(None).number(), 1);
    }

    #[test]
    fn malformed_page_defaults_to_one() {
        assert_eq!(query(Some("abc")).number(), 1);
        assert_eq!(query(Some("")).number(), 1);
        assert_eq!(query(Some("1.5")).number(), 1);
    }

    #[test]
    fn non_positive_page_defaults_to_one() {
        assert_eq!(query(Some("0")).number(), 1);
        assert_eq!(query(Some("-3")).number(), 1);
    }

    #[test]
    fn valid_page_parses() {
        assert_eq!(query(Some("4")).number(), 4);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(offset(1, PER_PAGE_MANAGE), 0);
        assert_eq!(offset(3, PER_PAGE_MANAGE), 20);
        assert_eq!(offset(2, PER_PAGE_BROWSE), 9);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 25, 3, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);

        let page = Page::new(Vec::<i32>::new(), 25, 4, 10);
        assert_eq!(page.total_pages, 3);
        assert!(page.items.is_empty());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = Page::new(Vec::<i32>::new(), 0, 1, 9);
        assert_eq!(page.total_pages, 0);
    }
}

//! Pagination of post listings.

use serde::Serialize;

/// Navigation metadata for one page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationData {
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
    pub page_size: usize,
    pub total_items: usize,
    pub page_path: String,
}

impl PaginationData {
    pub fn next_url(&self) -> Option<String> {
        self.next_page.map(|page| page_url(&self.page_path, page))
    }

    pub fn prev_url(&self) -> Option<String> {
        self.prev_page.map(|page| page_url(&self.page_path, page))
    }
}

/// Compute navigation metadata for page `page` (1-based).
pub fn paginate(total_items: usize, page: usize, page_size: usize, page_path: &str) -> PaginationData {
    let page_size = page_size.max(1);
    let total_pages = total_items.div_ceil(page_size);
    let has_next_page = page < total_pages;
    let has_prev_page = page > 1;

    PaginationData {
        current_page: page,
        total_pages,
        has_next_page,
        has_prev_page,
        next_page: has_next_page.then(|| page + 1),
        prev_page: has_prev_page.then(|| page - 1),
        page_size,
        total_items,
        page_path: page_path.to_string(),
    }
}

/// Items shown on page `page`; empty when the page is out of range.
pub fn slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let Some(start) = page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// URL of a page: the listing itself for page 1, `{path}page/{n}/` after.
pub fn page_url(page_path: &str, page: usize) -> String {
    let base = if page_path.ends_with('/') {
        page_path.to_string()
    } else {
        format!("{}/", page_path)
    };
    if page <= 1 {
        base
    } else {
        format!("{}page/{}/", base, page)
    }
}

/// Every page of a listing with its items. An empty listing still has one
/// (empty) page so index pages always render.
pub fn pages<'a, T>(
    items: &'a [T],
    page_size: usize,
    page_path: &str,
) -> Vec<(PaginationData, &'a [T])> {
    let total_pages = paginate(items.len(), 1, page_size, page_path).total_pages.max(1);
    (1..=total_pages)
        .map(|page| {
            (
                paginate(items.len(), page, page_size, page_path),
                slice(items, page, page_size),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    #[test]
    fn test_first_page() {
        assert_debug_snapshot!(paginate(25, 1, 10, "/"), @r###"
        PaginationData {
            current_page: 1,
            total_pages: 3,
            has_next_page: true,
            has_prev_page: false,
            next_page: Some(
                2,
            ),
            prev_page: None,
            page_size: 10,
            total_items: 25,
            page_path: "/",
        }
        "###);
    }

    #[test]
    fn test_middle_page() {
        assert_debug_snapshot!(paginate(25, 2, 10, "/"), @r###"
        PaginationData {
            current_page: 2,
            total_pages: 3,
            has_next_page: true,
            has_prev_page: true,
            next_page: Some(
                3,
            ),
            prev_page: Some(
                1,
            ),
            page_size: 10,
            total_items: 25,
            page_path: "/",
        }
        "###);
    }

    #[test]
    fn test_last_page() {
        let data = paginate(25, 3, 10, "/tags/food/");
        assert!(!data.has_next_page);
        assert_eq!(data.next_page, None);
        assert_eq!(data.prev_page, Some(2));
        assert_eq!(slice(&(0..25).collect::<Vec<_>>(), 3, 10), &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_empty_listing() {
        assert_debug_snapshot!(paginate(0, 1, 10, "/"), @r###"
        PaginationData {
            current_page: 1,
            total_pages: 0,
            has_next_page: false,
            has_prev_page: false,
            next_page: None,
            prev_page: None,
            page_size: 10,
            total_items: 0,
            page_path: "/",
        }
        "###);
    }

    #[test]
    fn test_exact_multiple() {
        let data = paginate(20, 2, 10, "/");
        assert_eq!(data.total_pages, 2);
        assert!(!data.has_next_page);
    }

    #[test]
    fn test_out_of_range_slices_are_empty() {
        let items: Vec<u32> = (0..5).collect();
        assert!(slice(&items, 0, 2).is_empty());
        assert!(slice(&items, 4, 2).is_empty());
        assert!(slice(&items, usize::MAX, 2).is_empty());
        assert_eq!(slice(&items, 1, 2), &[0, 1]);
        assert_eq!(slice(&items, 3, 2), &[4]);
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let data = paginate(3, 1, 0, "/");
        assert_eq!(data.page_size, 1);
        assert_eq!(data.total_pages, 3);
        assert_eq!(slice(&[1, 2, 3], 2, 0), &[2]);
    }

    #[test]
    fn test_page_urls() {
        assert_eq!(page_url("/", 1), "/");
        assert_eq!(page_url("/", 2), "/page/2/");
        assert_eq!(page_url("/tags/food", 3), "/tags/food/page/3/");
        let data = paginate(25, 2, 10, "/tags/food/");
        assert_eq!(data.next_url().as_deref(), Some("/tags/food/page/3/"));
        assert_eq!(data.prev_url().as_deref(), Some("/tags/food/"));
    }

    #[test]
    fn test_pages_cover_every_item() {
        let items: Vec<u32> = (0..7).collect();
        let all = pages(&items, 3, "/");
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].1, &[6]);
        assert_eq!(all[0].0.next_page, Some(2));

        let none: Vec<u32> = Vec::new();
        let all = pages(&none, 3, "/");
        assert_eq!(all.len(), 1);
        assert!(all[0].1.is_empty());
    }
}

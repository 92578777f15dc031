//! Filtering, pagination and link building for the listing pages.
//!
//! Collections are fetched whole from the backend and paged here.

use serde::{Deserialize, Serialize};

use crate::form_utils::deserialize_optional_i64;
use crate::sort_utils::{Sortable, SortableColumn, TableSort};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Flash messages carried across the post-redirect-get of a mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Sortable for ListQuery {
    fn sort_by(&self) -> Option<&String> {
        self.sort.as_ref()
    }

    fn sort_dir(&self) -> Option<&String> {
        self.dir.as_ref()
    }
}

impl ListQuery {
    pub fn search(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    /// The same view without flash messages or page number.
    fn base(&self) -> Self {
        Self {
            page: None,
            notice: None,
            error: None,
            ..self.clone()
        }
    }

    pub fn href(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(qs) if !qs.is_empty() => format!("{}?{}", path, qs),
            _ => path.to_string(),
        }
    }

    pub fn page_href(&self, path: &str, page: i64) -> String {
        Self {
            page: Some(page),
            ..self.base()
        }
        .href(path)
    }

    /// Link to the same filters under another path, e.g. the CSV export.
    pub fn filtered_href(&self, path: &str) -> String {
        Self {
            sort: None,
            dir: None,
            ..self.base()
        }
        .href(path)
    }

    pub fn sort_headers<C: SortableColumn>(
        &self,
        path: &str,
        sort: &TableSort<C>,
        columns: &[(&'static str, &'static str)],
    ) -> Vec<SortHeader> {
        columns
            .iter()
            .map(|&(name, label)| {
                let href = match sort.params_for(name) {
                    Some((col, dir)) => Self {
                        sort: Some(col.to_string()),
                        dir: Some(dir.to_string()),
                        ..self.base()
                    }
                    .href(path),
                    None => path.to_string(),
                };
                SortHeader {
                    label,
                    href,
                    indicator: sort.indicator_for(name),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortHeader {
    pub label: &'static str,
    pub href: String,
    pub indicator: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_count: i64,
    pub total: usize,
}

/// Slice `items` into the requested page, clamping it to `1..=page_count`.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size).max(1) as i64;
    let page = page.clamp(1, page_count);

    let start = (page as usize - 1) * page_size;
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        page,
        page_count,
        total,
    }
}

/// Previous/next links for a [`Page`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    pub page: i64,
    pub page_count: i64,
    pub total: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    pub fn new<T>(page: &Page<T>, query: &ListQuery, path: &str) -> Self {
        Self {
            page: page.page,
            page_count: page.page_count,
            total: page.total,
            prev_href: (page.page > 1).then(|| query.page_href(path, page.page - 1)),
            next_href: (page.page < page.page_count)
                .then(|| query.page_href(path, page.page + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSortColumn;

    #[test]
    fn test_paginate_clamps() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 9, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);

        let page = paginate((1..=25).collect::<Vec<_>>(), 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<i32>::new(), 4, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_links_keep_filters() {
        let query: ListQuery =
            serde_urlencoded::from_str("q=ana+m&login=social&page=2&notice=Saved").unwrap();
        assert_eq!(query.search(), "ana m");
        assert_eq!(query.page_href("/users", 3), "/users?q=ana+m&login=social&page=3");
        assert_eq!(
            query.filtered_href("/users/export.csv"),
            "/users/export.csv?q=ana+m&login=social"
        );
        assert_eq!(ListQuery::default().href("/users"), "/users");
    }

    #[test]
    fn test_pager_links() {
        let query = ListQuery::default();
        let page = paginate((1..=25).collect::<Vec<_>>(), 2, 10);
        let pager = Pager::new(&page, &query, "/users");
        assert_eq!(pager.prev_href.as_deref(), Some("/users?page=1"));
        assert_eq!(pager.next_href.as_deref(), Some("/users?page=3"));
    }

    #[test]
    fn test_sort_headers() {
        let query: ListQuery = serde_urlencoded::from_str("sort=name&dir=asc").unwrap();
        let sort = query.resolve_sort::<UserSortColumn>();
        let headers = query.sort_headers("/users", &sort, &[("name", "Name"), ("city", "City")]);
        assert_eq!(headers[0].href, "/users?sort=name&dir=desc");
        assert_eq!(headers[0].indicator, "▲");
        assert_eq!(headers[1].href, "/users?sort=city&dir=desc");
    }
}

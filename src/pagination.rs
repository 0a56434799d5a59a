//! Ordering, page slicing and the paged response envelope shared by every listing.
//!
//! Repositories declare which fields a listing may be sorted by through a
//! [`SortColumns`] table; [`push_order_and_page`] appends the resulting
//! `ORDER BY ... LIMIT ... OFFSET ...` to a query that already carries its
//! filters. Services then wrap the rows and the pre-pagination count in a
//! [`PagedResponse`] whose navigation links come from [`UriService`].

use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};

use crate::config::PaginationConfig;

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationFilter {
    pub page_index: i64,
    pub page_size: i64,
}

impl PaginationFilter {
    /// Build a filter from optional query values, clamped to sane bounds
    pub fn new(page_index: Option<i64>, page_size: Option<i64>, config: &PaginationConfig) -> Self {
        let max_page_size = config.max_page_size.max(1);
        Self {
            page_index: page_index.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(config.default_page_size)
                .clamp(1, max_page_size),
        }
    }

    /// Number of rows to skip: `(page_index - 1) * page_size`
    pub fn skip(&self) -> i64 {
        (self.page_index - 1).saturating_mul(self.page_size)
    }

    pub fn take(&self) -> i64 {
        self.page_size
    }
}

impl Default for PaginationFilter {
    fn default() -> Self {
        Self::new(None, None, &PaginationConfig::default())
    }
}

/// Requested ordering: a field name as the client knows it plus a direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub order_by: Option<String>,
    pub descending: bool,
}

impl SortSpec {
    pub fn new(order_by: Option<String>, descending: Option<bool>) -> Self {
        Self {
            order_by: order_by.filter(|s| !s.trim().is_empty()),
            descending: descending.unwrap_or(false),
        }
    }
}

/// Whitelist of sortable fields for one listing
#[derive(Debug)]
pub struct SortColumns {
    /// (client field name, SQL column expression)
    pub fields: &'static [(&'static str, &'static str)],
    /// Column used when no field, or an unknown field, is requested
    pub default: &'static str,
    /// Unique column appended to every ordering so pages never overlap
    pub tiebreaker: &'static str,
}

impl SortColumns {
    pub fn resolve(&self, order_by: Option<&str>) -> &'static str {
        order_by
            .and_then(|name| {
                self.fields
                    .iter()
                    .find(|(field, _)| field.eq_ignore_ascii_case(name.trim()))
                    .map(|(_, column)| *column)
            })
            .unwrap_or(self.default)
    }
}

/// Append ordering, then `LIMIT take OFFSET skip`
pub fn push_order_and_page(
    builder: &mut QueryBuilder<'_, Postgres>,
    columns: &SortColumns,
    sort: &SortSpec,
    page: &PaginationFilter,
) {
    let column = columns.resolve(sort.order_by.as_deref());
    let direction = if sort.descending { "DESC" } else { "ASC" };

    builder.push(" ORDER BY ").push(column).push(" ").push(direction);
    if column != columns.tiebreaker {
        builder.push(", ").push(columns.tiebreaker).push(" ASC");
    }
    builder.push(" LIMIT ").push_bind(page.take());
    builder.push(" OFFSET ").push_bind(page.skip());
}

/// `ceil(total_records / page_size)`
pub fn total_pages(total_records: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_records <= 0 {
        return 0;
    }
    (total_records + page_size - 1) / page_size
}

/// Builds absolute page URLs from the configured public base URL
#[derive(Debug, Clone)]
pub struct UriService {
    base_url: String,
}

impl UriService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn page_uri(&self, route: &str, page_index: i64, page_size: i64) -> String {
        let separator = if route.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}pageIndex={}&pageSize={}",
            self.base_url, route, separator, page_index, page_size
        )
    }
}

/// Paged envelope: data plus paging metadata and navigation links
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub succeeded: bool,
    pub data: Vec<T>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_records: i64,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
}

impl<T> PagedResponse<T> {
    pub fn new(
        data: Vec<T>,
        filter: &PaginationFilter,
        total_records: i64,
        uri: &UriService,
        route: &str,
    ) -> Self {
        let total_pages = total_pages(total_records, filter.page_size);
        let page = filter.page_index;
        let size = filter.page_size;

        let previous_page = (page > 1 && page <= total_pages)
            .then(|| uri.page_uri(route, page - 1, size));
        let next_page = (page < total_pages).then(|| uri.page_uri(route, page + 1, size));

        Self {
            succeeded: true,
            data,
            page_index: page,
            page_size: size,
            total_pages,
            total_records,
            first_page: Some(uri.page_uri(route, 1, size)),
            last_page: Some(uri.page_uri(route, total_pages.max(1), size)),
            next_page,
            previous_page,
        }
    }
}

/// Page-size defaults plus link building, shared by every listing service
#[derive(Debug, Clone)]
pub struct Paginator {
    config: PaginationConfig,
    uri: UriService,
}

impl Paginator {
    pub fn new(config: PaginationConfig, base_url: impl Into<String>) -> Self {
        Self {
            config,
            uri: UriService::new(base_url),
        }
    }

    pub fn filter(&self, page_index: Option<i64>, page_size: Option<i64>) -> PaginationFilter {
        PaginationFilter::new(page_index, page_size, &self.config)
    }

    /// Wrap one page of rows; `route` is the request path plus any non-paging query
    pub fn page<T>(
        &self,
        data: Vec<T>,
        filter: &PaginationFilter,
        total_records: i64,
        route: &str,
    ) -> PagedResponse<T> {
        PagedResponse::new(data, filter, total_records, &self.uri, route)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PaginationConfig::default(), "http://localhost:8080")
    }
}

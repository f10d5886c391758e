//! Page-based pagination: request parameters, page descriptors and the
//! adapter that attaches `meta.pagination` to an envelope.

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::{BaseRepoError, BaseRepoResult, Envelope, ValidateExt};

/// A validated request for one page (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageRequest {
    /// The page number, starting at 1.
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u64,
    /// The number of items per page.
    #[validate(range(min = 1, message = "per_page must be at least 1"))]
    pub per_page: u64,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_PER_PAGE: u64 = 25;
    /// The maximum allowed page size.
    pub const MAX_PER_PAGE: u64 = 100;

    /// Creates a page request, rejecting zero values.
    pub fn new(page: u64, per_page: u64) -> BaseRepoResult<Self> {
        let request = Self { page, per_page };
        request.validate_request()?;
        Ok(request)
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns the limit for data source queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page
    }

    /// Pairs this request with a total count.
    #[must_use]
    pub const fn with_total(self, total_count: u64) -> PageDescriptor {
        PageDescriptor {
            page_number: self.page,
            per_page: self.per_page,
            total_count,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Query parameters for pagination, as they arrive from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

impl PaginationQuery {
    /// Resolves missing values with defaults and caps `per_page` at `max_per_page`.
    pub fn resolve(&self, default_per_page: u64, max_per_page: u64) -> BaseRepoResult<PageRequest> {
        let per_page = self.per_page.unwrap_or(default_per_page).min(max_per_page);
        PageRequest::new(self.page.unwrap_or(1), per_page)
    }
}

/// A page number, a page size and the total number of matching records.
///
/// `page_number` is never reclamped: asking for page 9 of 3 describes page 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Validate)]
pub struct PageDescriptor {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    page_number: u64,
    #[validate(range(min = 1, message = "per_page must be at least 1"))]
    per_page: u64,
    total_count: u64,
}

impl PageDescriptor {
    /// Creates a page descriptor, rejecting a zero page number or page size.
    pub fn new(page_number: u64, per_page: u64, total_count: u64) -> BaseRepoResult<Self> {
        let descriptor = Self {
            page_number,
            per_page,
            total_count,
        };
        descriptor.validate_request()?;
        Ok(descriptor)
    }

    #[must_use]
    pub const fn page_number(&self) -> u64 {
        self.page_number
    }

    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// `ceil(total_count / per_page)`; zero when there are no records.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        match self.per_page {
            0 => 0,
            per_page => self.total_count.div_ceil(per_page),
        }
    }

    /// Returns the number of rows before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_number.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns true when the requested page lies past the last page.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        self.page_number > self.total_pages()
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page_number < self.total_pages()
    }

    /// Returns true if a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    /// Builds the `meta.pagination` block for a page holding `count` items.
    #[must_use]
    pub const fn meta(&self, count: u64) -> PaginationMeta {
        PaginationMeta {
            total: self.total_count,
            count,
            per_page: self.per_page,
            current_page: self.page_number,
            total_pages: self.total_pages(),
        }
    }
}

/// `meta.pagination` of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub count: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

/// Top-level `links` of a paginated envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Produces page URLs from a request path and its query string.
///
/// Every query parameter except the page parameter itself is carried over
/// to the generated links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    base: Url,
    page_name: String,
    query: Vec<(String, String)>,
}

impl PageUrl {
    /// The query parameter holding the page number.
    pub const DEFAULT_PAGE_NAME: &'static str = "page";

    /// Parses an absolute request URL, keeping its query parameters.
    pub fn parse(raw: &str) -> BaseRepoResult<Self> {
        let mut base = Url::parse(raw).map_err(|e| {
            BaseRepoError::invalid_argument(format!("invalid page url `{raw}`: {e}"))
        })?;
        let query = base
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            page_name: Self::DEFAULT_PAGE_NAME.to_string(),
            query,
        })
    }

    /// Uses `name` instead of `page` for the page parameter.
    #[must_use]
    pub fn page_name(mut self, name: impl Into<String>) -> Self {
        self.page_name = name.into();
        self
    }

    /// Appends an extra query parameter to every generated link.
    #[must_use]
    pub fn append(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Returns the URL of page `page`.
    #[must_use]
    pub fn url(&self, page: u64) -> String {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.query.iter().filter(|(key, _)| *key != self.page_name) {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(&self.page_name, &page.to_string());
        }
        url.into()
    }

    /// Builds the `links` block for `page`.
    #[must_use]
    pub fn links(&self, page: &PageDescriptor) -> PaginationLinks {
        let current = page.page_number();
        let last = page.total_pages().max(1);
        PaginationLinks {
            self_link: Some(self.url(current)),
            first: Some(self.url(1)),
            prev: page.has_previous().then(|| self.url(current - 1)),
            next: page.has_next().then(|| self.url(current + 1)),
            last: Some(self.url(last)),
        }
    }
}

/// Attaches `meta.pagination` for `page`; `count` is what `data` holds.
#[must_use]
pub fn attach_pagination(mut envelope: Envelope, page: &PageDescriptor) -> Envelope {
    let count = envelope.count() as u64;
    envelope.meta.pagination = Some(page.meta(count));
    envelope
}

/// Attaches `meta.pagination` and top-level page links.
#[must_use]
pub fn attach_pagination_links(
    envelope: Envelope,
    page: &PageDescriptor,
    url: &PageUrl,
) -> Envelope {
    let mut envelope = attach_pagination(envelope, page);
    envelope.links = Some(url.links(page));
    envelope
}

/// Returns the records of page `page_number`, `per_page` at a time.
///
/// Pages past the end yield an empty slice.
pub fn slice<R>(records: &[R], page_number: u64, per_page: u64) -> BaseRepoResult<&[R]> {
    let request = PageRequest::new(page_number, per_page)?;
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX).min(records.len());
    let len = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let end = start.saturating_add(len).min(records.len());
    Ok(&records[start..end])
}

//! Pagination types
//!
//! `PaginateOptions` is what a caller asks for, `PaginationResult` is what the
//! pagination helper answers. The result is derived per request and never stored.

use serde::{Deserialize, Serialize};

/// Default page number (1-indexed)
pub const DEFAULT_PAGE: u64 = 1;

/// Default number of documents per page
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page size a caller may request
pub const MAX_LIMIT: u64 = 100;

/// Largest page number a caller may request; keeps `(page - 1) * limit` in range
pub const MAX_PAGE: u64 = u32::MAX as u64;

/// Pagination request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginateOptions {
    /// Page number (1-indexed)
    pub page: u64,
    /// Documents per page
    pub limit: u64,
    /// Sort specification, e.g. `-createdAt,title`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Reference fields to resolve
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub populate: Vec<String>,
    /// Fields to keep in each document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
            populate: Vec::new(),
            select: Vec::new(),
        }
    }
}

impl PaginateOptions {
    /// Create options for a page; out-of-range values are normalized
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit.min(MAX_LIMIT) },
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_populate<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Number of documents to skip
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of documents plus navigation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u64>,
    pub prev_page: Option<u64>,
    /// 1-based position of the first document of this page
    pub paging_counter: u64,
}

impl<T> PaginationResult<T> {
    /// Build the result for `docs` at the position described by `page`/`limit`
    pub fn new(docs: Vec<T>, total_docs: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total_docs.div_ceil(limit) };
        let has_next_page = page < total_pages;
        let has_prev_page = page > 1;

        Self {
            docs,
            total_docs,
            limit,
            page,
            total_pages,
            has_next_page,
            has_prev_page,
            next_page: has_next_page.then(|| page + 1),
            prev_page: has_prev_page.then(|| page - 1),
            paging_counter: page.saturating_sub(1).saturating_mul(limit).saturating_add(1),
        }
    }

    /// Page for a list the backend already cut to `page`/`limit` without
    /// reporting a total. `totalDocs` counts up to the end of this page.
    pub fn from_window(docs: Vec<T>, page: u64, limit: u64) -> Self {
        let skip = page.saturating_sub(1).saturating_mul(limit);
        let total_docs = skip.saturating_add(docs.len() as u64);
        Self::new(docs, total_docs, page, limit)
    }

    /// Convert every document, keeping the metadata; stops at the first error
    pub fn try_map<U, E, F>(self, f: F) -> Result<PaginationResult<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(PaginationResult {
            docs: self.docs.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            total_docs: self.total_docs,
            limit: self.limit,
            page: self.page,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            next_page: self.next_page,
            prev_page: self.prev_page,
            paging_counter: self.paging_counter,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

//! Cursor pagination: one window per fetch and the adapter that attaches
//! `meta.cursor` to an envelope.
//!
//! `next` carries the identifier of the last record in the window. The
//! following request hands it back as its offset, so the data source never
//! re-scans rows already served. A `null` `current` or `prev` means there is
//! no lower bound.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BaseRepoError, BaseRepoResult, DataSource, Envelope, Query, Record, ResourceId};

/// The position of one fetched window within a cursor walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorWindow {
    offset: Option<u64>,
    previous_cursor: Option<ResourceId>,
    current_cursor: Option<ResourceId>,
    page_count: usize,
}

impl CursorWindow {
    /// Creates a window from its raw parts.
    #[must_use]
    pub const fn new(
        offset: Option<u64>,
        previous_cursor: Option<ResourceId>,
        current_cursor: Option<ResourceId>,
        page_count: usize,
    ) -> Self {
        Self {
            offset,
            previous_cursor,
            current_cursor,
            page_count,
        }
    }

    /// Creates the window describing `records`, fetched at `offset`.
    ///
    /// An empty slice gives an exhausted window with no `next` cursor.
    #[must_use]
    pub fn from_records<R: Record>(
        offset: Option<u64>,
        previous_cursor: Option<ResourceId>,
        records: &[R],
    ) -> Self {
        Self::new(
            offset,
            previous_cursor,
            records.last().map(Record::id),
            records.len(),
        )
    }

    /// Fetches one window from `source`.
    ///
    /// With an offset, `limit` records starting at `offset` are fetched;
    /// without one, the first `limit` records.
    pub fn fetch<S: DataSource>(
        source: &S,
        query: &Query,
        limit: u64,
        offset: Option<u64>,
        previous_cursor: Option<ResourceId>,
    ) -> BaseRepoResult<(Vec<S::Record>, Self)> {
        if limit == 0 {
            return Err(BaseRepoError::invalid_argument("cursor limit must be at least 1"));
        }

        let page = source.fetch_page(query, offset, Some(limit))?;
        let window = Self::from_records(offset, previous_cursor, &page.records);

        debug!(
            offset = ?window.offset,
            limit,
            fetched = window.page_count,
            next = ?window.current_cursor,
            "Fetched cursor window"
        );

        Ok((page.records, window))
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    #[must_use]
    pub const fn previous_cursor(&self) -> Option<&ResourceId> {
        self.previous_cursor.as_ref()
    }

    #[must_use]
    pub const fn current_cursor(&self) -> Option<&ResourceId> {
        self.current_cursor.as_ref()
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Returns true when the fetch returned no records.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.current_cursor.is_none()
    }

    /// Returns the `next` cursor, or [`BaseRepoError::EmptyResult`] when the
    /// walk has reached its end.
    pub fn require_next(&self) -> BaseRepoResult<&ResourceId> {
        self.current_cursor.as_ref().ok_or(BaseRepoError::EmptyResult)
    }

    /// Builds the `meta.cursor` block.
    #[must_use]
    pub fn meta(&self) -> CursorMeta {
        CursorMeta {
            current: self.offset,
            prev: self.previous_cursor.clone(),
            next: self.current_cursor.clone(),
            count: self.page_count as u64,
        }
    }
}

/// `meta.cursor` of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorMeta {
    pub current: Option<u64>,
    pub prev: Option<ResourceId>,
    pub next: Option<ResourceId>,
    pub count: u64,
}

/// Attaches `meta.cursor` for `window`.
#[must_use]
pub fn attach_cursor(mut envelope: Envelope, window: &CursorWindow) -> Envelope {
    envelope.meta.cursor = Some(window.meta());
    envelope
}

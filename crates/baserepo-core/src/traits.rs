//! Capabilities consumed from the surrounding application.

use crate::{BaseRepoResult, Query, ResourceId};

/// A domain record with a stable identifier.
pub trait Record {
    /// Returns the record's identifier.
    fn id(&self) -> ResourceId;
}

impl<T: Record + ?Sized> Record for &T {
    fn id(&self) -> ResourceId {
        (**self).id()
    }
}

/// Records returned by one data source fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage<R> {
    /// The fetched records, in query order.
    pub records: Vec<R>,
    /// Number of records matching the query's filter, ignoring offset and limit.
    pub total_count: u64,
}

impl<R> FetchedPage<R> {
    /// Creates a fetched page.
    #[must_use]
    pub fn new(records: Vec<R>, total_count: u64) -> Self {
        Self {
            records,
            total_count,
        }
    }

    /// Returns the identifier of the last fetched record.
    #[must_use]
    pub fn last_id(&self) -> Option<ResourceId>
    where
        R: Record,
    {
        self.records.last().map(Record::id)
    }
}

/// Generic query capability over one record set.
///
/// Calls are synchronous and blocking. Retry and backoff belong to the
/// implementation, not to the callers in this workspace.
pub trait DataSource: Send + Sync {
    /// The record type this source yields.
    type Record: Record;

    /// Fetches up to `limit` records matching `query`, skipping `offset` rows.
    ///
    /// `None` for `offset` starts at the first row; `None` for `limit`
    /// returns every remaining row.
    fn fetch_page(
        &self,
        query: &Query,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> BaseRepoResult<FetchedPage<Self::Record>>;

    /// Looks a record up by identifier.
    fn find(&self, id: &ResourceId) -> BaseRepoResult<Option<Self::Record>>;

    /// Counts the records matching `query`.
    fn count(&self, query: &Query) -> BaseRepoResult<u64> {
        Ok(self.fetch_page(query, None, Some(0))?.total_count)
    }
}

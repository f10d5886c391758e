//! The base repository facade.

use baserepo_config::{AppConfig, PaginationConfig};
use baserepo_core::{
    attach_cursor, attach_pagination, rules, slice, BaseRepoError, BaseRepoResult, CursorWindow,
    DataSource, Envelope, EnvelopeBuilder, Filter, IncludeSet, PageDescriptor, PaginationQuery,
    Query, Record, Resource, ResourceId, SerializerConfig, SortDirection, Transformer,
};
use tracing::debug;

/// One page of an in-memory collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatedRecords<'a, R> {
    /// Records on the requested page.
    pub items: &'a [R],
    pub page: PageDescriptor,
}

/// Read-side repository over one data source.
///
/// Lookups pass straight through to the source. The `transform_*` methods
/// turn records into envelopes with the repository's serializer settings.
#[derive(Debug)]
pub struct BaseRepository<S> {
    source: S,
    builder: EnvelopeBuilder,
    pagination: PaginationConfig,
}

impl<S: DataSource> BaseRepository<S> {
    /// Creates a repository with the default configuration.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::from_config(source, &AppConfig::default())
    }

    /// Creates a repository with links and page sizes taken from `config`.
    #[must_use]
    pub fn from_config(source: S, config: &AppConfig) -> Self {
        Self {
            source,
            builder: EnvelopeBuilder::new(config.serializer_config()),
            pagination: config.pagination,
        }
    }

    /// Replaces the serializer settings.
    #[must_use]
    pub fn with_serializer(mut self, config: SerializerConfig) -> Self {
        self.builder = EnvelopeBuilder::new(config);
        self
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn builder(&self) -> &EnvelopeBuilder {
        &self.builder
    }

    #[must_use]
    pub const fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    // ----- lookups -----

    /// Returns every record ordered by `order_by`.
    pub fn all(
        &self,
        order_by: &str,
        direction: SortDirection,
    ) -> BaseRepoResult<Vec<S::Record>> {
        let query = Query::new().order_by(order_by, direction);
        Ok(self.source.fetch_page(&query, None, None)?.records)
    }

    pub fn find(&self, id: impl Into<ResourceId>) -> BaseRepoResult<Option<S::Record>> {
        self.source.find(&id.into())
    }

    /// Like [`find`](Self::find), but a missing record is [`BaseRepoError::NotFound`].
    pub fn find_one_or_fail(&self, id: impl Into<ResourceId>) -> BaseRepoResult<S::Record> {
        let id = id.into();
        self.source
            .find(&id)?
            .ok_or_else(|| BaseRepoError::not_found(record_name::<S::Record>(), &id))
    }

    /// Returns every record matching `filter`, ordered by `id asc`.
    pub fn find_by(&self, filter: Filter) -> BaseRepoResult<Vec<S::Record>> {
        Ok(self
            .source
            .fetch_page(&self.query_by(filter), None, None)?
            .records)
    }

    /// Returns the first record matching `filter`.
    pub fn find_one_by(&self, filter: Filter) -> BaseRepoResult<Option<S::Record>> {
        Ok(self
            .source
            .fetch_page(&self.query_by(filter), None, Some(1))?
            .records
            .into_iter()
            .next())
    }

    pub fn find_one_by_or_fail(&self, filter: Filter) -> BaseRepoResult<S::Record> {
        let description = describe(&filter);
        self.find_one_by(filter)?
            .ok_or_else(|| BaseRepoError::not_found(record_name::<S::Record>(), description))
    }

    /// Counts the records matching `filter`.
    pub fn count(&self, filter: Filter) -> BaseRepoResult<u64> {
        self.source.count(&self.query_by(filter))
    }

    /// Builds a query narrowed by `filter`.
    #[must_use]
    pub fn query_by(&self, filter: Filter) -> Query {
        Query::new().filter(filter)
    }

    // ----- pagination -----

    /// Slices `records` into page `page`.
    ///
    /// `per_page` defaults to `pagination.array_per_page`.
    pub fn paginate_array_results<'a, R>(
        &self,
        records: &'a [R],
        page: u64,
        per_page: Option<u64>,
    ) -> BaseRepoResult<PaginatedRecords<'a, R>> {
        let per_page = per_page.unwrap_or(self.pagination.array_per_page);
        let items = slice(records, page, per_page)?;
        let page = PageDescriptor::new(page, per_page, records.len() as u64)?;
        Ok(PaginatedRecords { items, page })
    }

    // ----- envelopes -----

    /// Builds `{ data: Item }` for `record`.
    pub fn transform_item<R, T>(
        &self,
        record: Option<&R>,
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        let record = record.ok_or_else(|| {
            BaseRepoError::invalid_argument(format!(
                "cannot transform a missing `{resource_key}` record"
            ))
        })?;
        self.builder
            .build_with_includes(Resource::Item(record), transformer, resource_key, includes)
    }

    /// Builds `{ data: [Item...] }` in input order.
    pub fn transform_collection<R, T>(
        &self,
        records: &[R],
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        self.builder.build_with_includes(
            Resource::Collection(records),
            transformer,
            resource_key,
            includes,
        )
    }

    /// Builds a collection envelope for one page and attaches `meta.pagination`.
    pub fn transform_paginated<R, T>(
        &self,
        records: &[R],
        page: &PageDescriptor,
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        let envelope = self.transform_collection(records, transformer, resource_key, includes)?;
        Ok(attach_pagination(envelope, page))
    }

    /// Fetches one cursor window and attaches `meta.cursor`.
    ///
    /// `limit` defaults to `pagination.cursor_limit`. An empty window yields
    /// `data: []` with a `null` next cursor.
    pub fn transform_with_cursor<T>(
        &self,
        query: &Query,
        transformer: &T,
        resource_key: &str,
        limit: Option<u64>,
        offset: Option<u64>,
        previous: Option<ResourceId>,
    ) -> BaseRepoResult<Envelope>
    where
        T: Transformer<S::Record> + ?Sized,
    {
        rules::resource_key(resource_key).map_err(|e| {
            BaseRepoError::invalid_argument(format!("invalid resource key `{resource_key}`: {e}"))
        })?;

        let limit = limit.unwrap_or(self.pagination.cursor_limit);
        let (records, window) =
            CursorWindow::fetch(&self.source, query, limit, offset, previous)?;
        let envelope =
            self.transform_collection(&records, transformer, resource_key, &IncludeSet::empty())?;
        Ok(attach_cursor(envelope, &window))
    }

    /// Slices an in-memory collection and paginates the slice.
    ///
    /// `per_page` defaults to `pagination.per_page`.
    pub fn paginate_collection<R, T>(
        &self,
        records: &[R],
        page: u64,
        per_page: Option<u64>,
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        let per_page = per_page.or(Some(self.pagination.per_page));
        let paginated = self.paginate_array_results(records, page, per_page)?;
        self.transform_paginated(
            paginated.items,
            &paginated.page,
            transformer,
            resource_key,
            includes,
        )
    }

    /// Fetches the requested page from the data source and paginates it.
    ///
    /// Missing parameters fall back to page 1 and `pagination.per_page`;
    /// `per_page` is capped at `pagination.max_per_page`.
    pub fn transform_page<T>(
        &self,
        query: &Query,
        page_query: &PaginationQuery,
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        T: Transformer<S::Record> + ?Sized,
    {
        let request =
            page_query.resolve(self.pagination.per_page, self.pagination.max_per_page)?;
        let fetched = self
            .source
            .fetch_page(query, Some(request.offset()), Some(request.limit()))?;
        let page = request.with_total(fetched.total_count);

        debug!(
            resource_key,
            page = page.page_number(),
            per_page = page.per_page(),
            total = page.total_count(),
            "Fetched page"
        );

        self.transform_paginated(&fetched.records, &page, transformer, resource_key, includes)
    }
}

fn record_name<R>() -> &'static str {
    let name = std::any::type_name::<R>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

fn describe(filter: &Filter) -> String {
    filter
        .conditions()
        .map(|(field, value)| format!("{field}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

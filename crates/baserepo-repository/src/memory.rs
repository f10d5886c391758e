//! In-memory data source.

use baserepo_core::{BaseRepoResult, DataSource, FetchedPage, Query, Record, ResourceId};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// A [`DataSource`] over records held in memory.
///
/// Filters and ordering work on the serialized form of each record, so any
/// field `serde` emits can be matched or sorted on. A field missing from a
/// record sorts as `null`, ahead of every other value.
#[derive(Debug)]
pub struct InMemoryDataSource<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for InMemoryDataSource<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R> InMemoryDataSource<R> {
    /// Creates a source holding `records` in insertion order.
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Appends a record.
    pub fn insert(&self, record: R) {
        self.records.write().push(record);
    }

    /// Appends every record of `records`.
    pub fn extend(&self, records: impl IntoIterator<Item = R>) {
        self.records.write().extend(records);
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<R> FromIterator<R> for InMemoryDataSource<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R> DataSource for InMemoryDataSource<R>
where
    R: Record + Serialize + Clone + Send + Sync,
{
    type Record = R;

    fn fetch_page(
        &self,
        query: &Query,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> BaseRepoResult<FetchedPage<R>> {
        let records = self.records.read();

        let mut matched = Vec::new();
        for record in records.iter() {
            let value = serde_json::to_value(record)?;
            if matches_filter(&value, query) {
                let key = value.get(&query.order_by).cloned().unwrap_or(Value::Null);
                matched.push((key, record));
            }
        }

        matched.sort_by(|(a, _), (b, _)| {
            let ordering = compare_values(a, b);
            if query.direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let total_count = matched.len() as u64;
        let skip = offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let take = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let page: Vec<R> = matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, record)| record.clone())
            .collect();

        debug!(
            order_by = %query.order_by,
            direction = %query.direction,
            ?offset,
            ?limit,
            total_count,
            fetched = page.len(),
            "In-memory fetch"
        );

        Ok(FetchedPage::new(page, total_count))
    }

    fn find(&self, id: &ResourceId) -> BaseRepoResult<Option<R>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| &record.id() == id)
            .cloned())
    }
}

fn matches_filter(value: &Value, query: &Query) -> bool {
    query
        .filter
        .conditions()
        .all(|(field, expected)| {
            value
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected))
        })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baserepo_core::{Filter, SortDirection};
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Book {
        id: i64,
        title: &'static str,
        year: Option<u32>,
    }

    impl Record for Book {
        fn id(&self) -> ResourceId {
            self.id.into()
        }
    }

    fn shelf() -> InMemoryDataSource<Book> {
        InMemoryDataSource::new(vec![
            Book { id: 3, title: "Dune", year: Some(1965) },
            Book { id: 1, title: "Emma", year: Some(1815) },
            Book { id: 2, title: "Beloved", year: None },
        ])
    }

    fn ids(page: &FetchedPage<Book>) -> Vec<i64> {
        page.records.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_default_query_orders_by_id() {
        let page = shelf().fetch_page(&Query::new(), None, None).unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3]);
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_order_by_string_desc() {
        let query = Query::new().order_by("title", SortDirection::Desc);
        let page = shelf().fetch_page(&query, None, None).unwrap();
        assert_eq!(ids(&page), vec![1, 3, 2]);
    }

    #[test]
    fn test_null_sorts_first() {
        let query = Query::new().order_by("year", SortDirection::Asc);
        let page = shelf().fetch_page(&query, None, None).unwrap();
        assert_eq!(ids(&page), vec![2, 1, 3]);
    }

    #[test]
    fn test_offset_and_limit_keep_total() {
        let page = shelf().fetch_page(&Query::new(), Some(1), Some(1)).unwrap();
        assert_eq!(ids(&page), vec![2]);
        assert_eq!(page.total_count, 3);

        let past_end = shelf().fetch_page(&Query::new(), Some(10), Some(5)).unwrap();
        assert!(past_end.records.is_empty());
        assert_eq!(past_end.total_count, 3);
    }

    #[test]
    fn test_filter_and_count() {
        let source = shelf();
        let query = Query::new().filter(Filter::new().where_eq("title", "Dune"));
        let page = source.fetch_page(&query, None, None).unwrap();
        assert_eq!(ids(&page), vec![3]);
        assert_eq!(source.count(&query).unwrap(), 1);

        let unknown_field = Query::new().filter(Filter::new().where_eq("author", "Austen"));
        assert_eq!(source.count(&unknown_field).unwrap(), 0);
    }

    #[test]
    fn test_numeric_filter_ignores_representation() {
        let query = Query::new().filter(Filter::new().where_eq("year", 1965.0));
        assert_eq!(shelf().count(&query).unwrap(), 1);
    }

    #[test]
    fn test_find_and_insert() {
        let source = shelf();
        assert_eq!(
            source.find(&ResourceId::Int(2)).unwrap().map(|b| b.title),
            Some("Beloved")
        );
        assert!(source.find(&ResourceId::Int(9)).unwrap().is_none());

        source.insert(Book { id: 9, title: "Ulysses", year: Some(1922) });
        assert_eq!(source.len(), 4);
        assert!(source.find(&ResourceId::Int(9)).unwrap().is_some());
    }

    #[test]
    fn test_find_with_string_id() {
        let source = shelf();
        let found = source.find(&ResourceId::from("2")).unwrap();
        assert_eq!(found.map(|b| b.title), Some("Beloved"));
        assert!(source.find(&ResourceId::from("02")).unwrap().is_none());
    }
}

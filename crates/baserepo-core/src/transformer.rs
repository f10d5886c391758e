//! The transformer contract: one record in, one attribute map out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Record, ResourceId};

/// Public attributes of a record, in the order the transformer emitted them.
pub type Attributes = Map<String, Value>;

/// Maps a domain record to its public attribute representation.
///
/// Implementations must be pure: no mutation of the record, and identical
/// input yields identical output. Errors abort the whole build they occur in.
///
/// ```ignore
/// struct UserTransformer;
///
/// impl Transformer<User> for UserTransformer {
///     fn transform(&self, user: &User) -> anyhow::Result<Attributes> {
///         Ok(attributes! { "id" => user.id, "name" => user.name.clone() })
///     }
/// }
/// ```
pub trait Transformer<R: ?Sized> {
    /// Produces the attribute map for one record.
    fn transform(&self, record: &R) -> anyhow::Result<Attributes>;

    /// Relation names a caller may ask for.
    fn available_includes(&self) -> &[&'static str] {
        &[]
    }

    /// Relation names attached on every build, requested or not.
    fn default_includes(&self) -> &[&'static str] {
        &[]
    }

    /// Resolves one relation of `record`.
    ///
    /// `Ok(None)` means the name is not recognised; the builder drops it.
    fn include(&self, _record: &R, _name: &str) -> anyhow::Result<Option<Related>> {
        Ok(None)
    }
}

impl<R: ?Sized, T: Transformer<R> + ?Sized> Transformer<R> for &T {
    fn transform(&self, record: &R) -> anyhow::Result<Attributes> {
        (**self).transform(record)
    }

    fn available_includes(&self) -> &[&'static str] {
        (**self).available_includes()
    }

    fn default_includes(&self) -> &[&'static str] {
        (**self).default_includes()
    }

    fn include(&self, record: &R, name: &str) -> anyhow::Result<Option<Related>> {
        (**self).include(record, name)
    }
}

/// A transformer backed by a plain function or closure.
#[derive(Debug, Clone, Copy)]
pub struct FnTransformer<F>(F);

/// Wraps `f` as a [`Transformer`] with no includes.
pub fn transformer_fn<R, F>(f: F) -> FnTransformer<F>
where
    R: ?Sized,
    F: Fn(&R) -> anyhow::Result<Attributes>,
{
    FnTransformer(f)
}

impl<R: ?Sized, F> Transformer<R> for FnTransformer<F>
where
    F: Fn(&R) -> anyhow::Result<Attributes>,
{
    fn transform(&self, record: &R) -> anyhow::Result<Attributes> {
        (self.0)(record)
    }
}

/// A transformed related record, ready to be emitted under `included`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedResource {
    pub resource_key: String,
    pub id: ResourceId,
    pub attributes: Attributes,
}

impl RelatedResource {
    /// Transforms `record` into a related resource of type `resource_key`.
    pub fn build<R, T>(record: &R, transformer: &T, resource_key: &str) -> anyhow::Result<Self>
    where
        R: Record + ?Sized,
        T: Transformer<R> + ?Sized,
    {
        Ok(Self {
            resource_key: resource_key.to_string(),
            id: record.id(),
            attributes: transformer.transform(record)?,
        })
    }
}

/// The resolved value of one relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// To-one relation.
    One(RelatedResource),
    /// To-many relation.
    Many(Vec<RelatedResource>),
    /// Recognised to-one relation with no related record.
    Null,
}

impl Related {
    /// Builds a to-one relation.
    pub fn one<R, T>(record: &R, transformer: &T, resource_key: &str) -> anyhow::Result<Self>
    where
        R: Record + ?Sized,
        T: Transformer<R> + ?Sized,
    {
        RelatedResource::build(record, transformer, resource_key).map(Self::One)
    }

    /// Builds a to-one relation that may be absent.
    pub fn optional<R, T>(
        record: Option<&R>,
        transformer: &T,
        resource_key: &str,
    ) -> anyhow::Result<Self>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        match record {
            Some(record) => Self::one(record, transformer, resource_key),
            None => Ok(Self::Null),
        }
    }

    /// Builds a to-many relation, preserving input order.
    pub fn many<'a, R, T, I>(
        records: I,
        transformer: &T,
        resource_key: &str,
    ) -> anyhow::Result<Self>
    where
        R: Record + 'a,
        T: Transformer<R> + ?Sized,
        I: IntoIterator<Item = &'a R>,
    {
        records
            .into_iter()
            .map(|record| RelatedResource::build(record, transformer, resource_key))
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Self::Many)
    }

    /// Iterates over every related resource.
    pub fn resources(&self) -> impl Iterator<Item = &RelatedResource> {
        let slice: &[RelatedResource] = match self {
            Self::One(resource) => std::slice::from_ref(resource),
            Self::Many(resources) => resources,
            Self::Null => &[],
        };
        slice.iter()
    }
}

/// Builds an [`Attributes`] map in insertion order.
///
/// Values go through `Into<serde_json::Value>`.
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Attributes::new();
        $(map.insert(
            ::std::string::String::from($key),
            ::std::convert::Into::<$crate::__serde_json::Value>::into($value),
        );)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Tag {
        id: i64,
        label: &'static str,
    }

    impl Record for Tag {
        fn id(&self) -> ResourceId {
            self.id.into()
        }
    }

    fn tag_transformer() -> FnTransformer<impl Fn(&Tag) -> anyhow::Result<Attributes>> {
        transformer_fn(|tag: &Tag| Ok(attributes! { "label" => tag.label }))
    }

    #[test]
    fn test_attributes_macro_keeps_order() {
        let attrs = attributes! { "z" => 1, "a" => "two", "m" => Value::Null };
        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(attrs["m"], json!(null));
        assert_eq!(attrs["z"], json!(1));
        assert!(attributes! {}.is_empty());
    }

    #[test]
    fn test_fn_transformer_has_no_includes() {
        let transformer = tag_transformer();
        assert!(transformer.available_includes().is_empty());
        assert!(transformer.default_includes().is_empty());
        let tag = Tag { id: 1, label: "rust" };
        assert!(transformer.include(&tag, "anything").unwrap().is_none());
    }

    #[test]
    fn test_related_one_and_many() {
        let transformer = tag_transformer();
        let tags = [Tag { id: 1, label: "a" }, Tag { id: 2, label: "b" }];

        let one = Related::one(&tags[0], &transformer, "tags").unwrap();
        assert_eq!(one.resources().count(), 1);

        let many = Related::many(tags.iter(), &transformer, "tags").unwrap();
        let ids: Vec<ResourceId> = many.resources().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![ResourceId::Int(1), ResourceId::Int(2)]);

        let none = Related::optional::<Tag, _>(None, &transformer, "tags").unwrap();
        assert_eq!(none, Related::Null);
        assert_eq!(none.resources().count(), 0);
    }

    #[test]
    fn test_related_propagates_transformer_error() {
        let failing = transformer_fn(|_: &Tag| Err(anyhow::anyhow!("nope")));
        let tag = Tag { id: 1, label: "a" };
        let err = Related::one(&tag, &failing, "tags").unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}

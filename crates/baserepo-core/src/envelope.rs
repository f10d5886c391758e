//! Resource envelopes and the builder that produces them.
//!
//! An [`Envelope`] is the serialization-ready tree handed to a response
//! layer:
//!
//! ```text
//! { data: Item | [Item], included?: [Item], links?: {...}, meta?: {...} }
//! Item = { type, id, attributes, relationships?, links?: { self } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::{
    Attributes, BaseRepoError, BaseRepoResult, CursorMeta, IncludeSet, PaginationLinks,
    PaginationMeta, Record, Related, RelatedResource, Transformer, rules,
};

/// Serializer settings threaded through every build call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Prefix for generated links. `None` disables links entirely.
    pub base_url: Option<String>,
}

impl SerializerConfig {
    /// Creates a config that emits links under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: Some(base_url.trim_end_matches('/').to_string()),
        }
    }

    /// Creates a config that emits no links.
    #[must_use]
    pub const fn without_links() -> Self {
        Self { base_url: None }
    }

    fn resource_url(&self, resource_key: &str, id: &str) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{base}/{resource_key}/{id}"))
    }
}

/// `links` of a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// `links` of a relationship object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub related: String,
}

/// `{ type, id }` pointer to a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

/// Linkage of a relationship: one identifier or many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// One entry of `relationships`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    /// `null` for a recognised to-one relation without a related record.
    pub data: Option<Linkage>,
}

/// A transformed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
}

impl ResourceObject {
    /// The `{ type, id }` pointer to this object.
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
        }
    }
}

/// Primary data of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(ResourceObject),
    Many(Vec<ResourceObject>),
}

impl PrimaryData {
    /// Number of resource objects present.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    /// Returns true for an empty collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the resource objects in order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceObject> {
        let slice: &[ResourceObject] = match self {
            Self::One(item) => std::slice::from_ref(item),
            Self::Many(items) => items,
        };
        slice.iter()
    }
}

/// Top-level `meta`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorMeta>,
}

impl Meta {
    /// Returns true when no metadata is attached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pagination.is_none() && self.cursor.is_none()
    }
}

/// The serialization-ready output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: PrimaryData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl Envelope {
    fn new(data: PrimaryData, included: Vec<ResourceObject>) -> Self {
        Self {
            data,
            included,
            links: None,
            meta: Meta::default(),
        }
    }

    /// Number of primary resource objects.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Converts the envelope to a JSON value.
    pub fn to_value(&self) -> BaseRepoResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encodes the envelope as a JSON string.
    pub fn to_json(&self) -> BaseRepoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an envelope from a JSON string.
    pub fn from_json(raw: &str) -> BaseRepoResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// What to build: one record or an ordered sequence.
#[derive(Debug)]
pub enum Resource<'a, R> {
    Item(&'a R),
    Collection(&'a [R]),
}

impl<R> Clone for Resource<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Resource<'_, R> {}

/// Builds envelopes from records and a transformer.
///
/// Stateless apart from its [`SerializerConfig`]; one builder can serve any
/// number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    config: SerializerConfig,
}

impl EnvelopeBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Returns the serializer settings.
    #[must_use]
    pub const fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Builds `{ data: Item }`.
    ///
    /// A missing record is a contract violation and never yields an item
    /// filled with nulls.
    pub fn build_item<R, T>(
        &self,
        record: Option<&R>,
        transformer: &T,
        resource_key: &str,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        let record = record.ok_or_else(|| missing_record(resource_key))?;
        self.build_with_includes(
            Resource::Item(record),
            transformer,
            resource_key,
            &IncludeSet::empty(),
        )
    }

    /// Builds `{ data: [Item...] }` in input order.
    pub fn build_collection<R, T>(
        &self,
        records: &[R],
        transformer: &T,
        resource_key: &str,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        self.build_with_includes(
            Resource::Collection(records),
            transformer,
            resource_key,
            &IncludeSet::empty(),
        )
    }

    /// Builds an item or collection envelope, resolving `includes`.
    ///
    /// Each recognised relation lands under the item's `relationships` and
    /// its resource objects under top-level `included`. Unknown names are
    /// dropped without error.
    pub fn build_with_includes<R, T>(
        &self,
        resource: Resource<'_, R>,
        transformer: &T,
        resource_key: &str,
        includes: &IncludeSet,
    ) -> BaseRepoResult<Envelope>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        rules::resource_key(resource_key).map_err(|e| {
            BaseRepoError::invalid_argument(format!("invalid resource key `{resource_key}`: {e}"))
        })?;

        let names = includes.resolve(
            transformer.available_includes(),
            transformer.default_includes(),
        );
        let mut related = Vec::new();

        let data = match resource {
            Resource::Item(record) => PrimaryData::One(self.resource_object(
                record,
                transformer,
                resource_key,
                &names,
                &mut related,
            )?),
            Resource::Collection(records) => PrimaryData::Many(
                records
                    .iter()
                    .map(|record| {
                        self.resource_object(
                            record,
                            transformer,
                            resource_key,
                            &names,
                            &mut related,
                        )
                    })
                    .collect::<BaseRepoResult<Vec<_>>>()?,
            ),
        };

        let included = self.dedup_included(&data, related);

        debug!(
            resource_key,
            count = data.len(),
            included = included.len(),
            "Built resource envelope"
        );

        Ok(Envelope::new(data, included))
    }

    fn resource_object<R, T>(
        &self,
        record: &R,
        transformer: &T,
        resource_key: &str,
        includes: &[&str],
        related: &mut Vec<RelatedResource>,
    ) -> BaseRepoResult<ResourceObject>
    where
        R: Record,
        T: Transformer<R> + ?Sized,
    {
        let attributes = transformer.transform(record)?;
        let id = record.id().to_string();

        let mut relationships = BTreeMap::new();
        for name in includes {
            let Some(resolved) = transformer.include(record, name)? else {
                debug!(
                    resource_key,
                    include = %name,
                    "Include not recognised by transformer, ignoring"
                );
                continue;
            };
            let relationship = self.relationship(resource_key, &id, name, &resolved);
            relationships.insert((*name).to_string(), relationship);
            match resolved {
                Related::One(resource) => related.push(resource),
                Related::Many(resources) => related.extend(resources),
                Related::Null => {}
            }
        }

        let links = self
            .config
            .resource_url(resource_key, &id)
            .map(|self_link| ResourceLinks { self_link });

        Ok(ResourceObject {
            resource_type: resource_key.to_string(),
            id,
            attributes,
            relationships,
            links,
        })
    }

    fn relationship(
        &self,
        resource_key: &str,
        id: &str,
        name: &str,
        related: &Related,
    ) -> Relationship {
        let data = match related {
            Related::One(resource) => Some(Linkage::One(identifier_of(resource))),
            Related::Many(resources) => {
                Some(Linkage::Many(resources.iter().map(identifier_of).collect()))
            }
            Related::Null => None,
        };
        let links = self.config.resource_url(resource_key, id).map(|base| RelationshipLinks {
            self_link: format!("{base}/relationships/{name}"),
            related: format!("{base}/{name}"),
        });
        Relationship { links, data }
    }

    fn dedup_included(
        &self,
        data: &PrimaryData,
        related: Vec<RelatedResource>,
    ) -> Vec<ResourceObject> {
        let mut seen: HashSet<ResourceIdentifier> =
            data.iter().map(ResourceObject::identifier).collect();
        let mut included = Vec::new();
        for resource in related {
            let identifier = identifier_of(&resource);
            if !seen.insert(identifier.clone()) {
                continue;
            }
            let links = self
                .config
                .resource_url(&identifier.resource_type, &identifier.id)
                .map(|self_link| ResourceLinks { self_link });
            included.push(ResourceObject {
                resource_type: identifier.resource_type,
                id: identifier.id,
                attributes: resource.attributes,
                relationships: BTreeMap::new(),
                links,
            });
        }
        included
    }
}

fn identifier_of(resource: &RelatedResource) -> ResourceIdentifier {
    ResourceIdentifier {
        resource_type: resource.resource_key.clone(),
        id: resource.id.to_string(),
    }
}

fn missing_record(resource_key: &str) -> BaseRepoError {
    BaseRepoError::invalid_argument(format!(
        "cannot build `{resource_key}` item from a missing record"
    ))
}

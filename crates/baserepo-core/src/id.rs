//! Record identifiers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// The identifier of a record, as read from its identity accessor.
///
/// Integer and string keys are both common in the tables this library sits
/// on top of. Envelopes always carry the string form; cursor metadata keeps
/// the original shape.
///
/// Equality, hashing and ordering go through the string form, so `Int(1)`
/// and `Str("1")` are the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Numeric primary key.
    Int(i64),
    /// String key (slugs, UUIDs, ...).
    Str(String),
}

impl ResourceId {
    /// Returns the numeric value if this is an integer id.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Str(_) => None,
        }
    }

    /// Returns the id as an offset, if it is a non-negative integer.
    #[must_use]
    pub fn as_offset(&self) -> Option<u64> {
        match self {
            Self::Int(value) => u64::try_from(*value).ok(),
            Self::Str(value) => value.parse().ok(),
        }
    }
}

/// Comparison key: numeric strings that print back unchanged count as integers.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Key<'a> {
    Int(i64),
    Str(&'a str),
}

impl ResourceId {
    fn key(&self) -> Key<'_> {
        match self {
            Self::Int(value) => Key::Int(*value),
            Self::Str(value) => match value.parse::<i64>() {
                Ok(n) if n.to_string() == *value => Key::Int(n),
                _ => Key::Str(value),
            },
        }
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ResourceId {}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for ResourceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ResourceId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ResourceId {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Uuid> for ResourceId {
    fn from(uuid: Uuid) -> Self {
        Self::Str(uuid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display() {
        assert_eq!(ResourceId::from(1).to_string(), "1");
        assert_eq!(ResourceId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_uuid_is_string_id() {
        let uuid = Uuid::now_v7();
        assert_eq!(ResourceId::from(uuid), ResourceId::Str(uuid.to_string()));
    }

    #[test]
    fn test_serde_untagged() {
        assert_eq!(serde_json::to_string(&ResourceId::from(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&ResourceId::from("x")).unwrap(), "\"x\"");

        let id: ResourceId = serde_json::from_str("11").unwrap();
        assert_eq!(id, ResourceId::Int(11));
        let id: ResourceId = serde_json::from_str("\"11\"").unwrap();
        assert!(matches!(id, ResourceId::Str(ref s) if s == "11"));
    }

    #[test]
    fn test_numeric_string_equals_int() {
        assert_eq!(ResourceId::from("1"), ResourceId::Int(1));
        assert_eq!(ResourceId::Int(-4), ResourceId::from("-4"));
        assert_ne!(ResourceId::from("01"), ResourceId::Int(1));
        assert_ne!(ResourceId::from("slug"), ResourceId::Int(1));

        let ids: HashSet<ResourceId> = [ResourceId::Int(1), ResourceId::from("1")]
            .into_iter()
            .collect();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_ordering_agrees_with_equality() {
        assert_eq!(ResourceId::from("2").cmp(&ResourceId::Int(2)), Ordering::Equal);
        assert!(ResourceId::Int(2) < ResourceId::from("10"));
        assert!(ResourceId::Int(99) < ResourceId::from("abc"));
    }

    #[test]
    fn test_as_offset() {
        assert_eq!(ResourceId::from(5).as_offset(), Some(5));
        assert_eq!(ResourceId::from(-1).as_offset(), None);
        assert_eq!(ResourceId::from("12").as_offset(), Some(12));
        assert_eq!(ResourceId::from("slug").as_offset(), None);
        assert_eq!(ResourceId::from(3).as_i64(), Some(3));
    }
}

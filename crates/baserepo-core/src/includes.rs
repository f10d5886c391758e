//! Requested relation names.

/// The set of relation names a caller asked to include.
///
/// Only the top-level segment of a dotted path is kept (`author.posts`
/// becomes `author`), `:modifier` suffixes are stripped, and duplicates
/// collapse onto their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSet {
    names: Vec<String>,
}

impl IncludeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a comma separated list such as `"author, comments"`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    /// Returns true if `name` was requested.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns true if nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Iterates over the names in request order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names to resolve against a transformer: its defaults first, then every
    /// requested name it lists as available.
    pub(crate) fn resolve<'a>(
        &'a self,
        available: &'a [&'static str],
        defaults: &'a [&'static str],
    ) -> Vec<&'a str> {
        let mut resolved: Vec<&str> = Vec::with_capacity(defaults.len() + self.names.len());
        for name in defaults.iter().copied() {
            if !resolved.contains(&name) {
                resolved.push(name);
            }
        }
        for name in self.iter() {
            if available.contains(&name) && !resolved.contains(&name) {
                resolved.push(name);
            }
        }
        resolved
    }

    fn push(&mut self, raw: &str) {
        let Some(name) = normalize(raw) else {
            return;
        };
        if !self.contains(name) {
            self.names.push(name.to_string());
        }
    }
}

fn normalize(raw: &str) -> Option<&str> {
    let path = raw.split(':').next().unwrap_or_default();
    let top = path.split('.').next().unwrap_or_default().trim();
    (!top.is_empty()).then_some(top)
}

impl<S: AsRef<str>> FromIterator<S> for IncludeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::empty();
        for raw in iter {
            set.push(raw.as_ref());
        }
        set
    }
}

impl From<&str> for IncludeSet {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<Option<&str>> for IncludeSet {
    fn from(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }
}

impl From<&[&str]> for IncludeSet {
    fn from(names: &[&str]) -> Self {
        names.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_dedups() {
        let set = IncludeSet::parse(" author , comments,,author ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["author", "comments"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_keeps_top_level_segment() {
        let set = IncludeSet::parse("author.posts,comments:limit(5|1)");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["author", "comments"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(IncludeSet::parse("").is_empty());
        assert!(IncludeSet::parse(" , ,").is_empty());
        assert!(IncludeSet::from(None).is_empty());
    }

    #[test]
    fn test_from_slice() {
        let names: &[&str] = &["posts", "roles"];
        let set = IncludeSet::from(names);
        assert!(set.contains("posts"));
        assert!(!set.contains("author"));
    }

    #[test]
    fn test_resolve_defaults_first_and_drops_unknown() {
        let set = IncludeSet::parse("comments,unknown,author");
        let resolved = set.resolve(&["author", "comments"], &["profile"]);
        assert_eq!(resolved, vec!["profile", "comments", "author"]);
    }

    #[test]
    fn test_resolve_default_not_repeated() {
        let set = IncludeSet::parse("profile");
        let resolved = set.resolve(&["profile"], &["profile"]);
        assert_eq!(resolved, vec!["profile"]);
    }
}

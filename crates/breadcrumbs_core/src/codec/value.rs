//! Tagged value tree produced by the frontmatter parser.

/// One frontmatter value.
///
/// The grammar only knows scalars, arrays of scalars and nested maps, so there
/// is no numeric/boolean typing: every leaf is a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    Array(Vec<String>),
    Map(FrontmatterMap),
}

impl FrontmatterValue {
    /// Short type label used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}

/// Insertion-ordered key/value map.
///
/// Order matters for serialization: the writer emits keys exactly in the order
/// they were inserted. Re-inserting a key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterMap {
    entries: Vec<(String, FrontmatterValue)>,
}

impl FrontmatterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: FrontmatterValue,
    ) -> Option<FrontmatterValue> {
        let key = key.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn insert_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, FrontmatterValue::Scalar(value.into()));
    }

    /// Inserts a scalar only when `value` is present.
    pub fn insert_optional(&mut self, key: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value {
            self.insert_scalar(key, value);
        }
    }

    pub fn insert_array(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.insert(key, FrontmatterValue::Array(values));
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FrontmatterMap, FrontmatterValue};

    #[test]
    fn insert_replaces_in_place_and_keeps_order() {
        let mut map = FrontmatterMap::new();
        map.insert_scalar("id", "a");
        map.insert_scalar("title", "b");
        let previous = map.insert("id", FrontmatterValue::Scalar("c".to_string()));

        assert_eq!(previous, Some(FrontmatterValue::Scalar("a".to_string())));
        let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["id", "title"]);
        assert_eq!(map.get("id"), Some(&FrontmatterValue::Scalar("c".to_string())));
    }

    #[test]
    fn insert_optional_skips_absent_values() {
        let mut map = FrontmatterMap::new();
        map.insert_optional("commit", None);
        assert!(map.is_empty());
    }
}

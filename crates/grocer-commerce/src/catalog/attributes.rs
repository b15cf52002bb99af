//! Variant attribute selections (e.g. `Color: Red, Size: M`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A set of attribute name/value pairs.
///
/// Backed by a sorted map, so two selections compare equal exactly when they
/// carry the same keys with the same values, whatever order they were built
/// or received in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from name/value pairs. A repeated name keeps the last value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Human label, e.g. `Color: Red, Size: M`.
    pub fn label(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Stable serialized form with keys sorted, e.g. `Color=Red|Size=M`.
    pub fn canonical_key(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// `None` for an empty selection, so "no attributes" has one spelling.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Attributes::from_pairs([("Color", "Red"), ("Size", "M")]);
        let b = Attributes::from_pairs([("Size", "M"), ("Color", "Red")]);
        assert_eq!(a, b);
        assert_eq!(a.canonical_key(), "Color=Red|Size=M");
    }

    #[test]
    fn test_subset_and_different_value_are_not_equal() {
        let full = Attributes::from_pairs([("Color", "Red"), ("Size", "M")]);
        assert_ne!(full, Attributes::from_pairs([("Color", "Red")]));
        assert_ne!(full, Attributes::from_pairs([("Color", "Red"), ("Size", "L")]));
    }

    #[test]
    fn test_label() {
        let a = Attributes::from_pairs([("Weight", "1kg"), ("Brand", "Dano")]);
        assert_eq!(a.label(), "Brand: Dano, Weight: 1kg");
    }

    #[test]
    fn test_json_object_roundtrip_is_order_free() {
        let parsed: Attributes = serde_json::from_str(r#"{"Size":"M","Color":"Red"}"#).unwrap();
        assert_eq!(parsed, Attributes::from_pairs([("Color", "Red"), ("Size", "M")]));
    }
}

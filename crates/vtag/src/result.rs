//! Rendered validation results.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field name to rendered message, in the order the failures were found.
///
/// Validation methods return `None` instead of an empty `FieldMessages`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages {
    entries: Vec<(String, String)>,
}

impl FieldMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result with a single entry.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut messages = Self::new();
        messages.insert(field, message);
        messages
    }

    /// Set the message for `field`, replacing an earlier one in place.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `None` when empty.
    pub fn into_option(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl IntoIterator for FieldMessages {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMessages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut messages = Self::new();
        for (field, message) in iter {
            messages.insert(field, message);
        }
        messages
    }
}

impl Serialize for FieldMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut messages = FieldMessages::new();
        messages.insert("name", "first");
        messages.insert("age", "too young");
        messages.insert("name", "second");

        let entries: Vec<_> = messages.iter().collect();
        assert_eq!(entries, vec![("name", "second"), ("age", "too young")]);
    }

    #[test]
    fn empty_becomes_none() {
        assert!(FieldMessages::new().into_option().is_none());
        assert!(FieldMessages::single("a", "b").into_option().is_some());
    }

    #[test]
    fn serializes_as_ordered_object() {
        let messages: FieldMessages = [("zip", "bad"), ("city", "missing")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&messages).unwrap(),
            r#"{"zip":"bad","city":"missing"}"#
        );
    }
}

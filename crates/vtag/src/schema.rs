//! Per-type validation metadata.
//!
//! A [`Schema`] lists a struct's fields in declaration order with their rule
//! expression and display markers. It is usually generated by
//! `#[derive(Validate)]` but can be written by hand:
//!
//! ```rust,ignore
//! use vtag::{FieldSchema, Schema, Validate};
//!
//! #[derive(serde::Serialize)]
//! struct Signup {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Validate for Signup {
//!     fn schema() -> Schema {
//!         Schema::new("Signup")
//!             .field(FieldSchema::new("name").rules("required,min=3").title("Name"))
//!             .field(FieldSchema::new("age").rules("gte=18"))
//!     }
//! }
//! ```

use serde::Serialize;
use std::any::TypeId;

/// A type that can be validated by the tag engine.
///
/// Field names in the schema must match the keys the type serializes to.
pub trait Validate: Serialize {
    /// Describe the fields of this type.
    fn schema() -> Schema;
}

/// Validation metadata for one struct type.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Type name used for struct-scoped translations.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}

/// Reference to the schema of a nested struct type.
#[derive(Debug, Clone, Copy)]
pub struct Nested {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) schema: fn() -> Schema,
}

impl Nested {
    pub fn of<T: Validate + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            schema: T::schema,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Validation metadata for one field.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    rules: String,
    title: Option<String>,
    localized_titles: Vec<(String, String)>,
    format: bool,
    nested: Option<Nested>,
    skip: bool,
}

/// Lowercase with `-` as the subtag separator, so `fa_IR` and `fa-ir` agree.
pub(crate) fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}

/// The primary language subtag of a normalized locale.
pub(crate) fn language_of(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: String::new(),
            title: None,
            localized_titles: Vec::new(),
            format: false,
            nested: None,
            skip: false,
        }
    }

    /// Rule expression, e.g. `required,min=3`.
    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Display title used in messages for every locale without its own title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Display title for one locale.
    pub fn title_in(mut self, locale: &str, title: impl Into<String>) -> Self {
        let locale = normalize_locale(locale);
        let title = title.into();
        match self.localized_titles.iter_mut().find(|(l, _)| *l == locale) {
            Some(entry) => entry.1 = title,
            None => self.localized_titles.push((locale, title)),
        }
        self
    }

    /// Render numeric rule params with locale digit grouping.
    pub fn format(mut self) -> Self {
        self.format = true;
        self
    }

    /// Validate the field's value against `T`'s schema.
    pub fn nested<T: Validate + 'static>(mut self) -> Self {
        self.nested = Some(Nested::of::<T>());
        self
    }

    /// Exclude the field from validation.
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule_expr(&self) -> &str {
        &self.rules
    }

    pub fn is_formatted(&self) -> bool {
        self.format
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn nested_schema(&self) -> Option<&Nested> {
        self.nested.as_ref()
    }

    /// Title for `locale`: exact locale, then its language, then the default
    /// title, then the field name.
    pub fn title_for(&self, locale: &str) -> &str {
        let locale = normalize_locale(locale);
        let language = language_of(&locale);

        let localized = |wanted: &str| {
            self.localized_titles
                .iter()
                .find(|(l, _)| l == wanted)
                .map(|(_, t)| t.as_str())
        };

        localized(&locale)
            .or_else(|| localized(language))
            .or(self.title.as_deref())
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_resolution_order() {
        let field = FieldSchema::new("name")
            .title("Name")
            .title_in("fa", "نام")
            .title_in("en_GB", "Full name");

        assert_eq!(field.title_for("fa"), "نام");
        assert_eq!(field.title_for("fa-IR"), "نام");
        assert_eq!(field.title_for("en-gb"), "Full name");
        assert_eq!(field.title_for("en"), "Name");
        assert_eq!(field.title_for("de"), "Name");
    }

    #[test]
    fn title_defaults_to_field_name() {
        let field = FieldSchema::new("postal_code");
        assert_eq!(field.title_for("en"), "postal_code");
    }

    #[test]
    fn localized_title_overwrites() {
        let field = FieldSchema::new("name")
            .title_in("fa", "اسم")
            .title_in("FA", "نام");
        assert_eq!(field.title_for("fa"), "نام");
    }

    #[test]
    fn schema_keeps_field_order() {
        let schema = Schema::new("Signup")
            .field(FieldSchema::new("b"))
            .field(FieldSchema::new("a").skip());
        let names: Vec<_> = schema.fields().iter().map(FieldSchema::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(schema.fields()[1].is_skipped());
    }
}

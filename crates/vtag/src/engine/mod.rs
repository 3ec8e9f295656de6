//! The tag engine.
//!
//! Owns the tag table (built-ins plus anything registered at runtime), parses
//! and caches rule expressions, and walks serialized values against compiled
//! [`Schema`](crate::Schema)s. It knows nothing about messages; the
//! [`Validator`](crate::Validator) facade turns its [`FieldError`]s into text.
//!
//! Registration and validation may run concurrently. Registering a tag drops
//! every cached rule set and schema so that later calls see the new tag.

mod builtin;
pub mod rules;

use crate::error::{Error, FieldError, Result};
use crate::schema::{FieldSchema, Nested, Validate};
use rules::{Rule, RuleSet};
use serde_json::{Map, Value};
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

pub(crate) use builtin::is_empty;

/// A validation function for a tag.
pub type Func = Arc<dyn Fn(&FieldLevel<'_>) -> bool + Send + Sync>;

/// What a tag accepts as its parameter; checked when a rule is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// No parameter allowed.
    None,
    /// A number is required.
    Numeric,
    /// A non-empty parameter is required.
    Required,
    /// Anything, including nothing.
    Any,
}

impl Param {
    fn check(self, tag: &str, param: &str) -> Result<()> {
        let valid = match self {
            Param::None => param.is_empty(),
            Param::Numeric => param.trim().parse::<f64>().is_ok(),
            Param::Required => !param.trim().is_empty(),
            Param::Any => true,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::InvalidParam {
                tag: tag.to_string(),
                param: param.to_string(),
            })
        }
    }
}

#[derive(Clone)]
struct TagEntry {
    func: Func,
    param: Param,
}

/// The field being checked, as seen by a tag function.
#[derive(Debug, Clone, Copy)]
pub struct FieldLevel<'a> {
    field: &'a str,
    value: &'a Value,
    param: &'a str,
    parent: Option<&'a Map<String, Value>>,
    other: Option<&'a Value>,
}

impl<'a> FieldLevel<'a> {
    pub fn new(field: &'a str, value: &'a Value, param: &'a str) -> Self {
        Self {
            field,
            value,
            param,
            parent: None,
            other: None,
        }
    }

    /// Attach the struct the field belongs to.
    pub fn with_parent(mut self, parent: &'a Map<String, Value>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach an explicit value to compare against.
    pub fn with_other(mut self, other: &'a Value) -> Self {
        self.other = Some(other);
        self
    }

    pub fn field(&self) -> &'a str {
        self.field
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn param(&self) -> &'a str {
        self.param
    }

    pub fn parent(&self) -> Option<&'a Map<String, Value>> {
        self.parent
    }

    /// String form of the value. Null is empty, strings are unquoted,
    /// everything else is its JSON text.
    pub fn as_string(&self) -> Cow<'a, str> {
        match self.value {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Value for field-comparison tags: the explicit other value, else the
    /// sibling field named by the param.
    pub fn comparison_target(&self) -> Option<&'a Value> {
        self.other
            .or_else(|| self.parent.and_then(|parent| parent.get(self.param)))
    }
}

#[derive(Debug)]
struct CompiledField {
    schema: Arc<FieldSchema>,
    rules: Arc<RuleSet>,
}

/// A schema with every rule expression parsed and checked.
#[derive(Debug)]
pub struct CompiledSchema {
    name: String,
    fields: Vec<CompiledField>,
}

impl CompiledSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A failing field found while walking a struct.
#[derive(Debug, Clone)]
pub struct StructViolation {
    pub error: FieldError,
    /// Metadata of the failing field (title, format marker)
    pub field: Arc<FieldSchema>,
}

/// Which fields of a struct take part in validation.
///
/// Entries are dotted paths; naming a struct field covers everything nested
/// under it.
#[derive(Debug, Clone, Copy, Default)]
pub enum FieldFilter<'a> {
    #[default]
    All,
    Except(&'a [&'a str]),
    Only(&'a [&'a str]),
}

/// Whether `entry` is `path` or one of its ancestors.
fn covers(entry: &str, path: &str) -> bool {
    path.strip_prefix(entry)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

impl FieldFilter<'_> {
    /// Whether the rules of the field at `path` are evaluated.
    pub fn includes(&self, path: &str) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::Except(names) => !names.iter().any(|n| covers(n, path)),
            FieldFilter::Only(names) => names.iter().any(|n| covers(n, path)),
        }
    }

    /// Whether the walk visits the field at `path` at all.
    pub fn descends(&self, path: &str) -> bool {
        match self {
            FieldFilter::Only(names) => {
                self.includes(path) || names.iter().any(|n| covers(path, n))
            }
            _ => self.includes(path),
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Tag table, rule cache and schema cache.
pub struct TagEngine {
    tags: RwLock<HashMap<String, TagEntry>>,
    rule_cache: RwLock<HashMap<String, Arc<RuleSet>>>,
    schemas: RwLock<HashMap<TypeId, Arc<CompiledSchema>>>,
}

impl Default for TagEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags = self.tags.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("TagEngine")
            .field("tags", &tags.len())
            .finish_non_exhaustive()
    }
}

impl TagEngine {
    /// An engine with the built-in tags registered.
    pub fn new() -> Self {
        let tags = builtin::BUILTINS
            .iter()
            .map(|&(name, param, func)| {
                let func: Func = Arc::new(func);
                (name.to_string(), TagEntry { func, param })
            })
            .collect();

        Self {
            tags: RwLock::new(tags),
            rule_cache: RwLock::new(HashMap::new()),
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Register `tag`, replacing any existing tag of that name.
    ///
    /// Custom tags accept any parameter; the function decides what it means.
    pub fn register<F>(&self, tag: &str, func: F)
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        let entry = TagEntry {
            func: Arc::new(func),
            param: Param::Any,
        };

        let replaced = self
            .tags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag.to_string(), entry)
            .is_some();

        self.rule_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        debug!(tag, replaced, "registered validation tag");
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(tag)
    }

    fn lookup(&self, tag: &str) -> Result<TagEntry> {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned()
            .ok_or_else(|| Error::UnknownTag {
                tag: tag.to_string(),
            })
    }

    /// Parse and check a rule expression, reusing an earlier result.
    pub fn compile(&self, expr: &str) -> Result<Arc<RuleSet>> {
        if let Some(cached) = self
            .rule_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(expr)
        {
            return Ok(Arc::clone(cached));
        }

        let set = rules::parse(expr)?;
        for alt in set.alternatives() {
            self.lookup(&alt.tag)?.param.check(&alt.tag, &alt.param)?;
        }

        let set = Arc::new(set);
        self.rule_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(expr.to_string(), Arc::clone(&set));
        Ok(set)
    }

    /// Compiled schema of `T`.
    pub fn schema_of<T: Validate + 'static>(&self) -> Result<Arc<CompiledSchema>> {
        self.compiled(&Nested::of::<T>())
    }

    fn compiled(&self, nested: &Nested) -> Result<Arc<CompiledSchema>> {
        if let Some(cached) = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&nested.type_id)
        {
            return Ok(Arc::clone(cached));
        }

        let schema = (nested.schema)();
        let fields = schema
            .fields
            .into_iter()
            .map(|field| {
                Ok(CompiledField {
                    rules: self.compile(field.rule_expr())?,
                    schema: Arc::new(field),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let compiled = Arc::new(CompiledSchema {
            name: schema.name,
            fields,
        });
        debug!(
            schema = compiled.name(),
            type_name = nested.type_name,
            fields = compiled.len(),
            "compiled validation schema"
        );

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        let compiled = Arc::clone(schemas.entry(nested.type_id).or_insert(compiled));
        Ok(compiled)
    }

    /// Run a rule set; returns the failing tag and param of the first rule that fails.
    fn evaluate(&self, rules: &RuleSet, fl: FieldLevel<'_>) -> Result<Option<(String, String)>> {
        for rule in rules.rules() {
            let alts = match rule {
                Rule::OmitEmpty if is_empty(fl.value) => return Ok(None),
                Rule::OmitEmpty => continue,
                Rule::Check(alts) => alts,
            };

            let mut passed = false;
            for alt in alts {
                let entry = self.lookup(&alt.tag)?;
                let level = FieldLevel {
                    param: &alt.param,
                    ..fl
                };
                if (entry.func)(&level) {
                    passed = true;
                    break;
                }
            }

            if !passed {
                return Ok(Some((rule.failing_tag(), rule.failing_param())));
            }
        }
        Ok(None)
    }

    /// Check a single value against a rule expression. The error carries an
    /// empty field name.
    pub fn check_value(&self, value: &Value, expr: &str) -> Result<Option<FieldError>> {
        let rules = self.compile(expr)?;
        let failure = self.evaluate(&rules, FieldLevel::new("", value, ""))?;
        trace!(expr, failed = failure.is_some(), "checked value");
        Ok(failure.map(|(tag, param)| FieldError::new("", tag, param, value.clone())))
    }

    /// Check a value against another using comparison tags such as `eqfield`.
    pub fn check_pair(
        &self,
        value: &Value,
        other: &Value,
        expr: &str,
    ) -> Result<Option<FieldError>> {
        let rules = self.compile(expr)?;
        let fl = FieldLevel::new("", value, "").with_other(other);
        let failure = self.evaluate(&rules, fl)?;
        trace!(expr, failed = failure.is_some(), "checked value pair");
        Ok(failure.map(|(tag, param)| FieldError::new("", tag, param, value.clone())))
    }

    /// Validate every field of `value` selected by `filter`, recursing into
    /// nested fields. At most one violation is reported per field, in schema order.
    pub fn validate_struct<T: Validate + 'static>(
        &self,
        value: &T,
        filter: FieldFilter<'_>,
    ) -> Result<Vec<StructViolation>> {
        let schema = self.schema_of::<T>()?;
        let Value::Object(map) = serde_json::to_value(value)? else {
            return Err(Error::NotAStruct {
                type_name: std::any::type_name::<T>(),
            });
        };

        let mut violations = Vec::new();
        self.walk(&schema, &map, "", filter, &mut violations)?;
        trace!(
            schema = schema.name(),
            violations = violations.len(),
            "validated struct"
        );
        Ok(violations)
    }

    fn walk(
        &self,
        schema: &CompiledSchema,
        map: &Map<String, Value>,
        prefix: &str,
        filter: FieldFilter<'_>,
        out: &mut Vec<StructViolation>,
    ) -> Result<()> {
        for field in &schema.fields {
            if field.schema.is_skipped() {
                continue;
            }

            let name = field.schema.name();
            let path = join_path(prefix, name);
            if !filter.descends(&path) {
                continue;
            }

            let value = map.get(name).unwrap_or(&Value::Null);
            if filter.includes(&path) {
                let fl = FieldLevel::new(name, value, "").with_parent(map);
                if let Some((tag, param)) = self.evaluate(&field.rules, fl)? {
                    out.push(StructViolation {
                        error: FieldError::new(name, tag, param, value.clone()).at(path),
                        field: Arc::clone(&field.schema),
                    });
                    continue;
                }
            }

            let Some(nested) = field.schema.nested_schema() else {
                continue;
            };
            let child = self.compiled(nested)?;
            match value {
                Value::Object(inner) => self.walk(&child, inner, &path, filter, out)?,
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Object(inner) = item {
                            let item_path = join_path(&path, &i.to_string());
                            self.walk(&child, inner, &item_path, filter, out)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Address {
        city: String,
        zip: String,
    }

    impl Validate for Address {
        fn schema() -> Schema {
            Schema::new("Address")
                .field(FieldSchema::new("city").rules("required"))
                .field(FieldSchema::new("zip").rules("len=5"))
        }
    }

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u32,
        password: String,
        confirm: String,
        address: Option<Address>,
        note: String,
    }

    impl Validate for User {
        fn schema() -> Schema {
            Schema::new("User")
                .field(FieldSchema::new("name").rules("required,min=3"))
                .field(FieldSchema::new("age").rules("gte=18"))
                .field(FieldSchema::new("password").rules("required"))
                .field(FieldSchema::new("confirm").rules("eqfield=password"))
                .field(FieldSchema::new("address").nested::<Address>())
                .field(FieldSchema::new("note").rules("required").skip())
        }
    }

    fn user() -> User {
        User {
            name: "Al".to_string(),
            age: 16,
            password: "secret".to_string(),
            confirm: "other".to_string(),
            address: Some(Address {
                city: String::new(),
                zip: "12345".to_string(),
            }),
            note: String::new(),
        }
    }

    fn paths(violations: &[StructViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.error.path.as_str()).collect()
    }

    #[test]
    fn walks_fields_in_order() {
        let engine = TagEngine::new();
        let violations = engine.validate_struct(&user(), FieldFilter::All).unwrap();
        assert_eq!(paths(&violations), vec!["name", "age", "confirm", "address.city"]);

        let name = &violations[0].error;
        assert_eq!(name.tag, "min");
        assert_eq!(name.param, "3");
        assert_eq!(violations[2].error.tag, "eqfield");
        assert_eq!(violations[3].error.field, "city");
    }

    #[test]
    fn except_and_only_filters() {
        let engine = TagEngine::new();

        let except = engine
            .validate_struct(&user(), FieldFilter::Except(&["name", "address"]))
            .unwrap();
        assert_eq!(paths(&except), vec!["age", "confirm"]);

        let only = engine
            .validate_struct(&user(), FieldFilter::Only(&["age", "address.city"]))
            .unwrap();
        assert_eq!(paths(&only), vec!["age", "address.city"]);
    }

    #[test]
    fn null_nested_is_skipped() {
        let engine = TagEngine::new();
        let mut value = user();
        value.address = None;
        let violations = engine.validate_struct(&value, FieldFilter::All).unwrap();
        assert_eq!(paths(&violations), vec!["name", "age", "confirm"]);
    }

    #[test]
    fn omitempty_short_circuits() {
        let engine = TagEngine::new();
        assert!(engine.check_value(&json!(""), "omitempty,email").unwrap().is_none());
        let err = engine.check_value(&json!("x"), "omitempty,email").unwrap().unwrap();
        assert_eq!(err.tag, "email");
        assert_eq!(err.field, "");
    }

    #[test]
    fn reports_first_failure_only() {
        let engine = TagEngine::new();
        let err = engine.check_value(&json!(""), "required,min=3").unwrap().unwrap();
        assert_eq!(err.tag, "required");
    }

    #[test]
    fn or_group_reports_joined_tag() {
        let engine = TagEngine::new();
        let err = engine.check_value(&json!("x"), "email|url").unwrap().unwrap();
        assert_eq!(err.tag, "email|url");
        assert_eq!(err.param, "");
        assert!(engine.check_value(&json!("https://a.io"), "email|url").unwrap().is_none());
    }

    #[test]
    fn compile_errors() {
        let engine = TagEngine::new();
        assert!(matches!(engine.compile("nope"), Err(Error::UnknownTag { .. })));
        assert!(matches!(engine.compile("min=abc"), Err(Error::InvalidParam { .. })));
        assert!(matches!(engine.compile("required=1"), Err(Error::InvalidParam { .. })));
        assert!(matches!(engine.compile("oneof"), Err(Error::InvalidParam { .. })));
    }

    #[test]
    fn compile_is_cached() {
        let engine = TagEngine::new();
        let a = engine.compile("required,max=5").unwrap();
        let b = engine.compile("required,max=5").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn registration_overrides_and_invalidates() {
        let engine = TagEngine::new();
        assert!(engine.check_value(&json!("abc"), "alpha").unwrap().is_none());

        engine.register("alpha", |fl| fl.as_string() == "only");
        assert!(engine.check_value(&json!("abc"), "alpha").unwrap().is_some());
        assert!(engine.check_value(&json!("only"), "alpha").unwrap().is_none());
    }

    #[test]
    fn custom_tag_receives_param() {
        let engine = TagEngine::new();
        engine.register("startswith", |fl| fl.as_string().starts_with(fl.param()));
        assert!(engine.check_value(&json!("vtag"), "startswith=vt").unwrap().is_none());
        assert!(engine.check_value(&json!("vtag"), "startswith=x").unwrap().is_some());
    }

    #[test]
    fn pair_comparison() {
        let engine = TagEngine::new();
        assert!(engine.check_pair(&json!(5), &json!(3), "gtfield").unwrap().is_none());
        let err = engine.check_pair(&json!(2), &json!(3), "gtfield").unwrap().unwrap();
        assert_eq!(err.tag, "gtfield");
    }

    #[test]
    fn non_struct_is_an_error() {
        #[derive(Serialize)]
        struct Wrapper(u32);

        impl Validate for Wrapper {
            fn schema() -> Schema {
                Schema::new("Wrapper")
            }
        }

        let engine = TagEngine::new();
        assert!(matches!(
            engine.validate_struct(&Wrapper(1), FieldFilter::All),
            Err(Error::NotAStruct { .. })
        ));
    }

    #[test]
    fn nested_arrays_are_indexed() {
        #[derive(Serialize)]
        struct Book {
            addresses: Vec<Address>,
        }

        impl Validate for Book {
            fn schema() -> Schema {
                Schema::new("Book").field(FieldSchema::new("addresses").nested::<Address>())
            }
        }

        let book = Book {
            addresses: vec![
                Address {
                    city: "Tehran".to_string(),
                    zip: "12345".to_string(),
                },
                Address {
                    city: "Shiraz".to_string(),
                    zip: "1".to_string(),
                },
            ],
        };

        let engine = TagEngine::new();
        let violations = engine.validate_struct(&book, FieldFilter::All).unwrap();
        assert_eq!(paths(&violations), vec!["addresses.1.zip"]);
    }

    #[test]
    fn filter_paths() {
        let only = FieldFilter::Only(&["address.city"]);
        assert!(!only.includes("address"));
        assert!(only.descends("address"));
        assert!(only.includes("address.city"));
        assert!(!only.descends("addressee"));

        let except = FieldFilter::Except(&["address"]);
        assert!(!except.includes("address.city"));
        assert!(except.includes("addresses"));
    }
}

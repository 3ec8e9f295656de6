//! Message templates per locale.
//!
//! Templates use `{name}` placeholders, filled in a single pass: substituted
//! text is never scanned again, and placeholders without a value stay as they
//! are. `{{` and `}}` produce literal braces.

use crate::error::{Error, Result};
use crate::schema::{language_of, normalize_locale};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Stores and renders message templates.
pub trait Translator: Send + Sync {
    /// Register or replace the template for `key` in `locale`.
    fn register(&self, locale: &str, key: &str, message: &str);

    /// Raw template for `key`, after locale fallback.
    fn lookup(&self, locale: &str, key: &str) -> Option<String>;

    /// Render `key` in `locale`. A missing template renders as the key itself.
    fn translate(&self, locale: &str, key: &str, placeholders: &[(&str, &str)]) -> String {
        match self.lookup(locale, key) {
            Some(template) => interpolate(&template, placeholders),
            None => {
                warn!(locale, key, "no translation found, using key");
                key.to_string()
            }
        }
    }

    /// Like [`translate`](Self::translate), but a template registered as
    /// `<struct_name>.<key>` takes precedence.
    fn translate_struct(
        &self,
        struct_name: &str,
        locale: &str,
        key: &str,
        placeholders: &[(&str, &str)],
    ) -> String {
        let scoped = format!("{struct_name}.{key}");
        match self.lookup(locale, &scoped) {
            Some(template) => interpolate(&template, placeholders),
            None => self.translate(locale, key, placeholders),
        }
    }
}

/// Fill `{name}` placeholders in `template`.
pub fn interpolate(template: &str, placeholders: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(['{', '}']) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        match tail.find('}') {
            Some(end) => {
                let name = &tail[1..end];
                match placeholders.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// In-memory [`Translator`].
///
/// Lookup tries the exact locale, then its language (`fa-IR` to `fa`), then
/// the fallback locale if one is set.
#[derive(Debug, Default)]
pub struct MemoryTranslator {
    messages: RwLock<HashMap<String, HashMap<String, String>>>,
    fallback_locale: Option<String>,
}

impl MemoryTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locale consulted when neither the requested locale nor its language
    /// has a template.
    pub fn with_fallback(mut self, locale: &str) -> Self {
        self.fallback_locale = Some(normalize_locale(locale));
        self
    }

    pub fn fallback_locale(&self) -> Option<&str> {
        self.fallback_locale.as_deref()
    }

    /// Load a flat JSON object of `key -> template` into `locale`.
    ///
    /// Nested objects are flattened with `.`, so `{"User": {"required": ".."}}`
    /// registers the struct-scoped key `User.required`. Returns the number of
    /// templates loaded.
    pub fn load_json(&self, locale: &str, json: &str) -> Result<usize> {
        let data: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).map_err(Error::Translations)?;

        let mut loaded = 0;
        let mut stack: Vec<(String, serde_json::Value)> = data.into_iter().collect();
        while let Some((key, value)) = stack.pop() {
            match value {
                serde_json::Value::String(message) => {
                    self.register(locale, &key, &message);
                    loaded += 1;
                }
                serde_json::Value::Object(children) => {
                    stack.extend(children.into_iter().map(|(k, v)| (format!("{key}.{k}"), v)));
                }
                _ => {}
            }
        }

        debug!(locale, loaded, "loaded translations");
        Ok(loaded)
    }

    /// Load every `<locale>.json` file in `dir`.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let json = std::fs::read_to_string(&path)?;
            loaded += self.load_json(locale, &json)?;
        }
        Ok(loaded)
    }

    fn get(&self, locale: &str, key: &str) -> Option<String> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locale)
            .and_then(|bundle| bundle.get(key))
            .cloned()
    }
}

impl Translator for MemoryTranslator {
    fn register(&self, locale: &str, key: &str, message: &str) {
        let locale = normalize_locale(locale);
        debug!(locale = locale.as_str(), key, "registered translation");
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(locale)
            .or_default()
            .insert(key.to_string(), message.to_string());
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        let locale = normalize_locale(locale);
        self.get(&locale, key)
            .or_else(|| self.get(language_of(&locale), key))
            .or_else(|| {
                self.fallback_locale
                    .as_deref()
                    .and_then(|fallback| self.get(fallback, key))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_known_placeholders() {
        let out = interpolate(
            "{field} must be at least {param} characters",
            &[("field", "Name"), ("param", "3")],
        );
        assert_eq!(out, "Name must be at least 3 characters");
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        assert_eq!(interpolate("{field} {other}", &[("field", "a")]), "a {other}");
        assert_eq!(interpolate("open {field", &[("field", "a")]), "open {field");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = interpolate("{field}", &[("field", "{param}"), ("param", "x")]);
        assert_eq!(out, "{param}");
    }

    #[test]
    fn escaped_braces() {
        assert_eq!(interpolate("{{field}} }", &[("field", "a")]), "{field} }");
    }

    #[test]
    fn locale_fallback_chain() {
        let t = MemoryTranslator::new().with_fallback("en");
        t.register("en", "required", "required");
        t.register("fa", "required", "الزامی");
        t.register("fa_IR", "min", "حداقل");

        assert_eq!(t.lookup("fa-IR", "min").as_deref(), Some("حداقل"));
        assert_eq!(t.lookup("fa-IR", "required").as_deref(), Some("الزامی"));
        assert_eq!(t.lookup("de", "required").as_deref(), Some("required"));
        assert_eq!(t.lookup("de", "max"), None);
    }

    #[test]
    fn missing_translation_renders_key() {
        let t = MemoryTranslator::new();
        assert_eq!(t.translate("en", "mobile", &[]), "mobile");
    }

    #[test]
    fn register_overwrites() {
        let t = MemoryTranslator::new();
        t.register("en", "tel", "first");
        t.register("en", "tel", "second");
        assert_eq!(t.translate("en", "tel", &[]), "second");
    }

    #[test]
    fn struct_scoped_template_wins() {
        let t = MemoryTranslator::new();
        t.register("en", "required", "{field} is required");
        t.register("en", "Signup.required", "Please fill in {field}");

        assert_eq!(
            t.translate_struct("Signup", "en", "required", &[("field", "Name")]),
            "Please fill in Name"
        );
        assert_eq!(
            t.translate_struct("Other", "en", "required", &[("field", "Name")]),
            "Name is required"
        );
    }

    #[test]
    fn load_json_flattens_objects() {
        let t = MemoryTranslator::new();
        let loaded = t
            .load_json(
                "en",
                r#"{"required": "{field} is required", "Signup": {"min": "too short"}}"#,
            )
            .unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(t.lookup("en", "Signup.min").as_deref(), Some("too short"));
    }

    #[test]
    fn load_json_rejects_invalid() {
        let t = MemoryTranslator::new();
        assert!(matches!(t.load_json("en", "[1, 2]"), Err(Error::Translations(_))));
    }

    #[test]
    fn load_dir_reads_locale_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"tel": "bad tel"}"#).unwrap();
        std::fs::write(dir.path().join("fa.json"), r#"{"tel": "تلفن نامعتبر"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let t = MemoryTranslator::new();
        assert_eq!(t.load_dir(dir.path()).unwrap(), 2);
        assert_eq!(t.translate("fa", "tel", &[]), "تلفن نامعتبر");
    }
}

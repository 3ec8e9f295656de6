//! The validation facade.
//!
//! [`Validator`] pairs a [`TagEngine`] with a [`Translator`] and turns engine
//! failures into localized messages.
//!
//! ```rust,ignore
//! use vtag::{Validate, Validator};
//!
//! #[derive(serde::Serialize, Validate)]
//! struct Signup {
//!     #[validate(rules = "required,min=3", title = "Name", title_fa = "نام")]
//!     name: String,
//! }
//!
//! let validator = Validator::new();
//! let errors = validator.validate_struct("en", &Signup { name: "Al".into() })?;
//! assert_eq!(
//!     errors.unwrap().get("name"),
//!     Some("Name must be at least 3")
//! );
//! ```

use crate::config::ValidatorConfig;
use crate::engine::{FieldFilter, FieldLevel, StructViolation, TagEngine};
use crate::error::{FieldError, Result};
use crate::format::format_numeric_param;
use crate::result::FieldMessages;
use crate::schema::Validate;
use crate::translator::{MemoryTranslator, Translator};
use crate::upload::{self, UploadError, UploadedFile};
use crate::validations::register_builtin_translations;
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// Validates values with registered tags and renders localized messages.
///
/// Registration takes `&self`, so a `Validator` can be shared behind an
/// `Arc` and extended while in use.
pub struct Validator {
    engine: TagEngine,
    translator: Arc<dyn Translator>,
    config: ValidatorConfig,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with the built-in tags and their English and Farsi messages.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Like [`new`](Self::new), with explicit configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        let mut translator = MemoryTranslator::new();
        if let Some(fallback) = &config.fallback_locale {
            translator = translator.with_fallback(fallback);
        }

        let validator = Self {
            engine: TagEngine::new(),
            translator: Arc::new(translator),
            config,
        };
        register_builtin_translations(&validator);
        validator
    }

    /// A validator rendering through `translator`. No messages are registered.
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self {
            engine: TagEngine::new(),
            translator,
            config: ValidatorConfig::default(),
        }
    }

    /// The underlying tag engine.
    pub fn engine(&self) -> &TagEngine {
        &self.engine
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Register a validation tag. An existing tag of the same name is replaced.
    pub fn add_validation<F>(&self, tag: &str, func: F)
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.engine.register(tag, func);
    }

    /// Register a message template. An existing template is replaced.
    pub fn add_translation(&self, locale: &str, key: &str, message: &str) {
        self.translator.register(locale, key, message);
    }

    pub fn translate(&self, locale: &str, key: &str, placeholders: &[(&str, &str)]) -> String {
        self.translator.translate(locale, key, placeholders)
    }

    /// Render `key`, preferring a template scoped to `T`'s schema name.
    pub fn translate_struct<T: Validate>(
        &self,
        locale: &str,
        key: &str,
        placeholders: &[(&str, &str)],
    ) -> String {
        self.translator
            .translate_struct(T::schema().name(), locale, key, placeholders)
    }

    /// Validate every field of `value`, recursing into nested fields.
    ///
    /// Returns `Ok(None)` when nothing fails. Messages are keyed by field
    /// name, or by dotted path for nested fields.
    pub fn validate_struct<T: Validate + 'static>(
        &self,
        locale: &str,
        value: &T,
    ) -> Result<Option<FieldMessages>> {
        self.struct_messages(locale, value, FieldFilter::All)
    }

    /// Like [`validate_struct`](Self::validate_struct), skipping `fields`.
    pub fn validate_struct_except<T: Validate + 'static>(
        &self,
        locale: &str,
        value: &T,
        fields: &[&str],
    ) -> Result<Option<FieldMessages>> {
        self.struct_messages(locale, value, FieldFilter::Except(fields))
    }

    /// Like [`validate_struct`](Self::validate_struct), checking only `fields`.
    pub fn validate_struct_partial<T: Validate + 'static>(
        &self,
        locale: &str,
        value: &T,
        fields: &[&str],
    ) -> Result<Option<FieldMessages>> {
        self.struct_messages(locale, value, FieldFilter::Only(fields))
    }

    /// [`validate_struct`](Self::validate_struct) in the configured default locale.
    pub fn validate<T: Validate + 'static>(&self, value: &T) -> Result<Option<FieldMessages>> {
        self.validate_struct(&self.config.default_locale, value)
    }

    fn struct_messages<T: Validate + 'static>(
        &self,
        locale: &str,
        value: &T,
        filter: FieldFilter<'_>,
    ) -> Result<Option<FieldMessages>> {
        let schema = self.engine.schema_of::<T>()?;
        let violations = self.engine.validate_struct(value, filter)?;
        trace!(
            locale,
            schema = schema.name(),
            failed = violations.len(),
            "rendering struct violations"
        );

        let messages = violations
            .iter()
            .map(|violation| {
                let message = self.render_violation(schema.name(), locale, violation);
                (violation.error.path.clone(), message)
            })
            .collect::<FieldMessages>();
        Ok(messages.into_option())
    }

    fn render_violation(
        &self,
        struct_name: &str,
        locale: &str,
        violation: &StructViolation,
    ) -> String {
        let StructViolation { error, field } = violation;
        let title = field.title_for(locale);
        let param = if field.is_formatted() {
            format_numeric_param(&error.param, locale)
        } else {
            error.param.clone()
        };

        self.translator.translate_struct(
            struct_name,
            locale,
            &error.tag,
            &[("field", title), ("param", param.as_str())],
        )
    }

    /// Validate a single value against a rule expression.
    ///
    /// Only the first failing rule is reported, keyed by the empty field name.
    /// When `overrides` has a message for the failing tag it is returned as is.
    pub fn var<V: Serialize + ?Sized>(
        &self,
        locale: &str,
        value: &V,
        tag: &str,
        overrides: &[(&str, &str)],
    ) -> Result<Option<FieldMessages>> {
        let value = serde_json::to_value(value)?;
        let failure = self.engine.check_value(&value, tag)?;
        Ok(failure.map(|error| self.render_var(locale, &error, overrides)))
    }

    /// Like [`var`](Self::var), comparing `value` against `other` with tags
    /// such as `eqfield` or `gtfield`.
    pub fn var_with_value<V, O>(
        &self,
        locale: &str,
        value: &V,
        other: &O,
        tag: &str,
        overrides: &[(&str, &str)],
    ) -> Result<Option<FieldMessages>>
    where
        V: Serialize + ?Sized,
        O: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        let other = serde_json::to_value(other)?;
        let failure = self.engine.check_pair(&value, &other, tag)?;
        Ok(failure.map(|error| self.render_var(locale, &error, overrides)))
    }

    fn render_var(
        &self,
        locale: &str,
        error: &FieldError,
        overrides: &[(&str, &str)],
    ) -> FieldMessages {
        let message = match overrides.iter().find(|(tag, _)| *tag == error.tag) {
            Some((_, message)) => message.to_string(),
            None => self.translator.translate(
                locale,
                &error.tag,
                &[("field", error.field.as_str()), ("param", error.param.as_str())],
            ),
        };
        FieldMessages::single(error.field.clone(), message)
    }

    /// A single-entry result for a failure detected outside the engine.
    pub fn failure(&self, field: &str, message: &str) -> FieldMessages {
        FieldMessages::single(field, message)
    }

    /// [`upload::validate_upload_mime`] with the configured sniff window.
    pub fn upload_mime<F>(&self, file: &F, mimes: &[&str]) -> std::result::Result<bool, UploadError>
    where
        F: UploadedFile + ?Sized,
    {
        upload::validate_upload_mime_with_limit(file, mimes, self.config.sniff_limit)
    }

    /// [`upload::validate_upload_ext`] with the configured sniff window.
    pub fn upload_ext<F>(&self, file: &F, exts: &[&str]) -> std::result::Result<bool, UploadError>
    where
        F: UploadedFile + ?Sized,
    {
        upload::validate_upload_ext_with_limit(file, exts, self.config.sniff_limit)
    }
}

//! # vtag
//!
//! Tag-driven struct validation with localized error messages.
//!
//! Rules are written as tag expressions (`required,min=3`, `omitempty,tel|mobile`)
//! on struct fields, checked by a [`TagEngine`], and rendered into per-field
//! messages by a [`Translator`]. The crate also ships domain predicates
//! (Iranian phone numbers, national codes, Jalali dates, and more) and
//! content-sniffing checks for uploaded files.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vtag::prelude::*;
//!
//! #[derive(serde::Serialize, Validate)]
//! struct Signup {
//!     #[validate(rules = "required,username", title = "Username", title_fa = "نام کاربری")]
//!     username: String,
//!
//!     #[validate(rules = "required,mobile")]
//!     mobile: String,
//!
//!     #[validate(rules = "lte=1000000", format)]
//!     budget: u64,
//! }
//!
//! let validator = Validator::new();
//! register_extra_validations(&validator);
//!
//! match validator.validate_struct("fa", &signup)? {
//!     None => println!("ok"),
//!     Some(errors) => println!("{}", serde_json::to_string(&errors)?),
//! }
//! ```
//!
//! ## Results
//!
//! Struct and value validation return `Result<Option<FieldMessages>>`:
//! `Ok(None)` when everything passes, `Ok(Some(messages))` keyed by field
//! name (dotted path for nested fields), and `Err` only when a rule cannot be
//! evaluated at all, such as an unknown tag.

extern crate self as vtag;

pub mod config;
mod driver;
pub mod engine;
mod error;
pub mod format;
pub mod jalali;
pub mod predicates;
mod result;
mod schema;
mod sniff;
pub mod translator;
pub mod upload;
pub mod validations;

pub use config::{ConfigError, ValidatorConfig};
pub use driver::Validator;
pub use engine::{FieldFilter, FieldLevel, TagEngine};
pub use error::{Error, FieldError, Result};
pub use result::FieldMessages;
pub use schema::{FieldSchema, Nested, Schema, Validate};
pub use sniff::{detect, Detected};
pub use translator::{MemoryTranslator, Translator};
pub use upload::{UploadError, UploadedFile};

/// Derive [`Validate`] from `#[validate(...)]` field attributes.
pub use vtag_macros::Validate;

/// Prelude module for validation
pub mod prelude {
    pub use crate::error::{Error, FieldError};
    pub use crate::result::FieldMessages;
    pub use crate::schema::{FieldSchema, Schema, Validate};
    pub use crate::translator::Translator;
    pub use crate::validations::register_extra_validations;
    pub use crate::Validator;
    pub use vtag_macros::Validate;
}

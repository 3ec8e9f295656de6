//! Ready-made tags for the domain predicates, with English and Farsi messages.
//!
//! ```rust,ignore
//! let validator = vtag::Validator::new();
//! vtag::validations::register_extra_validations(&validator);
//!
//! let errors = validator.var("fa", "0912", "mobile", &[])?;
//! ```

use crate::driver::Validator;
use crate::engine::FieldLevel;
use crate::predicates;

fn register(validator: &Validator, tag: &str, predicate: fn(&str) -> bool, en: &str, fa: &str) {
    validator.add_validation(tag, move |fl: &FieldLevel<'_>| predicate(&fl.as_string()));
    validator.add_translation("en", tag, en);
    validator.add_translation("fa", tag, fa);
}

/// Register the `creditcard` tag: 16 or 20 digits, optionally in dash-separated groups of four.
pub fn register_credit_card_validation(validator: &Validator) {
    register(
        validator,
        "creditcard",
        predicates::is_credit_card_number,
        "Must be a valid credit card number",
        "شماره کارت وارد شده معتبر نیست",
    );
}

/// Register the `identifier` tag: an integer greater than zero.
pub fn register_identifier_validation(validator: &Validator) {
    register(
        validator,
        "identifier",
        predicates::is_identifier,
        "Must be a valid (numeric) identifier",
        "شناسه وارد شده معتبر نیست",
    );
}

/// Register the `idnumber` tag: one to ten digits.
pub fn register_id_number_validation(validator: &Validator) {
    register(
        validator,
        "idnumber",
        predicates::is_id_number,
        "Must be a valid id number",
        "شماره شناسنامه وارد شده معتبر نیست",
    );
}

/// Register the `ipport` tag: a dotted IPv4 address followed by `:port`.
pub fn register_ip_port_validation(validator: &Validator) {
    register(
        validator,
        "ipport",
        predicates::is_ip_port,
        "Must be a valid ip:port address",
        "آدرس آی‌پی و پورت وارد شده معتبر نیست",
    );
}

/// Register the `jalali` tag, backed by [`predicates::is_jalali_date`].
pub fn register_jalali_validation(validator: &Validator) {
    register(
        validator,
        "jalali",
        predicates::is_jalali_date,
        "Must be a valid jalali date",
        "تاریخ وارد شده معتبر نیست",
    );
}

/// Register the `mobile` tag: `09xxxxxxxxx` or `(09xx) xxx-xxxx`.
pub fn register_mobile_validation(validator: &Validator) {
    register(
        validator,
        "mobile",
        predicates::is_mobile,
        "Must be a valid mobile",
        "شماره موبایل وارد شده معتبر نیست",
    );
}

/// Register the `nationalcode` tag: ten digits, or `xxx-xxxxxx-x`.
pub fn register_national_code_validation(validator: &Validator) {
    register(
        validator,
        "nationalcode",
        predicates::is_national_code,
        "Must be a valid national code",
        "کدملی وارد شده معتبر نیست",
    );
}

/// Register the `postalcode` tag: ten digits, or two groups of five joined by `-`.
pub fn register_postal_code_validation(validator: &Validator) {
    register(
        validator,
        "postalcode",
        predicates::is_postal_code,
        "Must be a valid postal code",
        "کد پستی وارد شده معتبر نیست",
    );
}

/// Register the `tel` tag: `0xxxxxxxxxx` or `(0xx) xxxx-xxxx`.
pub fn register_tel_validation(validator: &Validator) {
    register(
        validator,
        "tel",
        predicates::is_tel,
        "Must be a valid tel",
        "شماره تلفن وارد شده معتبر نیست",
    );
}

/// Register the `unsigned` tag: an integer greater than or equal to zero.
pub fn register_unsigned_validation(validator: &Validator) {
    register(
        validator,
        "unsigned",
        predicates::is_unsigned,
        "Must be a unsigned number",
        "باید یک عدد صحیح مثبت باشد",
    );
}

/// Register the `username` tag: letters, digits, `_`, `.` and `-`.
pub fn register_username_validation(validator: &Validator) {
    register(
        validator,
        "username",
        predicates::is_username,
        "Must be a valid username",
        "نام کاربری وارد شده معتبر نیست",
    );
}

/// Register the `uuid` tag: a version 4 UUID in canonical form.
pub fn register_uuid_validation(validator: &Validator) {
    register(
        validator,
        "uuid",
        predicates::is_uuid,
        "Must be a valid uuid",
        "شناسه یکتا وارد شده معتبر نیست",
    );
}

/// Register every domain tag.
pub fn register_extra_validations(validator: &Validator) {
    register_credit_card_validation(validator);
    register_identifier_validation(validator);
    register_id_number_validation(validator);
    register_ip_port_validation(validator);
    register_jalali_validation(validator);
    register_mobile_validation(validator);
    register_national_code_validation(validator);
    register_postal_code_validation(validator);
    register_tel_validation(validator);
    register_unsigned_validation(validator);
    register_username_validation(validator);
    register_uuid_validation(validator);
}

const BUILTIN_MESSAGES: &[(&str, &str, &str)] = &[
    ("required", "{field} is required", "{field} الزامی است"),
    ("min", "{field} must be at least {param}", "{field} باید حداقل {param} باشد"),
    ("max", "{field} must be at most {param}", "{field} باید حداکثر {param} باشد"),
    ("len", "{field} must be exactly {param} long", "طول {field} باید {param} باشد"),
    ("gt", "{field} must be greater than {param}", "{field} باید بیشتر از {param} باشد"),
    ("gte", "{field} must be at least {param}", "{field} باید حداقل {param} باشد"),
    ("lt", "{field} must be less than {param}", "{field} باید کمتر از {param} باشد"),
    ("lte", "{field} must be at most {param}", "{field} باید حداکثر {param} باشد"),
    ("eq", "{field} must be {param}", "{field} باید برابر {param} باشد"),
    ("ne", "{field} must not be {param}", "{field} نباید برابر {param} باشد"),
    ("oneof", "{field} must be one of [{param}]", "{field} باید یکی از [{param}] باشد"),
    ("email", "{field} must be a valid email address", "{field} باید یک ایمیل معتبر باشد"),
    ("url", "{field} must be a valid URL", "{field} باید یک آدرس اینترنتی معتبر باشد"),
    ("alpha", "{field} may only contain letters", "{field} فقط می‌تواند شامل حروف باشد"),
    (
        "alphanum",
        "{field} may only contain letters and digits",
        "{field} فقط می‌تواند شامل حروف و اعداد باشد",
    ),
    ("numeric", "{field} must be numeric", "{field} باید عددی باشد"),
    ("eqfield", "{field} must match {param}", "{field} باید با {param} یکسان باشد"),
    ("nefield", "{field} must differ from {param}", "{field} باید با {param} متفاوت باشد"),
    ("gtfield", "{field} must be greater than {param}", "{field} باید بیشتر از {param} باشد"),
    ("gtefield", "{field} must be at least {param}", "{field} باید حداقل برابر {param} باشد"),
    ("ltfield", "{field} must be less than {param}", "{field} باید کمتر از {param} باشد"),
    ("ltefield", "{field} must be at most {param}", "{field} باید حداکثر برابر {param} باشد"),
];

/// Register English and Farsi messages for the built-in tags.
pub fn register_builtin_translations(validator: &Validator) {
    for (tag, en, fa) in BUILTIN_MESSAGES {
        validator.add_translation("en", tag, en);
        validator.add_translation("fa", tag, fa);
    }
}

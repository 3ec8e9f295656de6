//! Validate a signup form in English and Farsi.
//!
//! ```sh
//! RUST_LOG=vtag=debug cargo run -p vtag --example signup
//! ```

use serde::Serialize;
use vtag::config::{load_dotenv, ValidatorConfig};
use vtag::prelude::*;

#[derive(Serialize, Validate)]
struct Address {
    #[validate(rules = "required", title = "City", title_fa = "شهر")]
    city: String,

    #[validate(rules = "omitempty,postalcode", title = "Postal code", title_fa = "کد پستی")]
    postal_code: String,
}

#[derive(Serialize, Validate)]
struct Signup {
    #[validate(rules = "required,username", title = "Username", title_fa = "نام کاربری")]
    username: String,

    #[validate(rules = "required,mobile", title = "Mobile", title_fa = "موبایل")]
    mobile: String,

    #[validate(rules = "required,nationalcode", title = "National code", title_fa = "کد ملی")]
    national_code: String,

    #[validate(rules = "omitempty,jalali", title = "Birth date", title_fa = "تاریخ تولد")]
    birth_date: String,

    #[validate(rules = "lte=50000000", format, title = "Budget", title_fa = "بودجه")]
    budget: u64,

    #[validate(nested)]
    address: Address,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signup=info".parse()?)
                .add_directive("warn".parse()?),
        )
        .init();

    load_dotenv();
    let validator = Validator::with_config(ValidatorConfig::from_env()?);
    register_extra_validations(&validator);

    let form = Signup {
        username: "ali reza".to_string(),
        mobile: "0912123".to_string(),
        national_code: "0012345678".to_string(),
        birth_date: "1370/13/01".to_string(),
        budget: 120_000_000,
        address: Address {
            city: String::new(),
            postal_code: "12345-67890".to_string(),
        },
    };

    for locale in ["en", "fa"] {
        match validator.validate_struct(locale, &form)? {
            None => tracing::info!(locale, "signup is valid"),
            Some(errors) => {
                tracing::info!(locale, failed = errors.len(), "signup rejected");
                println!("{}", serde_json::to_string_pretty(&errors)?);
            }
        }
    }

    let mismatch = [("eqfield", "Passwords do not match")];
    let confirmation = validator.var_with_value("en", "secret", "s3cret", "eqfield", &mismatch)?;
    if let Some(errors) = confirmation {
        println!("{}", serde_json::to_string(&errors)?);
    }

    Ok(())
}

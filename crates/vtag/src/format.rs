//! Locale-aware formatting of numeric rule parameters.
//!
//! Used for fields marked with `format`, so a rule like `max=1000000` renders
//! as `1,000,000` in English and `1.000.000` in German.

/// Decimal and grouping separators for a locale tag such as `en`, `de-DE` or `fa_IR`.
pub fn number_separators(locale: &str) -> (&'static str, &'static str) {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match language.as_str() {
        // Comma decimal, period grouping
        "de" | "es" | "it" | "pt" | "nl" | "da" | "sv" | "no" | "fi" | "pl" | "cs" | "sk"
        | "hu" | "ro" | "bg" | "el" | "ru" | "uk" | "tr" | "id" | "vi" => (",", "."),

        // Comma decimal, space grouping
        "fr" => (",", " "),

        // Arabic decimal and thousands separators
        "fa" | "ar" => ("٫", "٬"),

        _ => (".", ","),
    }
}

/// Group the digits of an integer string by thousands.
fn add_grouping(digits: &str, sep: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }

    let mut result = String::with_capacity(len + (len - 1) / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push_str(sep);
        }
        result.push(c);
    }
    result
}

/// Reformat a numeric parameter with the locale's separators.
///
/// Params that are not plain decimal numbers (`"abc"`, `"1e5"`, durations)
/// are returned unchanged.
pub fn format_numeric_param(param: &str, locale: &str) -> String {
    let trimmed = param.trim();
    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer) || fraction.is_some_and(|f| !is_digits(f)) {
        return param.to_string();
    }

    let (decimal_sep, group_sep) = number_separators(locale);
    let grouped = add_grouping(integer, group_sep);

    match fraction {
        Some(frac) => format!("{sign}{grouped}{decimal_sep}{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

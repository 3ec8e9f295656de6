//! Domain string predicates.
//!
//! Each predicate is a pure `&str -> bool` check. They are registered as tags
//! by [`crate::validations`] but can be called directly as well.

use crate::jalali;
use regex::Regex;
use std::sync::OnceLock;

// Pre-compiled regex patterns
static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
static TEL_REGEX: OnceLock<Regex> = OnceLock::new();
static MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();
static POSTAL_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
static ID_NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
static NATIONAL_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
static CREDIT_CARD_REGEX: OnceLock<Regex> = OnceLock::new();
static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
static IP_REGEX: OnceLock<Regex> = OnceLock::new();
static IP_PORT_REGEX: OnceLock<Regex> = OnceLock::new();

const OCTET: &str = r"(?:[0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])";

fn username_regex() -> &'static Regex {
    USERNAME_REGEX.get_or_init(|| Regex::new(r"^[0-9A-Za-z_.\-]+$").unwrap())
}

fn tel_regex() -> &'static Regex {
    TEL_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\(0[0-9]{2}\) [0-9]{4}-[0-9]{4}|0[0-9]{10})$").unwrap()
    })
}

fn mobile_regex() -> &'static Regex {
    MOBILE_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\(09[0-9]{2}\) [0-9]{3}-[0-9]{4}|09[0-9]{9})$").unwrap()
    })
}

fn postal_code_regex() -> &'static Regex {
    POSTAL_CODE_REGEX.get_or_init(|| Regex::new(r"^(?:[0-9]{5}-[0-9]{5}|[0-9]{10})$").unwrap())
}

fn id_number_regex() -> &'static Regex {
    ID_NUMBER_REGEX.get_or_init(|| Regex::new(r"^[0-9]{1,10}$").unwrap())
}

fn national_code_regex() -> &'static Regex {
    NATIONAL_CODE_REGEX
        .get_or_init(|| Regex::new(r"^(?:[0-9]{3}-[0-9]{6}-[0-9]|[0-9]{10})$").unwrap())
}

fn credit_card_regex() -> &'static Regex {
    CREDIT_CARD_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{4}|[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{4}|[0-9]{20}|[0-9]{16})$")
            .unwrap()
    })
}

fn uuid_regex() -> &'static Regex {
    UUID_REGEX.get_or_init(|| {
        Regex::new(r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-4[a-fA-F0-9]{3}-[89abAB][a-fA-F0-9]{3}-[a-fA-F0-9]{12}$")
            .unwrap()
    })
}

fn ip_regex() -> &'static Regex {
    IP_REGEX.get_or_init(|| Regex::new(&format!(r"^(?:{OCTET}\.){{3}}{OCTET}$")).unwrap())
}

fn ip_port_regex() -> &'static Regex {
    IP_PORT_REGEX
        .get_or_init(|| Regex::new(&format!(r"^(?:{OCTET}\.){{3}}{OCTET}:[0-9]+$")).unwrap())
}

/// Letters, digits, `_`, `.` and `-`, at least one character.
pub fn is_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// Landline number: `(0NN) NNNN-NNNN` or `0` followed by 10 digits.
pub fn is_tel(tel: &str) -> bool {
    tel_regex().is_match(tel)
}

/// Mobile number: `(09NN) NNN-NNNN` or `09` followed by 9 digits.
pub fn is_mobile(mobile: &str) -> bool {
    mobile_regex().is_match(mobile)
}

/// Postal code: `NNNNN-NNNNN` or 10 digits.
pub fn is_postal_code(postal_code: &str) -> bool {
    postal_code_regex().is_match(postal_code)
}

/// Integer strictly greater than zero.
pub fn is_identifier(id: &str) -> bool {
    id.parse::<i64>().map(|n| n > 0).unwrap_or(false)
}

/// Integer greater than or equal to zero.
pub fn is_unsigned(num: &str) -> bool {
    num.parse::<i64>().map(|n| n >= 0).unwrap_or(false)
}

/// One to ten digits.
pub fn is_id_number(id_number: &str) -> bool {
    id_number_regex().is_match(id_number)
}

/// National code: `NNN-NNNNNN-N` or 10 digits.
pub fn is_national_code(code: &str) -> bool {
    national_code_regex().is_match(code)
}

/// Card number in 5x4 or 4x4 dash groups, or 20 or 16 plain digits.
pub fn is_credit_card_number(number: &str) -> bool {
    credit_card_regex().is_match(number)
}

/// Version 4 UUID in canonical 8-4-4-4-12 form.
pub fn is_uuid(uuid: &str) -> bool {
    uuid_regex().is_match(uuid)
}

/// Date in the Jalali (Solar Hijri) calendar, see [`jalali::parse`].
pub fn is_jalali_date(date: &str) -> bool {
    jalali::parse(date).is_ok()
}

/// Dotted-quad IPv4 address.
pub fn is_ip(address: &str) -> bool {
    ip_regex().is_match(address)
}

/// Dotted-quad IPv4 address followed by `:port`.
pub fn is_ip_port(address: &str) -> bool {
    ip_port_regex().is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn username() {
        assert!(is_username("john.doe-99"));
        assert!(is_username("_"));
        assert!(!is_username("john doe"));
        assert!(!is_username(""));
        assert!(!is_username("ali@home"));
    }

    #[test]
    fn tel() {
        assert!(is_tel("(021) 1234-5678"));
        assert!(is_tel("02112345678"));
        assert!(!is_tel("2112345678"));
        // a valid prefix followed by junk no longer matches
        assert!(!is_tel("(021) 1234-5678 ext 9"));
        assert!(!is_tel("x02112345678"));
    }

    #[test]
    fn mobile() {
        assert!(is_mobile("(0912) 345-6789"));
        assert!(is_mobile("09123456789"));
        assert!(!is_mobile("0912345678"));
        assert!(!is_mobile("08123456789"));
    }

    #[test]
    fn postal_code() {
        assert!(is_postal_code("12345-67890"));
        assert!(is_postal_code("1234567890"));
        assert!(!is_postal_code("1234-567890"));
        assert!(!is_postal_code("123456789"));
    }

    #[test]
    fn identifier() {
        assert!(is_identifier("42"));
        assert!(!is_identifier("0"));
        assert!(!is_identifier("-3"));
        assert!(!is_identifier("abc"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn unsigned() {
        assert!(is_unsigned("0"));
        assert!(is_unsigned("7"));
        assert!(!is_unsigned("-1"));
        assert!(!is_unsigned(""));
        assert!(!is_unsigned("1.5"));
    }

    #[test]
    fn id_number() {
        assert!(is_id_number("1"));
        assert!(is_id_number("1234567890"));
        assert!(!is_id_number("12345678901"));
        assert!(!is_id_number(""));
    }

    #[test]
    fn national_code() {
        assert!(is_national_code("123-456789-0"));
        assert!(is_national_code("1234567890"));
        assert!(!is_national_code("12-3456789-0"));
    }

    #[test]
    fn credit_card_number() {
        assert!(is_credit_card_number("1234-5678-9012-3456"));
        assert!(is_credit_card_number("1234-5678-9012-3456-7890"));
        assert!(is_credit_card_number("1234567890123456"));
        assert!(is_credit_card_number("12345678901234567890"));
        assert!(!is_credit_card_number("123456789012345"));
        assert!(!is_credit_card_number("1234 5678 9012 3456"));
    }

    #[test]
    fn uuid_v4_only() {
        assert!(is_uuid("123e4567-e89b-42d3-a456-426614174000"));
        assert!(is_uuid("123E4567-E89B-42D3-B456-426614174000"));
        // version 1
        assert!(!is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        // variant nibble outside 8..b
        assert!(!is_uuid("123e4567-e89b-42d3-c456-426614174000"));
        assert!(!is_uuid("123e4567-e89b-42d3-|456-426614174000"));
    }

    #[test]
    fn jalali_date() {
        assert!(is_jalali_date("1402-12-29"));
        assert!(is_jalali_date("1403/01/01 10:30"));
        assert!(!is_jalali_date("1402-13-01"));
        assert!(!is_jalali_date("not a date"));
    }

    #[test]
    fn ip_accepts_ascii_dotted_quads() {
        // The plain IPv4 check uses ASCII digit ranges, matching ip:port.
        assert!(is_ip("192.168.1.1"));
        assert!(is_ip("0.0.0.0"));
        assert!(is_ip("255.255.255.255"));
        assert!(!is_ip("256.1.1.1"));
        assert!(!is_ip("01.1.1.1"));
        assert!(!is_ip("1.1.1"));
    }

    #[test]
    fn ip_port() {
        assert!(is_ip_port("127.0.0.1:8080"));
        assert!(!is_ip_port("127.0.0.1"));
        assert!(!is_ip_port("127.0.0.1:"));
        assert!(!is_ip_port("300.0.0.1:80"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_username_grammar_accepted(name in "[0-9A-Za-z_.-]{1,40}") {
            prop_assert!(is_username(&name));
        }

        #[test]
        fn prop_username_foreign_char_rejected(
            prefix in "[0-9A-Za-z_.-]{0,10}",
            bad in "[ @#/\\\\!?*]",
            suffix in "[0-9A-Za-z_.-]{0,10}",
        ) {
            let name = format!("{prefix}{bad}{suffix}");
            prop_assert!(!is_username(&name));
        }

        #[test]
        fn prop_identifier_matches_sign(n in any::<i64>()) {
            prop_assert_eq!(is_identifier(&n.to_string()), n > 0);
            prop_assert_eq!(is_unsigned(&n.to_string()), n >= 0);
        }

        #[test]
        fn prop_ip_octets(
            a in 0u8..=255,
            b in 0u8..=255,
            c in 0u8..=255,
            d in 0u8..=255,
            port in any::<u16>(),
        ) {
            let ip = format!("{a}.{b}.{c}.{d}");
            let ip_port = format!("{a}.{b}.{c}.{d}:{port}");
            prop_assert!(is_ip(&ip));
            prop_assert!(is_ip_port(&ip_port));
        }
    }
}

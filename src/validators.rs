use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::currency::Currency;

pub const MAX_AMOUNT: f64 = 1_000_000.0;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const REQUIRED_PASSWORD_STRENGTH: u8 = 75;

lazy_static! {
    // shape check only, not RFC 5322
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn amount(value: f64) -> bool {
    amount_within(value, MAX_AMOUNT)
}

pub fn amount_within(value: f64, ceiling: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= ceiling
}

pub fn currency(code: &str) -> bool {
    code.parse::<Currency>().is_ok()
}

pub fn email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn payment_link(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.scheme() == "https",
        Err(_) => false,
    }
}

pub fn username(value: &str) -> bool {
    (3..=20).contains(&value.chars().count())
}

/// Scores a password 0..=100 in steps of 25: length >= 8, a lowercase
/// letter, an uppercase letter, a digit.
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
    ];
    checks.iter().filter(|ok| **ok).count() as u8 * 25
}

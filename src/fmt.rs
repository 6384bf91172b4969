use chrono::DateTime;
use rust_decimal::Decimal;

/// Currencies Stripe bills without a fractional minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

pub fn currency_exponent(currency: &str) -> u32 {
    let lower = currency.to_ascii_lowercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&lower.as_str()) {
        0
    } else {
        2
    }
}

/// Convert an amount in minor units to major units without rounding.
pub fn to_major(minor: i64, currency: &str) -> Decimal {
    Decimal::new(minor, currency_exponent(currency))
}

/// Format a minor-unit amount with thousands separators: 1,234.56 EUR
pub fn money(minor: i64, currency: &str) -> String {
    let value = to_major(minor, currency);
    let negative = value.is_sign_negative() && !value.is_zero();
    let text = value.abs().to_string();
    let (int_part, dec_part) = match text.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (text.as_str(), None),
    };

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    let code = currency.to_uppercase();
    match dec_part {
        Some(dec) => format!("{sign}{with_commas}.{dec} {code}"),
        None => format!("{sign}{with_commas} {code}"),
    }
}

pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn format_date(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| secs.to_string())
}

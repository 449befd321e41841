use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// How a discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage of the total (e.g., 10 = 10% off)
    Percent,

    /// Fixed euro amount subtracted from the total
    Fixed,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountKind::Percent => write!(f, "percent"),
            DiscountKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// A configured discount code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCode {
    /// Upper-cased code
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl DiscountCode {
    /// Whether the value is usable for its kind
    ///
    /// Percent must lie in (0, 100], fixed must be positive.
    pub fn is_in_range(&self) -> bool {
        match self.kind {
            DiscountKind::Percent => self.value > Decimal::ZERO && self.value <= Decimal::ONE_HUNDRED,
            DiscountKind::Fixed => self.value > Decimal::ZERO,
        }
    }
}

/// Suffix marking a fixed euro amount
const FIXED_MARKER: &str = "e";

fn value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(e?)$").expect("discount value pattern is valid")
    })
}

/// Parse a `CODE:VALUE,CODE:VALUE` list
///
/// `VALUE` is a bare number for a percentage or a number followed by `e` for
/// a fixed euro amount. Malformed or out-of-range entries are skipped.
pub fn parse_discount_codes(raw: &str) -> Vec<DiscountCode> {
    raw.split(',')
        .filter_map(|entry| parse_entry(entry.trim()))
        .collect()
}

fn parse_entry(entry: &str) -> Option<DiscountCode> {
    let (code, value) = entry.split_once(':')?;
    let code = code.trim();
    let value = value.trim();
    if code.is_empty() {
        return None;
    }

    let captures = value_pattern().captures(value)?;
    let number = Decimal::from_str(captures.get(1)?.as_str()).ok()?;
    let kind = if captures.get(2).map_or(false, |m| m.as_str() == FIXED_MARKER) {
        DiscountKind::Fixed
    } else {
        DiscountKind::Percent
    };

    let parsed = DiscountCode {
        code: code.to_uppercase(),
        kind,
        value: number,
    };
    if parsed.is_in_range() {
        Some(parsed)
    } else {
        tracing::warn!("Ignoring discount code '{}' with out-of-range value", parsed.code);
        None
    }
}

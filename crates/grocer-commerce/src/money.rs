//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's smallest unit. The storefront's
//! default currencies (XOF, XAF) have no minor unit, so an amount of `50_000`
//! is fifty thousand francs.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// West African CFA franc.
    #[default]
    XOF,
    /// Central African CFA franc.
    XAF,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "XOF").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::XOF => "XOF",
            Currency::XAF => "XAF",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::XOF | Currency::XAF => "FCFA",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Whether the symbol follows the amount ("12 500 FCFA") rather than
    /// preceding it ("$49.99").
    pub fn symbol_after(&self) -> bool {
        matches!(self, Currency::XOF | Currency::XAF)
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::XOF | Currency::XAF | Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "XOF" => Some(Currency::XOF),
            "XAF" => Some(Currency::XAF),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Try to add another Money value, returning None on currency mismatch
    /// or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values, returning None on mismatch or overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Format the amount with grouped thousands, without a symbol
    /// (e.g. "12 500" or "1 049.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let divisor = 10_i64.pow(places);
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let whole = group_thousands(abs / divisor as u64);
        if places == 0 {
            format!("{}{}", sign, whole)
        } else {
            let frac = abs % divisor as u64;
            format!("{}{}.{:0width$}", sign, whole, frac, width = places as usize)
        }
    }

    /// Format as a display string (e.g. "12 500 FCFA" or "$49.99").
    pub fn display(&self) -> String {
        if self.currency.symbol_after() {
            format!("{} {}", self.display_amount(), self.currency.symbol())
        } else {
            format!("{}{}", self.currency.symbol(), self.display_amount())
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        groups.push(value % 1000);
        value /= 1000;
        if value == 0 {
            break;
        }
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push_str(&format!(" {:03}", g));
    }
    out
}

/// Deserialize a backend amount that may arrive as an integer or a float.
///
/// Prices are stored as numeric columns and some endpoints return `12500.0`.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Int(v) => Ok(v),
        Amount::Float(v) => Ok(v.round() as i64),
        Amount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(|v| v.round() as i64)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display_zero_decimal() {
        let m = Money::new(1_250_000, Currency::XOF);
        assert_eq!(m.display(), "1 250 000 FCFA");
        assert_eq!(Money::new(0, Currency::XOF).display(), "0 FCFA");
        assert_eq!(Money::new(999, Currency::XOF).display_amount(), "999");
    }

    #[test]
    fn test_money_display_with_decimals() {
        let m = Money::new(104_999, Currency::USD);
        assert_eq!(m.display(), "$1 049.99");
        assert_eq!(Money::new(-505, Currency::USD).display_amount(), "-5.05");
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let a = Money::new(1000, Currency::XOF);
        let b = Money::new(500, Currency::XOF);
        assert_eq!(a.try_add(&b).unwrap().amount, 1500);
        assert_eq!(a.try_subtract(&b).unwrap().amount, 500);
        assert_eq!(a.try_multiply(3).unwrap().amount, 3000);
        assert!(Money::new(i64::MAX, Currency::XOF).try_add(&b).is_none());
    }

    #[test]
    fn test_money_currency_mismatch() {
        let xof = Money::new(1000, Currency::XOF);
        let eur = Money::new(1000, Currency::EUR);
        assert!(xof.try_add(&eur).is_none());
    }

    #[test]
    fn test_try_sum() {
        let items = [Money::new(100, Currency::XOF), Money::new(250, Currency::XOF)];
        assert_eq!(Money::try_sum(items.iter(), Currency::XOF).unwrap().amount, 350);
    }

    #[test]
    fn test_deserialize_amount_variants() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "deserialize_amount")]
            price: i64,
        }
        let a: Row = serde_json::from_str(r#"{"price": 12500}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"price": 12500.0}"#).unwrap();
        let c: Row = serde_json::from_str(r#"{"price": "12500.00"}"#).unwrap();
        assert_eq!((a.price, b.price, c.price), (12500, 12500, 12500));
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("xof"), Some(Currency::XOF));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}

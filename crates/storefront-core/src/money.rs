//! # Money Module
//!
//! Provides the `Money` value object for catalog prices and cart totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The catalog API sends prices as decimal strings: "999.0", "12.50"     │
//! │                                                                         │
//! │  parseFloat("0.1") + parseFloat("0.2") = 0.30000000000000004  ❌        │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    "0.1" + "0.2" = 0.3 exactly                                         │
//! │    Amounts are serialized back out as strings, never floats            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::parse("999.0", "USD").unwrap();
//! assert_eq!(price.times(3).to_string(), "$2,997.00");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Currency Code
// =============================================================================

/// ISO 4217 currency code, always three upper-case ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code (`"usd"` becomes `"USD"`).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::parse("eur").unwrap().as_str(), "EUR");
    /// assert!(CurrencyCode::parse("EURO").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::required("currency_code"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency_code",
                format!("'{}' is not a 3-letter ISO 4217 code", code),
            ));
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }

    /// US dollars, the storefront's default currency.
    pub fn usd() -> Self {
        CurrencyCode("USD".to_string())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display prefix for this currency.
    ///
    /// Currencies without a well-known symbol fall back to the code itself
    /// followed by a space (`"SEK 100.00"`).
    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "JPY" => "¥".to_string(),
            other => format!("{} ", other),
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::usd()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::parse(s)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A non-negative amount in a specific currency.
///
/// ## Design Decisions
/// - **Decimal amount**: exact, matches the catalog API's string amounts
/// - **Non-negative**: carts never hold refunds or discounts
/// - **Value semantics**: equality is by amount and currency
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Variant.price ──┬──► LineItem.price (frozen) ──► LineItem.line_total  │
/// │                  │                                                      │
/// │                  └──► Displayed as "$999.00" on product cards          │
/// │                                                                         │
/// │  Cart subtotal ──► CartTotals.subtotal ──► Checkout hand-off           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
#[ts(export)]
#[ts(rename_all = "camelCase")]
pub struct Money {
    #[ts(as = "String")]
    amount: Decimal,
    currency_code: CurrencyCode,
}

/// Wire shape of [`Money`]; validated on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyRepr {
    amount: Decimal,
    currency_code: CurrencyCode,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = ValidationError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::new(repr.amount, repr.currency_code)
    }
}

impl From<Money> for MoneyRepr {
    fn from(money: Money) -> Self {
        MoneyRepr {
            amount: money.amount,
            currency_code: money.currency_code,
        }
    }
}

impl Money {
    /// Creates a Money value, rejecting negative amounts.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::Negative {
                field: "amount".to_string(),
            });
        }
        Ok(Money {
            amount: amount.normalize(),
            currency_code,
        })
    }

    /// Parses an amount string as sent by the catalog API.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::parse("999.0", "usd").unwrap();
    /// assert_eq!(price.currency_code().as_str(), "USD");
    ///
    /// assert!(Money::parse("-1", "USD").is_err());
    /// assert!(Money::parse("abc", "USD").is_err());
    /// ```
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, ValidationError> {
        let amount = amount.trim();
        if amount.is_empty() {
            return Err(ValidationError::required("amount"));
        }
        let decimal = Decimal::from_str(amount).map_err(|e| {
            ValidationError::invalid_format("amount", format!("'{}': {}", amount, e))
        })?;
        Money::new(decimal, CurrencyCode::parse(currency_code)?)
    }

    /// Zero in the given currency.
    pub fn zero(currency_code: CurrencyCode) -> Self {
        Money {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// The decimal amount in major units (dollars, not cents).
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency_code(&self) -> &CurrencyCode {
        &self.currency_code
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit = Money::parse("2.99", "USD").unwrap();
    /// assert_eq!(unit.times(3), Money::parse("8.97", "USD").unwrap());
    /// ```
    pub fn times(&self, quantity: u32) -> Money {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX);
        Money {
            amount: amount.normalize(),
            currency_code: self.currency_code.clone(),
        }
    }

    /// Adds two amounts of the same currency.
    ///
    /// Returns `None` when the currencies differ; the caller decides how to
    /// segment mixed-currency sums. Saturates like [`Money::times`].
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency_code != other.currency_code {
            return None;
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .unwrap_or(Decimal::MAX);
        Some(Money {
            amount: amount.normalize(),
            currency_code: self.currency_code.clone(),
        })
    }

    /// Formats for display: symbol, thousands separators, two decimals.
    ///
    /// Rounds half to even so that display never drifts upward across many
    /// lines.
    pub fn format(&self) -> String {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(2);

        let text = rounded.to_string();
        let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        format!(
            "{}{}.{}",
            self.currency_code.symbol(),
            group_thousands(whole),
            frac
        )
    }
}

/// Inserts `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: &str) -> Money {
        Money::parse(amount, "USD").unwrap()
    }

    #[test]
    fn test_parse_catalog_amounts() {
        assert_eq!(usd("999.0").amount(), Decimal::from(999));
        assert_eq!(usd(" 12.50 ").amount(), Decimal::new(125, 1));
        assert_eq!(usd("0").amount(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Money::parse("-5.00", "USD"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            Money::parse("", "USD"),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Money::parse("12,50", "USD"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(Money::parse("10", "US").is_err());
        assert!(Money::parse("10", "U$D").is_err());
    }

    #[test]
    fn test_currency_code_normalized() {
        let money = Money::parse("1", "gbp").unwrap();
        assert_eq!(money.currency_code().as_str(), "GBP");
    }

    #[test]
    fn test_equality_by_value() {
        assert_eq!(usd("999.0"), usd("999.00"));
        assert_ne!(usd("999"), Money::parse("999", "CAD").unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(usd("2997").to_string(), "$2,997.00");
        assert_eq!(usd("0").to_string(), "$0.00");
        assert_eq!(usd("1234567.891").to_string(), "$1,234,567.89");
        assert_eq!(usd("999.5").to_string(), "$999.50");
        assert_eq!(Money::parse("12", "EUR").unwrap().to_string(), "€12.00");
        assert_eq!(Money::parse("12", "SEK").unwrap().to_string(), "SEK 12.00");
    }

    #[test]
    fn test_display_rounds_half_to_even() {
        assert_eq!(usd("0.125").to_string(), "$0.12");
        assert_eq!(usd("0.135").to_string(), "$0.14");
    }

    #[test]
    fn test_times_and_checked_add() {
        let unit = usd("999");
        assert_eq!(unit.times(3), usd("2997"));
        assert_eq!(unit.times(0), usd("0"));

        let sum = usd("0.1").checked_add(&usd("0.2")).unwrap();
        assert_eq!(sum, usd("0.3"));

        let cad = Money::parse("1", "CAD").unwrap();
        assert!(usd("1").checked_add(&cad).is_none());
    }

    #[test]
    fn test_serde_uses_string_amounts() {
        let json = serde_json::to_value(usd("999.0")).unwrap();
        assert_eq!(json["amount"], "999");
        assert_eq!(json["currencyCode"], "USD");

        let back: Money =
            serde_json::from_str(r#"{"amount":"12.50","currencyCode":"usd"}"#).unwrap();
        assert_eq!(back, usd("12.5"));
    }

    #[test]
    fn test_serde_rejects_invalid_money() {
        assert!(serde_json::from_str::<Money>(r#"{"amount":"-1","currencyCode":"USD"}"#).is_err());
        assert!(serde_json::from_str::<Money>(r#"{"amount":"1","currencyCode":"DOLLARS"}"#).is_err());
    }
}

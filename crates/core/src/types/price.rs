//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a price or currency.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    /// The currency code is not supported.
    #[error("unsupported currency code '{0}'")]
    UnknownCurrency(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., koruna, not haléř).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Parse an amount as typed by staff.
    ///
    /// Accepts both `20.50` and the Czech `20,50` decimal separator. The sign
    /// is not checked here; whoever applies the amount decides whether a
    /// negative value is acceptable.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::InvalidAmount`] if the input is not a number.
    pub fn parse_amount(s: &str) -> Result<Decimal, PriceError> {
        let normalized = s.trim().replace(',', ".");
        Decimal::from_str(&normalized).map_err(|_| PriceError::InvalidAmount(s.trim().to_owned()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.round_dp(2);
        if self.currency_code.symbol_after() {
            write!(f, "{amount:.2} {}", self.currency_code.symbol())
        } else {
            write!(f, "{}{amount:.2}", self.currency_code.symbol())
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    CZK,
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::CZK => "Kč",
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CZK => "CZK",
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
        }
    }

    // Czech and euro amounts are written "32.00 Kč", the rest "$32.00".
    const fn symbol_after(self) -> bool {
        matches!(self, Self::CZK | Self::EUR)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CZK" => Ok(Self::CZK),
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            _ => Err(PriceError::UnknownCurrency(s.trim().to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_display_czk_suffix() {
        let price = Price::new(dec!(32), CurrencyCode::CZK);
        assert_eq!(price.to_string(), "32.00 Kč");
    }

    #[test]
    fn test_display_usd_prefix() {
        let price = Price::new(dec!(19.999), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$20.00");
    }

    #[test]
    fn test_parse_amount_accepts_comma() {
        assert_eq!(Price::parse_amount("20,50").unwrap(), dec!(20.50));
        assert_eq!(Price::parse_amount(" 32 ").unwrap(), dec!(32));
        assert_eq!(Price::parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_keeps_sign() {
        assert_eq!(Price::parse_amount("-1").unwrap(), dec!(-1));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            Price::parse_amount("free"),
            Err(PriceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::new(dec!(-0.01), CurrencyCode::CZK).is_negative());
        assert!(!Price::zero(CurrencyCode::CZK).is_negative());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("czk".parse::<CurrencyCode>().unwrap(), CurrencyCode::CZK);
        assert!(matches!(
            "XYZ".parse::<CurrencyCode>(),
            Err(PriceError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_serde_amount_as_string() {
        let price = Price::new(dec!(99), CurrencyCode::CZK);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, r#"{"amount":"99","currency_code":"CZK"}"#);
    }
}

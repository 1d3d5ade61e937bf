//! Integer minor-unit money.
//!
//! Contributions travel as text so that text inputs never show float
//! artifacts. All arithmetic happens here on `i64` minor units (kobo, cents).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Largest supported number of fractional digits
pub const MAX_MINOR_UNIT_DIGITS: u32 = 4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurrencyFormatError {
    #[error("minor_unit_digits must be at most {max}, got {0}", max = MAX_MINOR_UNIT_DIGITS)]
    TooManyMinorUnitDigits(u32),
}

#[derive(Deserialize)]
struct RawCurrencyFormat {
    symbol: String,
    minor_unit_digits: u32,
}

/// How amounts are written in text inputs and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCurrencyFormat")]
pub struct CurrencyFormat {
    symbol: String,
    /// Number of fractional digits in one major unit (2 for NGN/USD)
    minor_unit_digits: u32,
}

impl CurrencyFormat {
    pub fn new(
        symbol: impl Into<String>,
        minor_unit_digits: u32,
    ) -> Result<Self, CurrencyFormatError> {
        if minor_unit_digits > MAX_MINOR_UNIT_DIGITS {
            return Err(CurrencyFormatError::TooManyMinorUnitDigits(minor_unit_digits));
        }
        Ok(Self {
            symbol: symbol.into(),
            minor_unit_digits,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn minor_unit_digits(&self) -> u32 {
        self.minor_unit_digits
    }

    /// Minor units per major unit
    pub fn scale(&self) -> i64 {
        // minor_unit_digits <= MAX_MINOR_UNIT_DIGITS, so this stays far below i64::MAX
        10_i64.pow(self.minor_unit_digits)
    }
}

impl TryFrom<RawCurrencyFormat> for CurrencyFormat {
    type Error = CurrencyFormatError;

    fn try_from(raw: RawCurrencyFormat) -> Result<Self, Self::Error> {
        CurrencyFormat::new(raw.symbol, raw.minor_unit_digits)
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "₦".to_string(),
            minor_unit_digits: 2,
        }
    }
}

/// A monetary amount in minor units. May be negative as an intermediate
/// value; stored contributions never are.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_minor_units(units: i64) -> Self {
        Amount(units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Parse user-entered text such as `"1,500.50"` or `"₦ 200"`.
    ///
    /// Returns `None` for empty or non-numeric text, negative values, more
    /// fractional digits than the currency allows, and values too large to
    /// hold in minor units.
    pub fn parse(input: &str, currency: &CurrencyFormat) -> Option<Amount> {
        let mut cleaned = input.trim();
        if !currency.symbol.is_empty() {
            cleaned = cleaned.strip_prefix(currency.symbol.as_str()).unwrap_or(cleaned);
        }
        let cleaned: String = cleaned
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };

        // "5." and ".5" are both accepted, a lone "." is not
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return None;
        }
        if fraction.len() > currency.minor_unit_digits as usize {
            return None;
        }

        let whole_units: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut fraction_units: i64 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
        for _ in fraction.len()..currency.minor_unit_digits as usize {
            fraction_units *= 10;
        }

        whole_units
            .checked_mul(currency.scale())?
            .checked_add(fraction_units)
            .map(Amount)
    }

    /// Plain decimal text for a text input, e.g. `1500.00`
    pub fn to_input_string(self, currency: &CurrencyFormat) -> String {
        let (sign, whole, fraction) = self.split(currency);
        if currency.minor_unit_digits == 0 {
            format!("{}{}", sign, whole)
        } else {
            format!(
                "{}{}.{:0width$}",
                sign,
                whole,
                fraction,
                width = currency.minor_unit_digits as usize
            )
        }
    }

    /// Label text with symbol and thousands separators, e.g. `₦1,500.00`
    pub fn display(self, currency: &CurrencyFormat) -> String {
        let (sign, whole, fraction) = self.split(currency);
        let whole = group_thousands(whole);
        if currency.minor_unit_digits == 0 {
            format!("{}{}{}", sign, currency.symbol, whole)
        } else {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                currency.symbol,
                whole,
                fraction,
                width = currency.minor_unit_digits as usize
            )
        }
    }

    fn split(self, currency: &CurrencyFormat) -> (&'static str, u64, u64) {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = currency.scale() as u64;
        (sign, magnitude / scale, magnitude % scale)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Domain models that the catalog owns and the UI and report only read. These
//! stay plain data holders; validation lives in the catalog.

use std::fmt;
use std::iter::Sum;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;

/// Synthetic identifier handed out by the catalog when a book is added. It
/// survives deletes of other rows, unlike the positional index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub(crate) u64);

impl BookId {
    /// Raw counter value, for logs and external front-ends.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-negative money amount. The entered value is kept exactly; rounding to
/// the cent only happens when it is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Exact amount of `cents` hundredths.
    pub fn from_cents(cents: u64) -> Self {
        Price(Decimal::from_i128_with_scale(i128::from(cents), 2))
    }

    /// The amount as entered, without display rounding.
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Parse plain decimal notation (`12`, `12.5`, `12.`, `.5`, `+3.99`,
    /// `0.004`).
    ///
    /// Every fractional digit is kept. Signs other than a leading `+`,
    /// exponents, grouping separators and currency symbols are rejected, as are
    /// amounts beyond what a 96-bit mantissa with 28 fractional digits holds.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPrice {
            input: text.trim().to_string(),
        };

        let raw = text.trim();
        let raw = raw.strip_prefix('+').unwrap_or(raw);
        let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(invalid());
        }

        let frac = frac.trim_end_matches('0');
        let mut mantissa: i128 = 0;
        for digit in whole.bytes().chain(frac.bytes()).map(|b| i128::from(b - b'0')) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|value| value.checked_add(digit))
                .ok_or_else(invalid)?;
        }

        let scale = u32::try_from(frac.len()).map_err(|_| invalid())?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map(Price)
            .map_err(|_| invalid())
    }

    /// Add two prices, pinning at the largest representable amount.
    pub fn saturating_add(self, other: Price) -> Price {
        Price(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    /// Pinned currency format: `$` prefix, comma grouping, two decimals.
    /// Half-cent amounts round to the even cent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        let plain = format!("{rounded:.2}");
        let (digits, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "${grouped}.{cents}")
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Price::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One library book as shown in the table and the report.
pub struct BookRecord {
    /// Assigned by the catalog; never reused within one catalog.
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Not unique. Two copies of the same edition are two records.
    pub isbn: String,
    pub price: Price,
    /// Whether the book is currently checked out.
    pub issued: bool,
}

impl BookRecord {
    /// `Yes`/`No` label used by both the table column and the report.
    pub fn issued_label(&self) -> &'static str {
        if self.issued {
            "Yes"
        } else {
            "No"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: u64) -> Price {
        Price::from_cents(value)
    }

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(Price::parse("15").unwrap(), cents(1500));
        assert_eq!(Price::parse("9.50").unwrap(), cents(950));
        assert_eq!(Price::parse(" 9.5 ").unwrap(), cents(950));
        assert_eq!(Price::parse("12.").unwrap(), cents(1200));
        assert_eq!(Price::parse(".5").unwrap(), cents(50));
        assert_eq!(Price::parse("+3.99").unwrap(), cents(399));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn keeps_sub_cent_digits_exactly() {
        assert_eq!(Price::parse("0.004").unwrap().amount(), Decimal::new(4, 3));
        assert_eq!(Price::parse("1.005").unwrap().amount(), Decimal::new(1005, 3));
        assert_eq!(
            Price::parse("2.50000000000000000000000000000000").unwrap(),
            cents(250)
        );
    }

    #[test]
    fn rounds_only_when_displayed() {
        assert_eq!(Price::parse("0.004").unwrap().to_string(), "$0.00");
        assert_eq!(Price::parse("2.999").unwrap().to_string(), "$3.00");
        assert_eq!(Price::parse("1.0051").unwrap().to_string(), "$1.01");
        assert_eq!(Price::parse("0.125").unwrap().to_string(), "$0.12");
        assert_eq!(Price::parse("0.135").unwrap().to_string(), "$0.14");
    }

    #[test]
    fn rejects_non_numeric_and_negative_text() {
        for input in ["abc", "-1", "-0.50", "1e3", "$5", "1,000", ".", "+", "1.2.3", "NaN"] {
            assert_eq!(
                Price::parse(input),
                Err(ValidationError::InvalidPrice {
                    input: input.to_string()
                }),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_amounts_that_overflow() {
        assert!(Price::parse("999999999999999999999999999999999").is_err());
        assert!(Price::parse("0.00000000000000000000000000001").is_err());
    }

    #[test]
    fn displays_pinned_currency_format() {
        assert_eq!(cents(0).to_string(), "$0.00");
        assert_eq!(cents(1500).to_string(), "$15.00");
        assert_eq!(cents(950).to_string(), "$9.50");
        assert_eq!(cents(123_450).to_string(), "$1,234.50");
        assert_eq!(cents(100_000_005).to_string(), "$1,000,000.05");
    }

    #[test]
    fn sums_prices() {
        let total: Price = [150, 250, 5].into_iter().map(cents).sum();
        assert_eq!(total, cents(405));
    }

    #[test]
    fn sums_sub_cent_prices_before_rounding() {
        let each = Price::parse("0.004").unwrap();
        let total: Price = [each, each, each].into_iter().sum();
        assert_eq!(total.amount(), Decimal::new(12, 3));
        assert_eq!(total.to_string(), "$0.01");
    }
}

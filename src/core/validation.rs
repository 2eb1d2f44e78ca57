//! Transaction validation - turns raw command arguments into a well-formed entry.
//!
//! Everything here is pure. The errors are meant to be shown to the user as-is.

use crate::core::amount;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Category used when the user gives none.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Longest category the `category` column holds, in characters.
pub const MAX_CATEGORY_CHARS: usize = 100;

/// A validated amount and category, ready to be appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Strictly positive, at most two fractional digits
    pub amount: Decimal,
    /// Joined category text or [`UNCATEGORIZED`]
    pub category: String,
}

/// User-correctable problems with command input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The command was sent without any amount
    #[error("Provide an amount and, optionally, a category")]
    MissingAmount,

    /// The amount token is not a decimal number
    #[error("'{input}' is not a valid amount")]
    MalformedAmount {
        /// The rejected token
        input: String,
    },

    /// Zero or negative amount; the direction comes from the command, not the sign
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// More than the ledger can store
    #[error("Amount is too large, the maximum is {max}")]
    AmountOutOfRange {
        /// Largest accepted amount, formatted
        max: String,
    },

    /// Category text longer than the column allows
    #[error("Category is too long, use at most {max} characters")]
    CategoryTooLong {
        /// Character limit
        max: usize,
    },
}

/// Validates one raw amount token and the remaining category tokens.
///
/// The amount is parsed exactly (plain or scientific notation) and rounded to
/// two fractional digits. Category tokens are joined with single spaces;
/// nothing left means [`UNCATEGORIZED`].
pub fn validate<S: AsRef<str>>(
    raw_amount: &str,
    raw_category_tokens: &[S],
) -> Result<ParsedEntry, ValidationError> {
    let amount = parse_amount(raw_amount)?;
    let category = parse_category(raw_category_tokens)?;
    Ok(ParsedEntry { amount, category })
}

fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let token = raw.trim();
    let parsed = match Decimal::from_str(token).or_else(|_| Decimal::from_scientific(token)) {
        Ok(value) => value,
        Err(_) => approximate_literal(token).ok_or_else(|| ValidationError::MalformedAmount {
            input: token.to_string(),
        })?,
    };

    let rounded = amount::round(parsed);
    if rounded <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if rounded > amount::max_amount() {
        return Err(ValidationError::AmountOutOfRange {
            max: amount::format(amount::max_amount()),
        });
    }
    Ok(rounded)
}

/// Stand-in for a valid decimal literal that `Decimal` cannot hold.
///
/// The result has the same sign, the same two-digit rounding, and the same
/// position relative to the storable range as the literal. `None` means the
/// token is not a decimal literal at all.
fn approximate_literal(token: &str) -> Option<Decimal> {
    let (negative, digits, point) = split_literal(token)?;

    let leading_zeros = digits.bytes().take_while(|b| *b == b'0').count();
    let significant = &digits[leading_zeros..];
    if negative {
        return Some(Decimal::NEGATIVE_ONE);
    }
    if significant.is_empty() {
        return Some(Decimal::ZERO);
    }

    // value lies in [10^(point-1), 10^point)
    let point = point.saturating_sub(i64::try_from(leading_zeros).ok()?);
    if point > 10 {
        return Some(amount::max_amount() + Decimal::ONE);
    }
    if point < -2 {
        return Some(Decimal::ZERO);
    }

    // Three fractional digits are enough to round to two
    let keep = usize::try_from(point + 3).ok()?;
    let kept = &significant[..significant.len().min(keep)];
    let mantissa: i64 = kept.parse().ok()?;
    let fraction_digits = i64::try_from(kept.len()).ok()? - point;
    match u32::try_from(fraction_digits) {
        Ok(scale) => Some(Decimal::new(mantissa, scale)),
        Err(_) => {
            let shift = u32::try_from(-fraction_digits).ok()?;
            Some(Decimal::from(mantissa) * Decimal::from(10_i64.checked_pow(shift)?))
        }
    }
}

/// Splits `[+-]digits[.digits][(e|E)[+-]digits]` into sign, mantissa digits,
/// and the decimal point position after applying the exponent.
fn split_literal(token: &str) -> Option<(bool, String, i64)> {
    let (negative, rest) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return None;
    }

    let exponent = match exponent {
        None => 0,
        Some(exp) => {
            let magnitude = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if magnitude.is_empty() || !all_digits(magnitude) {
                return None;
            }
            // Absurd exponents only need to stay absurd
            let value = magnitude.parse::<i64>().unwrap_or(i64::MAX / 2);
            if exp.starts_with('-') { -value } else { value }
        }
    };

    let point = i64::try_from(int_part.len()).ok()?.saturating_add(exponent);
    Some((negative, format!("{int_part}{frac_part}"), point))
}

fn parse_category<S: AsRef<str>>(tokens: &[S]) -> Result<String, ValidationError> {
    let joined = tokens
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        return Ok(UNCATEGORIZED.to_string());
    }
    if joined.chars().count() > MAX_CATEGORY_CHARS {
        return Err(ValidationError::CategoryTooLong {
            max: MAX_CATEGORY_CHARS,
        });
    }
    Ok(joined)
}

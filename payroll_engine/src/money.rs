//! Currency values and numeric helpers.
//!
//! Every monetary amount that flows through the engine is a [`Money`],
//! a thin wrapper around [`rust_decimal::Decimal`].  Upstream payroll
//! records are loosely typed (numbers, numeric strings, `null`, or
//! decimal wrapper objects), so the `Deserialize` implementation is
//! deliberately lenient: anything that cannot be read as a number
//! becomes zero.  Once a record has been deserialised the rest of the
//! crate works with a single, already-normalised type.

use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use tracing::warn;

/// Number of decimal places kept for currency amounts (centavos).
pub const CURRENCY_DECIMALS: u32 = 2;

/// Largest magnitude accepted from upstream data, 10^15.  Anything
/// beyond it is treated as garbage and read as zero.
pub const MAX_INGESTED_MAGNITUDE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A currency amount in BRL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Builds an amount from an integer mantissa and a scale, e.g.
    /// `Money::new(12345, 2)` is `123.45`.
    pub fn new(num: i64, scale: u32) -> Self {
        Money(Decimal::new(num, scale))
    }

    /// Wraps an already-normalised decimal without rounding it.
    pub fn from_decimal(value: Decimal) -> Self {
        Money(value)
    }

    /// Parses plain (`1234.56`) or pt-BR formatted (`R$ 1.234,56`) text.
    pub fn parse(text: &str) -> Option<Self> {
        parse_localized(text).map(Money)
    }

    /// The underlying decimal, at whatever scale it was built with.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Rounds to the currency's minor unit, midpoint away from zero.
    pub fn round_cents(self) -> Self {
        Money(round_currency(self.0))
    }

    /// `percentage` percent of this amount, rounded to cents.
    pub fn percent_of(self, percentage: Decimal) -> Self {
        let fraction = percent_to_fraction(percentage);
        let product = self.0.checked_mul(fraction).unwrap_or_else(|| {
            saturated(self.0.is_sign_negative() != fraction.is_sign_negative())
        });
        Money(round_currency(product))
    }

    /// Divides by a row/head count, rounded to cents.  A zero count
    /// yields zero instead of failing.
    pub fn div_count(self, count: usize) -> Self {
        if count == 0 {
            return Money::ZERO;
        }
        let quotient = self.0.checked_div(Decimal::from(count)).unwrap_or(self.0);
        Money(round_currency(quotient))
    }
}

/// The bound an overflowing operation clamps to.
fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(Decimal::from(units))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturates at `Decimal::MAX`/`Decimal::MIN` instead of panicking.
    fn add(self, rhs: Money) -> Money {
        Money(
            self.0
                .checked_add(rhs.0)
                .unwrap_or_else(|| saturated(self.0.is_sign_negative())),
        )
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    /// Saturates at `Decimal::MAX`/`Decimal::MIN` instead of panicking.
    fn sub(self, rhs: Money) -> Money {
        Money(
            self.0
                .checked_sub(rhs.0)
                .unwrap_or_else(|| saturated(self.0.is_sign_negative())),
        )
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_brl(*self))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = round_currency(self.0).to_f64().unwrap_or_default();
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Money(lenient_decimal(&value)))
    }
}

/// Reads a loosely-typed JSON value as a decimal.  Anything that is not
/// a number or a numeric string, or whose magnitude exceeds
/// [`MAX_INGESTED_MAGNITUDE`], resolves to zero.
pub fn lenient_decimal(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(number) => number_to_decimal(number),
        Value::String(text) => parse_localized(text).unwrap_or_default(),
        _ => Decimal::ZERO,
    };
    if parsed.abs() > MAX_INGESTED_MAGNITUDE {
        warn!(value = %value, "numeric value out of range, reading as zero");
        return Decimal::ZERO;
    }
    parsed
}

fn number_to_decimal(number: &serde_json::Number) -> Decimal {
    if let Some(int) = number.as_i64() {
        return Decimal::from(int);
    }
    if let Some(uint) = number.as_u64() {
        return Decimal::from(uint);
    }
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .or_else(|| number.as_f64().and_then(Decimal::from_f64))
        .unwrap_or_default()
}

/// Reads a loosely-typed JSON value as a whole number.  Fractions are
/// truncated; non-numeric values yield `None`.
fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .and_then(Decimal::from_f64)
                .and_then(|d| d.trunc().to_i64())
        }),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| parse_localized(text).and_then(|d| d.trunc().to_i64()))
        }
        _ => None,
    }
}

/// `deserialize_with` helper for optional decimal fields such as
/// discount percentages: `null`/absent is `None`, any other value is
/// read leniently.
pub fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(lenient_decimal(&value)))
}

/// `null` becomes `T::default()`; any other value deserialises normally.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lenient `u32`: numbers and numeric strings are read, negatives and
/// anything else become 0.
pub fn deserialize_lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_integer(&value)
        .and_then(|int| u32::try_from(int).ok())
        .unwrap_or(0))
}

/// Lenient `i32`, as [`deserialize_lenient_u32`].
pub fn deserialize_lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_integer(&value)
        .and_then(|int| i32::try_from(int).ok())
        .unwrap_or(0))
}

/// Optional lenient `u32`: `null` is `None`, garbage is `Some(0)`.
pub fn deserialize_optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(
        lenient_integer(&value)
            .and_then(|int| u32::try_from(int).ok())
            .unwrap_or(0),
    ))
}

/// Lenient flag: booleans, `"true"`/`"false"`, and non-zero numbers;
/// everything else is `false`.
pub fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        Value::Number(_) => lenient_integer(&value).map_or(false, |int| int != 0),
        _ => false,
    })
}

/// Lenient text: strings as-is, numbers and booleans printed, anything
/// else empty.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

/// Parses a number written either plainly or in pt-BR notation.
///
/// A `R$` prefix and whitespace are ignored.  When a comma is present it
/// is taken as the decimal separator and dots as thousands separators.
/// Without a comma, dots are read as thousands separators when the text
/// is laid out in thousands groups (`1.500`, `1.234.567`); otherwise a
/// single dot is the decimal point (`12.50`, `2500.000`).  Several dots
/// that do not form thousands groups are rejected.
pub fn parse_localized(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("R$", "");
    if cleaned.is_empty() {
        return None;
    }
    let normalised = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else if cleaned.matches('.').count() > 1 {
        return None;
    } else {
        cleaned
    };
    Decimal::from_str(&normalised)
        .or_else(|_| Decimal::from_scientific(&normalised))
        .ok()
}

/// `1.500`, `-12.345.678`: a leading group of one to three digits (not
/// starting with zero) followed by dot-separated groups of exactly three.
fn is_thousands_grouped(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut groups = digits.split('.');
    let lead = match groups.next() {
        Some(lead) => lead,
        None => return false,
    };
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    let lead_ok = (1..=3).contains(&lead.len()) && all_digits(lead) && !lead.starts_with('0');
    let mut rest = groups.peekable();
    lead_ok && rest.peek().is_some() && rest.all(|group| group.len() == 3 && all_digits(group))
}

/// Formats a number with pt-BR separators: `1.234.567,89`.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let mut rounded =
        value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(decimals);

    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (text.clone(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(&frac);
    }
    out
}

/// Formats an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(value: Money) -> String {
    let body = format_number(value.amount().abs(), CURRENCY_DECIMALS);
    if value.round_cents().is_negative() {
        format!("-R$ {}", body)
    } else {
        format!("R$ {}", body)
    }
}

/// `10` (percent) becomes `0.10`.
pub fn percent_to_fraction(percentage: Decimal) -> Decimal {
    percentage / Decimal::ONE_HUNDRED
}

/// `0.1` becomes `10` (percent).
pub fn fraction_to_percent(fraction: Decimal) -> Decimal {
    fraction
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or_else(|| saturated(fraction.is_sign_negative()))
}

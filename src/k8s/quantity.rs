use k8s_openapi::apimachinery::pkg::api::resource::Quantity as KubeQuantity;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;

/// Nano-units per base unit (one core, one byte).
const NANO: u128 = 1_000_000_000;

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ei", 60),
    ("Pi", 50),
    ("Ti", 40),
    ("Gi", 30),
    ("Mi", 20),
    ("Ki", 10),
];

const DECIMAL_SUFFIXES: [(&str, u32); 6] = [
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
];

/// How a quantity prefers to be written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    DecimalSI,
    BinarySI,
}

/// A non-negative resource quantity such as `500m` cores or `16Gi` bytes.
///
/// The magnitude is held exactly as a count of nano-units, so values with
/// different suffixes add without any floating point drift. Equality compares
/// the magnitude only, so `1024` equals `1Ki`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantity {
    nanos: u128,
    format: Format,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quantity {input:?}: {reason}")]
pub struct QuantityError {
    input: String,
    reason: &'static str,
}

impl QuantityError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Binary(u32),
    Decimal(i32),
}

impl Scale {
    fn from_suffix(suffix: &str) -> Option<Self> {
        let scale = match suffix {
            "" => Scale::Decimal(0),
            "n" => Scale::Decimal(-9),
            "u" => Scale::Decimal(-6),
            "m" => Scale::Decimal(-3),
            "k" => Scale::Decimal(3),
            "M" => Scale::Decimal(6),
            "G" => Scale::Decimal(9),
            "T" => Scale::Decimal(12),
            "P" => Scale::Decimal(15),
            "E" => Scale::Decimal(18),
            "Ki" => Scale::Binary(10),
            "Mi" => Scale::Binary(20),
            "Gi" => Scale::Binary(30),
            "Ti" => Scale::Binary(40),
            "Pi" => Scale::Binary(50),
            "Ei" => Scale::Binary(60),
            other => {
                let exponent = other.strip_prefix(['e', 'E'])?;
                Scale::Decimal(exponent.parse::<i32>().ok()?)
            }
        };
        Some(scale)
    }

    fn format(self) -> Format {
        match self {
            Scale::Binary(_) => Format::BinarySI,
            Scale::Decimal(_) => Format::DecimalSI,
        }
    }

    /// Converts `mantissa * 10^-frac_digits` at this scale into nano-units,
    /// rounding anything below one nano-unit up.
    fn to_nanos(self, mantissa: u128, frac_digits: i32) -> Option<u128> {
        let (shift, pow10) = match self {
            Scale::Binary(shift) => (shift, 0),
            Scale::Decimal(pow10) => (0, pow10),
        };
        let scaled = mantissa.checked_mul(1u128 << shift)?;
        let exponent = pow10.checked_add(9)?.checked_sub(frac_digits)?;

        if exponent >= 0 {
            scaled.checked_mul(10u128.checked_pow(exponent.unsigned_abs())?)
        } else {
            match 10u128.checked_pow(exponent.unsigned_abs()) {
                Some(divisor) => Some(scaled.div_ceil(divisor)),
                None => Some(u128::from(scaled != 0)),
            }
        }
    }
}

impl Quantity {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Parses the Kubernetes quantity grammar: an optional `+`, a decimal
    /// magnitude, then a binary suffix, a decimal suffix or an exponent.
    ///
    /// Magnitudes above `u128::MAX` nano-units (about 3.4e29 base units) are
    /// rejected as out of range. Node status never reports values that large.
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        if text.is_empty() {
            return Err(QuantityError::new(text, "empty quantity"));
        }

        let body = text.strip_prefix('+').unwrap_or(text);
        if body.starts_with('-') {
            return Err(QuantityError::new(text, "negative quantity"));
        }

        let number_end = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(number_end);
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(QuantityError::new(text, "missing magnitude"));
        }
        if frac.contains('.') {
            return Err(QuantityError::new(text, "more than one decimal point"));
        }

        let scale = Scale::from_suffix(suffix)
            .ok_or_else(|| QuantityError::new(text, "unrecognized suffix"))?;

        let mut mantissa: u128 = 0;
        for digit in whole.bytes().chain(frac.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                .ok_or_else(|| QuantityError::new(text, "magnitude out of range"))?;
        }

        let frac_digits = i32::try_from(frac.len())
            .map_err(|_| QuantityError::new(text, "magnitude out of range"))?;
        let nanos = scale
            .to_nanos(mantissa, frac_digits)
            .ok_or_else(|| QuantityError::new(text, "magnitude out of range"))?;

        Ok(Self {
            nanos,
            format: scale.format(),
        })
    }

    #[cfg(test)]
    fn as_nanos(&self) -> u128 {
        self.nanos
    }

    #[cfg(test)]
    fn format(&self) -> Format {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    fn fmt_binary(bytes: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (suffix, shift) in BINARY_SUFFIXES {
            let unit = 1u128 << shift;
            if bytes >= unit && bytes % unit == 0 {
                return write!(f, "{}{}", bytes / unit, suffix);
            }
        }
        write!(f, "{}", bytes)
    }

    fn fmt_decimal(nanos: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = nanos / NANO;
        let frac = nanos % NANO;

        if frac != 0 {
            let digits = format!("{:09}", frac);
            return write!(f, "{}.{}", whole, digits.trim_end_matches('0'));
        }

        for (suffix, pow10) in DECIMAL_SUFFIXES {
            let unit = 10u128.pow(pow10);
            if whole >= unit && whole % unit == 0 {
                return write!(f, "{}{}", whole / unit, suffix);
            }
        }
        write!(f, "{}", whole)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        let format = if self.format == Format::BinarySI || rhs.format == Format::BinarySI {
            Format::BinarySI
        } else {
            Format::DecimalSI
        };
        Quantity {
            nanos: self.nanos.saturating_add(rhs.nanos),
            format,
        }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::zero(), |total, next| total + next)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl TryFrom<&KubeQuantity> for Quantity {
    type Error = QuantityError;

    fn try_from(quantity: &KubeQuantity) -> Result<Self, Self::Error> {
        Quantity::parse(&quantity.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Format::BinarySI if self.nanos % NANO == 0 => Self::fmt_binary(self.nanos / NANO, f),
            _ => Self::fmt_decimal(self.nanos, f),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

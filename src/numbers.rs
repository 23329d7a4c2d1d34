//! Numeric tokens and fixed-width fields of the record lines
use std::fmt::{self, Write};

use crate::error::FormatError;

/// Split `line` into exactly `N` whitespace-separated tokens
pub(crate) fn fields<'a, const N: usize>(
    record: &'static str,
    line: &'a str,
) -> Result<[&'a str; N], FormatError> {
    let mut tokens = [""; N];
    let mut found = 0;
    for token in line.split_whitespace() {
        if found < N {
            tokens[found] = token;
        }
        found += 1;
    }
    if found != N {
        return Err(FormatError::FieldCount {
            record,
            expected: N,
            found,
            line: line.to_owned(),
        });
    }
    Ok(tokens)
}

pub(crate) fn float(
    record: &'static str,
    field: &'static str,
    token: &str,
) -> Result<f64, FormatError> {
    fast_float::parse::<f64, _>(token).map_err(|_| FormatError::Number {
        record,
        field,
        token: token.to_owned(),
    })
}

/// Integer entries are often written as `5.0`, so they are read as floats
/// and truncated
pub(crate) fn int(
    record: &'static str,
    field: &'static str,
    token: &str,
) -> Result<i32, FormatError> {
    let value = float(record, field, token)?.trunc();
    if value.is_finite()
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Ok(value as i32)
    } else {
        Err(FormatError::Number {
            record,
            field,
            token: token.to_owned(),
        })
    }
}

/// Integer printed like printf's `%Wd`, or `% Wd` if `sign_space` is set
#[derive(Copy, Clone, Debug)]
pub(crate) struct Int {
    value: i32,
    width: usize,
    sign_space: bool,
}

impl Int {
    pub(crate) fn new(value: i32, width: usize) -> Self {
        Self {
            value,
            width,
            sign_space: false,
        }
    }

    pub(crate) fn signed(value: i32, width: usize) -> Self {
        Self {
            value,
            width,
            sign_space: true,
        }
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut body = String::with_capacity(self.width);
        if self.sign_space && self.value >= 0 {
            body.push(' ');
        }
        write!(body, "{}", self.value)?;
        write!(f, "{:>1$}", body, self.width)
    }
}

/// Float printed like printf's `%W.Pe`, or `% W.Pe` if `sign_space` is set
///
/// In contrast to Rust's `{:e}` the exponent always has a sign and at least
/// two digits.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Exp {
    value: f64,
    width: usize,
    precision: usize,
    sign_space: bool,
}

impl Exp {
    pub(crate) fn new(value: f64, width: usize, precision: usize) -> Self {
        Self {
            value,
            width,
            precision,
            sign_space: false,
        }
    }

    pub(crate) fn signed(value: f64, width: usize, precision: usize) -> Self {
        Self {
            value,
            width,
            precision,
            sign_space: true,
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut body = String::with_capacity(self.width);
        if self.value.is_sign_negative() && !self.value.is_nan() {
            body.push('-');
        } else if self.sign_space {
            body.push(' ');
        }
        let abs = self.value.abs();
        if abs.is_nan() {
            body.push_str("nan");
        } else if abs.is_infinite() {
            body.push_str("inf");
        } else {
            let repr = format!("{:.*e}", self.precision, abs);
            let (mantissa, exponent) = repr.split_once('e').unwrap_or((&repr, "0"));
            let exponent: i32 = exponent.parse().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(body, "{mantissa}e{sign}{:02}", exponent.abs())?;
        }
        write!(f, "{:>1$}", body, self.width)
    }
}

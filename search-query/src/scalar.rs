//! Singleton parsers: turn one cleaned token into a typed [`Scalar`].

use crate::errors::{SearchParsingError, SearchResult};
use crate::grammar;
use crate::query::Scalar;
use num_rational::Rational64;
use num_traits::Zero;

pub type SingletonParser = dyn Fn(&str) -> SearchResult<Scalar> + Send + Sync;

pub(crate) fn parse_i64(token: &str) -> SearchResult<i64> {
    token
        .trim()
        .parse::<i64>()
        .map_err(|_| SearchParsingError::InvalidNumber(token.to_string()))
}

pub fn parse_int(token: &str) -> SearchResult<Scalar> {
    parse_i64(token).map(Scalar::Int)
}

pub fn parse_float(token: &str) -> SearchResult<Scalar> {
    match token.trim().parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Scalar::Float(x)),
        _ => Err(SearchParsingError::InvalidNumber(token.to_string())),
    }
}

pub fn parse_string(token: &str) -> SearchResult<Scalar> {
    Ok(Scalar::Str(token.to_string()))
}

/// `-3/4`, `7`: a signed integer or fraction.
pub fn parse_rational(token: &str) -> SearchResult<Scalar> {
    parse_ratio(token).map(Scalar::Rational)
}

pub(crate) fn parse_ratio(token: &str) -> SearchResult<Rational64> {
    let invalid = || SearchParsingError::InvalidNumber(token.to_string());
    if !grammar::is_qq(token) {
        return Err(invalid());
    }
    match token.split_once('/') {
        Some((numer, denom)) => {
            let numer = numer.parse::<i64>().map_err(|_| invalid())?;
            let denom = denom.parse::<i64>().map_err(|_| invalid())?;
            if denom.is_zero() {
                return Err(SearchParsingError::Semantic(
                    "The denominator must be nonzero".to_string(),
                ));
            }
            Ok(Rational64::new(numer, denom))
        }
        None => token
            .parse::<i64>()
            .map(Rational64::from_integer)
            .map_err(|_| invalid()),
    }
}

/// `0.75`, `3/4`, `2`: a non-negative decimal or fraction, kept exact.
pub fn parse_decimal_rational(token: &str) -> SearchResult<Scalar> {
    let invalid = || SearchParsingError::InvalidNumber(token.to_string());
    if !grammar::is_qq_dec(token) {
        return Err(invalid());
    }
    if token.contains('/') {
        return parse_rational(token);
    }
    let ratio = match token.split_once('.') {
        Some((whole, frac)) => {
            let scale = 10i64
                .checked_pow(frac.len() as u32)
                .ok_or_else(invalid)?;
            let whole = whole.parse::<i64>().map_err(|_| invalid())?;
            let frac = frac.parse::<i64>().map_err(|_| invalid())?;
            let numer = whole
                .checked_mul(scale)
                .and_then(|n| n.checked_add(frac))
                .ok_or_else(invalid)?;
            Rational64::new(numer, scale)
        }
        None => Rational64::from_integer(token.parse::<i64>().map_err(|_| invalid())?),
    };
    Ok(Scalar::Rational(ratio))
}

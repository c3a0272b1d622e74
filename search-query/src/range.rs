use crate::errors::SearchResult;
use crate::grammar;
use crate::query::{Constraint, Fragment, Scalar};
use crate::scalar::SingletonParser;

/// Input to the range compiler: raw text, or a value that is already typed.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeArg<'a> {
    Text(&'a str),
    Parsed(Scalar),
}

impl<'a> From<&'a str> for RangeArg<'a> {
    fn from(token: &'a str) -> Self {
        RangeArg::Text(token)
    }
}

impl From<Scalar> for RangeArg<'_> {
    fn from(value: Scalar) -> Self {
        RangeArg::Parsed(value)
    }
}

/// Compiles one cleaned token into a `(key, constraint)` fragment, or an OR
/// fragment for comma lists.
pub struct RangeCompiler<'p> {
    singleton: &'p SingletonParser,
    endpoint: &'p SingletonParser,
    split_on_dash: bool,
}

impl<'p> RangeCompiler<'p> {
    pub fn new(singleton: &'p SingletonParser) -> Self {
        Self {
            singleton,
            endpoint: singleton,
            split_on_dash: true,
        }
    }

    /// Parser for interval bounds, when they differ from singletons.
    pub fn endpoint(mut self, endpoint: &'p SingletonParser) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// With `false`, only `..` separates an interval.
    pub fn split_on_dash(mut self, split_on_dash: bool) -> Self {
        self.split_on_dash = split_on_dash;
        self
    }

    pub fn compile<'a>(&self, arg: impl Into<RangeArg<'a>>, key: &str) -> SearchResult<Fragment> {
        let token = match arg.into() {
            RangeArg::Parsed(value) => {
                return Ok(Fragment::Field(key.to_string(), Constraint::Value(value)))
            }
            RangeArg::Text(token) => token.replace(' ', ""),
        };
        if token.contains(',') {
            let alternatives = token
                .split(',')
                .map(|piece| self.compile(piece, key).map(Fragment::into_query))
                .collect::<SearchResult<Vec<_>>>()?;
            return Ok(Fragment::Or(alternatives));
        }
        if let Some((ix, len)) = grammar::find_range_separator(&token, self.split_on_dash) {
            let (start, end) = (&token[..ix], &token[ix + len..]);
            let min = optional_bound(start, self.endpoint)?;
            let max = optional_bound(end, self.endpoint)?;
            return Ok(Fragment::Field(key.to_string(), Constraint::range(min, max)));
        }
        Ok(Fragment::Field(
            key.to_string(),
            Constraint::Value((self.singleton)(&token)?),
        ))
    }
}

fn optional_bound(text: &str, parse: &SingletonParser) -> SearchResult<Option<Scalar>> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse(text).map(Some)
    }
}

/// Shorthand for [`RangeCompiler`] with default settings.
pub fn compile_range(token: &str, key: &str, singleton: &SingletonParser) -> SearchResult<Fragment> {
    RangeCompiler::new(singleton).compile(token, key)
}

/// Rational variant: tokens that are already a plain decimal or fraction are
/// passed straight to `process` before any splitting happens.
pub fn compile_range_rat(token: &str, key: &str, process: &SingletonParser) -> SearchResult<Fragment> {
    let token = token.replace(' ', "");
    if grammar::is_qq_dec(&token) {
        return Ok(Fragment::Field(
            key.to_string(),
            Constraint::Value(process(&token)?),
        ));
    }
    if token.contains(',') {
        let alternatives = token
            .split(',')
            .map(|piece| compile_range_rat(piece, key, process).map(Fragment::into_query))
            .collect::<SearchResult<Vec<_>>>()?;
        return Ok(Fragment::Or(alternatives));
    }
    match grammar::find_range_separator(&token, true) {
        Some((ix, len)) => {
            let min = optional_bound(&token[..ix], process)?;
            let max = optional_bound(&token[ix + len..], process)?;
            Ok(Fragment::Field(key.to_string(), Constraint::range(min, max)))
        }
        None => Ok(Fragment::Field(
            key.to_string(),
            Constraint::Value(process(&token)?),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchParsingError;
    use crate::query::Query;
    use crate::scalar::{parse_decimal_rational, parse_float, parse_int, parse_string};
    use num_rational::Rational64;

    #[test]
    fn test_compile_interval() {
        assert_eq!(
            compile_range("2-10", "deg", &parse_int).unwrap(),
            Fragment::Field(
                "deg".to_string(),
                Constraint::range(Some(Scalar::Int(2)), Some(Scalar::Int(10)))
            )
        );
    }

    #[test]
    fn test_compile_singleton() {
        assert_eq!(
            compile_range("7", "deg", &parse_int).unwrap(),
            Fragment::Field("deg".to_string(), Constraint::value(7i64))
        );
        assert_eq!(
            compile_range("-7", "deg", &parse_int).unwrap(),
            Fragment::Field("deg".to_string(), Constraint::value(-7i64))
        );
    }

    #[test]
    fn test_compile_open_ended() {
        assert_eq!(
            compile_range("5-", "n", &parse_int).unwrap(),
            Fragment::Field("n".to_string(), Constraint::range(Some(Scalar::Int(5)), None))
        );
        assert_eq!(
            compile_range("-5-", "n", &parse_int).unwrap(),
            Fragment::Field("n".to_string(), Constraint::range(Some(Scalar::Int(-5)), None))
        );
        assert_eq!(
            compile_range("1..", "n", &parse_int).unwrap(),
            Fragment::Field("n".to_string(), Constraint::range(Some(Scalar::Int(1)), None))
        );
    }

    #[test]
    fn test_compile_negative_interval() {
        assert_eq!(
            compile_range("-5--2", "n", &parse_int).unwrap(),
            Fragment::Field(
                "n".to_string(),
                Constraint::range(Some(Scalar::Int(-5)), Some(Scalar::Int(-2)))
            )
        );
    }

    #[test]
    fn test_comma_list_matches_individual_compilation() {
        let tokens = ["4", "9-16", "25-"];
        let compiled = compile_range(&tokens.join(","), "n", &parse_int).unwrap();
        let expected: Vec<Query> = tokens
            .iter()
            .map(|t| compile_range(t, "n", &parse_int).unwrap().into_query())
            .collect();
        assert_eq!(compiled, Fragment::Or(expected));
    }

    #[test]
    fn test_already_typed_value() {
        let compiler = RangeCompiler::new(&parse_int);
        assert_eq!(
            compiler.compile(Scalar::Int(3), "n").unwrap(),
            Fragment::Field("n".to_string(), Constraint::value(3i64))
        );
    }

    #[test]
    fn test_split_on_dash_disabled() {
        let compiler = RangeCompiler::new(&parse_string).split_on_dash(false);
        assert_eq!(
            compiler.compile("a-b", "label").unwrap(),
            Fragment::Field("label".to_string(), Constraint::value("a-b"))
        );
        assert_eq!(
            compiler.compile("a..b", "label").unwrap(),
            Fragment::Field(
                "label".to_string(),
                Constraint::range(Some(Scalar::from("a")), Some(Scalar::from("b")))
            )
        );
    }

    #[test]
    fn test_float_exponent_not_a_separator() {
        assert_eq!(
            compile_range("1e-5-2.5", "x", &parse_float).unwrap(),
            Fragment::Field(
                "x".to_string(),
                Constraint::range(Some(Scalar::Float(1e-5)), Some(Scalar::Float(2.5)))
            )
        );
    }

    #[test]
    fn test_endpoint_parser() {
        let compiler = RangeCompiler::new(&parse_int).endpoint(&parse_float);
        assert_eq!(
            compiler.compile("1-2", "x").unwrap(),
            Fragment::Field(
                "x".to_string(),
                Constraint::range(Some(Scalar::Float(1.0)), Some(Scalar::Float(2.0)))
            )
        );
    }

    #[test]
    fn test_malformed_token_propagates_scalar_error() {
        assert_eq!(
            compile_range("1-x", "n", &parse_int).unwrap_err(),
            SearchParsingError::InvalidNumber("x".to_string())
        );
    }

    #[test]
    fn test_compile_range_rat() {
        let half = Scalar::Rational(Rational64::new(1, 2));
        assert_eq!(
            compile_range_rat("0.5", "r", &parse_decimal_rational).unwrap(),
            Fragment::Field("r".to_string(), Constraint::Value(half.clone()))
        );
        assert_eq!(
            compile_range_rat("1/2-3", "r", &parse_decimal_rational).unwrap(),
            Fragment::Field(
                "r".to_string(),
                Constraint::range(
                    Some(half.clone()),
                    Some(Scalar::Rational(Rational64::from_integer(3)))
                )
            )
        );
        match compile_range_rat("0.5,2-", "r", &parse_decimal_rational).unwrap() {
            Fragment::Or(alternatives) => assert_eq!(alternatives.len(), 2),
            other => panic!("expected an OR fragment, got {:?}", other),
        }
    }
}

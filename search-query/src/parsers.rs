//! Ready-made field parsers. Each constructor returns a [`SearchParser`]
//! carrying the input policy that suits the field type.

use crate::combine::fold_or;
use crate::decompose::{enumerate_bounded, split_list, INTEGER_LIST_HINT};
use crate::errors::{SearchParsingError, SearchResult};
use crate::grammar;
use crate::parser::{ParserPolicy, SearchParser};
use crate::query::{Constraint, Query, Scalar};
use crate::range::{compile_range, compile_range_rat};
use crate::resolver::LabelResolver;
use crate::scalar::{parse_decimal_rational, parse_float, parse_i64, parse_int, parse_ratio};
use crate::subset::{apply_subset, multiset_encode, Canonical, SubsetMode};
use std::sync::Arc;

const SIGNED_LIST_HINT: &str = "It needs to be an integer (such as -25), a range of integers (such as -5--2 or -3-7), or a comma-separated list of these (such as -4,9,16 or -4-25, 81-121).";
const FLOAT_LIST_HINT: &str = "It needs to be a number (such as 2.5), a range of numbers (such as 2.1-8.7), or a comma-separated list of these (such as 1,2.5 or 0.5-1, 7-).";
const RAT_LIST_HINT: &str = "It needs to be a non-negative rational number (such as 4/3 or 0.75), a range of these (such as 1/2-3), or a comma-separated list of these (such as 1/2,2/3 or 0-1/2, 3-).";
const RATIONAL_HINT: &str = "It needs to be a rational number (such as -3/4 or 7).";

/// Non-negative integers, ranges and comma lists: `4`, `2-10`, `2..10`, `4,9-16,25-`.
pub fn parse_ints() -> SearchParser {
    SearchParser::new(ParserPolicy::default().clean_info().prep_ranges(), |inp, query, ctx| {
        if !grammar::is_list(inp) {
            return Err(SearchParsingError::Semantic(INTEGER_LIST_HINT.to_string()));
        }
        fold_or(compile_range(inp, ctx.qfield, &parse_int)?, query);
        Ok(())
    })
}

/// [`parse_ints`] that also rejects any value or bound outside `[min, max]`.
pub fn parse_ints_bounded(min: i64, max: i64) -> SearchParser {
    let singleton = move |token: &str| -> SearchResult<Scalar> {
        let n = parse_i64(token)?;
        if n < min || n > max {
            return Err(SearchParsingError::Semantic(format!(
                "Every value must be between {} and {}.",
                min, max
            )));
        }
        Ok(Scalar::Int(n))
    };
    SearchParser::new(
        ParserPolicy::default().clean_info().prep_ranges(),
        move |inp, query, ctx| {
            if !grammar::is_list(inp) && !grammar::is_signed_list(inp) {
                return Err(SearchParsingError::Semantic(INTEGER_LIST_HINT.to_string()));
            }
            fold_or(compile_range(inp, ctx.qfield, &singleton)?, query);
            Ok(())
        },
    )
}

/// Integers that may be negative; `-5--2` is the range from -5 to -2.
pub fn parse_signed_ints() -> SearchParser {
    SearchParser::new(ParserPolicy::default().clean_info().prep_ranges(), |inp, query, ctx| {
        if !grammar::is_signed_list(inp) {
            return Err(SearchParsingError::Semantic(SIGNED_LIST_HINT.to_string()));
        }
        fold_or(compile_range(inp, ctx.qfield, &parse_int)?, query);
        Ok(())
    })
}

pub fn parse_floats() -> SearchParser {
    SearchParser::new(ParserPolicy::default().clean_info().prep_ranges(), |inp, query, ctx| {
        if !grammar::is_list_float(inp) {
            return Err(SearchParsingError::Semantic(FLOAT_LIST_HINT.to_string()));
        }
        fold_or(compile_range(inp, ctx.qfield, &parse_float)?, query);
        Ok(())
    })
}

/// Non-negative rationals written as fractions or decimals, with ranges.
pub fn parse_rats() -> SearchParser {
    SearchParser::new(ParserPolicy::default().clean_info().prep_ranges(), |inp, query, ctx| {
        if !grammar::is_list_rat(inp) {
            return Err(SearchParsingError::Semantic(RAT_LIST_HINT.to_string()));
        }
        fold_or(compile_range_rat(inp, ctx.qfield, &parse_decimal_rational)?, query);
        Ok(())
    })
}

/// One signed rational, stored exactly.
pub fn parse_rational() -> SearchParser {
    SearchParser::new(ParserPolicy::default().clean_info(), |inp, query, ctx| {
        if !grammar::is_qq(inp) {
            return Err(SearchParsingError::Semantic(RATIONAL_HINT.to_string()));
        }
        query.insert(ctx.qfield, Constraint::Value(Scalar::Rational(parse_ratio(inp)?)));
        Ok(())
    })
}

fn bracketed_hint(exactlength: Option<usize>, maxlength: Option<usize>) -> String {
    let sample = |n: usize| {
        let items: Vec<String> = (2..n + 2).map(|i| i.to_string()).collect();
        format!("[{}]", items.join(","))
    };
    let (what, example) = match (exactlength, maxlength) {
        (Some(2), _) => ("pair of integers".to_string(), "[2,3] or [3,3]".to_string()),
        (Some(1), _) => ("list of 1 integer".to_string(), "[2]".to_string()),
        (Some(n), _) => (
            format!("list of {} integers", n),
            format!("{} or [{}]", sample(n), vec!["3"; n].join(",")),
        ),
        (None, Some(m)) => (
            format!("list of at most {} integers", m),
            format!("{} or [3]", sample(m)),
        ),
        (None, None) => ("list of integers".to_string(), "[1,2,3] or [5,6]".to_string()),
    };
    format!("It needs to be a {} in square brackets, such as {}", what, example)
}

/// A vector of positive integers in square brackets, stored as a list value.
pub fn parse_bracketed_posints(exactlength: Option<usize>, maxlength: Option<usize>) -> SearchParser {
    SearchParser::new(
        ParserPolicy::default().clean_info().error_is_safe(),
        move |inp, query, ctx| {
            let len = if inp == "[]" { 0 } else { inp.matches(',').count() + 1 };
            let fits = grammar::is_bracketed_posint(inp)
                && exactlength.map_or(true, |n| len == n)
                && maxlength.map_or(true, |m| len <= m);
            if !fits {
                return Err(SearchParsingError::Semantic(bracketed_hint(exactlength, maxlength)));
            }
            query.insert(ctx.qfield, Constraint::value(split_list(inp)?));
            Ok(())
        },
    )
}

pub fn parse_bracketed_rats() -> SearchParser {
    SearchParser::new(
        ParserPolicy::default().clean_info().error_is_safe(),
        |inp, query, ctx| {
            if !grammar::is_bracketed_rat(inp) || !inp.ends_with(']') {
                return Err(SearchParsingError::Semantic(
                    "It needs to be a list of rational numbers in square brackets, such as [1/2,3] or [-1,0]"
                        .to_string(),
                ));
            }
            let inner = &inp[1..inp.len() - 1];
            let values = if inner.is_empty() {
                Vec::new()
            } else {
                inner
                    .split(',')
                    .map(parse_ratio)
                    .collect::<SearchResult<Vec<_>>>()?
            };
            query.insert(ctx.qfield, Constraint::value(values));
            Ok(())
        },
    )
}

/// `[1,2,3]` or `1,2,3`, passed through `process` to build the stored value.
pub fn parse_list<F>(process: F) -> SearchParser
where
    F: Fn(Vec<i64>) -> Scalar + Send + Sync + 'static,
{
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        let cleaned = inp.replace(['[', ']'], "");
        let values = cleaned
            .split(',')
            .map(parse_i64)
            .collect::<SearchResult<Vec<_>>>()?;
        query.insert(ctx.qfield, Constraint::Value(process(values)));
        Ok(())
    })
}

/// Yes/no fields. Inputs listed in `blank` and `Any` leave the query alone.
pub fn parse_bool(blank: Vec<String>) -> SearchParser {
    parse_bool_with(blank, Scalar::from)
}

/// [`parse_bool`] storing `process(flag)` instead of the flag itself.
pub fn parse_bool_with<F>(blank: Vec<String>, process: F) -> SearchParser
where
    F: Fn(bool) -> Scalar + Send + Sync + 'static,
{
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        if blank.iter().any(|b| b == inp) {
            return Ok(());
        }
        match inp {
            "True" | "yes" | "1" | "even" => {
                query.insert(ctx.qfield, Constraint::Value(process(true)));
            }
            "False" | "no" | "-1" | "0" | "odd" => {
                query.insert(ctx.qfield, Constraint::Value(process(false)));
            }
            "Any" => {}
            _ => return Err(SearchParsingError::Semantic("It must be True or False.".to_string())),
        }
        Ok(())
    })
}

/// Three-valued flag stored as 1 / -1 / 0, where 0 means unknown.
pub fn parse_bool_unknown() -> SearchParser {
    SearchParser::new(ParserPolicy::default(), |inp, query, ctx| {
        let constraint = match inp {
            "yes" => Constraint::value(1i64),
            "no" => Constraint::value(-1i64),
            "unknown" => Constraint::value(0i64),
            "not_no" => Constraint::range(Some(Scalar::Int(0)), None),
            "not_yes" => Constraint::range(None, Some(Scalar::Int(0))),
            _ => {
                return Err(SearchParsingError::Semantic(
                    "It must be yes, no, not_no, not_yes or unknown.".to_string(),
                ))
            }
        };
        query.insert(ctx.qfield, constraint);
        Ok(())
    })
}

fn describe_allowed(allowed: &[String]) -> String {
    match allowed {
        [] => "unspecified".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Accepts only the listed strings.
pub fn parse_restricted(allowed: Vec<String>, blank: Vec<String>) -> SearchParser {
    parse_restricted_with(allowed, blank, |inp: &str| Scalar::from(inp))
}

/// [`parse_restricted`] storing `process(input)` for an accepted input.
pub fn parse_restricted_with<F>(allowed: Vec<String>, blank: Vec<String>, process: F) -> SearchParser
where
    F: Fn(&str) -> Scalar + Send + Sync + 'static,
{
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        if blank.iter().any(|b| b == inp) {
            return Ok(());
        }
        if !allowed.iter().any(|a| a == inp) {
            return Err(SearchParsingError::Semantic(format!(
                "It must be {}",
                describe_allowed(&allowed)
            )));
        }
        query.insert(ctx.qfield, Constraint::Value(process(inp)));
        Ok(())
    })
}

/// Stores the cleaned input after applying `func`.
pub fn parse_noop<F>(func: F) -> SearchParser
where
    F: Fn(&str) -> Scalar + Send + Sync + 'static,
{
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        query.insert(ctx.qfield, Constraint::Value(func(inp)));
        Ok(())
    })
}

/// `a1=3,a4=-2` constrains `qfield.1` and `qfield.4`, each index moved by `shift`.
pub fn parse_equality_constraints(prefix: impl Into<String>, shift: i64) -> SearchParser {
    parse_equality_constraints_with(prefix, shift, parse_int)
}

/// [`parse_equality_constraints`] with the right-hand sides read by `parse_value`.
pub fn parse_equality_constraints_with<F>(prefix: impl Into<String>, shift: i64, parse_value: F) -> SearchParser
where
    F: Fn(&str) -> SearchResult<Scalar> + Send + Sync + 'static,
{
    let prefix = prefix.into();
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        for piece in inp.split(',') {
            let Some((name, value)) = piece.trim().split_once('=').filter(|(_, v)| !v.contains('=')) else {
                return Err(SearchParsingError::Semantic(format!(
                    "It must be a comma separated list of expressions of the form {}N=T",
                    prefix
                )));
            };
            let name = name.trim();
            let Some(index) = name.strip_prefix(prefix.as_str()) else {
                return Err(SearchParsingError::Semantic(format!(
                    "{} does not start with {}",
                    name, prefix
                )));
            };
            let index = parse_i64(index)?.checked_add(shift).ok_or_else(|| {
                SearchParsingError::Semantic(format!("The index in {} is out of range", name))
            })?;
            query.insert(
                format!("{}.{}", ctx.qfield, index),
                Constraint::Value(parse_value(value.trim())?),
            );
        }
        Ok(())
    })
}

/// Canonicalises the input through `resolver`; its errors reach the user as-is.
pub fn parse_label(resolver: Arc<dyn LabelResolver>) -> SearchParser {
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        let label = resolver.resolve(inp)?;
        query.insert(ctx.qfield, Constraint::value(label));
        Ok(())
    })
}

/// What a subset field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetItems {
    /// Integers, ranges allowed, at most `max_count` of them after expansion.
    Integers { max_count: usize },
    /// Comma separated labels. With `multiset`, repeats are kept apart by
    /// an occurrence suffix.
    Labels { multiset: bool },
}

/// Integer-set column holding a value derived from the whole set.
#[derive(Clone)]
pub struct CanonicalField {
    pub field: String,
    pub derive: Arc<dyn Fn(&[i64]) -> Scalar + Send + Sync>,
}

impl std::fmt::Debug for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalField")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

fn subset_policy(items: SubsetItems) -> ParserPolicy {
    match items {
        SubsetItems::Integers { .. } => ParserPolicy::default().clean_info().prep_ranges(),
        SubsetItems::Labels { .. } => ParserPolicy::default().clean_info(),
    }
}

fn compile_subset(
    inp: &str,
    query: &mut Query,
    qfield: &str,
    items: SubsetItems,
    mode: SubsetMode,
    canonical: Option<&CanonicalField>,
) -> SearchResult<()> {
    match items {
        SubsetItems::Integers { max_count } => {
            let values = enumerate_bounded(inp, Some(max_count), None)?;
            let canonical = canonical.map(|c| Canonical::<'_, i64> {
                field: c.field.as_str(),
                derive: &*c.derive,
            });
            apply_subset(values, query, qfield, mode, canonical.as_ref())
        }
        SubsetItems::Labels { multiset } => {
            let labels: Vec<&str> = inp.split(',').filter(|s| !s.is_empty()).collect();
            if labels.is_empty() {
                return Err(SearchParsingError::Semantic(
                    "It needs to be a comma-separated list of labels.".to_string(),
                ));
            }
            let labels = if multiset {
                multiset_encode(&labels)
            } else {
                labels.into_iter().map(str::to_string).collect()
            };
            apply_subset::<String>(labels, query, qfield, mode, None)
        }
    }
}

pub fn parse_subset(items: SubsetItems, mode: SubsetMode, canonical: Option<CanonicalField>) -> SearchParser {
    SearchParser::new(subset_policy(items), move |inp, query, ctx| {
        compile_subset(inp, query, ctx.qfield, items, mode, canonical.as_ref())
    })
}

/// Subset field whose mode was typed by the user next to it. The mode is
/// only read once the field itself has input, and an unknown mode is
/// reported against the field like any other bad input.
pub fn parse_subset_by_mode(items: SubsetItems, mode: impl Into<String>, canonical: Option<CanonicalField>) -> SearchParser {
    let mode = mode.into();
    SearchParser::new(subset_policy(items), move |inp, query, ctx| {
        let mode: SubsetMode = mode.trim().parse().map_err(|_| {
            SearchParsingError::Semantic(format!(
                "The mode '{}' must be include, exclude, subset or exactly.",
                mode
            ))
        })?;
        compile_subset(inp, query, ctx.qfield, items, mode, canonical.as_ref())
    })
}

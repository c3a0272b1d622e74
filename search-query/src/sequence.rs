//! Parsers for array columns searched position by position.

use crate::combine::fold_or;
use crate::errors::{SearchParsingError, SearchResult};
use crate::grammar;
use crate::parser::{ParserPolicy, SearchParser};
use crate::query::{Constraint, Fragment, Ops, Query, Scalar};
use crate::range::compile_range;
use crate::scalar::{parse_int, parse_string, SingletonParser};

/// Element type of the searched array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SingletonKind {
    #[default]
    Int,
    Str,
}

impl SingletonKind {
    fn parser(self) -> &'static SingletonParser {
        match self {
            SingletonKind::Int => &parse_int,
            SingletonKind::Str => &parse_string,
        }
    }

    /// Whether `value` may be used as an exact array member in `$all`.
    fn is_exact(self, value: &Scalar) -> bool {
        match (self, value) {
            (SingletonKind::Int, Scalar::Int(_)) => true,
            (SingletonKind::Str, Scalar::Str(s)) => !s.contains('-') && !s.contains(','),
            _ => false,
        }
    }
}

/// Bracketed groups stay whole; everything between them is split on commas.
fn split_parts(inp: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for piece in grammar::split_bracketed(inp) {
        if piece.is_empty() {
            continue;
        }
        if piece.starts_with('[') {
            parts.push(piece);
        } else {
            parts.extend(piece.split(',').map(str::trim).filter(|s| !s.is_empty()));
        }
    }
    parts
}

fn constraint_for(token: &str, key: &str, parser: &SingletonParser) -> SearchResult<Constraint> {
    match compile_range(token, key, parser)? {
        Fragment::Field(_, constraint) => Ok(constraint),
        Fragment::Or(_) => Err(SearchParsingError::Programming(format!(
            "position '{}' compiled to a disjunction",
            token
        ))),
    }
}

fn bracket_inner(part: &str) -> &str {
    part.strip_prefix('[')
        .and_then(|p| p.strip_suffix(']'))
        .unwrap_or(part)
}

/// Searches the leading entries of an array column.
///
/// `[1,2-4]` constrains `qfield.0` to 1 and `qfield.1` to 2..4 (indexes moved
/// by `index_shift`), and also requires the array to contain 1 and to have an
/// element in 2..4. A bare token constrains only the first position. Several
/// bracketed groups or tokens are alternatives.
pub fn parse_list_start(index_shift: i64, kind: SingletonKind) -> SearchParser {
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        let parser = kind.parser();
        let qfield = ctx.qfield;
        let make_sub_query = |part: &str| -> SearchResult<Query> {
            let mut sub = Query::new();
            if !part.starts_with('[') {
                let key = format!("{}.{}", qfield, index_shift);
                let constraint = constraint_for(part, &key, parser)?;
                sub.insert(key, constraint);
                return Ok(sub);
            }
            let mut exact = Vec::new();
            let mut first_range = None;
            for (i, val) in bracket_inner(part).split(',').enumerate() {
                let key = format!("{}.{}", qfield, i as i64 + index_shift);
                let constraint = constraint_for(val, &key, parser)?;
                match &constraint {
                    Constraint::Value(v) if kind.is_exact(v) => exact.push(v.clone()),
                    Constraint::Ops(ops) if first_range.is_none() => first_range = Some(ops.clone()),
                    _ => {}
                }
                sub.insert(key, constraint);
            }
            let whole = Ops {
                all: (!exact.is_empty()).then_some(exact),
                elem_match: first_range.map(Box::new),
                ..Default::default()
            };
            if !whole.is_empty() {
                sub.insert(qfield, Constraint::Ops(whole));
            }
            Ok(sub)
        };
        let parts = split_parts(inp);
        match parts.as_slice() {
            [] => {}
            [only] => query.update(make_sub_query(*only)?),
            _ => {
                let alternatives = parts
                    .iter()
                    .map(|part| make_sub_query(*part))
                    .collect::<SearchResult<Vec<_>>>()?;
                fold_or(Fragment::Or(alternatives), query);
            }
        }
        Ok(())
    })
}

/// Options for [`parse_string_start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringStart {
    /// Joins the segments of the stored string.
    pub sep: String,
    /// Column that holds the first segment on its own; single-segment input
    /// is matched there with full range support.
    pub first_field: Option<String>,
    pub kind: SingletonKind,
    /// Segments every match starts with.
    pub initial_segment: Vec<String>,
}

impl Default for StringStart {
    fn default() -> Self {
        Self {
            sep: " ".to_string(),
            first_field: None,
            kind: SingletonKind::Int,
            initial_segment: Vec::new(),
        }
    }
}

const NONEMPTY_MSG: &str = "Every count specified must be nonempty.";
const NO_RANGES_MSG: &str = "Ranges not supported.";

fn has_inner_dash(s: &str) -> bool {
    s.char_indices().any(|(i, c)| i > 0 && c == '-')
}

/// Prefix search over a separator-joined string column: `[2,1]` matches
/// values starting with `"2 1 "`.
pub fn parse_string_start(options: StringStart) -> SearchParser {
    SearchParser::new(ParserPolicy::default(), move |inp, query, ctx| {
        let parser = options.kind.parser();
        let prefix = |segments: &[&str]| -> SearchResult<Constraint> {
            if segments.iter().any(|s| has_inner_dash(s)) {
                return Err(SearchParsingError::Semantic(NO_RANGES_MSG.to_string()));
            }
            // Configured leading segments are taken as written
            let fixed = options.initial_segment.len();
            let mut joined = String::new();
            for (i, &segment) in segments.iter().enumerate() {
                if i < fixed {
                    joined.push_str(segment);
                } else {
                    joined.push_str(&parser(segment)?.to_string());
                }
                joined.push_str(&options.sep);
            }
            Ok(Constraint::Ops(Ops::prefix(joined)))
        };
        let make_sub_query = |part: &str| -> SearchResult<Query> {
            let part = part.trim();
            if part.is_empty() {
                return Err(SearchParsingError::Semantic(NONEMPTY_MSG.to_string()));
            }
            let mut segments: Vec<&str> = options.initial_segment.iter().map(String::as_str).collect();
            if part.starts_with('[') {
                segments.extend(bracket_inner(part).split(',').map(str::trim));
                if segments.iter().any(|s| s.is_empty()) {
                    return Err(SearchParsingError::Semantic(NONEMPTY_MSG.to_string()));
                }
                if let (Some(first), [only]) = (&options.first_field, segments.as_slice()) {
                    return Ok(Query::single(first.clone(), constraint_for(only, first, parser)?));
                }
            } else if let Some(first) = &options.first_field {
                return Ok(Query::single(first.clone(), constraint_for(part, first, parser)?));
            } else {
                segments.push(part);
            }
            Ok(Query::single(ctx.qfield, prefix(&segments)?))
        };
        let parts = split_parts(inp);
        match parts.as_slice() {
            [] => {}
            [only] => query.update(make_sub_query(*only)?),
            _ => {
                let alternatives = parts
                    .iter()
                    .map(|part| make_sub_query(*part))
                    .collect::<SearchResult<Vec<_>>>()?;
                fold_or(Fragment::Or(alternatives), query);
            }
        }
        Ok(())
    })
}

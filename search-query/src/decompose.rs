use crate::errors::{SearchParsingError, SearchResult};
use crate::grammar;
use crate::parser::{escape_html, SearchInfo};
use crate::scalar::parse_i64;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

pub const INTEGER_LIST_HINT: &str = "It needs to be an integer (such as 25), a range of integers (such as 2-10 or 2..10), or a comma-separated list of these (such as 4,9,16 or 4-25, 81-121).";

/// One piece of a decomposed integer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Single(i64),
    /// Inclusive bounds.
    Interval(i64, i64),
}

/// Splits an integer token into singles and inclusive intervals, in input
/// order. With `split_on_zero`, an interval crossing zero is cut into its
/// negative and positive halves and zero itself is dropped.
pub fn decompose(token: &str, split_on_zero: bool) -> SearchResult<Vec<Span>> {
    let token = token.replace(' ', "");
    if token.contains(',') {
        let mut spans = Vec::new();
        for piece in token.split(',') {
            spans.extend(decompose(piece, split_on_zero)?);
        }
        return Ok(spans);
    }
    let Some((ix, len)) = grammar::find_range_separator(&token, true) else {
        return Ok(vec![Span::Single(parse_i64(&token)?)]);
    };
    let (start, end) = (&token[..ix], &token[ix + len..]);
    if start.is_empty() || end.is_empty() {
        return Err(SearchParsingError::Semantic(INTEGER_LIST_HINT.to_string()));
    }
    let low = parse_i64(start)?;
    let high = parse_i64(end)?;
    if low == high {
        return Ok(vec![Span::Single(low)]);
    }
    if split_on_zero && low < 0 && high > 0 {
        let negative = if low == -1 {
            Span::Single(low)
        } else {
            Span::Interval(low, -1)
        };
        let positive = if high == 1 {
            Span::Single(high)
        } else {
            Span::Interval(1, high)
        };
        return Ok(vec![negative, positive]);
    }
    Ok(vec![Span::Interval(low, high)])
}

/// Expands `token` into the ascending, deduplicated integers it denotes.
///
/// `max_count` caps the result; without `restrict_to` the cap is checked
/// against each interval's width before anything is materialized. With
/// `restrict_to`, only its members are kept and they are drawn from the set
/// itself, so a huge typed interval costs nothing. Callers must pass at least
/// one of the two for user-supplied input.
pub fn enumerate_bounded(
    token: &str,
    max_count: Option<usize>,
    restrict_to: Option<&BTreeSet<i64>>,
) -> SearchResult<Vec<i64>> {
    let spans = decompose(token, false)?;
    let width_cap = max_count.filter(|_| restrict_to.is_none());
    if let Some(max) = width_cap {
        if spans.len() > max {
            return Err(SearchParsingError::TooManyOptions);
        }
    }
    let mut found = BTreeSet::new();
    for span in spans {
        match span {
            Span::Interval(low, high) => {
                if let Some(max) = width_cap {
                    let width = (i128::from(high) - i128::from(low) + 1).max(0);
                    if found.len() as i128 + width > max as i128 {
                        return Err(SearchParsingError::TooManyOptions);
                    }
                }
                if low <= high {
                    match restrict_to {
                        Some(allowed) => found.extend(allowed.range(low..=high).copied()),
                        None => found.extend(low..=high),
                    }
                }
            }
            Span::Single(n) => {
                if restrict_to.map_or(true, |allowed| allowed.contains(&n)) {
                    found.insert(n);
                }
            }
        }
        if let Some(max) = max_count {
            if found.len() > max {
                return Err(SearchParsingError::TooManyOptions);
            }
        }
    }
    Ok(found.into_iter().collect())
}

/// Integers named by a simple list or a single inclusive span. Spans stay
/// lazy so a wide range is never materialized unless iterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntList {
    Values(Vec<i64>),
    Span(RangeInclusive<i64>),
}

impl IntList {
    pub fn to_vec(&self) -> Vec<i64> {
        self.clone().into_iter().collect()
    }

    pub fn contains(&self, n: i64) -> bool {
        match self {
            IntList::Values(values) => values.contains(&n),
            IntList::Span(span) => span.contains(&n),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IntList::Values(values) => values.is_empty(),
            IntList::Span(span) => span.is_empty(),
        }
    }
}

pub enum IntListIter {
    Values(std::vec::IntoIter<i64>),
    Span(RangeInclusive<i64>),
}

impl Iterator for IntListIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        match self {
            IntListIter::Values(iter) => iter.next(),
            IntListIter::Span(iter) => iter.next(),
        }
    }
}

impl IntoIterator for IntList {
    type Item = i64;
    type IntoIter = IntListIter;

    fn into_iter(self) -> IntListIter {
        match self {
            IntList::Values(values) => IntListIter::Values(values.into_iter()),
            IntList::Span(span) => IntListIter::Span(span),
        }
    }
}

/// `"4,9,16"`, `"2-10"`, `"2..10"`, `"[1,2]"` or `"7"`. No mixing of lists
/// and spans; use [`enumerate_bounded`] for that.
pub fn parse_ints_to_list(arg: Option<&str>) -> SearchResult<IntList> {
    let Some(arg) = arg else {
        return Ok(IntList::Values(Vec::new()));
    };
    let mut s = arg.replace(' ', "");
    if s.is_empty() {
        return Ok(IntList::Values(Vec::new()));
    }
    if s.len() >= 2 && s.starts_with('[') && s.ends_with(']') {
        s = s[1..s.len() - 1].to_string();
    }
    if s.contains(',') {
        return s
            .split(',')
            .map(parse_i64)
            .collect::<SearchResult<Vec<_>>>()
            .map(IntList::Values);
    }
    let first = s.chars().next().map_or(0, char::len_utf8);
    let separator = s[first..]
        .find('-')
        .map(|ix| (ix + first, 1))
        .or_else(|| s[first..].find("..").map(|ix| (ix + first, 2)));
    if let Some((ix, len)) = separator {
        let low = parse_i64(&s[..ix])?;
        let high = parse_i64(&s[ix + len..])?;
        return Ok(IntList::Span(low..=high));
    }
    Ok(IntList::Values(vec![parse_i64(&s)?]))
}

/// [`parse_ints_to_list`], flashing the standard integer-list message into
/// `info` when the input is rejected.
pub fn parse_ints_to_list_flash(arg: Option<&str>, name: &str, info: &mut SearchInfo) -> SearchResult<IntList> {
    parse_ints_to_list(arg).inspect_err(|_| {
        info.flash(format!(
            "Error: <span style='color:black'>{}</span> is not a valid input for <span style='color:black'>{}</span>. {}",
            escape_html(arg.unwrap_or_default()),
            escape_html(name),
            INTEGER_LIST_HINT
        ));
        info.mark_error();
    })
}

/// `"[1, 2, 3]"` to `[1, 2, 3]`; the outer characters are dropped unchecked.
pub fn split_list(s: &str) -> SearchResult<Vec<i64>> {
    let s = s.replace(' ', "");
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    let inner = chars.as_str();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner.split(',').map(parse_i64).collect()
}

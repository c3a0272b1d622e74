//! The fixed regular grammars accepted by the search boxes.
//!
//! Patterns are matched the way a prefix matcher would: a pattern only has
//! to match starting at the first character, and it only has to reach the end
//! of the input where the pattern itself says `$`. Several of the bracketed
//! grammars rely on this (`^\[\]|...` accepts anything starting with `[]`).

use regex::Regex;
use std::sync::OnceLock;

const FLOAT_STR: &str = r"((\d+([.]\d*)?)|([.]\d+))(e[-+]?\d+)?";

static SPACES_RE: OnceLock<Regex> = OnceLock::new();
static LIST_RE: OnceLock<Regex> = OnceLock::new();
static LIST_FLOAT_RE: OnceLock<Regex> = OnceLock::new();
static FLOAT_RE: OnceLock<Regex> = OnceLock::new();
static BRACKETED_POSINT_RE: OnceLock<Regex> = OnceLock::new();
static BRACKETED_RAT_RE: OnceLock<Regex> = OnceLock::new();
static QQ_RE: OnceLock<Regex> = OnceLock::new();
static QQ_DEC_RE: OnceLock<Regex> = OnceLock::new();
static LIST_POSINT_RE: OnceLock<Regex> = OnceLock::new();
static LIST_RAT_RE: OnceLock<Regex> = OnceLock::new();
static SIGNED_LIST_RE: OnceLock<Regex> = OnceLock::new();
static BRACKETING_RE: OnceLock<Regex> = OnceLock::new();

fn spaces_re() -> &'static Regex {
    SPACES_RE.get_or_init(|| Regex::new(r"\d\s+\d").unwrap())
}

fn list_re() -> &'static Regex {
    LIST_RE.get_or_init(|| Regex::new(r"^(\d+|(\d*-(\d+)?))(,(\d+|(\d*-(\d+)?)))*$").unwrap())
}

fn list_float_re() -> &'static Regex {
    LIST_FLOAT_RE.get_or_init(|| {
        Regex::new(&format!(
            r"^({0}|{0}-|{0}-{0})(,({0}|{0}-|{0}-{0}))*$",
            FLOAT_STR
        ))
        .unwrap()
    })
}

fn float_re() -> &'static Regex {
    FLOAT_RE.get_or_init(|| Regex::new(&format!("^{}$", FLOAT_STR)).unwrap())
}

fn bracketed_posint_re() -> &'static Regex {
    BRACKETED_POSINT_RE.get_or_init(|| Regex::new(r"^\[\]|\[\d+(,\d+)*\]$").unwrap())
}

fn bracketed_rat_re() -> &'static Regex {
    BRACKETED_RAT_RE.get_or_init(|| {
        Regex::new(r"^\[\]|\[-?(\d+|\d+/\d+)(,-?(\d+|\d+/\d+))*\]$").unwrap()
    })
}

fn qq_re() -> &'static Regex {
    QQ_RE.get_or_init(|| Regex::new(r"^-?\d+(/\d+)?$").unwrap())
}

fn qq_dec_re() -> &'static Regex {
    QQ_DEC_RE.get_or_init(|| Regex::new(r"^\d+((\.\d+)|(/\d+))?$").unwrap())
}

fn list_posint_re() -> &'static Regex {
    LIST_POSINT_RE.get_or_init(|| Regex::new(r"^(\d+)(,\d+)*$").unwrap())
}

fn list_rat_re() -> &'static Regex {
    LIST_RAT_RE.get_or_init(|| {
        let rat = r"(\d+((\.\d+)|(/\d+))?)";
        Regex::new(&format!(
            r"^({0}|({0}-({0})?))(,({0}|({0}-({0})?)))*$",
            rat
        ))
        .unwrap()
    })
}

fn signed_list_re() -> &'static Regex {
    SIGNED_LIST_RE
        .get_or_init(|| Regex::new(r"^(-?\d+|(-?\d+--?\d+))(,(-?\d+|(-?\d+--?\d+)))*$").unwrap())
}

fn bracketing_re() -> &'static Regex {
    BRACKETING_RE.get_or_init(|| Regex::new(r"(\[[^\]]*\])").unwrap())
}

/// Leftmost match must start at offset 0.
fn matches_at_start(re: &Regex, s: &str) -> bool {
    re.find(s).is_some_and(|m| m.start() == 0)
}

/// Whitespace sitting directly between two digits, e.g. `"12 5"`.
pub fn has_ambiguous_spaces(s: &str) -> bool {
    spaces_re().is_match(s)
}

pub fn is_list(s: &str) -> bool {
    matches_at_start(list_re(), s)
}

pub fn is_list_float(s: &str) -> bool {
    matches_at_start(list_float_re(), s)
}

pub fn is_float(s: &str) -> bool {
    matches_at_start(float_re(), s)
}

pub fn is_bracketed_posint(s: &str) -> bool {
    matches_at_start(bracketed_posint_re(), s)
}

pub fn is_bracketed_rat(s: &str) -> bool {
    matches_at_start(bracketed_rat_re(), s)
}

/// A signed rational such as `-3/4` or `12`.
pub fn is_qq(s: &str) -> bool {
    matches_at_start(qq_re(), s)
}

/// A non-negative decimal or fraction such as `0.75` or `3/4`.
pub fn is_qq_dec(s: &str) -> bool {
    matches_at_start(qq_dec_re(), s)
}

pub fn is_list_posint(s: &str) -> bool {
    matches_at_start(list_posint_re(), s)
}

pub fn is_list_rat(s: &str) -> bool {
    matches_at_start(list_rat_re(), s)
}

pub fn is_signed_list(s: &str) -> bool {
    matches_at_start(signed_list_re(), s)
}

/// Splits `s` around bracketed groups, keeping the groups themselves:
/// `"1,[2,3],4"` becomes `["1,", "[2,3]", ",4"]`. Empty pieces are kept so
/// callers see exactly what lay between two groups.
pub fn split_bracketed(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in bracketing_re().find_iter(s) {
        pieces.push(&s[last..m.start()]);
        pieces.push(m.as_str());
        last = m.end();
    }
    pieces.push(&s[last..]);
    pieces
}

/// Locates the interval separator in a token, returning its byte offset and
/// length. The search starts at offset 1 so a leading sign is never taken for
/// a separator; `..` wins over `-` when both occur. A `-` right after a digit
/// followed by `e` belongs to an exponent (`1e-5`) and is skipped.
pub fn find_range_separator(token: &str, split_on_dash: bool) -> Option<(usize, usize)> {
    let bytes = token.as_bytes();
    let first = token.chars().next().map_or(0, char::len_utf8);
    if first == 0 || first >= bytes.len() {
        return None;
    }
    if let Some(ix) = token[first..].find("..") {
        return Some((ix + first, 2));
    }
    if !split_on_dash {
        return None;
    }
    (first..bytes.len())
        .find(|&ix| {
            bytes[ix] == b'-'
                && !(ix >= 2
                    && matches!(bytes[ix - 1], b'e' | b'E')
                    && (bytes[ix - 2].is_ascii_digit() || bytes[ix - 2] == b'.'))
        })
        .map(|ix| (ix, 1))
}

/// Shape of a cleaned search token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Singleton,
    List,
    Interval,
    Bracketed,
}

pub fn classify(token: &str) -> TokenKind {
    if token.len() >= 2 && token.starts_with('[') && token.ends_with(']') {
        TokenKind::Bracketed
    } else if token.contains(',') {
        TokenKind::List
    } else if find_range_separator(token, true).is_some() {
        TokenKind::Interval
    } else {
        TokenKind::Singleton
    }
}

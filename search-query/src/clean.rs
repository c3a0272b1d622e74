use crate::errors::{SearchParsingError, SearchResult};
use crate::grammar;
use regex::Regex;
use std::sync::OnceLock;

static STRIP_WITH_SPACES_RE: OnceLock<Regex> = OnceLock::new();
static STRIP_BRACKETS_RE: OnceLock<Regex> = OnceLock::new();

pub const AMBIGUOUS_SPACES_MSG: &str =
    "You have entered spaces in between digits. Please add a comma or delete the spaces.";

fn strip_with_spaces_re() -> &'static Regex {
    STRIP_WITH_SPACES_RE.get_or_init(|| Regex::new(r"[\s<>]").unwrap())
}

fn strip_brackets_re() -> &'static Regex {
    STRIP_BRACKETS_RE.get_or_init(|| Regex::new(r"[<>]").unwrap())
}

/// Rejects whitespace between two digits, which almost always means a
/// missing separator. Must run on the raw input, before any cleaning would
/// glue the digits together.
pub fn check_spaces(raw: &str) -> SearchResult<()> {
    if grammar::has_ambiguous_spaces(raw) {
        return Err(SearchParsingError::Syntax(AMBIGUOUS_SPACES_MSG.to_string()));
    }
    Ok(())
}

/// Removes angle brackets (so the input can be echoed back safely) and,
/// unless `clean_spaces` is false, all whitespace.
pub fn clean_input(raw: &str, clean_spaces: bool) -> String {
    let re = if clean_spaces {
        strip_with_spaces_re()
    } else {
        strip_brackets_re()
    };
    re.replace_all(raw, "").into_owned()
}

/// Normalizes `..` interval separators to `-` and drops spaces.
pub fn prep_ranges(inp: &str) -> String {
    inp.replace("..", "-").replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_strips_brackets_and_spaces() {
        assert_eq!(clean_input(" 1, 2 <b>", true), "1,2b");
        assert_eq!(clean_input("x y <z>", false), "x y z");
    }

    #[test]
    fn test_clean_input_idempotent() {
        for raw in ["1 - 5", "<script>", "a\tb\nc", "[1, 2]", ""] {
            for clean_spaces in [true, false] {
                let once = clean_input(raw, clean_spaces);
                assert_eq!(clean_input(&once, clean_spaces), once);
            }
        }
    }

    #[test]
    fn test_check_spaces() {
        assert!(check_spaces("1, 2").is_ok());
        assert!(check_spaces("1 -2").is_ok());
        let err = check_spaces("12 5").unwrap_err();
        assert_eq!(err, SearchParsingError::Syntax(AMBIGUOUS_SPACES_MSG.to_string()));
    }

    #[test]
    fn test_prep_ranges() {
        assert_eq!(prep_ranges("2..10"), "2-10");
        assert_eq!(prep_ranges("-5..-2, 3"), "-5--2,3");
    }
}

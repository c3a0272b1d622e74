//! Shared helpers for the search-query integration tests

#![allow(dead_code)]

use search_query::{FieldArgs, Query, SearchInfo, SearchParser, SearchResult};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a search form from `(field, raw input)` pairs
pub fn form(pairs: &[(&str, &str)]) -> SearchInfo {
    pairs.iter().copied().collect()
}

/// Run one parser over `field` of `info` into `query`
pub fn apply(parser: &SearchParser, info: &mut SearchInfo, query: &mut Query, field: &str) -> SearchResult<()> {
    parser.call(info, query, FieldArgs::new(field))
}

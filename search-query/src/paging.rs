use crate::parser::SearchInfo;

pub const DEFAULT_COUNT: i64 = 50;

/// Page size from `info["count"]`, falling back to `default` when it is
/// missing, unparsable or not positive. The value used is written back.
pub fn parse_count(info: &mut SearchInfo, default: i64) -> i64 {
    let count = info
        .get("count")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default);
    info.set("count", count.to_string());
    count
}

/// Offset of the first result from `info["start"]`. A negative start counts
/// back from the end of a page: -1 is the last row of the first page.
/// Call after [`parse_count`]. Falls back to `default` when the wrapped
/// offset does not fit in an `i64`.
pub fn parse_start(info: &SearchInfo, default: i64) -> i64 {
    let start = info.get("start").and_then(|raw| raw.trim().parse::<i64>().ok());
    let count = info
        .get("count")
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|&n| n > 0);
    match (start, count) {
        (Some(start), Some(count)) if start < 0 => 1i64
            .checked_sub((start + 1).div_euclid(count))
            .and_then(|pages| pages.checked_mul(count))
            .and_then(|shift| shift.checked_add(start))
            .unwrap_or(default),
        (Some(start), Some(_)) => start,
        _ => default,
    }
}

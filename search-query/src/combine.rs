use crate::errors::{SearchParsingError, SearchResult};
use crate::parser::{FieldArgs, SearchInfo, SearchParser};
use crate::query::{Fragment, Query};

/// Merges a compiled fragment into `query`. A field fragment is inserted
/// under its key; an OR fragment replaces any disjunction already present.
pub fn fold_or(fragment: Fragment, query: &mut Query) {
    match fragment {
        Fragment::Field(key, constraint) => {
            query.insert(key, constraint);
        }
        Fragment::Or(alternatives) => {
            if let Some(previous) = query.set_or(alternatives) {
                log::debug!("Replaced a disjunction of {} alternatives", previous.len());
            }
        }
    }
}

fn alternatives(side: Query) -> SearchResult<Vec<Query>> {
    if side.alternatives().is_some() && side.field_count() > 0 {
        return Err(SearchParsingError::Programming(
            "paired field compiled to both a disjunction and plain fields".to_string(),
        ));
    }
    let mut side = side;
    match side.take_or() {
        Some(alternatives) => Ok(alternatives),
        None if side.is_empty() => Ok(Vec::new()),
        None => Ok(vec![side]),
    }
}

/// Every left alternative AND-ed with every right alternative. An empty side
/// leaves the other unchanged.
pub fn cartesian_combine(left: Query, right: Query) -> SearchResult<Vec<Query>> {
    let left = alternatives(left)?;
    let right = alternatives(right)?;
    if left.is_empty() {
        return Ok(right);
    }
    if right.is_empty() {
        return Ok(left);
    }
    let mut combined = Vec::with_capacity(left.len() * right.len());
    for a in &left {
        for b in &right {
            if let Some((key, _)) = b.fields().find(|(key, _)| a.contains_key(key)) {
                return Err(SearchParsingError::OverlappingFields(key.to_string()));
            }
            let mut union = a.clone();
            union.update(b.clone());
            combined.push(union);
        }
    }
    Ok(combined)
}

/// Runs two parsers into scratch queries and merges their conjunction into
/// `query`: a single combined alternative is merged directly, several become
/// the disjunction.
pub fn parse_paired_fields(
    info: &mut SearchInfo,
    query: &mut Query,
    first: (&SearchParser, FieldArgs<'_>),
    second: (&SearchParser, FieldArgs<'_>),
) -> SearchResult<()> {
    let mut left = Query::new();
    let mut right = Query::new();
    first.0.call(info, &mut left, first.1)?;
    second.0.call(info, &mut right, second.1)?;
    let mut combined = cartesian_combine(left, right)?;
    match combined.len() {
        0 => {}
        1 => query.update(combined.remove(0)),
        _ => fold_or(Fragment::Or(combined), query),
    }
    Ok(())
}

mod common;

use common::form;
use search_query::{
    cartesian_combine, enumerate_bounded, parse_ints, parse_ints_to_list, parse_paired_fields,
    parse_signed_ints, Constraint, FieldArgs, Query, SearchParsingError, Span,
};
use serde_json::json;

#[test]
fn test_paired_single_values_merge_directly() {
    let mut info = form(&[("weight", "2"), ("level", "11")]);
    let mut query = Query::new();
    let (ints, other) = (parse_ints(), parse_ints());
    parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("weight")),
        (&other, FieldArgs::new("level")),
    )
    .unwrap();
    assert_eq!(query.to_json(), json!({"weight": 2, "level": 11}));
}

#[test]
fn test_paired_lists_distribute() {
    let mut info = form(&[("weight", "2,4"), ("level", "1-10,13")]);
    let mut query = Query::new();
    let ints = parse_ints();
    parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("weight")),
        (&ints, FieldArgs::new("level")),
    )
    .unwrap();
    assert_eq!(
        query.to_json(),
        json!({"$or": [
            {"weight": 2, "level": {"$gte": 1, "$lte": 10}},
            {"weight": 2, "level": 13},
            {"weight": 4, "level": {"$gte": 1, "$lte": 10}},
            {"weight": 4, "level": 13}
        ]})
    );
}

#[test]
fn test_paired_one_side_empty() {
    let mut info = form(&[("level", "5,7")]);
    let mut query = Query::single("rank", Constraint::value(1i64));
    let ints = parse_ints();
    parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("weight")),
        (&ints, FieldArgs::new("level")),
    )
    .unwrap();
    assert_eq!(
        query.to_json(),
        json!({"rank": 1, "$or": [{"level": 5}, {"level": 7}]})
    );
}

#[test]
fn test_paired_nothing_entered() {
    let mut info = form(&[]);
    let mut query = Query::new();
    let ints = parse_ints();
    parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("weight")),
        (&ints, FieldArgs::new("level")),
    )
    .unwrap();
    assert!(query.is_empty());
}

#[test]
fn test_paired_same_qfield_is_a_defect() {
    let mut info = form(&[("a", "1"), ("b", "2")]);
    let mut query = Query::new();
    let ints = parse_ints();
    let err = parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("a").with_qfield("n")),
        (&ints, FieldArgs::new("b").with_qfield("n")),
    )
    .unwrap_err();
    assert_eq!(err, SearchParsingError::OverlappingFields("n".to_string()));
    // Caller defects are not shown to the user
    assert!(info.flashes().is_empty());
}

#[test]
fn test_paired_error_from_one_side() {
    let mut info = form(&[("weight", "2"), ("char", "-3--1x")]);
    let mut query = Query::new();
    let (ints, signed) = (parse_ints(), parse_signed_ints());
    let err = parse_paired_fields(
        &mut info,
        &mut query,
        (&ints, FieldArgs::new("weight")),
        (&signed, FieldArgs::new("char")),
    )
    .unwrap_err();
    assert!(matches!(err, SearchParsingError::Semantic(_)));
    assert!(info.has_error());
    assert!(query.is_empty());
}

#[test]
fn test_cartesian_product_size() {
    let left: Vec<Query> = (0..3)
        .map(|n| Query::single("a", Constraint::value(n as i64)))
        .collect();
    let right: Vec<Query> = (0..4)
        .map(|n| Query::single("b", Constraint::value(n as i64)))
        .collect();
    let mut l = Query::new();
    l.set_or(left);
    let mut r = Query::new();
    r.set_or(right);
    let combined = cartesian_combine(l, r).unwrap();
    assert_eq!(combined.len(), 12);
    assert!(combined.iter().all(|q| q.field_count() == 2));
}

#[test]
fn test_enumeration_helpers() {
    assert_eq!(enumerate_bounded("1-5", None, None).unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        enumerate_bounded("1-1000000", Some(10), None).unwrap_err(),
        SearchParsingError::TooManyOptions
    );
    assert_eq!(
        search_query::decompose("-5-3", true).unwrap(),
        vec![Span::Interval(-5, -1), Span::Interval(1, 3)]
    );
    assert_eq!(
        parse_ints_to_list(Some("2-10")).unwrap().to_vec(),
        (2..=10).collect::<Vec<i64>>()
    );
    assert_eq!(
        parse_ints_to_list(Some("4,9,16")).unwrap().to_vec(),
        vec![4, 9, 16]
    );
}

mod common;

use common::{apply, form, init_logger};
use search_query::{
    parse_bool, parse_floats, parse_ints, parse_label, parse_list_start, parse_restricted,
    parse_subset, AliasTable, FieldArgs, Query, SearchParsingError, SingletonKind, SubsetItems,
    SubsetMode,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_independent_fields_are_anded() {
    init_logger();
    let mut info = form(&[("degree", "2..4"), ("regulator", "0.5-"), ("cm", "no")]);
    let mut query = Query::new();

    apply(&parse_ints(), &mut info, &mut query, "degree").unwrap();
    apply(&parse_floats(), &mut info, &mut query, "regulator").unwrap();
    apply(&parse_bool(vec![]), &mut info, &mut query, "cm").unwrap();

    assert_eq!(
        query.to_json(),
        json!({
            "degree": {"$gte": 2, "$lte": 4},
            "regulator": {"$gte": 0.5},
            "cm": false
        })
    );
    // Cleaned input is echoed back for the integer box
    assert_eq!(info.get("degree"), Some("2-4"));
    assert!(!info.has_error());
}

#[test]
fn test_missing_fields_leave_query_untouched() {
    let mut info = form(&[("degree", "")]);
    let mut query = Query::new();
    apply(&parse_ints(), &mut info, &mut query, "degree").unwrap();
    apply(&parse_ints(), &mut info, &mut query, "conductor").unwrap();
    assert!(query.is_empty());
}

#[test]
fn test_error_is_flashed_once_and_search_abandoned() {
    init_logger();
    let mut info = form(&[("degree", "3"), ("conductor", "1 1")]);
    let mut query = Query::new();

    apply(&parse_ints(), &mut info, &mut query, "degree").unwrap();
    let err = apply(&parse_ints(), &mut info, &mut query, "conductor").unwrap_err();

    assert!(matches!(err, SearchParsingError::Syntax(_)));
    assert!(info.has_error());
    assert_eq!(info.flashes().len(), 1);
    assert!(info.flashes()[0].contains("<span style='color:black'>Conductor</span>"));
    // Earlier fields stay as they were
    assert_eq!(query.to_json(), json!({"degree": 3}));
}

#[test]
fn test_qfield_and_name_overrides() {
    let mut info = form(&[("deg", "x")]);
    let mut query = Query::new();
    let err = parse_ints()
        .call(
            &mut info,
            &mut query,
            FieldArgs::new("deg").with_name("Degree of the field").with_qfield("degree"),
        )
        .unwrap_err();
    assert!(matches!(err, SearchParsingError::Semantic(_)));
    assert!(info.flashes()[0].contains("Degree of the field"));

    let mut info = form(&[("deg", "6")]);
    parse_ints()
        .call(&mut info, &mut query, FieldArgs::new("deg").with_qfield("degree"))
        .unwrap();
    assert_eq!(query.to_json(), json!({"degree": 6}));
}

#[test]
fn test_user_input_is_escaped_in_flash() {
    let parser = parse_restricted(vec!["even".to_string(), "odd".to_string()], vec![]);
    let mut info = form(&[("parity", "\"&'")]);
    let mut query = Query::new();
    assert!(apply(&parser, &mut info, &mut query, "parity").is_err());
    let flash = &info.flashes()[0];
    assert!(flash.starts_with("<span style='color:black'>&quot;&amp;&#x27;</span>"));
    assert!(flash.ends_with("It must be even or odd"));
}

#[test]
fn test_label_resolution() {
    let table: AliasTable = [("Q", "1.1.1.1"), ("Qi", "2.0.4.1")].into_iter().collect();
    let parser = parse_label(Arc::new(table));

    let mut info = form(&[("field", "qi")]);
    let mut query = Query::new();
    apply(&parser, &mut info, &mut query, "field").unwrap();
    assert_eq!(query.to_json(), json!({"field": "2.0.4.1"}));

    let mut info = form(&[("field", "Qzeta7")]);
    let err = apply(&parser, &mut info, &mut query, "field").unwrap_err();
    assert!(matches!(err, SearchParsingError::Resolution(_)));
    assert!(info.has_error());
}

#[test]
fn test_subset_then_list_start() {
    let mut info = form(&[("ramps", "2,5"), ("ainvs", "[0,1-3]")]);
    let mut query = Query::new();

    apply(
        &parse_subset(SubsetItems::Integers { max_count: 100 }, SubsetMode::Exclude, None),
        &mut info,
        &mut query,
        "ramps",
    )
    .unwrap();
    apply(&parse_list_start(0, SingletonKind::Int), &mut info, &mut query, "ainvs").unwrap();

    assert_eq!(
        query.to_json(),
        json!({
            "ramps": {"$notcontains": [2, 5]},
            "ainvs.0": 0,
            "ainvs.1": {"$gte": 1, "$lte": 3},
            "ainvs": {"$all": [0], "$elemMatch": {"$gte": 1, "$lte": 3}}
        })
    );
}

#[test]
fn test_two_or_fields_last_one_wins() {
    let mut info = form(&[("degree", "2,3"), ("rank", "0,1")]);
    let mut query = Query::new();
    apply(&parse_ints(), &mut info, &mut query, "degree").unwrap();
    apply(&parse_ints(), &mut info, &mut query, "rank").unwrap();
    assert_eq!(
        query.to_json(),
        json!({"$or": [{"rank": 0}, {"rank": 1}]})
    );
}

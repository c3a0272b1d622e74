use search_cli::{Config, Registry};
use search_query::{SearchInfo, SearchParsingError};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const FORM: &str = r#"
[paging]
count = 20

[aliases]
label_pattern = '\d+\.\d+\.\d+\.\d+'

[aliases.names]
Q = "1.1.1.1"
"Q(i)" = "2.0.4.1"

[[field]]
name = "field"
kind = "label"
qfield = "base_field"

[[field]]
name = "degree"
kind = "ints"

[[field]]
name = "weight"
kind = "ints"

[[field]]
name = "level"
kind = "ints"
label = "Level of the form"

[[field]]
name = "primes"
kind = "subset"
mode_field = "primes_mode"
product_field = "rad"

[[field]]
name = "galois"
kind = "restricted"
allowed = ["abelian", "solvable"]

[[field]]
name = "code"
kind = "noop"
transform = "upper"

[[pair]]
first = "weight"
second = "level"
"#;

fn registry() -> (Config, Registry) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.toml");
    fs::write(&path, FORM).unwrap();
    let config = Config::load(&path).unwrap();
    let registry = Registry::from_config(&config).unwrap();
    (config, registry)
}

fn form(pairs: &[(&str, &str)]) -> SearchInfo {
    pairs.iter().copied().collect()
}

#[test]
fn test_compile_full_form() {
    let (_, registry) = registry();
    let mut info = form(&[
        ("field", "q(i)"),
        ("degree", "2..4"),
        ("galois", "abelian"),
        ("code", "ab"),
    ]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(
        query.to_json(),
        json!({
            "base_field": "2.0.4.1",
            "degree": {"$gte": 2, "$lte": 4},
            "galois": "abelian",
            "code": "AB"
        })
    );
    assert_eq!(info.get("degree"), Some("2-4"));
}

#[test]
fn test_pair_is_distributed() {
    let (_, registry) = registry();
    let mut info = form(&[("weight", "2,4"), ("level", "11")]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(
        query.to_json(),
        json!({"$or": [
            {"weight": 2, "level": 11},
            {"weight": 4, "level": 11}
        ]})
    );
}

#[test]
fn test_subset_mode_from_form() {
    let (_, registry) = registry();

    let mut info = form(&[("primes", "2,3")]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(query.to_json(), json!({"primes": {"$contains": [2, 3]}}));

    let mut info = form(&[("primes", "2,3,5"), ("primes_mode", "exactly")]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(query.to_json(), json!({"rad": 30}));
}

#[test]
fn test_unknown_subset_mode_is_flashed() {
    let (_, registry) = registry();
    let mut info = form(&[("primes", "2,3"), ("primes_mode", "bogus")]);
    let err = registry.compile(&mut info).unwrap_err();
    assert!(matches!(err, SearchParsingError::Semantic(_)));
    assert!(info.has_error());
    assert_eq!(info.flashes().len(), 1);
    assert!(info.flashes()[0].contains("Primes"));
    assert!(info.flashes()[0].contains("include, exclude, subset or exactly"));
}

#[test]
fn test_subset_mode_ignored_without_subset_input() {
    let (_, registry) = registry();
    let mut info = form(&[("degree", "3"), ("primes_mode", "bogus")]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(query.to_json(), json!({"degree": 3}));
    assert!(!info.has_error());
}

#[test]
fn test_equality_strings_and_restricted_transform() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.toml");
    fs::write(
        &path,
        r#"
[[field]]
name = "gens"
kind = "equality_constraints"
prefix = "g"
element = "str"

[[field]]
name = "parity"
kind = "restricted"
allowed = ["Even", "Odd"]
transform = "lower"
"#,
    )
    .unwrap();
    let config = Config::load(&path).unwrap();
    let registry = Registry::from_config(&config).unwrap();
    let mut info = form(&[("gens", "g1=C2"), ("parity", "Odd")]);
    let query = registry.compile(&mut info).unwrap();
    assert_eq!(query.to_json(), json!({"gens.1": "C2", "parity": "odd"}));
}

#[test]
fn test_error_uses_configured_name() {
    let (_, registry) = registry();
    let mut info = form(&[("degree", "3"), ("level", "x")]);
    assert!(registry.compile(&mut info).is_err());
    assert!(info.has_error());
    assert_eq!(info.flashes().len(), 1);
    assert!(info.flashes()[0].contains("Level of the form"));
}

#[test]
fn test_fields_listing() {
    let (config, registry) = registry();
    assert_eq!(config.paging.count, 20);
    let names: Vec<&str> = registry.fields().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["field", "degree", "weight", "level", "primes", "galois", "code"]
    );
    assert!(registry.is_paired("weight"));
    assert!(registry.is_paired("level"));
    assert!(!registry.is_paired("degree"));
    let field = registry.fields().next().unwrap();
    assert_eq!(field.qfield, "base_field");
}

#[test]
fn test_bad_label_pattern() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("form.toml");
    fs::write(
        &path,
        r#"
[aliases]
label_pattern = '(unclosed'

[[field]]
name = "field"
kind = "label"
"#,
    )
    .unwrap();
    let config = Config::load(&path).unwrap();
    let err = Registry::from_config(&config).err().unwrap();
    assert!(err.to_string().contains("Invalid aliases.label_pattern"));
}

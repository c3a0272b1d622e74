use crate::errors::{SearchParsingError, SearchResult};
use crate::query::{Constraint, Ops, Query, Scalar};
use crate::AHashMap;
use std::fmt;
use std::str::FromStr;

/// How a user-supplied set relates to the stored array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubsetMode {
    /// The stored array contains every item.
    #[default]
    Include,
    /// The stored array contains none of the items.
    Exclude,
    /// The stored array is contained in the items.
    Subset,
    /// The stored array equals the items as a set.
    Exactly,
}

impl FromStr for SubsetMode {
    type Err = SearchParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "include" => Ok(SubsetMode::Include),
            "exclude" => Ok(SubsetMode::Exclude),
            "subset" => Ok(SubsetMode::Subset),
            "exactly" => Ok(SubsetMode::Exactly),
            _ => Err(SearchParsingError::Programming(format!(
                "Unrecognized subset mode '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for SubsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubsetMode::Include => "include",
            SubsetMode::Exclude => "exclude",
            SubsetMode::Subset => "subset",
            SubsetMode::Exactly => "exactly",
        };
        write!(f, "{}", s)
    }
}

/// A precomputed column that identifies a set, e.g. the product of a set of
/// primes. Exact matches are written there instead of comparing arrays.
pub struct Canonical<'a, T> {
    pub field: &'a str,
    pub derive: &'a dyn Fn(&[T]) -> Scalar,
}

const CONFLICT: &str = "Cannot specify containment and equality simultaneously";

fn add_condition(query: &mut Query, field: &str, items: Vec<Scalar>, set: fn(&mut Ops, Vec<Scalar>)) -> SearchResult<()> {
    match query.get_mut(field) {
        Some(Constraint::Ops(ops)) => set(ops, items),
        Some(Constraint::Value(_)) => {
            return Err(SearchParsingError::ConflictingConstraint(CONFLICT.to_string()))
        }
        None => {
            let mut ops = Ops::default();
            set(&mut ops, items);
            query.insert(field, Constraint::Ops(ops));
        }
    }
    Ok(())
}

/// Writes the constraint for `items` under `field` according to `mode`.
pub fn apply_subset<T>(
    items: Vec<T>,
    query: &mut Query,
    field: &str,
    mode: SubsetMode,
    canonical: Option<&Canonical<'_, T>>,
) -> SearchResult<()>
where
    T: Ord + Clone + Into<Scalar>,
{
    let scalars = |items: Vec<T>| items.into_iter().map(Into::into).collect::<Vec<Scalar>>();
    match mode {
        SubsetMode::Include => add_condition(query, field, scalars(items), |ops, v| ops.contains = Some(v)),
        SubsetMode::Exclude => add_condition(query, field, scalars(items), |ops, v| ops.not_contains = Some(v)),
        SubsetMode::Subset => add_condition(query, field, scalars(items), |ops, v| ops.contained_in = Some(v)),
        SubsetMode::Exactly => {
            if let Some(canonical) = canonical {
                query.insert(canonical.field, Constraint::Value((canonical.derive)(&items)));
                return Ok(());
            }
            let mut items = items;
            items.sort();
            items.dedup();
            if query.contains_key(field) {
                return Err(SearchParsingError::ConflictingConstraint(CONFLICT.to_string()));
            }
            query.insert(field, Constraint::Value(Scalar::List(scalars(items))));
            Ok(())
        }
    }
}

/// Occurrence suffix: 0 is "A", 25 is "Z", 26 is "BA".
pub fn multiset_code(mut n: usize) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(b'A' + (n % 26) as u8);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Tags each label with its occurrence index so repeated labels stay
/// distinct: `["a", "a", "b"]` becomes `["aA", "aB", "bA"]`.
pub fn multiset_encode<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut seen: AHashMap<&str, usize> = AHashMap::default();
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            let count = seen.entry(label).or_insert(0);
            let code = format!("{}{}", label, multiset_code(*count));
            *count += 1;
            code
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("".parse::<SubsetMode>().unwrap(), SubsetMode::Include);
        assert_eq!("exactly".parse::<SubsetMode>().unwrap(), SubsetMode::Exactly);
        assert!(matches!(
            "superset".parse::<SubsetMode>(),
            Err(SearchParsingError::Programming(_))
        ));
        assert_eq!(SubsetMode::Subset.to_string(), "subset");
    }

    #[test]
    fn test_include_and_exclude_share_field() {
        let mut query = Query::new();
        apply_subset(vec![2i64, 3], &mut query, "primes", SubsetMode::Include, None).unwrap();
        apply_subset(vec![5i64], &mut query, "primes", SubsetMode::Exclude, None).unwrap();
        assert_eq!(
            query.to_json(),
            json!({"primes": {"$contains": [2, 3], "$notcontains": [5]}})
        );
    }

    #[test]
    fn test_subset_mode() {
        let mut query = Query::new();
        apply_subset(vec![2i64, 7], &mut query, "primes", SubsetMode::Subset, None).unwrap();
        assert_eq!(query.to_json(), json!({"primes": {"$containedin": [2, 7]}}));
    }

    #[test]
    fn test_exactly_is_a_set() {
        let mut a = Query::new();
        let mut b = Query::new();
        apply_subset(vec![3i64, 1, 2, 1], &mut a, "s", SubsetMode::Exactly, None).unwrap();
        apply_subset(vec![3i64, 2, 1, 1], &mut b, "s", SubsetMode::Exactly, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_json(), json!({"s": [1, 2, 3]}));
    }

    #[test]
    fn test_conflicts() {
        let mut query = Query::new();
        apply_subset(vec![2i64], &mut query, "s", SubsetMode::Include, None).unwrap();
        assert_eq!(
            apply_subset(vec![2i64], &mut query, "s", SubsetMode::Exactly, None).unwrap_err(),
            SearchParsingError::ConflictingConstraint(CONFLICT.to_string())
        );

        let mut query = Query::single("s", Constraint::value(vec![1i64]));
        assert!(matches!(
            apply_subset(vec![2i64], &mut query, "s", SubsetMode::Include, None),
            Err(SearchParsingError::ConflictingConstraint(_))
        ));
    }

    #[test]
    fn test_canonical_field() {
        let product = |items: &[i64]| Scalar::Int(items.iter().product());
        let canonical: Canonical<'_, i64> = Canonical {
            field: "rad",
            derive: &product,
        };
        let mut query = Query::new();
        apply_subset(vec![2i64, 3, 5], &mut query, "primes", SubsetMode::Exactly, Some(&canonical)).unwrap();
        assert_eq!(query.to_json(), json!({"rad": 30}));
    }

    #[test]
    fn test_multiset_code() {
        assert_eq!(multiset_code(0), "A");
        assert_eq!(multiset_code(25), "Z");
        assert_eq!(multiset_code(26), "BA");
        assert_eq!(multiset_code(27), "BB");
        assert_eq!(multiset_code(26 * 26), "BAA");
    }

    #[test]
    fn test_multiset_encode() {
        assert_eq!(
            multiset_encode(&["a", "a", "b", "a"]),
            vec!["aA", "aB", "bA", "aC"]
        );
        let many: Vec<&str> = std::iter::repeat("x").take(30).collect();
        let encoded = multiset_encode(&many);
        assert_eq!(encoded[26], "xBA");
        assert!(encoded[0] < encoded[1] && encoded[1] < encoded[2]);
    }
}

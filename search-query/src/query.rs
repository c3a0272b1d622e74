use indexmap::IndexMap;
use num_rational::Rational64;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Reserved key holding the top-level disjunction of a [`Query`].
pub const OR_KEY: &str = "$or";

/// A fully resolved value for a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    #[serde(serialize_with = "serialize_rational")]
    Rational(Rational64),
    Str(String),
    List(Vec<Scalar>),
}

fn serialize_rational<S: Serializer>(value: &Rational64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Rational(r) => write!(f, "{}", r),
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<Rational64> for Scalar {
    fn from(r: Rational64) -> Self {
        Scalar::Rational(r)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Scalar {
    fn from(items: Vec<T>) -> Self {
        Scalar::List(items.into_iter().map(Into::into).collect())
    }
}

/// Operator form of a constraint. A plain range only sets `min`/`max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ops {
    #[serde(rename = "$gte", skip_serializing_if = "Option::is_none")]
    pub min: Option<Scalar>,
    #[serde(rename = "$lte", skip_serializing_if = "Option::is_none")]
    pub max: Option<Scalar>,
    #[serde(rename = "$contains", skip_serializing_if = "Option::is_none")]
    pub contains: Option<Vec<Scalar>>,
    #[serde(rename = "$notcontains", skip_serializing_if = "Option::is_none")]
    pub not_contains: Option<Vec<Scalar>>,
    #[serde(rename = "$containedin", skip_serializing_if = "Option::is_none")]
    pub contained_in: Option<Vec<Scalar>>,
    #[serde(rename = "$all", skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<Scalar>>,
    #[serde(rename = "$elemMatch", skip_serializing_if = "Option::is_none")]
    pub elem_match: Option<Box<Ops>>,
    #[serde(rename = "$startswith", skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
}

impl Ops {
    pub fn range(min: Option<Scalar>, max: Option<Scalar>) -> Self {
        Ops {
            min,
            max,
            ..Default::default()
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Ops {
            starts_with: Some(prefix.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Ops::default()
    }

    /// True when only the bound members are set.
    pub fn is_range(&self) -> bool {
        (self.min.is_some() || self.max.is_some())
            && *self == Ops::range(self.min.clone(), self.max.clone())
    }
}

/// What a single field must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constraint {
    Value(Scalar),
    Ops(Ops),
}

impl Constraint {
    pub fn value(v: impl Into<Scalar>) -> Self {
        Constraint::Value(v.into())
    }

    pub fn range(min: Option<Scalar>, max: Option<Scalar>) -> Self {
        Constraint::Ops(Ops::range(min, max))
    }

    pub fn as_value(&self) -> Option<&Scalar> {
        match self {
            Constraint::Value(v) => Some(v),
            Constraint::Ops(_) => None,
        }
    }

    pub fn as_ops(&self) -> Option<&Ops> {
        match self {
            Constraint::Ops(ops) => Some(ops),
            Constraint::Value(_) => None,
        }
    }
}

/// Field name to constraint mapping, with an optional top-level disjunction
/// of sub-queries stored under [`OR_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fields: IndexMap<String, Constraint>,
    or: Option<Vec<Query>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(key: impl Into<String>, constraint: Constraint) -> Self {
        let mut query = Query::new();
        query.insert(key, constraint);
        query
    }

    pub fn insert(&mut self, key: impl Into<String>, constraint: Constraint) -> Option<Constraint> {
        self.fields.insert(key.into(), constraint)
    }

    pub fn get(&self, key: &str) -> Option<&Constraint> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Constraint> {
        self.fields.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Constraint> {
        self.fields.shift_remove(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn alternatives(&self) -> Option<&[Query]> {
        self.or.as_deref()
    }

    /// Replaces any existing disjunction.
    pub fn set_or(&mut self, alternatives: Vec<Query>) -> Option<Vec<Query>> {
        self.or.replace(alternatives)
    }

    pub fn take_or(&mut self) -> Option<Vec<Query>> {
        self.or.take()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.or.is_none()
    }

    /// Shallow merge: every field of `other` overwrites ours, and so does its
    /// disjunction when it has one.
    pub fn update(&mut self, other: Query) {
        self.fields.extend(other.fields);
        if let Some(or) = other.or {
            self.or = Some(or);
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, constraint) in &self.fields {
            map.insert(
                key.clone(),
                serde_json::to_value(constraint).unwrap_or(serde_json::Value::Null),
            );
        }
        if let Some(or) = &self.or {
            map.insert(
                OR_KEY.to_string(),
                serde_json::Value::Array(or.iter().map(Query::to_json).collect()),
            );
        }
        serde_json::Value::Object(map)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len() + usize::from(self.or.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, constraint) in &self.fields {
            map.serialize_entry(key, constraint)?;
        }
        if let Some(or) = &self.or {
            map.serialize_entry(OR_KEY, or)?;
        }
        map.end()
    }
}

/// Result of compiling one token for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Field(String, Constraint),
    Or(Vec<Query>),
}

impl Fragment {
    pub fn into_query(self) -> Query {
        match self {
            Fragment::Field(key, constraint) => Query::single(key, constraint),
            Fragment::Or(alternatives) => {
                let mut query = Query::new();
                query.set_or(alternatives);
                query
            }
        }
    }
}

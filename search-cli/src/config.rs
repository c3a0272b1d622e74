use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Search form description: which boxes exist and how each one is compiled.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paging: PagingConfig,
    pub aliases: Option<AliasConfig>,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldConfig>,
    #[serde(rename = "pair", default)]
    pub pairs: Vec<PairConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(default)]
    pub start: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            start: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AliasConfig {
    /// Inputs matching this pattern are taken as labels without lookup
    pub label_pattern: Option<String>,
    #[serde(default)]
    pub names: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    Ints,
    IntsBounded,
    SignedInts,
    Floats,
    Rats,
    Rational,
    BracketedPosints,
    BracketedRats,
    List,
    Bool,
    BoolUnknown,
    Restricted,
    Noop,
    EqualityConstraints,
    Label,
    Subset,
    ListStart,
    StringStart,
}

impl std::fmt::Display for ParserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParserKind::Ints => "ints",
            ParserKind::IntsBounded => "ints_bounded",
            ParserKind::SignedInts => "signed_ints",
            ParserKind::Floats => "floats",
            ParserKind::Rats => "rats",
            ParserKind::Rational => "rational",
            ParserKind::BracketedPosints => "bracketed_posints",
            ParserKind::BracketedRats => "bracketed_rats",
            ParserKind::List => "list",
            ParserKind::Bool => "bool",
            ParserKind::BoolUnknown => "bool_unknown",
            ParserKind::Restricted => "restricted",
            ParserKind::Noop => "noop",
            ParserKind::EqualityConstraints => "equality_constraints",
            ParserKind::Label => "label",
            ParserKind::Subset => "subset",
            ParserKind::ListStart => "list_start",
            ParserKind::StringStart => "string_start",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemsKind {
    #[default]
    Integers,
    Labels,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Int,
    Str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    #[default]
    None,
    Lower,
    Upper,
}

#[derive(Debug, Deserialize)]
pub struct FieldConfig {
    /// Key of the input box
    pub name: String,
    pub kind: ParserKind,
    /// Query key, when it differs from `name`
    pub qfield: Option<String>,
    /// Name shown in error messages
    pub label: Option<String>,

    // ints_bounded
    pub min: Option<i64>,
    pub max: Option<i64>,

    // bracketed_posints
    pub exactlength: Option<usize>,
    pub maxlength: Option<usize>,

    // bool, restricted
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub blank: Vec<String>,

    // noop, restricted
    #[serde(default)]
    pub transform: Transform,

    // equality_constraints
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub shift: i64,

    // subset
    #[serde(default)]
    pub items: ItemsKind,
    #[serde(default = "default_max_options")]
    pub max_options: usize,
    #[serde(default)]
    pub multiset: bool,
    pub mode: Option<String>,
    /// Input box holding the subset mode chosen by the user
    pub mode_field: Option<String>,
    /// Column holding the product of an integer set, used for exact matches
    pub product_field: Option<String>,

    // list_start, string_start
    #[serde(default)]
    pub index_shift: i64,
    /// Element type; for equality_constraints, the type of the right-hand sides
    #[serde(default)]
    pub element: ElementKind,
    #[serde(default = "default_sep")]
    pub sep: String,
    pub first_field: Option<String>,
    #[serde(default)]
    pub initial_segment: Vec<String>,
}

impl FieldConfig {
    pub fn qfield(&self) -> &str {
        self.qfield.as_deref().unwrap_or(&self.name)
    }
}

/// Two fields whose alternatives are combined pairwise.
#[derive(Debug, Deserialize)]
pub struct PairConfig {
    pub first: String,
    pub second: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn validate(&self) -> Result<()> {
        if self.paging.count <= 0 {
            bail!("paging.count must be positive, got {}", self.paging.count);
        }
        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                bail!("Field '{}' is defined more than once", field.name);
            }
            match field.kind {
                ParserKind::IntsBounded => match (field.min, field.max) {
                    (Some(min), Some(max)) if min <= max => {}
                    _ => bail!("Field '{}' needs min <= max", field.name),
                },
                ParserKind::Label if self.aliases.is_none() => {
                    bail!("Field '{}' is a label field but no [aliases] table is configured", field.name)
                }
                ParserKind::Subset if field.mode.is_some() && field.mode_field.is_some() => {
                    bail!("Field '{}' sets both mode and mode_field", field.name)
                }
                _ => {}
            }
        }
        let mut paired = HashSet::new();
        for pair in &self.pairs {
            for name in [&pair.first, &pair.second] {
                if self.field(name).is_none() {
                    bail!("Pair refers to unknown field '{}'", name);
                }
                if !paired.insert(name.as_str()) {
                    bail!("Field '{}' appears in more than one pair", name);
                }
            }
        }
        Ok(())
    }
}

// Default functions
fn default_count() -> i64 {
    search_query::DEFAULT_COUNT
}

fn default_prefix() -> String {
    "a".to_string()
}

fn default_max_options() -> usize {
    1000
}

fn default_sep() -> String {
    " ".to_string()
}

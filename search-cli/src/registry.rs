use crate::config::{Config, ElementKind, FieldConfig, ItemsKind, ParserKind, Transform};
use anyhow::{Context, Result};
use regex::Regex;
use search_query::scalar::parse_string;
use search_query::{
    parse_bool, parse_bool_unknown, parse_bracketed_posints, parse_bracketed_rats,
    parse_equality_constraints, parse_equality_constraints_with, parse_floats, parse_ints,
    parse_ints_bounded, parse_label, parse_list, parse_list_start, parse_noop,
    parse_paired_fields, parse_rational, parse_rats, parse_restricted_with, parse_signed_ints,
    parse_string_start, parse_subset, parse_subset_by_mode, AliasTable, CanonicalField,
    FieldArgs, Query, Scalar, SearchInfo, SearchParser, SearchResult, SingletonKind,
    StringStart, SubsetItems, SubsetMode,
};
use std::collections::HashMap;
use std::sync::Arc;

enum Source {
    Fixed(SearchParser),
    /// Subset parser whose mode is picked by the user in another box.
    SubsetByMode {
        items: SubsetItems,
        canonical: Option<CanonicalField>,
        mode_field: String,
    },
}

/// One compiled search box.
pub struct FieldEntry {
    pub name: String,
    pub kind: ParserKind,
    pub qfield: String,
    pub label: Option<String>,
    source: Source,
}

impl FieldEntry {
    fn args(&self) -> FieldArgs<'_> {
        let args = FieldArgs::new(&self.name).with_qfield(&self.qfield);
        match &self.label {
            Some(label) => args.with_name(label),
            None => args,
        }
    }

    fn parser<'a>(&'a self, info: &SearchInfo, built: &'a mut Option<SearchParser>) -> &'a SearchParser {
        match &self.source {
            Source::Fixed(parser) => parser,
            Source::SubsetByMode {
                items,
                canonical,
                mode_field,
            } => {
                let mode = info.get(mode_field).unwrap_or("");
                built.insert(parse_subset_by_mode(*items, mode, canonical.clone()))
            }
        }
    }
}

/// The parsers of a search form, in the order they are applied.
pub struct Registry {
    entries: Vec<FieldEntry>,
    /// First field of each pair to the index of its partner
    partners: HashMap<String, usize>,
    /// Second fields of pairs, compiled together with their partner
    paired_seconds: Vec<String>,
}

impl Registry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let aliases = match &config.aliases {
            Some(aliases) => {
                let mut table: AliasTable = aliases.names.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                if let Some(pattern) = &aliases.label_pattern {
                    let re = Regex::new(pattern)
                        .with_context(|| format!("Invalid aliases.label_pattern: {}", pattern))?;
                    table = table.with_label_pattern(re);
                }
                log::debug!("Loaded {} label aliases", table.len());
                Some(Arc::new(table))
            }
            None => None,
        };

        let entries = config
            .fields
            .iter()
            .map(|field| -> Result<FieldEntry> {
                let source = build_source(field, aliases.as_ref())
                    .with_context(|| format!("Failed to build parser for field '{}'", field.name))?;
                Ok(FieldEntry {
                    name: field.name.clone(),
                    kind: field.kind,
                    qfield: field.qfield().to_string(),
                    label: field.label.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut partners = HashMap::new();
        let mut paired_seconds = Vec::new();
        for pair in &config.pairs {
            let index = entries
                .iter()
                .position(|e| e.name == pair.second)
                .with_context(|| format!("Pair refers to unknown field '{}'", pair.second))?;
            partners.insert(pair.first.clone(), index);
            paired_seconds.push(pair.second.clone());
        }

        Ok(Self {
            entries,
            partners,
            paired_seconds,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    pub fn is_paired(&self, name: &str) -> bool {
        self.partners.contains_key(name) || self.paired_seconds.iter().any(|s| s == name)
    }

    /// Compiles every box of `info` into one query. Stops at the first
    /// error; input errors have been flashed into `info` by then.
    pub fn compile(&self, info: &mut SearchInfo) -> SearchResult<Query> {
        let mut query = Query::new();
        for entry in &self.entries {
            if self.paired_seconds.contains(&entry.name) {
                continue;
            }
            let mut built = None;
            let parser = entry.parser(info, &mut built);
            match self.partners.get(&entry.name) {
                Some(&index) => {
                    let partner = &self.entries[index];
                    let mut partner_built = None;
                    let partner_parser = partner.parser(info, &mut partner_built);
                    parse_paired_fields(
                        info,
                        &mut query,
                        (parser, entry.args()),
                        (partner_parser, partner.args()),
                    )?;
                }
                None => parser.call(info, &mut query, entry.args())?,
            }
        }
        Ok(query)
    }
}

fn singleton_kind(element: ElementKind) -> SingletonKind {
    match element {
        ElementKind::Int => SingletonKind::Int,
        ElementKind::Str => SingletonKind::Str,
    }
}

fn transformed(transform: Transform, s: &str) -> Scalar {
    match transform {
        Transform::None => Scalar::from(s),
        Transform::Lower => Scalar::from(s.to_lowercase()),
        Transform::Upper => Scalar::from(s.to_uppercase()),
    }
}

fn build_source(field: &FieldConfig, aliases: Option<&Arc<AliasTable>>) -> Result<Source> {
    let parser = match field.kind {
        ParserKind::Ints => parse_ints(),
        ParserKind::IntsBounded => {
            let min = field.min.context("ints_bounded needs min")?;
            let max = field.max.context("ints_bounded needs max")?;
            parse_ints_bounded(min, max)
        }
        ParserKind::SignedInts => parse_signed_ints(),
        ParserKind::Floats => parse_floats(),
        ParserKind::Rats => parse_rats(),
        ParserKind::Rational => parse_rational(),
        ParserKind::BracketedPosints => parse_bracketed_posints(field.exactlength, field.maxlength),
        ParserKind::BracketedRats => parse_bracketed_rats(),
        ParserKind::List => parse_list(|values: Vec<i64>| Scalar::from(values)),
        ParserKind::Bool => parse_bool(field.blank.clone()),
        ParserKind::BoolUnknown => parse_bool_unknown(),
        ParserKind::Restricted => {
            let transform = field.transform;
            parse_restricted_with(field.allowed.clone(), field.blank.clone(), move |s: &str| {
                transformed(transform, s)
            })
        }
        ParserKind::Noop => {
            let transform = field.transform;
            parse_noop(move |s: &str| transformed(transform, s))
        }
        ParserKind::EqualityConstraints => match field.element {
            ElementKind::Int => parse_equality_constraints(field.prefix.as_str(), field.shift),
            ElementKind::Str => parse_equality_constraints_with(field.prefix.as_str(), field.shift, parse_string),
        },
        ParserKind::Label => {
            let table = aliases.context("label fields need an [aliases] table")?;
            parse_label(table.clone())
        }
        ParserKind::Subset => {
            let items = match field.items {
                ItemsKind::Integers => SubsetItems::Integers {
                    max_count: field.max_options,
                },
                ItemsKind::Labels => SubsetItems::Labels {
                    multiset: field.multiset,
                },
            };
            let canonical = field.product_field.as_ref().map(|product| CanonicalField {
                field: product.clone(),
                derive: Arc::new(|items: &[i64]| {
                    Scalar::Int(items.iter().fold(1i64, |acc, &n| acc.saturating_mul(n)))
                }),
            });
            if let Some(mode_field) = &field.mode_field {
                return Ok(Source::SubsetByMode {
                    items,
                    canonical,
                    mode_field: mode_field.clone(),
                });
            }
            let mode: SubsetMode = field.mode.as_deref().unwrap_or("").parse()?;
            parse_subset(items, mode, canonical)
        }
        ParserKind::ListStart => parse_list_start(field.index_shift, singleton_kind(field.element)),
        ParserKind::StringStart => parse_string_start(StringStart {
            sep: field.sep.clone(),
            first_field: field.first_field.clone(),
            kind: singleton_kind(field.element),
            initial_segment: field.initial_segment.clone(),
        }),
    };
    Ok(Source::Fixed(parser))
}

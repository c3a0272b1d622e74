pub mod clean;
pub mod combine;
pub mod decompose;
pub mod errors;
pub mod grammar;
pub mod paging;
pub mod parser;
pub mod parsers;
pub mod query;
pub mod range;
pub mod resolver;
pub mod scalar;
pub mod sequence;
pub mod subset;

pub use clean::{check_spaces, clean_input, prep_ranges};
pub use combine::{cartesian_combine, fold_or, parse_paired_fields};
pub use decompose::{
    decompose, enumerate_bounded, parse_ints_to_list, parse_ints_to_list_flash, split_list,
    IntList, Span,
};
pub use errors::{ErrorKind, SearchParsingError, SearchResult};
pub use paging::{parse_count, parse_start, DEFAULT_COUNT};
pub use parser::{display_name, FieldArgs, ParseCtx, ParserPolicy, SearchInfo, SearchParser};
pub use parsers::*;
pub use query::{Constraint, Fragment, Ops, Query, Scalar, OR_KEY};
pub use range::{compile_range, compile_range_rat, RangeArg, RangeCompiler};
pub use resolver::{AliasTable, LabelResolver};
pub use scalar::SingletonParser;
pub use sequence::{parse_list_start, parse_string_start, SingletonKind, StringStart};
pub use subset::{apply_subset, multiset_code, multiset_encode, Canonical, SubsetMode};

use std::{collections::HashMap, hash::BuildHasherDefault};
pub type AHashMap<K, V> = HashMap<K, V, BuildHasherDefault<ahash::AHasher>>;

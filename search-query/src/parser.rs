use crate::clean;
use crate::errors::{SearchParsingError, SearchResult};
use crate::query::Query;
use indexmap::IndexMap;

/// Request-scoped raw input: field name to the string typed into its box,
/// plus whatever error messages were flashed while compiling it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    values: IndexMap<String, String>,
    errored: bool,
    flashes: Vec<String>,
}

impl SearchInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.shift_remove(field)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_error(&self) -> bool {
        self.errored
    }

    pub fn mark_error(&mut self) {
        self.errored = true;
    }

    pub fn flash(&mut self, message: String) {
        self.flashes.push(message);
    }

    pub fn flashes(&self) -> &[String] {
        &self.flashes
    }

    pub fn take_flashes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.flashes)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut info = SearchInfo::new();
        for (field, value) in iter {
            info.set(field, value);
        }
        info
    }
}

/// Behavioral flags shared by a family of field parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserPolicy {
    /// Write the cleaned input back into [`SearchInfo`] on success.
    pub clean_info: bool,
    /// Rewrite `..` to `-` before parsing.
    pub prep_ranges: bool,
    /// Drop every `+` before parsing.
    pub prep_plus: bool,
    /// Forward the display name to the raw parse function.
    pub pass_name: bool,
    pub default_field: Option<String>,
    pub default_name: Option<String>,
    pub default_qfield: Option<String>,
    /// Error messages contain no user input and may be shown unescaped.
    pub error_is_safe: bool,
    /// Strip all whitespace while cleaning.
    pub clean_spaces: bool,
}

impl Default for ParserPolicy {
    fn default() -> Self {
        Self {
            clean_info: false,
            prep_ranges: false,
            prep_plus: false,
            pass_name: false,
            default_field: None,
            default_name: None,
            default_qfield: None,
            error_is_safe: false,
            clean_spaces: true,
        }
    }
}

impl ParserPolicy {
    pub fn clean_info(mut self) -> Self {
        self.clean_info = true;
        self
    }

    pub fn prep_ranges(mut self) -> Self {
        self.prep_ranges = true;
        self
    }

    pub fn prep_plus(mut self) -> Self {
        self.prep_plus = true;
        self
    }

    pub fn pass_name(mut self) -> Self {
        self.pass_name = true;
        self
    }

    pub fn error_is_safe(mut self) -> Self {
        self.error_is_safe = true;
        self
    }

    pub fn keep_spaces(mut self) -> Self {
        self.clean_spaces = false;
        self
    }

    pub fn default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    pub fn default_qfield(mut self, qfield: impl Into<String>) -> Self {
        self.default_qfield = Some(qfield.into());
        self
    }
}

/// What the raw parse function learns about the field it is compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCtx<'a> {
    pub qfield: &'a str,
    /// Only set when the policy forwards names.
    pub name: Option<&'a str>,
}

/// Per-call overrides of the policy defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldArgs<'a> {
    pub field: Option<&'a str>,
    pub name: Option<&'a str>,
    pub qfield: Option<&'a str>,
}

impl<'a> FieldArgs<'a> {
    pub fn new(field: &'a str) -> Self {
        Self {
            field: Some(field),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_qfield(mut self, qfield: &'a str) -> Self {
        self.qfield = Some(qfield);
        self
    }
}

pub type RawParse = dyn Fn(&str, &mut Query, &ParseCtx<'_>) -> SearchResult<()> + Send + Sync;

/// A raw parse function wrapped in the shared input and error policy.
pub struct SearchParser {
    policy: ParserPolicy,
    raw: Box<RawParse>,
}

impl std::fmt::Debug for SearchParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchParser")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SearchParser {
    pub fn new<F>(policy: ParserPolicy, raw: F) -> Self
    where
        F: Fn(&str, &mut Query, &ParseCtx<'_>) -> SearchResult<()> + Send + Sync + 'static,
    {
        Self {
            policy,
            raw: Box::new(raw),
        }
    }

    pub fn policy(&self) -> &ParserPolicy {
        &self.policy
    }

    pub fn with_policy(mut self, policy: ParserPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Compiles `info[field]` into `query`.
    ///
    /// Missing or empty input is not an error and leaves `query` untouched.
    /// Input errors are flashed once into `info`, which is then marked as
    /// errored, and returned unchanged; callers should abandon the whole
    /// search when this returns `Err`.
    pub fn call(&self, info: &mut SearchInfo, query: &mut Query, args: FieldArgs<'_>) -> SearchResult<()> {
        let Some(field) = args.field.or(self.policy.default_field.as_deref()) else {
            return Ok(());
        };
        let mut inp = match info.get(field) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => return Ok(()),
        };
        let name = args
            .name
            .map(str::to_string)
            .or_else(|| self.policy.default_name.clone())
            .unwrap_or_else(|| display_name(field));
        let qfield = args
            .qfield
            .or(self.policy.default_qfield.as_deref())
            .unwrap_or(field)
            .to_string();

        match self.apply(&mut inp, query, &qfield, &name) {
            Ok(()) => {
                if self.policy.clean_info {
                    info.set(field, inp);
                }
                Ok(())
            }
            Err(err) if err.is_input_error() => {
                let message = self.error_message(&inp, &name, &err);
                log::warn!("Search field '{}' rejected: {}", field, err);
                info.flash(message);
                info.mark_error();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn apply(&self, inp: &mut String, query: &mut Query, qfield: &str, name: &str) -> SearchResult<()> {
        clean::check_spaces(inp)?;
        *inp = clean::clean_input(inp, self.policy.clean_spaces);
        if self.policy.prep_ranges {
            *inp = clean::prep_ranges(inp);
        }
        if self.policy.prep_plus {
            *inp = inp.replace('+', "");
        }
        let ctx = ParseCtx {
            qfield,
            name: self.policy.pass_name.then_some(name),
        };
        (self.raw)(inp, query, &ctx)?;
        log::debug!("Compiled '{}' for {}", inp, qfield);
        Ok(())
    }

    fn error_message(&self, inp: &str, name: &str, err: &SearchParsingError) -> String {
        let detail = err.to_string();
        if self.policy.error_is_safe {
            format!(
                "<span style='color:black'>{}</span> is not a valid input for <span style='color:black'>{}</span>. {}.",
                escape_html(inp),
                escape_html(name),
                detail
            )
        } else {
            format!(
                "<span style='color:black'>{}</span> is not a valid input for <span style='color:black'>{}</span>. {}",
                escape_html(inp),
                escape_html(name),
                escape_html(&detail)
            )
        }
    }
}

/// `"cm_disc"` becomes `"Cm disc"`.
pub fn display_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Broad classification of a [`SearchParsingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token or ambiguous whitespace.
    Syntax,
    /// Well-formed input that falls outside what the field accepts.
    Semantic,
    /// An alias or label the resolver does not know.
    Resolution,
    /// A defect in the calling code, never caused by user input.
    Programming,
}

/// Error types for compiling search-box input
#[derive(Debug, Clone, PartialEq)]
pub enum SearchParsingError {
    Syntax(String),
    InvalidNumber(String),
    Semantic(String),
    TooManyOptions,
    ConflictingConstraint(String),
    Resolution(String),
    OverlappingFields(String),
    Programming(String),
}

pub type SearchResult<T> = Result<T, SearchParsingError>;

impl SearchParsingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchParsingError::Syntax(_) | SearchParsingError::InvalidNumber(_) => {
                ErrorKind::Syntax
            }
            SearchParsingError::Semantic(_)
            | SearchParsingError::TooManyOptions
            | SearchParsingError::ConflictingConstraint(_) => ErrorKind::Semantic,
            SearchParsingError::Resolution(_) => ErrorKind::Resolution,
            SearchParsingError::OverlappingFields(_) | SearchParsingError::Programming(_) => {
                ErrorKind::Programming
            }
        }
    }

    /// True for errors caused by what the user typed; these are the ones
    /// turned into a flashed message by the parser wrapper.
    pub fn is_input_error(&self) -> bool {
        self.kind() != ErrorKind::Programming
    }
}

impl std::fmt::Display for SearchParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchParsingError::Syntax(msg) => write!(f, "{}", msg),
            SearchParsingError::InvalidNumber(token) => {
                write!(f, "Unable to parse '{}' as a number", token)
            }
            SearchParsingError::Semantic(msg) => write!(f, "{}", msg),
            SearchParsingError::TooManyOptions => write!(f, "Too many options"),
            SearchParsingError::ConflictingConstraint(_) => {
                write!(f, "Cannot specify containment and equality simultaneously")
            }
            SearchParsingError::Resolution(msg) => write!(f, "{}", msg),
            SearchParsingError::OverlappingFields(key) => {
                write!(f, "Paired fields both constrain '{}'", key)
            }
            SearchParsingError::Programming(msg) => write!(f, "Programming error: {}", msg),
        }
    }
}

impl std::error::Error for SearchParsingError {}

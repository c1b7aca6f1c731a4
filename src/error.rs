//! Error types for alphabets, tables, snapshots and code generation.

/// Errors that can occur while building, filling, persisting or emitting a
/// frequency table.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid symbol {:?} at position {position}", as_char(.byte))]
    InvalidSymbol { byte: u8, position: usize },

    #[error("expected {expected} symbols, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("symbol code {code} out of range for alphabet of size {size}")]
    SymbolOutOfRange { code: usize, size: usize },

    #[error("{representation} value {value} outside [{min}, {max}]")]
    RepresentationRange {
        representation: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("non-finite value {value} at index {index} cannot be encoded")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("symbol {:?} appears more than once in alphabet spec", as_char(.0))]
    DuplicateSymbol(u8),

    #[error("range {:?}-{:?} is reversed", as_char(.start), as_char(.end))]
    InvalidRange { start: u8, end: u8 },

    #[error("character {character:?} at position {position} is not a byte")]
    UnsupportedCharacter { character: char, position: usize },

    #[error("alphabet spec expands to no symbols")]
    EmptyAlphabet,

    #[error("order must be at least 1, got {0}")]
    InvalidOrder(usize),

    #[error("{size}^{order} entries does not fit in memory")]
    TableTooLarge { size: usize, order: usize },

    #[error("{0:?} is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary: {0}")]
    Binary(#[from] postcard::Error),
}

fn as_char(byte: &u8) -> char {
    char::from(*byte)
}

/// A specialized Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;

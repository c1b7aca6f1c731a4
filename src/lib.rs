//! Dense n-gram frequency tables.
//!
//! An [`Alphabet`] maps a small set of bytes to dense [`Symbol`] codes. A
//! [`Table`] stores one frequency for every sequence of `n` symbols, as a raw
//! [`Count`], a [`Probability`] or a [`LogProbability`]. Tables can be
//! persisted as JSON or binary snapshots, or emitted as static arrays in Go
//! or C source for embedding in other programs.
//!
//! ```
//! use ngram_tables::{Alphabet, CountTable, Count, Dialect, CodegenOptions};
//!
//! let alphabet = Alphabet::lowercase();
//! let mut counts = CountTable::new(2, 1000, alphabet).unwrap();
//! let key = counts.key("th").unwrap();
//! counts.set(&key, Count(27)).unwrap();
//!
//! let probabilities = counts.to_probability().unwrap();
//! let source = ngram_tables::generate(&probabilities, Dialect::C, &CodegenOptions::default())
//!     .unwrap();
//! assert!(source.contains("static const double freqs[676]"));
//! ```

pub mod alphabet;
pub mod codegen;
pub mod error;
pub mod representation;
pub mod snapshot;
pub mod symbol;
pub mod table;

pub use alphabet::Alphabet;
pub use codegen::{CodegenOptions, Dialect, generate};
pub use error::{Error, Result};
pub use representation::{Count, LogProbability, Probability, Representation};
pub use symbol::Symbol;
pub use table::{CountTable, LogProbabilityTable, ProbabilityTable, Table};

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// A dense code for one alphabet byte.
///
/// Codes only mean something relative to the [`Alphabet`] that produced them:
/// code 0 is the first byte of the alphabet's spec, code 1 the second, and so
/// on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u8);

impl Symbol {
    pub const fn new(code: u8) -> Self {
        Symbol(code)
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for Symbol {
    fn from(code: u8) -> Self {
        Symbol(code)
    }
}

/// Decode every byte of `text` into a symbol, failing on the first byte that
/// is not part of `alphabet`.
pub fn decode(alphabet: &Alphabet, text: &str) -> Result<Vec<Symbol>> {
    text.bytes()
        .enumerate()
        .map(|(position, byte)| {
            alphabet
                .symbol(byte)
                .ok_or(Error::InvalidSymbol { byte, position })
        })
        .collect()
}

/// Turn symbols back into the text they were decoded from.
pub fn encode(alphabet: &Alphabet, symbols: &[Symbol]) -> Result<String> {
    symbols
        .iter()
        .map(|&symbol| {
            alphabet
                .byte(symbol)
                .map(char::from)
                .ok_or(Error::SymbolOutOfRange {
                    code: symbol.index(),
                    size: alphabet.size(),
                })
        })
        .collect()
}

/// Decode `text` as the key of a single n-gram of length `order`.
pub fn ngram(alphabet: &Alphabet, text: &str, order: usize) -> Result<Vec<Symbol>> {
    if text.len() != order {
        return Err(Error::Arity {
            expected: order,
            actual: text.len(),
        });
    }
    decode(alphabet, text)
}

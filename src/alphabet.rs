use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::symbol::{self, Symbol};

pub const LOWERCASE: &str = "a-z";
pub const LOWERCASE_ALPHANUMERIC: &str = "0-9a-z";
pub const ALPHANUMERIC: &str = "0-9A-Za-z";
/// Space through tilde: every printable ASCII byte.
pub const PRINTABLE: &str = " -~";

/// A fixed set of bytes, each assigned a dense symbol code.
///
/// An alphabet is compiled from a spec string made of single bytes and
/// inclusive `start-end` ranges, e.g. `"0-9A-Za-z"`. Codes are handed out in
/// expansion order, so the first byte of the spec gets code 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlphabetSnapshot", into = "AlphabetSnapshot")]
pub struct Alphabet {
    spec: String,
    decode: [Option<Symbol>; 256],
    encode: Vec<u8>,
}

impl Alphabet {
    /// Compile `spec` into an alphabet.
    ///
    /// Fails if the spec expands to nothing, contains a reversed range or
    /// names a byte twice. Chars above U+00FF have no byte and are rejected.
    pub fn new(spec: &str) -> Result<Self> {
        let encode = expand(spec)?;
        if encode.is_empty() {
            return Err(Error::EmptyAlphabet);
        }

        let mut decode = [None; 256];
        for (code, &byte) in encode.iter().enumerate() {
            let slot = &mut decode[byte as usize];
            if slot.is_some() {
                return Err(Error::DuplicateSymbol(byte));
            }
            // No duplicates means at most 256 entries, so every code fits.
            *slot = Some(Symbol::new(code as u8));
        }

        log::debug!("compiled alphabet {spec:?} with {} symbols", encode.len());

        Ok(Self {
            spec: spec.to_owned(),
            decode,
            encode,
        })
    }

    /// Like [`Alphabet::new`], but panics on an invalid spec. Meant for specs
    /// known to be valid, such as the constants in this module.
    pub fn must_new(spec: &str) -> Self {
        match Self::new(spec) {
            Ok(alphabet) => alphabet,
            Err(e) => panic!("invalid alphabet spec {spec:?}: {e}"),
        }
    }

    pub fn lowercase() -> Self {
        Self::must_new(LOWERCASE)
    }

    pub fn lowercase_alphanumeric() -> Self {
        Self::must_new(LOWERCASE_ALPHANUMERIC)
    }

    pub fn alphanumeric() -> Self {
        Self::must_new(ALPHANUMERIC)
    }

    pub fn printable() -> Self {
        Self::must_new(PRINTABLE)
    }

    /// Number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.encode.len()
    }

    /// The spec string this alphabet was compiled from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// The symbol for `byte`, or `None` if the byte is not in the alphabet.
    pub fn symbol(&self, byte: u8) -> Option<Symbol> {
        self.decode[byte as usize]
    }

    /// The byte for `symbol`, or `None` if its code is out of range.
    pub fn byte(&self, symbol: Symbol) -> Option<u8> {
        self.encode.get(symbol.index()).copied()
    }

    /// Decode every byte of `text`, failing fast on the first unknown byte.
    pub fn symbols(&self, text: &str) -> Result<Vec<Symbol>> {
        symbol::decode(self, text)
    }

    /// Inverse of [`Alphabet::symbols`].
    pub fn text(&self, symbols: &[Symbol]) -> Result<String> {
        symbol::encode(self, symbols)
    }

    /// Dense byte to code map; `None` marks bytes outside the alphabet.
    pub fn decode_table(&self) -> &[Option<Symbol>; 256] {
        &self.decode
    }

    /// Dense code to byte map, indexed by symbol code.
    pub fn encode_table(&self) -> &[u8] {
        &self.encode
    }

    /// An iterator over every symbol and its byte, in code order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u8)> + '_ {
        self.encode
            .iter()
            .enumerate()
            .map(|(code, &byte)| (Symbol::new(code as u8), byte))
    }
}

/// Expand a spec into the bytes it names, in spec order. Each char of the
/// spec names the byte with the same value, so only U+0000..=U+00FF are
/// accepted.
fn expand(spec: &str) -> Result<Vec<u8>> {
    let bytes = spec
        .chars()
        .enumerate()
        .map(|(position, character)| {
            u8::try_from(character).map_err(|_| Error::UnsupportedCharacter {
                character,
                position,
            })
        })
        .collect::<Result<Vec<u8>>>()?;

    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if i + 2 < bytes.len() && bytes[i + 1] == b'-' {
            let (start, end) = (bytes[i], bytes[i + 2]);
            if start > end {
                return Err(Error::InvalidRange { start, end });
            }
            out.extend(start..=end);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Persisted form of an alphabet. The dense maps are rebuilt from the spec.
#[derive(Serialize, Deserialize)]
struct AlphabetSnapshot {
    spec: String,
    size: usize,
}

impl From<Alphabet> for AlphabetSnapshot {
    fn from(alphabet: Alphabet) -> Self {
        Self {
            size: alphabet.size(),
            spec: alphabet.spec,
        }
    }
}

impl TryFrom<AlphabetSnapshot> for Alphabet {
    type Error = Error;

    fn try_from(snapshot: AlphabetSnapshot) -> Result<Self> {
        let alphabet = Alphabet::new(&snapshot.spec)?;
        if alphabet.size() != snapshot.size {
            return Err(Error::MalformedSnapshot(format!(
                "alphabet {:?} has {} symbols, snapshot claims {}",
                snapshot.spec,
                alphabet.size(),
                snapshot.size
            )));
        }
        Ok(alphabet)
    }
}

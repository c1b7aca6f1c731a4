//! Persist tables as JSON or as a compact binary envelope.
//!
//! Both forms carry the order `n`, the `total`, the cells in index order as
//! `freqs`, and the `alphabet` (its spec and size; the dense maps are rebuilt
//! from the spec on load).
//!
//! The binary form is a 6-byte header followed by the postcard encoding of
//! the same fields:
//!
//! ```text
//! +------+---------+-----+------------------+
//! | NGRM | version | tag | postcard payload |
//! +------+---------+-----+------------------+
//!   4       1        1
//! ```
//!
//! `tag` identifies the representation, so a count table cannot be loaded as
//! a probability table by accident.
//!
//! JSON has no spelling for infinity, so a log-probability table that still
//! has unset cells can only be stored in binary form.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::representation::Representation;
use crate::table::Table;

pub const MAGIC: [u8; 4] = *b"NGRM";
pub const VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Serialize)]
struct SnapshotRef<'a, R> {
    n: usize,
    total: u64,
    freqs: &'a [R],
    alphabet: &'a Alphabet,
    representation: Option<&'a str>,
}

#[derive(Deserialize)]
struct Snapshot<R> {
    n: usize,
    total: u64,
    freqs: Vec<R>,
    alphabet: Alphabet,
    #[serde(default)]
    representation: Option<String>,
}

impl<R: Representation> Table<R> {
    fn snapshot(&self) -> SnapshotRef<'_, R> {
        SnapshotRef {
            n: self.order(),
            total: self.total(),
            freqs: self.values(),
            alphabet: self.alphabet(),
            representation: Some(R::NAME),
        }
    }

    fn from_snapshot(snapshot: Snapshot<R>) -> Result<Self> {
        if let Some(name) = &snapshot.representation {
            if name != R::NAME {
                return Err(Error::MalformedSnapshot(format!(
                    "snapshot holds a {name} table, expected {}",
                    R::NAME
                )));
            }
        }
        Table::from_parts(
            snapshot.n,
            snapshot.total,
            Arc::new(snapshot.alphabet),
            snapshot.freqs,
        )
    }

    /// Fail on the first cell outside the representation's domain.
    fn ensure_valid(&self) -> Result<()> {
        for value in self.values() {
            value.validate()?;
        }
        Ok(())
    }

    /// Fail on the first cell JSON cannot represent.
    fn ensure_finite(&self) -> Result<()> {
        match self
            .values()
            .iter()
            .position(|value| !value.as_f64().is_finite())
        {
            Some(index) => Err(Error::NonFiniteValue {
                index,
                value: self.values()[index].as_f64(),
            }),
            None => Ok(()),
        }
    }

    /// Encode as compact JSON.
    ///
    /// # Errors
    /// [`Error::NonFiniteValue`] if any cell is infinite, which is the case
    /// for every unset cell of a log-probability table.
    pub fn to_json(&self) -> Result<String> {
        self.ensure_valid()?;
        self.ensure_finite()?;
        let json = serde_json::to_string(&self.snapshot())?;
        log::debug!("encoded {} table as {} bytes of json", R::NAME, json.len());
        Ok(json)
    }

    /// Like [`Table::to_json`], but indented.
    pub fn to_json_pretty(&self) -> Result<String> {
        self.ensure_valid()?;
        self.ensure_finite()?;
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot<R> = serde_json::from_str(json)?;
        let table = Self::from_snapshot(snapshot)?;
        log::debug!("decoded {} table with {} cells from json", R::NAME, table.len());
        Ok(table)
    }

    /// Encode as a binary envelope. Infinite values survive this form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.ensure_valid()?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.len() * 8);
        bytes.extend_from_slice(&MAGIC);
        bytes.push(VERSION);
        bytes.push(R::TAG);
        let bytes = postcard::to_extend(&self.snapshot(), bytes)?;
        log::debug!("encoded {} table as {} bytes", R::NAME, bytes.len());
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::MalformedSnapshot(format!(
                "{} bytes is shorter than the header",
                bytes.len()
            )));
        }
        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header[..MAGIC.len()] != MAGIC {
            return Err(Error::MalformedSnapshot("bad magic".to_owned()));
        }
        let (version, tag) = (header[MAGIC.len()], header[MAGIC.len() + 1]);
        if version != VERSION {
            return Err(Error::MalformedSnapshot(format!(
                "unsupported version {version}"
            )));
        }
        if tag != R::TAG {
            return Err(Error::MalformedSnapshot(format!(
                "representation tag {tag}, expected {} for {}",
                R::TAG,
                R::NAME
            )));
        }

        let (snapshot, rest): (Snapshot<R>, _) = postcard::take_from_bytes(payload)?;
        if !rest.is_empty() {
            return Err(Error::MalformedSnapshot(format!(
                "{} trailing bytes",
                rest.len()
            )));
        }
        let table = Self::from_snapshot(snapshot)?;
        log::debug!("decoded {} table with {} cells", R::NAME, table.len());
        Ok(table)
    }
}

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::representation::{Count, LogProbability, Probability, Representation};
use crate::symbol::{self, Symbol};

/// A dense n-gram frequency table.
///
/// Holds one value for every possible sequence of `order` symbols, so a table
/// over an alphabet of size `k` always has `k^order` cells. A sequence is
/// addressed as a big-endian base-`k` number: the first symbol is the most
/// significant digit. Serialized and generated layouts use the same order.
///
/// `total` is the normalization constant used to turn counts into
/// probabilities. It is supplied by the caller and never derived from the
/// stored values.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<R: Representation> {
    order: usize,
    total: u64,
    values: Vec<R>,
    alphabet: Arc<Alphabet>,
}

pub type CountTable = Table<Count>;
pub type ProbabilityTable = Table<Probability>;
pub type LogProbabilityTable = Table<LogProbability>;

impl<R: Representation> Table<R> {
    /// Create a table with every cell set to the representation's zero value.
    pub fn new(order: usize, total: u64, alphabet: impl Into<Arc<Alphabet>>) -> Result<Self> {
        let alphabet = alphabet.into();
        let len = capacity(alphabet.size(), order)?;
        log::debug!(
            "new {} table: order {order}, {len} cells, total {total}, alphabet {:?}",
            R::NAME,
            alphabet.spec()
        );
        Ok(Self {
            order,
            total,
            values: vec![R::ZERO; len],
            alphabet,
        })
    }

    /// Assemble a table from already computed values, checking their count
    /// and domain.
    pub(crate) fn from_parts(
        order: usize,
        total: u64,
        alphabet: Arc<Alphabet>,
        values: Vec<R>,
    ) -> Result<Self> {
        let len = capacity(alphabet.size(), order)?;
        if values.len() != len {
            return Err(Error::MalformedSnapshot(format!(
                "expected {len} values for order {order} over {} symbols, got {}",
                alphabet.size(),
                values.len()
            )));
        }
        for value in &values {
            value.validate()?;
        }
        Ok(Self {
            order,
            total,
            values,
            alphabet,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// All cells in index order.
    pub fn values(&self) -> &[R] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat offset of `symbols`.
    ///
    /// # Errors
    /// [`Error::Arity`] unless exactly `order` symbols are given, and
    /// [`Error::SymbolOutOfRange`] for a code outside the alphabet.
    pub fn index(&self, symbols: &[Symbol]) -> Result<usize> {
        if symbols.len() != self.order {
            return Err(Error::Arity {
                expected: self.order,
                actual: symbols.len(),
            });
        }
        let size = self.alphabet.size();
        symbols.iter().try_fold(0, |address, &symbol| {
            let code = symbol.index();
            if code >= size {
                return Err(Error::SymbolOutOfRange { code, size });
            }
            Ok(address * size + code)
        })
    }

    /// The symbols addressed by `index`; the inverse of [`Table::index`].
    pub fn symbols_at(&self, mut index: usize) -> Option<Vec<Symbol>> {
        if index >= self.values.len() {
            return None;
        }
        let size = self.alphabet.size();
        let mut symbols = vec![Symbol::new(0); self.order];
        for slot in symbols.iter_mut().rev() {
            *slot = Symbol::new((index % size) as u8);
            index /= size;
        }
        Some(symbols)
    }

    /// Decode an n-gram string through the table's alphabet.
    pub fn key(&self, text: &str) -> Result<Vec<Symbol>> {
        symbol::ngram(&self.alphabet, text, self.order)
    }

    pub fn get(&self, symbols: &[Symbol]) -> Result<&R> {
        let index = self.index(symbols)?;
        Ok(&self.values[index])
    }

    /// Mutable access to a cell. Every `R` that can be constructed already
    /// lies in its domain, so writes through this reference keep the table
    /// valid.
    pub fn get_mut(&mut self, symbols: &[Symbol]) -> Result<&mut R> {
        let index = self.index(symbols)?;
        Ok(&mut self.values[index])
    }

    /// Store `value`, which must lie in the representation's domain.
    pub fn set(&mut self, symbols: &[Symbol], value: R) -> Result<()> {
        let index = self.index(symbols)?;
        self.values[index] = value.validate()?;
        Ok(())
    }

    /// Convert `count` against the table's total and store it. On error the
    /// cell keeps its previous value.
    pub fn set_from_count(&mut self, symbols: &[Symbol], count: u64) -> Result<()> {
        let index = self.index(symbols)?;
        self.values[index] = R::from_count(count, self.total)?;
        Ok(())
    }

    /// Like [`Table::get`], but panics on a bad key.
    pub fn must_get(&self, symbols: &[Symbol]) -> &R {
        match self.index(symbols) {
            Ok(index) => &self.values[index],
            Err(e) => panic!("bad n-gram key: {e}"),
        }
    }

    /// Like [`Table::set`], but panics on a bad key or value.
    pub fn must_set(&mut self, symbols: &[Symbol], value: R) {
        if let Err(e) = self.set(symbols, value) {
            panic!("cannot set n-gram: {e}");
        }
    }

    /// Like [`Table::set_from_count`], but panics on a bad key or count.
    pub fn must_set_from_count(&mut self, symbols: &[Symbol], count: u64) {
        if let Err(e) = self.set_from_count(symbols, count) {
            panic!("cannot set n-gram: {e}");
        }
    }

    /// Every cell with its key, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<Symbol>, &R)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| Some((self.symbols_at(index)?, value)))
    }
}

impl Table<Count> {
    /// Store a count given as a float. Fractional, negative and non-finite
    /// values are rejected.
    pub fn set_raw(&mut self, symbols: &[Symbol], value: f64) -> Result<()> {
        let count = Count::from_f64(value)?;
        self.set(symbols, count)
    }

    pub fn to_probability(&self) -> Result<Table<Probability>> {
        self.convert()
    }

    pub fn to_log_probability(&self) -> Result<Table<LogProbability>> {
        self.convert()
    }

    fn convert<T: Representation>(&self) -> Result<Table<T>> {
        log::debug!(
            "converting {} cells from {} to {}",
            self.values.len(),
            Count::NAME,
            T::NAME
        );
        let values = self
            .values
            .iter()
            .map(|count| T::from_count(count.get(), self.total))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            order: self.order,
            total: self.total,
            values,
            alphabet: Arc::clone(&self.alphabet),
        })
    }
}

/// Number of cells in a table of `order` over `size` symbols.
fn capacity(size: usize, order: usize) -> Result<usize> {
    if order == 0 {
        return Err(Error::InvalidOrder(order));
    }
    u32::try_from(order)
        .ok()
        .and_then(|exp| size.checked_pow(exp))
        .ok_or(Error::TableTooLarge { size, order })
}

use ngram_tables::{
    Alphabet, CodegenOptions, Count, CountTable, Dialect, Error, LogProbability,
    LogProbabilityTable, Probability, ProbabilityTable, Representation, Symbol,
};
use ngram_tables::representation::EPSILON;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use rand::Rng;

/// An alphabet compiled from a random spec of distinct alphanumeric bytes,
/// written as single characters in random order.
#[derive(Debug, Clone)]
struct RandomAlphabet(Alphabet);

impl Arbitrary for RandomAlphabet {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut pool: Vec<u8> = (b'0'..=b'9')
            .chain(b'A'..=b'Z')
            .chain(b'a'..=b'z')
            .collect();
        let size = 1 + usize::arbitrary(g) % 20;
        let mut spec = String::new();
        for _ in 0..size {
            let byte = pool.remove(usize::arbitrary(g) % pool.len());
            spec.push(char::from(byte));
        }
        RandomAlphabet(Alphabet::new(&spec).expect("distinct bytes form a valid spec"))
    }
}

fn random_counts(order: usize, total: u64, alphabet: Alphabet) -> CountTable {
    let mut table = CountTable::new(order, total, alphabet).unwrap();
    let mut rng = rand::rng();
    for index in 0..table.len() {
        let symbols = table.symbols_at(index).unwrap();
        table.must_set(&symbols, Count(rng.random_range(0..=total)));
    }
    table
}

#[quickcheck]
fn symbol_and_byte_cancel(alphabet: RandomAlphabet) -> bool {
    let alphabet = alphabet.0;
    alphabet.iter().all(|(symbol, byte)| {
        alphabet.symbol(byte) == Some(symbol) && alphabet.byte(symbol) == Some(byte)
    })
}

#[quickcheck]
fn bytes_outside_spec_are_invalid(alphabet: RandomAlphabet) -> bool {
    let alphabet = alphabet.0;
    (0..=255u8)
        .filter(|byte| !alphabet.encode_table().contains(byte))
        .all(|byte| alphabet.symbol(byte).is_none())
}

#[quickcheck]
fn text_round_trips(alphabet: RandomAlphabet, picks: Vec<usize>) -> bool {
    let alphabet = alphabet.0;
    let text: String = picks
        .iter()
        .map(|pick| char::from(alphabet.encode_table()[pick % alphabet.size()]))
        .collect();
    let symbols = alphabet.symbols(&text).unwrap();
    symbols.len() == text.len() && alphabet.text(&symbols).unwrap() == text
}

/// Property test verifying that the mixed-radix index maps every n-tuple of
/// symbols to a distinct cell, covering the whole table.
#[quickcheck]
fn index_is_a_bijection(alphabet: RandomAlphabet, order: usize) -> bool {
    let order = 1 + order % 3;
    let size = alphabet.0.size();
    let table = CountTable::new(order, 1, alphabet.0).unwrap();
    if table.len() != size.pow(order as u32) {
        return false;
    }
    (0..table.len()).all(|index| {
        let symbols = table.symbols_at(index).unwrap();
        symbols.len() == order && table.index(&symbols).unwrap() == index
    })
}

#[quickcheck]
fn wrong_arity_is_rejected(order: usize, actual: usize) -> bool {
    let order = 1 + order % 4;
    let actual = actual % 8;
    if actual == order {
        return true;
    }
    let mut table = CountTable::new(order, 1, Alphabet::new("ab").unwrap()).unwrap();
    let symbols = vec![Symbol::new(0); actual];
    let is_arity = |error: &Error| {
        matches!(
            error,
            Error::Arity { expected, actual: got } if *expected == order && *got == actual
        )
    };
    table.get(&symbols).err().is_some_and(|e| is_arity(&e))
        && table.set(&symbols, Count(1)).err().is_some_and(|e| is_arity(&e))
        && table.set_from_count(&symbols, 1).err().is_some_and(|e| is_arity(&e))
}

#[quickcheck]
fn conversions_stay_in_domain(count: u64, total: u64) -> bool {
    let total = total.max(1);
    let count = count % total.saturating_add(1);
    let alphabet = std::sync::Arc::new(Alphabet::new("a").unwrap());
    let mut probabilities = ProbabilityTable::new(1, total, alphabet.clone()).unwrap();
    let mut logs = LogProbabilityTable::new(1, total, alphabet).unwrap();
    let key = [Symbol::new(0)];
    probabilities.set_from_count(&key, count).unwrap();
    logs.set_from_count(&key, count).unwrap();

    let p = probabilities.must_get(&key).get();
    let lp = logs.must_get(&key).get();
    (0.0..=1.0).contains(&p) && lp <= 0.0 && (lp.exp() - p).abs() < 1e-9
}

/// Whatever a caller writes through `get_mut`, the table still saves and
/// loads, since no out-of-domain value can be constructed in the first place.
#[quickcheck]
fn cells_stay_in_domain_through_get_mut(raw: f64, count: u64) -> bool {
    let in_domain = raw >= 0.0 && raw <= 1.0 + EPSILON;
    let Ok(p) = Probability::new(raw) else {
        return !in_domain;
    };
    let mut table = ProbabilityTable::new(1, 100, Alphabet::new("ab").unwrap()).unwrap();
    let key = [Symbol::new(1)];
    *table.get_mut(&key).unwrap() = p;
    if let Ok(converted) = Probability::from_count(count, 100) {
        *table.get_mut(&[Symbol::new(0)]).unwrap() = converted;
    }
    let restored = ProbabilityTable::from_json(&table.to_json().unwrap()).unwrap();
    in_domain && restored.must_get(&key).get() == p.get()
}

#[test]
fn out_of_domain_values_cannot_be_built() {
    assert!(matches!(
        Probability::from_count(150, 100),
        Err(Error::RepresentationRange { value, .. }) if value == 1.5
    ));
    assert!(LogProbability::from_count(150, 100).is_err());
    assert!(Probability::new(1.5).is_err());
    assert!(LogProbability::new(0.5).is_err());
    assert!(serde_json::from_str::<Probability>("1.5").is_err());
    assert!(serde_json::from_str::<LogProbability>("0.5").is_err());
}

#[test]
fn unigram_conversions() {
    let mut counts = CountTable::new(1, 100, Alphabet::lowercase()).unwrap();
    counts.must_set(&[Symbol::new(0)], Count(50));
    counts.must_set(&[Symbol::new(1)], Count(100));

    let probabilities = counts.to_probability().unwrap();
    let logs = counts.to_log_probability().unwrap();

    assert!((probabilities.must_get(&[Symbol::new(0)]).get() - 0.5).abs() < 1e-10);
    assert!((logs.must_get(&[Symbol::new(0)]).get() - 0.5f64.ln()).abs() < 1e-10);
    assert_eq!(probabilities.must_get(&[Symbol::new(1)]).get(), 1.0);
    assert_eq!(logs.must_get(&[Symbol::new(1)]).get(), 0.0);
    assert_eq!(logs.must_get(&[Symbol::new(2)]).get(), f64::NEG_INFINITY);
}

#[test]
fn rejected_probability_leaves_cell_unchanged() {
    let mut table = ProbabilityTable::new(1, 100, Alphabet::lowercase()).unwrap();
    let key = table.key("q").unwrap();
    table.set_from_count(&key, 25).unwrap();
    assert!(matches!(
        table.set_from_count(&key, 101),
        Err(Error::RepresentationRange { .. })
    ));
    assert_eq!(table.must_get(&key).get(), 0.25);
}

#[test_log::test]
fn counts_to_snapshots_and_source() {
    let counts = random_counts(2, 500, Alphabet::lowercase_alphanumeric());

    let json = counts.to_json().unwrap();
    assert_eq!(CountTable::from_json(&json).unwrap(), counts);

    let logs = counts.to_log_probability().unwrap();
    let restored = LogProbabilityTable::from_bytes(&logs.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, logs);

    let has_zero = counts.values().iter().any(|count| count.get() == 0);
    assert_eq!(logs.to_json().is_err(), has_zero);

    let c = ngram_tables::generate(&logs, Dialect::C, &CodegenOptions::default()).unwrap();
    assert!(c.contains("static const double freqs[1296] = {"));
    assert_eq!(c.contains("-INFINITY"), has_zero);

    let go = ngram_tables::generate(
        &counts,
        Dialect::Go,
        &CodegenOptions::default().with_package("bigrams"),
    )
    .unwrap();
    assert!(go.contains("var freqs = [1296]uint64{"));
}

#[test_log::test]
fn log_probability_json_after_filling_every_cell() {
    let alphabet = Alphabet::lowercase();
    let mut table = LogProbabilityTable::new(1, 100, alphabet).unwrap();
    assert!(matches!(table.to_json(), Err(Error::NonFiniteValue { .. })));

    for index in 0..table.len() {
        let symbols = table.symbols_at(index).unwrap();
        table.set_from_count(&symbols, index as u64 + 1).unwrap();
    }
    let decoded = LogProbabilityTable::from_json(&table.to_json().unwrap()).unwrap();
    for (expected, actual) in table.values().iter().zip(decoded.values()) {
        assert!((expected.get() - actual.get()).abs() < 1e-10);
    }
}

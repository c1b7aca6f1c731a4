//! Emit a table as static arrays in Go or C source.
//!
//! Both dialects produce the same three arrays:
//!
//! - `decode`: 256 signed entries mapping a byte to its symbol code, `-1` for
//!   bytes outside the alphabet;
//! - `encode`: one unsigned byte per symbol code;
//! - `freqs`: every table cell in index order, as `uint64` for counts and as
//!   doubles otherwise.
//!
//! Floats are printed with 17 significant digits, which is enough to read
//! back the exact same `f64`.

mod wrapper;

pub use wrapper::{LineWrapper, TAB_STOP, advance};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::representation::{Literal, Primitive, Representation};
use crate::table::Table;

/// Output language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Go,
    C,
}

/// Formatting knobs for generated source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenOptions {
    /// Maximum line width of array bodies, with tabs counted to the next
    /// multiple of [`TAB_STOP`].
    #[serde(default = "default_max_width")]
    pub max_width: usize,
    /// Prefix of every array body line.
    #[serde(default = "default_indent")]
    pub indent: String,
    /// Go package name. Ignored for C.
    #[serde(default = "default_package")]
    pub package: String,
}

fn default_max_width() -> usize {
    80
}

fn default_indent() -> String {
    "\t".to_owned()
}

fn default_package() -> String {
    "ngrams".to_owned()
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            indent: default_indent(),
            package: default_package(),
        }
    }
}

impl CodegenOptions {
    pub fn with_package(mut self, package: &str) -> Self {
        self.package = package.to_owned();
        self
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }
}

/// Render `table` as source text in `dialect`.
pub fn generate<R: Representation>(
    table: &Table<R>,
    dialect: Dialect,
    options: &CodegenOptions,
) -> Result<String> {
    log::debug!(
        "generating {dialect:?} source for {} {}-gram table ({} cells)",
        R::NAME,
        table.order(),
        table.len()
    );
    match dialect {
        Dialect::Go => go(table, options),
        Dialect::C => Ok(c(table, options)),
    }
}

impl<R: Representation> Table<R> {
    /// Go source for this table, in package `package`.
    pub fn to_go(&self, package: &str) -> Result<String> {
        generate(
            self,
            Dialect::Go,
            &CodegenOptions::default().with_package(package),
        )
    }

    /// C source for this table.
    pub fn to_c(&self) -> Result<String> {
        generate(self, Dialect::C, &CodegenOptions::default())
    }
}

fn header<R: Representation>(table: &Table<R>) -> String {
    format!(
        "// Code generated by ngram-tables from a {}-gram {} table. DO NOT EDIT.\n\
         // {} entries, alphabet: {:?}\n\n",
        table.order(),
        R::NAME,
        table.len(),
        table.alphabet().spec()
    )
}

/// Codes stop fitting in a signed byte past 128 symbols.
fn decode_fits_in_i8<R: Representation>(table: &Table<R>) -> bool {
    table.alphabet().size() <= 128
}

fn decode_entries<R: Representation>(table: &Table<R>) -> impl Iterator<Item = String> + '_ {
    table
        .alphabet()
        .decode_table()
        .iter()
        .map(|symbol| match symbol {
            Some(symbol) => symbol.code().to_string(),
            None => "-1".to_owned(),
        })
}

fn encode_entries<R: Representation>(table: &Table<R>) -> impl Iterator<Item = String> + '_ {
    table
        .alphabet()
        .encode_table()
        .iter()
        .map(|byte| byte.to_string())
}

/// Write `entries` as a wrapped array body between `open` and `close`. Each
/// entry carries its own separator.
fn array<I>(out: &mut String, open: &str, entries: I, close: &str, options: &CodegenOptions)
where
    I: IntoIterator<Item = String>,
{
    out.push_str(open);
    out.push('\n');
    let mut wrapper = LineWrapper::new(out, options.max_width, &options.indent);
    let mut count = 0;
    for entry in entries {
        wrapper.write(&entry);
        count += 1;
    }
    wrapper.flush();
    log::trace!("wrote {count} entries for {open:?}");
    out.push_str(close);
    out.push_str("\n\n");
}

fn go<R: Representation>(table: &Table<R>, options: &CodegenOptions) -> Result<String> {
    if !is_go_identifier(&options.package) {
        return Err(Error::InvalidIdentifier(options.package.clone()));
    }

    let mut out = header(table);
    out.push_str(&format!("package {}\n\n", options.package));

    let needs_math = table
        .values()
        .iter()
        .any(|value| matches!(value.literal(), Literal::Float(v) if !v.is_finite()));
    if needs_math {
        out.push_str("import \"math\"\n\n");
    }

    let constants = [
        ("n", table.order().to_string()),
        ("alphabetSize", table.alphabet().size().to_string()),
        ("total", table.total().to_string()),
    ];
    let width = constants.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    out.push_str("const (\n");
    for (name, value) in &constants {
        out.push_str(&format!("\t{name:<width$} = {value}\n"));
    }
    out.push_str(")\n\n");

    let decode_type = if decode_fits_in_i8(table) { "int8" } else { "int16" };
    array(
        &mut out,
        &format!("var decode = [256]{decode_type}{{"),
        decode_entries(table).map(comma),
        "}",
        options,
    );
    array(
        &mut out,
        "var encode = [alphabetSize]byte{",
        encode_entries(table).map(comma),
        "}",
        options,
    );

    let freqs_type = match R::PRIMITIVE {
        Primitive::U64 => "uint64",
        Primitive::F64 => "float64",
    };
    array(
        &mut out,
        &format!("var freqs = [{}]{freqs_type}{{", table.len()),
        table.values().iter().map(|value| comma(go_literal(value.literal()))),
        "}",
        options,
    );

    Ok(canonicalize(&out))
}

fn c<R: Representation>(table: &Table<R>, options: &CodegenOptions) -> String {
    let mut out = header(table);
    out.push_str("#include <math.h>\n#include <stdint.h>\n\n");
    out.push_str(&format!(
        "#define ALPHABET_SIZE {}\n\n",
        table.alphabet().size()
    ));

    let decode_type = if decode_fits_in_i8(table) {
        "int8_t"
    } else {
        "int16_t"
    };
    array(
        &mut out,
        &format!("static const {decode_type} decode[256] = {{"),
        decode_entries(table).map(comma),
        "};",
        options,
    );
    array(
        &mut out,
        "static const uint8_t encode[ALPHABET_SIZE] = {",
        encode_entries(table).map(comma),
        "};",
        options,
    );

    let freqs_type = match R::PRIMITIVE {
        Primitive::U64 => "uint64_t",
        Primitive::F64 => "double",
    };
    array(
        &mut out,
        &format!("static const {freqs_type} freqs[{}] = {{", table.len()),
        table.values().iter().map(|value| comma(c_literal(value.literal()))),
        "};",
        options,
    );

    canonicalize(&out)
}

fn comma(entry: String) -> String {
    entry + ", "
}

fn go_literal(literal: Literal) -> String {
    match literal {
        Literal::Unsigned(value) => value.to_string(),
        Literal::Float(value) if value.is_nan() => "math.NaN()".to_owned(),
        Literal::Float(value) if value == f64::NEG_INFINITY => "math.Inf(-1)".to_owned(),
        Literal::Float(value) if value == f64::INFINITY => "math.Inf(1)".to_owned(),
        Literal::Float(value) => format_float(value),
    }
}

fn c_literal(literal: Literal) -> String {
    match literal {
        // Unsuffixed decimals above INT64_MAX have no standard type.
        Literal::Unsigned(value) if value > i64::MAX as u64 => format!("{value}ULL"),
        Literal::Unsigned(value) => value.to_string(),
        Literal::Float(value) if value.is_nan() => "NAN".to_owned(),
        Literal::Float(value) if value == f64::NEG_INFINITY => "-INFINITY".to_owned(),
        Literal::Float(value) if value == f64::INFINITY => "INFINITY".to_owned(),
        Literal::Float(value) => format_float(value),
    }
}

/// Shortest `%.17g`-style rendering of a finite float: 17 significant
/// digits, trailing zeros dropped, exponent form outside `[1e-4, 1e17)`.
pub fn format_float(value: f64) -> String {
    let scientific = format!("{value:.16e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if (-4..17).contains(&exponent) {
        let precision = (16 - exponent) as usize;
        trim_fraction(format!("{value:.precision$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa.to_owned()),
            exponent.abs()
        )
    }
}

fn trim_fraction(mut digits: String) -> String {
    if digits.contains('.') {
        let len = digits.trim_end_matches('0').trim_end_matches('.').len();
        digits.truncate(len);
    }
    digits
}

/// Normalize whitespace: no trailing spaces, no leading or repeated blank
/// lines, exactly one final newline.
fn canonicalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending_blank = false;
    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !GO_KEYWORDS.contains(&name)
}

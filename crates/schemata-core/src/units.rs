//! # Units: Scaled Numeric Strings
//!
//! A [`Units`] table describes how a plain number (bytes, nanoseconds,
//! characters) is written for humans: a base unit plus a set of scale steps
//! such as `1024 → kB` or `60 → m`.
//!
//! ## Formatting
//!
//! Multipliers are walked from largest to smallest. At each step the whole
//! part is taken by floor division and the remainder carried down:
//!
//! ```text
//! 1536 bytes      → "1kB512B"
//! 330 seconds     → "5m30s"          (short)
//! 330 seconds     → "5 minutes 30 seconds"  (long)
//! ```
//!
//! The singular name is used only for a part whose magnitude is exactly one.
//! Zero renders as `"0"` followed by the base unit's plural name. Negative
//! amounts carry the sign on every part (`"-1kB-512B"`) so that parsing the
//! output sums back to the original amount.
//!
//! ## Parsing
//!
//! A single anchored, whitespace-tolerant regular expression is built lazily
//! the first time a table parses anything. It has one optional capture group
//! per scale step followed by the base unit, in descending order. A bare
//! number counts as the base unit. Each matched group is multiplied by its
//! scale and summed; any fractional part promotes the result to a float.

use std::collections::BTreeMap;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::error::{quote_list, UnitParseError};

/// Display names for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    short_singular: String,
    short_plural: String,
    long_singular: String,
    long_plural: String,
}

impl Unit {
    /// Create a unit from its four display names.
    pub fn new(
        short_singular: impl Into<String>,
        short_plural: impl Into<String>,
        long_singular: impl Into<String>,
        long_plural: impl Into<String>,
    ) -> Self {
        Self {
            short_singular: short_singular.into(),
            short_plural: short_plural.into(),
            long_singular: long_singular.into(),
            long_plural: long_plural.into(),
        }
    }

    /// Short singular name, e.g. `"kB"`.
    pub fn name_short_singular(&self) -> &str {
        &self.short_singular
    }

    /// Short plural name, e.g. `"kB"`.
    pub fn name_short_plural(&self) -> &str {
        &self.short_plural
    }

    /// Long singular name, e.g. `"kilobyte"`.
    pub fn name_long_singular(&self) -> &str {
        &self.long_singular
    }

    /// Long plural name, e.g. `"kilobytes"`.
    pub fn name_long_plural(&self) -> &str {
        &self.long_plural
    }

    fn name(&self, short: bool, singular: bool) -> &str {
        match (short, singular) {
            (true, true) => &self.short_singular,
            (true, false) => &self.short_plural,
            (false, true) => &self.long_singular,
            (false, false) => &self.long_plural,
        }
    }

    fn names(&self) -> [&str; 4] {
        [
            &self.short_singular,
            &self.short_plural,
            &self.long_singular,
            &self.long_plural,
        ]
    }
}

/// A parsed scaled number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Every part was a whole number.
    Int(i64),
    /// At least one part had a fractional component.
    Float(f64),
}

/// A base unit plus its scale steps.
#[derive(Debug, Clone)]
pub struct Units {
    base: Unit,
    multipliers: BTreeMap<i64, Unit>,
    parser: OnceCell<Regex>,
}

impl PartialEq for Units {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.multipliers == other.multipliers
    }
}

impl Units {
    /// Create a unit table. Multipliers that are not greater than one are
    /// ignored since they cannot describe a larger scale.
    pub fn new(base: Unit, multipliers: impl IntoIterator<Item = (i64, Unit)>) -> Self {
        Self {
            base,
            multipliers: multipliers.into_iter().filter(|(m, _)| *m > 1).collect(),
            parser: OnceCell::new(),
        }
    }

    /// The unit amounts are counted in.
    pub fn base_unit(&self) -> &Unit {
        &self.base
    }

    /// Scale steps, keyed by how many base units one step is worth.
    pub fn multipliers(&self) -> &BTreeMap<i64, Unit> {
        &self.multipliers
    }

    /// Format an integer with short unit names: `1536 → "1kB512B"`.
    pub fn format_short_int(&self, amount: i64) -> String {
        self.format_int(amount, true)
    }

    /// Format an integer with long unit names: `1536 → "1 kilobyte 512 bytes"`.
    pub fn format_long_int(&self, amount: i64) -> String {
        self.format_int(amount, false)
    }

    /// Format a float with short unit names; the remainder below the base
    /// unit keeps its fractional part.
    pub fn format_short_float(&self, amount: f64) -> String {
        self.format_float(amount, true)
    }

    /// Format a float with long unit names.
    pub fn format_long_float(&self, amount: f64) -> String {
        self.format_float(amount, false)
    }

    fn format_int(&self, amount: i64, short: bool) -> String {
        if amount == 0 {
            return self.zero(short);
        }
        let sign = if amount < 0 { "-" } else { "" };
        let mut remaining = amount.unsigned_abs();
        let mut parts = Vec::new();
        for (multiplier, unit) in self.multipliers.iter().rev() {
            let step = multiplier.unsigned_abs();
            let whole = remaining / step;
            if whole > 0 {
                parts.push(render_part(sign, &whole.to_string(), unit.name(short, whole == 1), short));
                remaining -= whole * step;
            }
        }
        if remaining > 0 {
            parts.push(render_part(sign, &remaining.to_string(), self.base.name(short, remaining == 1), short));
        }
        join_parts(parts, short)
    }

    fn format_float(&self, amount: f64, short: bool) -> String {
        if amount == 0.0 {
            return self.zero(short);
        }
        let sign = if amount < 0.0 { "-" } else { "" };
        let mut remaining = amount.abs();
        let mut parts = Vec::new();
        for (multiplier, unit) in self.multipliers.iter().rev() {
            let step = *multiplier as f64;
            if remaining >= step {
                let whole = (remaining / step).floor();
                parts.push(render_part(sign, &whole.to_string(), unit.name(short, whole == 1.0), short));
                remaining -= whole * step;
            }
        }
        if remaining > 0.0 {
            parts.push(render_part(sign, &remaining.to_string(), self.base.name(short, remaining == 1.0), short));
        }
        join_parts(parts, short)
    }

    fn zero(&self, short: bool) -> String {
        let sep = if short { "" } else { " " };
        format!("0{sep}{}", self.base.name(short, false))
    }

    /// Parse a scaled string into an integer amount of base units.
    pub fn parse_int(&self, input: &str) -> Result<i64, UnitParseError> {
        match self.parse(input)? {
            Number::Int(i) => Ok(i),
            Number::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Ok(f as i64)
            }
            Number::Float(f) => Err(UnitParseError {
                input: input.to_string(),
                reason: format!("{f} is not a whole number of {}", self.base.long_plural),
            }),
        }
    }

    /// Parse a scaled string into a floating point amount of base units.
    pub fn parse_float(&self, input: &str) -> Result<f64, UnitParseError> {
        Ok(match self.parse(input)? {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        })
    }

    /// Parse a scaled string, keeping integer precision when no part has a
    /// fractional component.
    pub fn parse(&self, input: &str) -> Result<Number, UnitParseError> {
        let parser = self.parser.get_or_try_init(|| self.build_parser()).map_err(|e| UnitParseError {
            input: input.to_string(),
            reason: format!("unit table cannot be compiled: {e}"),
        })?;
        let captures = parser.captures(input).ok_or_else(|| self.unmatched(input))?;

        let steps: Vec<i64> = self
            .multipliers
            .keys()
            .rev()
            .copied()
            .chain(std::iter::once(1))
            .collect();

        let mut matched = false;
        let mut int_total: Option<i64> = Some(0);
        let mut float_total = 0.0_f64;
        let mut is_float = false;
        for (index, step) in steps.iter().enumerate() {
            let Some(group) = captures.name(&format!("g{index}")) else {
                continue;
            };
            matched = true;
            let text = group.as_str();
            if text.contains('.') {
                is_float = true;
                let number: f64 = text.parse().map_err(|_| self.unmatched(input))?;
                float_total += number * (*step as f64);
            } else {
                let number: i64 = text.parse().map_err(|_| UnitParseError {
                    input: input.to_string(),
                    reason: format!("'{text}' does not fit in a 64-bit integer"),
                })?;
                float_total += number as f64 * (*step as f64);
                int_total = int_total.and_then(|total| {
                    number
                        .checked_mul(*step)
                        .and_then(|part| total.checked_add(part))
                });
            }
        }
        if !matched {
            return Err(self.unmatched(input));
        }
        if is_float {
            return Ok(Number::Float(float_total));
        }
        int_total.map(Number::Int).ok_or_else(|| UnitParseError {
            input: input.to_string(),
            reason: "value does not fit in a 64-bit integer".to_string(),
        })
    }

    fn build_parser(&self) -> Result<Regex, regex::Error> {
        const NUMBER: &str = r"-?\d+(?:\.\d+)?";
        let mut groups: Vec<String> = self
            .multipliers
            .values()
            .rev()
            .enumerate()
            .map(|(index, unit)| format!(r"(?:(?P<g{index}>{NUMBER})\s*(?:{}))?", alternation(unit)))
            .collect();
        let base_index = groups.len();
        groups.push(format!(
            r"(?:(?P<g{base_index}>{NUMBER})\s*(?:{})?)?",
            alternation(&self.base)
        ));
        Regex::new(&format!(r"^\s*{}\s*$", groups.join(r"\s*")))
    }

    fn unmatched(&self, input: &str) -> UnitParseError {
        UnitParseError {
            input: input.to_string(),
            reason: format!(
                "expected a number followed by one of the units {}",
                quote_list(self.accepted_names())
            ),
        }
    }

    /// Every unit name the parser accepts, largest scale first.
    pub fn accepted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for unit in self.multipliers.values().rev().chain(std::iter::once(&self.base)) {
            for name in unit.names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn render_part(sign: &str, magnitude: &str, name: &str, short: bool) -> String {
    if short {
        format!("{sign}{magnitude}{name}")
    } else {
        format!("{sign}{magnitude} {name}")
    }
}

fn join_parts(parts: Vec<String>, short: bool) -> String {
    parts.join(if short { "" } else { " " })
}

/// Regex alternation over a unit's names, longest first so that `ms` is
/// tried before `m`.
fn alternation(unit: &Unit) -> String {
    let mut names: Vec<&str> = unit.names().to_vec();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();
    names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|")
}

/// Byte sizes with binary multipliers.
pub static BYTES: Lazy<Units> = Lazy::new(|| {
    Units::new(
        Unit::new("B", "B", "byte", "bytes"),
        [
            (1024, Unit::new("kB", "kB", "kilobyte", "kilobytes")),
            (1_048_576, Unit::new("MB", "MB", "megabyte", "megabytes")),
            (1_073_741_824, Unit::new("GB", "GB", "gigabyte", "gigabytes")),
            (1_099_511_627_776, Unit::new("TB", "TB", "terabyte", "terabytes")),
            (1_125_899_906_842_624, Unit::new("PB", "PB", "petabyte", "petabytes")),
        ],
    )
});

/// Durations counted in nanoseconds.
pub static DURATION_NANOSECONDS: Lazy<Units> = Lazy::new(|| {
    Units::new(
        Unit::new("ns", "ns", "nanosecond", "nanoseconds"),
        [
            (1_000, Unit::new("us", "us", "microsecond", "microseconds")),
            (1_000_000, Unit::new("ms", "ms", "millisecond", "milliseconds")),
            (1_000_000_000, Unit::new("s", "s", "second", "seconds")),
            (60_000_000_000, Unit::new("m", "m", "minute", "minutes")),
            (3_600_000_000_000, Unit::new("H", "H", "hour", "hours")),
            (86_400_000_000_000, Unit::new("d", "d", "day", "days")),
        ],
    )
});

/// Durations counted in seconds.
pub static DURATION_SECONDS: Lazy<Units> = Lazy::new(|| {
    Units::new(
        Unit::new("s", "s", "second", "seconds"),
        [
            (60, Unit::new("m", "m", "minute", "minutes")),
            (3_600, Unit::new("H", "H", "hour", "hours")),
            (86_400, Unit::new("d", "d", "day", "days")),
        ],
    )
});

/// Character counts.
pub static CHARACTERS: Lazy<Units> =
    Lazy::new(|| Units::new(Unit::new("char", "chars", "character", "characters"), []));

/// Percentages.
pub static PERCENTAGE: Lazy<Units> =
    Lazy::new(|| Units::new(Unit::new("%", "%", "percent", "percent"), []));

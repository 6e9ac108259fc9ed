//! # Native Values
//!
//! [`Native`] is the typed, in-memory side of every descriptor: what
//! `decode` produces and what `validate`/`encode` consume. It differs from the
//! generic [`Value`](schemata_core::Value) in three ways:
//!
//! - numbers are already normalized to `i64`/`f64`;
//! - compiled regular expressions are first-class ([`Pattern`]);
//! - records decoded by an object descriptor are kept apart from generic maps
//!   ([`Native::Object`] has string keys, [`Native::Map`] has native keys).
//!
//! [`ToNative`] and [`FromNative`] convert between `Native` and ordinary Rust
//! types. They are the building blocks of record binding in
//! [`crate::record`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use schemata_core::ConstraintError;

/// A compiled regular expression, compared and ordered by its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    /// The compiled regular expression.
    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed in-memory value.
#[derive(Debug, Clone)]
pub enum Native {
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// String.
    String(String),
    /// Compiled regular expression.
    Pattern(Pattern),
    /// List.
    List(Vec<Native>),
    /// Map with native keys.
    Map(BTreeMap<Native, Native>),
    /// Record decoded by an object descriptor, keyed by property id.
    Object(BTreeMap<String, Native>),
}

impl Native {
    /// Short name of the native shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Native::Bool(_) => "bool",
            Native::Int(_) => "integer",
            Native::Float(_) => "float",
            Native::String(_) => "string",
            Native::Pattern(_) => "pattern",
            Native::List(_) => "list",
            Native::Map(_) => "map",
            Native::Object(_) => "object",
        }
    }

    /// Borrow the string if this is a [`Native::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the fields if this is a [`Native::Object`].
    pub fn as_object(&self) -> Option<&BTreeMap<String, Native>> {
        match self {
            Native::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of a [`Native::Object`].
    pub fn get(&self, field: &str) -> Option<&Native> {
        self.as_object().and_then(|fields| fields.get(field))
    }

    /// Build an object from `(field, value)` pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Native)>,
    {
        Native::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn rank(&self) -> u8 {
        match self {
            Native::Bool(_) => 0,
            Native::Int(_) => 1,
            Native::Float(_) => 2,
            Native::String(_) => 3,
            Native::Pattern(_) => 4,
            Native::List(_) => 5,
            Native::Map(_) => 6,
            Native::Object(_) => 7,
        }
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Native {}

impl PartialOrd for Native {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Native {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Native::Bool(a), Native::Bool(b)) => a.cmp(b),
            (Native::Int(a), Native::Int(b)) => a.cmp(b),
            (Native::Float(a), Native::Float(b)) => a.total_cmp(b),
            (Native::String(a), Native::String(b)) => a.cmp(b),
            (Native::Pattern(a), Native::Pattern(b)) => a.cmp(b),
            (Native::List(a), Native::List(b)) => a.cmp(b),
            (Native::Map(a), Native::Map(b)) => a.iter().cmp(b.iter()),
            (Native::Object(a), Native::Object(b)) => a.iter().cmp(b.iter()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Bool(b) => write!(f, "{b}"),
            Native::Int(i) => write!(f, "{i}"),
            Native::Float(x) => write!(f, "{x}"),
            Native::String(s) => write!(f, "{s}"),
            Native::Pattern(p) => write!(f, "{p}"),
            Native::List(items) => write!(f, "list of {} items", items.len()),
            Native::Map(map) => write!(f, "map of {} entries", map.len()),
            Native::Object(fields) => write!(f, "object with {} fields", fields.len()),
        }
    }
}

/// The native shape a descriptor produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeKind {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// `String`
    String,
    /// [`Pattern`]
    Pattern,
    /// List of the inner kind.
    List(Box<NativeKind>),
    /// Map from the key kind to the value kind.
    Map(Box<NativeKind>, Box<NativeKind>),
    /// Record of the named object.
    Object(String),
    /// One of several records, selected by a discriminator.
    OneOf,
    /// Any scalar, list or map.
    Any,
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeKind::Bool => write!(f, "bool"),
            NativeKind::Int => write!(f, "integer"),
            NativeKind::Float => write!(f, "float"),
            NativeKind::String => write!(f, "string"),
            NativeKind::Pattern => write!(f, "pattern"),
            NativeKind::List(item) => write!(f, "list[{item}]"),
            NativeKind::Map(key, value) => write!(f, "map[{key}]{value}"),
            NativeKind::Object(id) => write!(f, "object {id}"),
            NativeKind::OneOf => write!(f, "one of"),
            NativeKind::Any => write!(f, "any"),
        }
    }
}

/// Convert a Rust value into its native form.
pub trait ToNative {
    /// The native form of `self`.
    fn to_native(&self) -> Native;
}

/// Build a Rust value from its native form.
pub trait FromNative: Sized {
    /// Convert, failing with a constraint error on a shape mismatch.
    fn from_native(value: Native) -> Result<Self, ConstraintError>;
}

pub(crate) fn shape_mismatch(expected: &str, got: &Native) -> ConstraintError {
    ConstraintError::new(format!("expected {expected}, got {}", got.type_name()))
}

impl ToNative for Native {
    fn to_native(&self) -> Native {
        self.clone()
    }
}

impl FromNative for Native {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        Ok(value)
    }
}

impl ToNative for bool {
    fn to_native(&self) -> Native {
        Native::Bool(*self)
    }
}

impl FromNative for bool {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::Bool(b) => Ok(b),
            other => Err(shape_mismatch("bool", &other)),
        }
    }
}

impl ToNative for i64 {
    fn to_native(&self) -> Native {
        Native::Int(*self)
    }
}

impl FromNative for i64 {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::Int(i) => Ok(i),
            other => Err(shape_mismatch("integer", &other)),
        }
    }
}

impl ToNative for f64 {
    fn to_native(&self) -> Native {
        Native::Float(*self)
    }
}

impl FromNative for f64 {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::Float(x) => Ok(x),
            Native::Int(i) => Ok(i as f64),
            other => Err(shape_mismatch("float", &other)),
        }
    }
}

impl ToNative for String {
    fn to_native(&self) -> Native {
        Native::String(self.clone())
    }
}

impl FromNative for String {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::String(s) => Ok(s),
            other => Err(shape_mismatch("string", &other)),
        }
    }
}

impl ToNative for Pattern {
    fn to_native(&self) -> Native {
        Native::Pattern(self.clone())
    }
}

impl FromNative for Pattern {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::Pattern(p) => Ok(p),
            other => Err(shape_mismatch("pattern", &other)),
        }
    }
}

impl<T: ToNative> ToNative for Vec<T> {
    fn to_native(&self) -> Native {
        Native::List(self.iter().map(ToNative::to_native).collect())
    }
}

impl<T: FromNative> FromNative for Vec<T> {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        match value {
            Native::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_native(item).map_err(|e| e.at(format!("[{i}]"))))
                .collect(),
            other => Err(shape_mismatch("list", &other)),
        }
    }
}

impl<K: ToNative, V: ToNative> ToNative for BTreeMap<K, V> {
    fn to_native(&self) -> Native {
        Native::Map(
            self.iter()
                .map(|(k, v)| (k.to_native(), v.to_native()))
                .collect(),
        )
    }
}

impl<K: FromNative + Ord, V: FromNative> FromNative for BTreeMap<K, V> {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let entries: Vec<(Native, Native)> = match value {
            Native::Map(map) => map.into_iter().collect(),
            Native::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| (Native::String(k), v))
                .collect(),
            other => return Err(shape_mismatch("map", &other)),
        };
        entries
            .into_iter()
            .map(|(k, v)| {
                let label = k.to_string();
                let key = K::from_native(k).map_err(|e| e.at(format!("{{{label}}}")))?;
                let value = V::from_native(v).map_err(|e| e.at(format!("[{label}]")))?;
                Ok((key, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compare_by_source() {
        let a = Pattern::new("^a+$").unwrap();
        let b = Pattern::new("^a+$").unwrap();
        assert_eq!(a, b);
        assert!(a.is_match("aaa"));
        assert!(!a.is_match("b"));
    }

    #[test]
    fn floats_order_totally() {
        let mut values = vec![Native::Float(f64::NAN), Native::Float(1.0), Native::Int(3)];
        values.sort();
        assert_eq!(values[0], Native::Int(3));
        assert_eq!(values[1], Native::Float(1.0));
    }

    #[test]
    fn vec_conversion_reports_item_path() {
        let err = Vec::<i64>::from_native(Native::List(vec![
            Native::Int(1),
            Native::String("x".into()),
        ]))
        .unwrap_err();
        assert_eq!(err.path, vec!["[1]"]);
    }

    #[test]
    fn map_accepts_objects_with_string_keys() {
        let native = Native::object([("a", Native::Int(1)), ("b", Native::Int(2))]);
        let map = BTreeMap::<String, i64>::from_native(native).unwrap();
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn float_accepts_integers() {
        assert_eq!(f64::from_native(Native::Int(4)).unwrap(), 4.0);
    }

    #[test]
    fn native_kind_display() {
        let kind = NativeKind::Map(Box::new(NativeKind::String), Box::new(NativeKind::List(Box::new(NativeKind::Int))));
        assert_eq!(kind.to_string(), "map[string]list[integer]");
    }
}

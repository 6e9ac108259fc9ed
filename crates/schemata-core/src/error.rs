//! # Error Hierarchy
//!
//! Structured error types for schemata, built with `thiserror`.
//!
//! Two failure channels exist and must not be confused:
//!
//! - [`ConstraintError`] is returned for data-dependent failures: bounds,
//!   required/conflicting properties, type mismatches, unknown keys or
//!   discriminators. It always carries the path from the document root to the
//!   offending node, and gains path segments as it crosses container,
//!   property and discriminator boundaries on its way up.
//! - [`BadArgumentError`] signals that the schema author made a mistake:
//!   malformed default literal, dangling reference, disallowed map key kind.
//!   It is only produced while a descriptor graph is being built or bound.

use std::error::Error as StdError;

use thiserror::Error;

/// Top-level error type for schemata.
#[derive(Error, Debug)]
pub enum SchemataError {
    /// A value did not satisfy its schema.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    /// A schema was built with invalid arguments.
    #[error(transparent)]
    BadArgument(#[from] BadArgumentError),

    /// A scaled numeric string could not be parsed.
    #[error(transparent)]
    UnitParse(#[from] UnitParseError),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A value failed validation against a descriptor.
///
/// The path is ordered root to leaf. Descriptors create the error at the
/// failing node with an empty path and every enclosing container prepends
/// its own segment with [`ConstraintError::at`].
#[derive(Error, Debug)]
#[error("{}", render(.path, .message))]
pub struct ConstraintError {
    /// Human-readable description of the violation.
    pub message: String,
    /// Segments from the document root to the offending node.
    pub path: Vec<String>,
    /// Underlying error that caused the violation, if any.
    #[source]
    pub cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ConstraintError {
    /// Create a constraint error located at the current node.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            cause: None,
        }
    }

    /// Prepend a path segment, moving the error one level up the tree.
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Attach the error that caused this violation.
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The path rendered as `a -> b -> c`.
    pub fn path_string(&self) -> String {
        self.path.join(" -> ")
    }
}

fn render(path: &[String], message: &str) -> String {
    if path.is_empty() {
        format!("validation failed: {message}")
    } else {
        format!("validation failed for '{}': {message}", path.join(" -> "))
    }
}

/// The schema itself is malformed.
///
/// Produced only at construction or binding time. A graph that built
/// successfully never produces one of these while decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("bad schema argument: {message}")]
pub struct BadArgumentError {
    /// What was wrong with the schema.
    pub message: String,
}

impl BadArgumentError {
    /// Create a bad-argument error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A scaled numeric string did not match its unit table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse '{input}': {reason}")]
pub struct UnitParseError {
    /// The string that failed to parse.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Quote and join a list of names for error messages: `'a', 'b', 'c'`.
///
/// Callers pass names in the order they want them shown; sorted input gives
/// stable messages.
pub fn quote_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_error_without_path() {
        let err = ConstraintError::new("must be at least 5");
        assert_eq!(err.to_string(), "validation failed: must be at least 5");
        assert!(err.path.is_empty());
    }

    #[test]
    fn constraint_error_path_is_root_to_leaf() {
        let err = ConstraintError::new("this field is required")
            .at("name")
            .at("[2]")
            .at("people");
        assert_eq!(err.path, vec!["people", "[2]", "name"]);
        assert_eq!(
            err.to_string(),
            "validation failed for 'people -> [2] -> name': this field is required"
        );
    }

    #[test]
    fn constraint_error_exposes_cause_as_source() {
        let cause = UnitParseError {
            input: "5x".into(),
            reason: "no unit matched".into(),
        };
        let err = ConstraintError::new("invalid value").with_cause(cause);
        let source = err.source().expect("cause should be the source");
        assert!(source.to_string().contains("5x"));
    }

    #[test]
    fn schemata_error_wraps_transparently() {
        let err: SchemataError = ConstraintError::new("boom").at("x").into();
        assert_eq!(err.to_string(), "validation failed for 'x': boom");
        let err: SchemataError = BadArgumentError::new("dangling ref 'A'").into();
        assert_eq!(err.to_string(), "bad schema argument: dangling ref 'A'");
    }

    #[test]
    fn quote_list_formats_names() {
        assert_eq!(quote_list(["a", "b"]), "'a', 'b'");
        assert_eq!(quote_list(Vec::<String>::new()), "");
    }
}

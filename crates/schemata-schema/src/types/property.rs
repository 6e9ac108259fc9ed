use super::Type;
use crate::display::DisplayValue;

/// One named field of an [`ObjectSchema`](super::ObjectSchema).
///
/// Defaults and examples are kept as JSON text and parsed when used. Both
/// are checked when the enclosing scope is bound.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    type_: Type,
    display: Option<DisplayValue>,
    required: bool,
    required_if: Vec<String>,
    required_if_not: Vec<String>,
    conflicts: Vec<String>,
    default: Option<String>,
    examples: Vec<String>,
}

impl PropertySchema {
    /// An optional property of the given type.
    pub fn new(type_: impl Into<Type>) -> Self {
        Self {
            type_: type_.into(),
            display: None,
            required: false,
            required_if: Vec::new(),
            required_if_not: Vec::new(),
            conflicts: Vec::new(),
            default: None,
            examples: Vec::new(),
        }
    }

    /// Mark the property as always required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set whether the property is always required.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach display metadata.
    pub fn with_display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    /// Required whenever any of `fields` is set.
    pub fn required_if<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.required_if.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Required whenever none of `fields` is set.
    pub fn required_if_not<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.required_if_not.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Must not be set together with any of `fields`.
    pub fn conflicts<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.conflicts.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Default value as JSON text, used when the property is absent.
    pub fn with_default(mut self, json: impl Into<String>) -> Self {
        self.default = Some(json.into());
        self
    }

    /// Example values as JSON text.
    pub fn with_examples<S: Into<String>>(mut self, examples: impl IntoIterator<Item = S>) -> Self {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }

    /// The property's type.
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// Display metadata.
    pub fn display(&self) -> Option<&DisplayValue> {
        self.display.as_ref()
    }

    /// Whether the property is always required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Fields whose presence makes this one required.
    pub fn required_if_fields(&self) -> &[String] {
        &self.required_if
    }

    /// Fields whose joint absence makes this one required.
    pub fn required_if_not_fields(&self) -> &[String] {
        &self.required_if_not
    }

    /// Fields that may not be set together with this one.
    pub fn conflicting_fields(&self) -> &[String] {
        &self.conflicts
    }

    /// Default value as JSON text.
    pub fn default_json(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Example values as JSON text.
    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Every field named by an interdependency.
    pub(crate) fn interdependencies(&self) -> impl Iterator<Item = &String> {
        self.required_if
            .iter()
            .chain(&self.required_if_not)
            .chain(&self.conflicts)
    }
}

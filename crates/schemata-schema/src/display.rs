//! Human-facing metadata attached to properties, refs, enum values and steps.

/// Name, description and icon shown to users of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayValue {
    /// Short human-readable name.
    pub name: Option<String>,
    /// Longer description, may contain Markdown.
    pub description: Option<String>,
    /// SVG icon markup.
    pub icon: Option<String>,
}

impl DisplayValue {
    /// Display metadata with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

//! Step schemas: the top-level document a plugin publishes.
//!
//! A [`Schema`] lists steps by id. Each step has one input scope and any
//! number of named output scopes, one of which is produced per run.
//! Documents are read and written through
//! [`SCHEMA_SCHEMA`](crate::bootstrap::SCHEMA_SCHEMA).

use std::collections::BTreeMap;
use std::path::Path;

use schemata_core::error::quote_list;
use schemata_core::{ConstraintError, SchemataError, Value};

use crate::bootstrap::SCHEMA_SCHEMA;
use crate::display::DisplayValue;
use crate::native::{shape_mismatch, FromNative, Native, ToNative};
use crate::types::{Descriptor, ScopeSchema};

/// One possible output of a step.
#[derive(Debug, Clone)]
pub struct StepOutputSchema {
    /// Schema of the output data.
    pub schema: ScopeSchema,
    /// Human-readable metadata.
    pub display: Option<DisplayValue>,
    /// Whether this output reports a failure.
    pub error: bool,
}

impl StepOutputSchema {
    /// A successful output with the given schema.
    pub fn new(schema: ScopeSchema) -> Self {
        Self {
            schema,
            display: None,
            error: false,
        }
    }

    /// Mark the output as an error output.
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Decode output data.
    pub fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        self.schema.decode(data)
    }
}

/// One step: an input scope and its possible outputs.
#[derive(Debug, Clone)]
pub struct StepSchema {
    /// Step id.
    pub id: String,
    /// Human-readable metadata.
    pub display: Option<DisplayValue>,
    /// Schema of the step input.
    pub input: ScopeSchema,
    /// Possible outputs by id.
    pub outputs: BTreeMap<String, StepOutputSchema>,
}

impl StepSchema {
    /// Decode the input of a run.
    pub fn decode_input(&self, data: &Value) -> Result<Native, ConstraintError> {
        self.input.decode(data)
    }

    /// Look up an output by id.
    pub fn output(&self, output_id: &str) -> Result<&StepOutputSchema, ConstraintError> {
        self.outputs.get(output_id).ok_or_else(|| {
            ConstraintError::new(format!(
                "step '{}' has no output '{output_id}', expected one of: {}",
                self.id,
                quote_list(self.outputs.keys())
            ))
        })
    }

    /// Encode the result of a run under the given output id.
    pub fn encode_output(&self, output_id: &str, value: &Native) -> Result<Value, ConstraintError> {
        self.output(output_id)?
            .schema
            .encode(value)
            .map_err(|e| e.at(output_id))
    }
}

/// A full step schema document.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Steps by id.
    pub steps: BTreeMap<String, StepSchema>,
}

impl Schema {
    /// Decode a document through the bootstrap.
    pub fn from_value(data: &Value) -> Result<Self, ConstraintError> {
        Self::from_native(SCHEMA_SCHEMA.decode(data)?)
    }

    /// Encode the document through the bootstrap.
    pub fn to_value(&self) -> Result<Value, ConstraintError> {
        SCHEMA_SCHEMA.encode(&self.to_native())
    }

    /// Load a document from a file: `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let data = if path.extension().is_some_and(|ext| ext == "json") {
            Value::parse_json(&text)?
        } else {
            Value::parse_yaml(&text)?
        };
        let schema = Self::from_value(&data)?;
        tracing::debug!(path = %path.display(), steps = schema.steps.len(), "schema loaded");
        Ok(schema)
    }

    /// Look up a step by id.
    pub fn step(&self, step_id: &str) -> Result<&StepSchema, ConstraintError> {
        self.steps.get(step_id).ok_or_else(|| {
            ConstraintError::new(format!(
                "no step named '{step_id}', expected one of: {}",
                quote_list(self.steps.keys())
            ))
        })
    }
}

fn fields(value: Native, what: &str) -> Result<BTreeMap<String, Native>, ConstraintError> {
    match value {
        Native::Object(fields) => Ok(fields),
        other => Err(shape_mismatch(what, &other)),
    }
}

fn required<T: FromNative>(fields: &mut BTreeMap<String, Native>, name: &str) -> Result<T, ConstraintError> {
    match fields.remove(name) {
        Some(value) => T::from_native(value).map_err(|e| e.at(name)),
        None => Err(ConstraintError::new("this field is required").at(name)),
    }
}

fn optional<T: FromNative>(fields: &mut BTreeMap<String, Native>, name: &str) -> Result<Option<T>, ConstraintError> {
    fields
        .remove(name)
        .map(|value| T::from_native(value).map_err(|e| e.at(name)))
        .transpose()
}

fn with_display(mut fields: BTreeMap<String, Native>, display: &Option<DisplayValue>) -> Native {
    if let Some(display) = display {
        fields.insert("display".to_string(), display.to_native());
    }
    Native::Object(fields)
}

impl ToNative for StepOutputSchema {
    fn to_native(&self) -> Native {
        let fields = BTreeMap::from([
            ("schema".to_string(), self.schema.to_native()),
            ("error".to_string(), Native::Bool(self.error)),
        ]);
        with_display(fields, &self.display)
    }
}

impl FromNative for StepOutputSchema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = fields(value, "step output")?;
        Ok(Self {
            schema: required(&mut fields, "schema")?,
            display: optional(&mut fields, "display")?,
            error: optional(&mut fields, "error")?.unwrap_or(false),
        })
    }
}

impl ToNative for StepSchema {
    fn to_native(&self) -> Native {
        let outputs: BTreeMap<String, Native> = self
            .outputs
            .iter()
            .map(|(id, output)| (id.clone(), output.to_native()))
            .collect();
        let fields = BTreeMap::from([
            ("id".to_string(), Native::String(self.id.clone())),
            ("input".to_string(), self.input.to_native()),
            ("outputs".to_string(), outputs.to_native()),
        ]);
        with_display(fields, &self.display)
    }
}

impl FromNative for StepSchema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = fields(value, "step")?;
        Ok(Self {
            id: required(&mut fields, "id")?,
            display: optional(&mut fields, "display")?,
            input: required(&mut fields, "input")?,
            outputs: required(&mut fields, "outputs")?,
        })
    }
}

impl ToNative for Schema {
    fn to_native(&self) -> Native {
        let steps: BTreeMap<String, Native> = self
            .steps
            .iter()
            .map(|(id, step)| (id.clone(), step.to_native()))
            .collect();
        Native::object([("steps", steps.to_native())])
    }
}

impl FromNative for Schema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = fields(value, "schema")?;
        let steps: BTreeMap<String, StepSchema> = required(&mut fields, "steps")?;
        for (key, step) in &steps {
            if *key != step.id {
                return Err(ConstraintError::new(format!(
                    "step is listed as '{key}' but its id is '{}'",
                    step.id
                ))
                .at(format!("[{key}]"))
                .at("steps"));
            }
        }
        Ok(Self { steps })
    }
}

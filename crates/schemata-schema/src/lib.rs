//! # schemata-schema: The Descriptor Algebra
//!
//! A closed set of type descriptors that convert structured data between the
//! generic [`Value`] model (what arrives in a YAML/JSON document or over the
//! wire) and typed in-memory [`Native`] values, and that can describe
//! themselves so a schema can be shipped across a process boundary.
//!
//! ## The Four-Operation Contract
//!
//! Every [`Type`] implements [`Descriptor`]:
//!
//! - `decode`: generic value to native value, applying format coercion
//!   (`"yes"` → `true`, `"1kB"` → `1024`).
//! - `validate`: check a native value against bounds, patterns and
//!   property interdependencies.
//! - `encode`: native value back to a generic value, re-validating.
//! - `check_compatibility`: can a literal value or another descriptor be
//!   consumed wherever this descriptor is expected?
//!
//! ## Lifecycle
//!
//! A descriptor graph is built once: objects are collected into a
//! [`ScopeSchema`], which resolves every [`RefSchema`] by name and verifies
//! defaults and discriminators. Construction problems surface as
//! [`BadArgumentError`]. Once bound, the graph is immutable and may be
//! shared across threads; per-call failures are always [`ConstraintError`]s.
//!
//! ## Native Records
//!
//! [`Record`] types carry a static field table (generated with
//! [`impl_record!`]) so that [`TypedObject`] can move values in and out of
//! plain Rust structs without any runtime introspection.
//!
//! ## Self-Description
//!
//! [`bootstrap::SCOPE_SCHEMA`] describes the whole algebra using the algebra
//! itself; [`Schema`] uses [`bootstrap::SCHEMA_SCHEMA`] to load and
//! serialize step schemas.

pub mod bootstrap;
pub mod describe;
pub mod display;
pub mod native;
pub mod record;
pub mod step;
pub mod types;

pub use schemata_core::{BadArgumentError, ConstraintError, SchemataError, Value};

pub use display::DisplayValue;
pub use native::{FromNative, Native, NativeKind, Pattern, ToNative};
pub use record::{Field, Record, RecordField, TypedObject, TypedType};
pub use step::{Schema, StepOutputSchema, StepSchema};
pub use types::{
    AnySchema, BoolSchema, Candidate, Descriptor, FloatSchema, IntEnumSchema, IntSchema,
    ListSchema, MapSchema, ObjectSchema, OneOfIntSchema, OneOfSchema, OneOfStringSchema,
    PatternSchema, PropertySchema, RefSchema, ScopeSchema, StringEnumSchema, StringSchema, Type,
    TypeKind,
};

// Copyright 2025 Cowboy AI, LLC.

//! Validation engine contract and the engines shipped with it
//!
//! Domain functions consume validation through the [`Schema`] trait: give
//! it a JSON value, get back either the typed data or an ordered list of
//! [`SchemaIssue`]s. The trait is the only coupling point: any engine
//! that can produce this shape plugs in.
//!
//! Two engines ship here:
//! - [`AnyObject`], the default schema: any JSON object passes.
//! - [`TypedSchema`], which generates a draft-07 schema for a Rust type
//!   via `schemars`, validates candidates with `jsonschema`, and then
//!   deserializes into the type.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use jsonschema::paths::PathChunk;
use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::result::SchemaError;

/// One segment of the path to a validated value.
///
/// Validation engines address object fields by key and array elements by
/// index; both stringify when mapped into a [`SchemaError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An object field
    Key(String),
    /// An array element
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// One validation issue reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Path from the root of the candidate value to the offending spot
    pub path: Vec<PathSegment>,
    /// Human-readable description of the issue
    pub message: String,
}

impl SchemaIssue {
    /// Issue at the given path.
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Issue that applies to the candidate value as a whole.
    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }

    /// Map the issue into the result algebra's error shape.
    pub fn to_schema_error(&self) -> SchemaError {
        SchemaError::new(
            self.path.iter().map(ToString::to_string).collect(),
            self.message.clone(),
        )
    }
}

/// Outcome of a validation attempt: the typed data, or the issues found.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    /// The candidate conforms; here is the typed data
    Valid(T),
    /// The candidate does not conform
    Invalid(Vec<SchemaIssue>),
}

impl<T> Validated<T> {
    /// True for the valid variant.
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    /// The issues mapped into [`SchemaError`]s; empty when valid.
    pub fn schema_errors(&self) -> Vec<SchemaError> {
        match self {
            Validated::Valid(_) => Vec::new(),
            Validated::Invalid(issues) => {
                issues.iter().map(SchemaIssue::to_schema_error).collect()
            }
        }
    }
}

/// The validation engine contract.
///
/// Implementations must attempt the whole candidate and report every
/// issue they find, in document order, since callers surface the full
/// list rather than just the first problem.
#[async_trait]
pub trait Schema: Send + Sync {
    /// The typed data a successful validation produces
    type Output: Send;

    /// Validate `value`, producing the typed data or the issues found.
    async fn validate(&self, value: &Value) -> Validated<Self::Output>;
}

/// A schema's compiled form was rejected.
#[derive(Debug, Error)]
#[error("schema failed to compile: {reason}")]
pub struct SchemaCompileError {
    reason: String,
}

impl SchemaCompileError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The default schema: any JSON object passes and flows through
/// unchanged; anything else fails with a single root issue.
///
/// Used where a domain function has no constraints to enforce on its
/// input or environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyObject;

#[async_trait]
impl Schema for AnyObject {
    type Output = Value;

    async fn validate(&self, value: &Value) -> Validated<Value> {
        if value.is_object() {
            Validated::Valid(value.clone())
        } else {
            Validated::Invalid(vec![SchemaIssue::at_root(format!(
                "expected an object, found {}",
                json_type_name(value)
            ))])
        }
    }
}

/// The default schema, accepting any JSON object.
pub fn any_object() -> AnyObject {
    AnyObject
}

/// Schema derived from a Rust type.
///
/// Generation comes from the type's [`JsonSchema`] impl; validation runs
/// the compiled draft-07 schema over the candidate, and only a
/// structurally valid candidate is deserialized. Structural issues carry
/// the validator's instance path and message (for `{"x": "abc"}` against
/// an integer field: path `["x"]`, message `"abc" is not of type
/// "integer"`).
pub struct TypedSchema<T> {
    compiled: JSONSchema,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema,
{
    /// Schema generated from `T`'s [`JsonSchema`] impl.
    pub fn new() -> Self {
        let root = schemars::gen::SchemaGenerator::default().into_root_schema_for::<T>();
        let schema =
            serde_json::to_value(root).expect("a generated schema serializes to JSON");
        Self::from_value(schema).expect("a generated schema compiles")
    }

    /// Schema compiled from a caller-supplied JSON Schema document.
    ///
    /// The document must describe values deserializable into `T`; the
    /// compile step only checks that the document itself is a valid
    /// schema.
    pub fn from_value(schema: Value) -> Result<Self, SchemaCompileError> {
        let compiled = JSONSchema::compile(&schema)
            .map_err(|err| SchemaCompileError::new(err.to_string()))?;
        Ok(Self {
            compiled,
            _marker: PhantomData,
        })
    }
}

impl<T> Default for TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[async_trait]
impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema + Send,
{
    type Output = T;

    async fn validate(&self, value: &Value) -> Validated<T> {
        if let Err(errors) = self.compiled.validate(value) {
            let issues = errors
                .map(|err| {
                    let path = err
                        .instance_path
                        .iter()
                        .map(|chunk| match chunk {
                            PathChunk::Property(property) => {
                                PathSegment::Key(property.to_string())
                            }
                            PathChunk::Index(index) => PathSegment::Index(*index),
                            PathChunk::Keyword(keyword) => {
                                PathSegment::Key((*keyword).to_string())
                            }
                        })
                        .collect();
                    SchemaIssue::new(path, err.to_string())
                })
                .collect();
            return Validated::Invalid(issues);
        }

        match serde_json::from_value(value.clone()) {
            Ok(data) => Validated::Valid(data),
            // Structurally valid but not deserializable: the schema and
            // the type disagree (possible with from_value-supplied
            // documents).
            Err(err) => Validated::Invalid(vec![SchemaIssue::at_root(format!(
                "value does not deserialize: {err}"
            ))]),
        }
    }
}

/// Schema generated from the Rust type `T`.
pub fn typed<T>() -> TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema,
{
    TypedSchema::new()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

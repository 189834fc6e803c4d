// Copyright 2025 Cowboy AI, LLC.

//! Result algebra for domain functions
//!
//! A domain function never panics and never returns a bare error: every
//! invocation resolves to a [`DomainResult`], which is either a success
//! carrying the output value or a failure carrying three separate error
//! channels: runtime errors, input validation errors, and environment
//! validation errors.

use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// A single validation failure, addressed by field path.
///
/// `path` holds the stringified segments leading to the offending value
/// (`["user", "address", "zip"]`), empty when the failure applies to the
/// whole input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaError {
    /// Field path segments from the root to the invalid value
    pub path: Vec<String>,
    /// Human-readable description of the failure
    pub message: String,
}

impl SchemaError {
    /// Create a schema error at the given path.
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Create a schema error that applies to the value as a whole.
    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }
}

/// A runtime failure raised while a handler or mapper was executing.
///
/// Unlike [`SchemaError`] this carries no path: runtime failures are not
/// tied to a location in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorWithMessage {
    /// Human-readable description of the failure
    pub message: String,
}

impl ErrorWithMessage {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The full error payload of a failed [`DomainResult`].
///
/// The three channels are populated by distinct failure causes: `errors`
/// by runtime failures, `input_errors` by input validation, and
/// `environment_errors` by environment validation. Combinators that
/// aggregate independent failures concatenate channels pairwise, in
/// argument order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Runtime errors from handler or mapper execution
    pub errors: Vec<ErrorWithMessage>,
    /// Input validation errors
    pub input_errors: Vec<SchemaError>,
    /// Environment validation errors
    pub environment_errors: Vec<SchemaError>,
}

impl ErrorData {
    /// Payload with a single runtime error.
    pub fn from_error_message(message: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorWithMessage::new(message)],
            ..Self::default()
        }
    }

    /// Payload with the given input validation errors.
    pub fn from_input_errors(input_errors: Vec<SchemaError>) -> Self {
        Self {
            input_errors,
            ..Self::default()
        }
    }

    /// Payload with the given environment validation errors.
    pub fn from_environment_errors(environment_errors: Vec<SchemaError>) -> Self {
        Self {
            environment_errors,
            ..Self::default()
        }
    }

    /// True when every channel is empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
            && self.input_errors.is_empty()
            && self.environment_errors.is_empty()
    }

    /// Concatenate payloads channel by channel, preserving order.
    ///
    /// This is the aggregation used by fan-out composition: every part's
    /// channels are appended in the order the parts are given. Empty
    /// payloads contribute nothing, so the operation is a monoid with
    /// `ErrorData::default()` as identity.
    pub fn merge(parts: impl IntoIterator<Item = ErrorData>) -> Self {
        let mut merged = ErrorData::default();
        for part in parts {
            merged.errors.extend(part.errors);
            merged.input_errors.extend(part.input_errors);
            merged.environment_errors.extend(part.environment_errors);
        }
        merged
    }
}

/// Outcome of invoking a domain function.
///
/// Success carries the output value; failure carries the three error
/// channels in an [`ErrorData`]. The success variant structurally has no
/// error channels, so a successful result can never report errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainResult<T> {
    /// The handler completed and produced a value
    Success {
        /// The handler's output
        data: T,
    },
    /// Validation or execution failed
    Failure(ErrorData),
}

impl<T> DomainResult<T> {
    /// Successful result wrapping `data`.
    pub fn success(data: T) -> Self {
        DomainResult::Success { data }
    }

    /// Failed result carrying the given payload.
    pub fn failure(errors: ErrorData) -> Self {
        DomainResult::Failure(errors)
    }

    /// True for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, DomainResult::Success { .. })
    }

    /// True for the failure variant.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The output value, if successful.
    pub fn data(&self) -> Option<&T> {
        match self {
            DomainResult::Success { data } => Some(data),
            DomainResult::Failure(_) => None,
        }
    }

    /// Consume the result and return the output value, if successful.
    pub fn into_data(self) -> Option<T> {
        match self {
            DomainResult::Success { data } => Some(data),
            DomainResult::Failure(_) => None,
        }
    }

    /// Consume the result and return the output value.
    ///
    /// Panics with `msg` on the failure variant. Intended for tests and
    /// examples where a failure is a bug in the test itself.
    pub fn expect_data(self, msg: &str) -> T {
        match self {
            DomainResult::Success { data } => data,
            DomainResult::Failure(errors) => panic!("{msg}: {errors:?}"),
        }
    }

    /// Runtime errors; empty on success.
    pub fn errors(&self) -> &[ErrorWithMessage] {
        match self {
            DomainResult::Success { .. } => &[],
            DomainResult::Failure(errors) => &errors.errors,
        }
    }

    /// Input validation errors; empty on success.
    pub fn input_errors(&self) -> &[SchemaError] {
        match self {
            DomainResult::Success { .. } => &[],
            DomainResult::Failure(errors) => &errors.input_errors,
        }
    }

    /// Environment validation errors; empty on success.
    pub fn environment_errors(&self) -> &[SchemaError] {
        match self {
            DomainResult::Success { .. } => &[],
            DomainResult::Failure(errors) => &errors.environment_errors,
        }
    }

    /// The error payload as a value; empty on success.
    pub fn error_data(&self) -> ErrorData {
        match self {
            DomainResult::Success { .. } => ErrorData::default(),
            DomainResult::Failure(errors) => errors.clone(),
        }
    }

    /// Consume the result and return its error payload; empty on success.
    pub fn into_error_data(self) -> ErrorData {
        match self {
            DomainResult::Success { .. } => ErrorData::default(),
            DomainResult::Failure(errors) => errors,
        }
    }

    /// Transform the output value, leaving failures untouched.
    pub fn map_data<U, F>(self, f: F) -> DomainResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            DomainResult::Success { data } => DomainResult::Success { data: f(data) },
            DomainResult::Failure(errors) => DomainResult::Failure(errors),
        }
    }
}

// The wire shape is flat: `success` discriminates, the three error
// channels are always present (empty arrays on success), and `data` is
// present only on success. Adapter layers serialize results straight to
// response bodies, so the shape is part of the public contract.
impl<T: Serialize> Serialize for DomainResult<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        const EMPTY_RUNTIME: &[ErrorWithMessage] = &[];
        const EMPTY_SCHEMA: &[SchemaError] = &[];

        match self {
            DomainResult::Success { data } => {
                let mut state = serializer.serialize_struct("DomainResult", 5)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.serialize_field("errors", EMPTY_RUNTIME)?;
                state.serialize_field("inputErrors", EMPTY_SCHEMA)?;
                state.serialize_field("environmentErrors", EMPTY_SCHEMA)?;
                state.end()
            }
            DomainResult::Failure(errors) => {
                let mut state = serializer.serialize_struct("DomainResult", 4)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", &errors.errors)?;
                state.serialize_field("inputErrors", &errors.input_errors)?;
                state.serialize_field("environmentErrors", &errors.environment_errors)?;
                state.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct DomainResultRepr<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorWithMessage>,
    #[serde(default)]
    input_errors: Vec<SchemaError>,
    #[serde(default)]
    environment_errors: Vec<SchemaError>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DomainResult<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = DomainResultRepr::<T>::deserialize(deserializer)?;
        if repr.success {
            let data = repr
                .data
                .ok_or_else(|| de::Error::missing_field("data"))?;
            Ok(DomainResult::Success { data })
        } else {
            Ok(DomainResult::Failure(ErrorData {
                errors: repr.errors,
                input_errors: repr.input_errors,
                environment_errors: repr.environment_errors,
            }))
        }
    }
}

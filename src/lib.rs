//! # CIM Domain Functions
//!
//! Composable, schema-validated units of business logic for the Composable Information Machine.
//!
//! A *domain function* is an async callable that takes a JSON input and an
//! optional JSON environment, validates both against schemas, runs a typed
//! handler, and resolves to a [`DomainResult`]: success with data, or
//! failure with three separate error channels (runtime, input validation,
//! environment validation). Nothing ever escapes as a panic or a bare
//! error; callers branch solely on the result.
//!
//! The crate provides:
//! - **Result Algebra**: [`DomainResult`], [`ErrorData`], [`SchemaError`],
//!   [`ErrorWithMessage`]: failures as data, per channel
//! - **Domain Function Contract**: [`DomainFunction`] and its constructor
//!   [`make_domain_function`]
//! - **Error Reclassification**: [`HandlerError`] routes handler failures
//!   into the right channel; panics are captured with their message
//! - **Combinators**: [`pipe`] (sequential, fail-fast), [`all`]
//!   (concurrent fan-out, fail-together), [`map`], [`map_error`]; each
//!   yields another domain function, so composition is closed
//! - **Validation Contract**: the [`Schema`] trait plus two engines,
//!   [`schema::AnyObject`] and the schemars/jsonschema-backed
//!   [`schema::TypedSchema`]
//!
//! ## Design Principles
//!
//! 1. **Errors Are Data**: every failure mode is reified in the result;
//!    no domain function call ever panics outward
//! 2. **Closed Composition**: combinators consume domain functions and
//!    produce domain functions of the same contract
//! 3. **Independent Validation**: input and environment are always both
//!    validated, and both issue lists are reported together
//! 4. **Shared Read-Only Environment**: one environment document flows
//!    unchanged to every stage and branch
//! 5. **Engine Agnostic**: validation is consumed through a trait; any
//!    engine that yields typed-data-or-issues plugs in
//!
//! ## Example
//!
//! ```rust
//! use cim_domain_functions::{make_domain_function, schema, HandlerError};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Input {
//!     x: i64,
//! }
//!
//! # tokio_test::block_on(async {
//! let double = make_domain_function(
//!     schema::typed::<Input>(),
//!     schema::any_object(),
//!     |input: Input, _env| async move { Ok::<_, HandlerError>(input.x * 2) },
//! );
//!
//! let ok = double.call(json!({"x": 5})).await;
//! assert_eq!(ok.into_data(), Some(10));
//!
//! let bad = double.call(json!({"x": "abc"})).await;
//! assert_eq!(bad.input_errors()[0].path, vec!["x"]);
//! # });
//! ```

#![warn(missing_docs)]

mod combinators;
mod errors;
mod function;
mod result;
mod result_schemas;

pub mod environment;
pub mod schema;

// Re-export core types
pub use combinators::{all, map, map_error, pipe, then, FanOut, Pipe};
pub use errors::{HandlerError, UNKNOWN_ERROR_MESSAGE};
pub use function::{make_domain_function, DomainFunction, DomainFunctionFuture};
pub use result::{DomainResult, ErrorData, ErrorWithMessage, SchemaError};
pub use schema::{Schema, SchemaCompileError, SchemaIssue, Validated};

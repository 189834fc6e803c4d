// Copyright 2025 Cowboy AI, LLC.

//! The domain function type and its constructor
//!
//! A [`DomainFunction`] is an immutable, reusable unit of business logic:
//! given a JSON input and a JSON environment it resolves to a
//! [`DomainResult`]. The central invariant of the whole crate is enforced
//! here: **a domain function call never panics outward**. Every failure
//! mode, including a panic inside a handler, terminates in the failure
//! variant of the result.
//!
//! [`make_domain_function`] builds a leaf domain function from a pair of
//! schemas and an async handler; the combinators ([`crate::pipe`],
//! [`crate::all`], [`crate::map`], [`crate::map_error`]) build composite
//! ones. Both produce the same callable shape, so composition is closed:
//! a composed function can itself be composed further.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::combinators;
use crate::environment;
use crate::errors::HandlerError;
use crate::result::{DomainResult, ErrorData};
use crate::schema::{Schema, Validated};

/// The future a domain function resolves.
pub type DomainFunctionFuture<O> = BoxFuture<'static, DomainResult<O>>;

/// A validated, error-safe unit of business logic.
///
/// Cloning is cheap (the behavior is shared behind an [`Arc`]) and the
/// value is stateless: it can be stored once and invoked concurrently
/// from many tasks.
pub struct DomainFunction<O> {
    run: Arc<dyn Fn(Value, Value) -> DomainFunctionFuture<O> + Send + Sync>,
}

impl<O> Clone for DomainFunction<O> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<O> std::fmt::Debug for DomainFunction<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainFunction")
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

impl<O: Send + 'static> DomainFunction<O> {
    /// Wrap a raw invocation closure into a domain function.
    ///
    /// Both the closure call and the future it returns are guarded: a
    /// panic in either becomes a failure with the panic's message in the
    /// runtime error channel. Every constructor and combinator goes
    /// through here, which is what makes the never-panic guarantee hold
    /// for arbitrary compositions.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value, Value) -> DomainFunctionFuture<O> + Send + Sync + 'static,
    {
        let run = Arc::new(move |input: Value, environment: Value| -> DomainFunctionFuture<O> {
            match std::panic::catch_unwind(AssertUnwindSafe(|| f(input, environment))) {
                Ok(future) => async move {
                    match AssertUnwindSafe(future).catch_unwind().await {
                        Ok(result) => result,
                        Err(payload) => {
                            debug!("domain function handler panicked");
                            DomainResult::Failure(ErrorData::from_panic(payload.as_ref()))
                        }
                    }
                }
                .boxed(),
                Err(payload) => {
                    debug!("domain function panicked before yielding a future");
                    let errors = ErrorData::from_panic(payload.as_ref());
                    async move { DomainResult::Failure(errors) }.boxed()
                }
            }
        });
        Self { run }
    }

    /// Invoke with the empty environment.
    pub async fn call(&self, input: Value) -> DomainResult<O> {
        self.call_in(input, environment::empty()).await
    }

    /// Invoke with an explicit environment.
    ///
    /// The environment is treated as read-only shared context: every
    /// stage of a pipeline and every branch of a fan-out sees the same
    /// document, unchanged.
    pub async fn call_in(&self, input: Value, environment: Value) -> DomainResult<O> {
        (self.run)(input, environment).await
    }

    /// Sequence `next` after this function; see [`crate::then`].
    pub fn then<B>(self, next: DomainFunction<B>) -> DomainFunction<B>
    where
        O: Serialize,
        B: Send + 'static,
    {
        combinators::then(self, next)
    }

    /// Transform this function's output; see [`crate::map`].
    pub fn map<N, M>(self, mapper: M) -> DomainFunction<N>
    where
        N: Send + 'static,
        M: Fn(O) -> Result<N, anyhow::Error> + Send + Sync + 'static,
    {
        combinators::map(self, mapper)
    }

    /// Transform this function's error payload; see [`crate::map_error`].
    pub fn map_error<M>(self, mapper: M) -> DomainFunction<O>
    where
        M: Fn(ErrorData) -> Result<ErrorData, anyhow::Error> + Send + Sync + 'static,
    {
        combinators::map_error(self, mapper)
    }
}

/// Build a domain function from schemas and an async handler.
///
/// On every invocation, the environment is validated against
/// `environment_schema` and the input against `input_schema`. Both
/// validations always run, so when both fail the result reports both
/// issue lists together. Only when both pass is `handler` invoked, exactly
/// once, with the typed data. A handler error is reclassified into the
/// result's channels per [`HandlerError`]; a handler panic is captured.
///
/// Handlers may return any error convertible into [`HandlerError`], in
/// particular `anyhow::Error`, so `?` works on arbitrary failures while
/// structured input/environment signals still reach their channel.
///
/// # Example
///
/// ```rust
/// use cim_domain_functions::{make_domain_function, schema, HandlerError};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Order {
///     quantity: i64,
/// }
///
/// # tokio_test::block_on(async {
/// let reserve = make_domain_function(
///     schema::typed::<Order>(),
///     schema::any_object(),
///     |order: Order, _env| async move {
///         if order.quantity <= 0 {
///             return Err(HandlerError::input_at("must be positive", ["quantity"]));
///         }
///         Ok(order.quantity)
///     },
/// );
///
/// let result = reserve.call(json!({"quantity": 3})).await;
/// assert_eq!(result.into_data(), Some(3));
/// # });
/// ```
pub fn make_domain_function<IS, ES, H, Fut, O, HE>(
    input_schema: IS,
    environment_schema: ES,
    handler: H,
) -> DomainFunction<O>
where
    IS: Schema + 'static,
    ES: Schema + 'static,
    H: Fn(IS::Output, ES::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HE>> + Send + 'static,
    HE: Into<HandlerError>,
    O: Send + 'static,
{
    let input_schema = Arc::new(input_schema);
    let environment_schema = Arc::new(environment_schema);
    let handler = Arc::new(handler);

    DomainFunction::from_fn(move |input, environment| {
        let input_schema = Arc::clone(&input_schema);
        let environment_schema = Arc::clone(&environment_schema);
        let handler = Arc::clone(&handler);

        async move {
            let (environment_result, input_result) = futures::join!(
                environment_schema.validate(&environment),
                input_schema.validate(&input),
            );

            match (input_result, environment_result) {
                (Validated::Valid(input_data), Validated::Valid(environment_data)) => {
                    match handler(input_data, environment_data).await {
                        Ok(data) => DomainResult::Success { data },
                        Err(err) => {
                            let err: HandlerError = err.into();
                            debug!("domain function handler failed: {}", err);
                            DomainResult::Failure(ErrorData::from(err))
                        }
                    }
                }
                (input_result, environment_result) => {
                    let errors = ErrorData {
                        errors: Vec::new(),
                        input_errors: input_result.schema_errors(),
                        environment_errors: environment_result.schema_errors(),
                    };
                    debug!(
                        "domain function validation failed: {} input, {} environment",
                        errors.input_errors.len(),
                        errors.environment_errors.len()
                    );
                    DomainResult::Failure(errors)
                }
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    #[tokio::test]
    async fn a_panicking_closure_becomes_a_failure() {
        let df: DomainFunction<i64> =
            DomainFunction::from_fn(|_input, _environment| panic!("sync kaboom"));

        let result = df.call(json!({})).await;
        assert_eq!(result.errors()[0].message, "sync kaboom");
    }

    #[tokio::test]
    async fn a_panicking_future_becomes_a_failure() {
        let df: DomainFunction<i64> = DomainFunction::from_fn(|_input, _environment| {
            async { panic!("async kaboom") }.boxed()
        });

        let result = df.call(json!({})).await;
        assert_eq!(result.errors()[0].message, "async kaboom");
    }

    #[tokio::test]
    async fn clones_share_behavior() {
        let df = make_domain_function(
            schema::any_object(),
            schema::any_object(),
            |_input, _environment| async move { Ok::<_, HandlerError>(1_i64) },
        );
        let clone = df.clone();

        assert_eq!(df.call(json!({})).await.into_data(), Some(1));
        assert_eq!(clone.call(json!({})).await.into_data(), Some(1));
    }
}

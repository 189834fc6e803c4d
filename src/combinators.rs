// Copyright 2025 Cowboy AI, LLC.

//! Combinators over domain functions
//!
//! Every combinator consumes domain functions and produces a new
//! [`DomainFunction`] with the same contract, so composition is closed:
//! a composed function composes further.
//!
//! - [`pipe`]: sequential composition, fail-fast on the first failing
//!   stage.
//! - [`all`]: concurrent fan-out over the same input and environment,
//!   fail-together with every branch's errors collected.
//! - [`map`]: transform a function's output with a plain fallible
//!   mapper.
//! - [`map_error`]: transform a function's error payload wholesale.
//!
//! [`pipe`] and [`all`] take tuples of 2 to 8 domain functions. The tuple
//! impls are generated from a single template each and layer over one
//! runtime algorithm ([`then`] for pipelines, a shared join-and-merge for
//! fan-out); arity changes the types, never the behavior.

use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::function::DomainFunction;
use crate::result::{DomainResult, ErrorData};

/// Sequence two domain functions.
///
/// `first` runs with the given input; on success its output is
/// serialized and becomes `next`'s input, while the environment flows to
/// both stages unchanged. On failure the error result is returned
/// verbatim and `next` is never invoked, so at most one stage's errors
/// are ever reported.
pub fn then<A, B>(first: DomainFunction<A>, next: DomainFunction<B>) -> DomainFunction<B>
where
    A: Serialize + Send + 'static,
    B: Send + 'static,
{
    DomainFunction::from_fn(move |input, environment| {
        let first = first.clone();
        let next = next.clone();
        async move {
            match first.call_in(input, environment.clone()).await {
                DomainResult::Success { data } => match serde_json::to_value(data) {
                    Ok(intermediate) => next.call_in(intermediate, environment).await,
                    Err(err) => DomainResult::Failure(ErrorData::from_error_message(format!(
                        "intermediate value does not serialize: {err}"
                    ))),
                },
                DomainResult::Failure(errors) => {
                    trace!("pipeline short-circuit: downstream stages skipped");
                    DomainResult::Failure(errors)
                }
            }
        }
        .boxed()
    })
}

/// An ordered sequence of domain functions that compose sequentially.
///
/// Implemented for tuples of 2 to 8 functions where every stage's output
/// serializes into the next stage's input.
pub trait Pipe {
    /// Output of the final stage
    type Output: Send + 'static;

    /// Compose the stages into a single domain function.
    fn pipe(self) -> DomainFunction<Self::Output>;
}

/// Sequential composition: each stage's output feeds the next stage's
/// input, the environment passes through unchanged, and the first failing
/// stage short-circuits the rest.
///
/// ```rust
/// # use cim_domain_functions::{make_domain_function, pipe, schema, HandlerError};
/// # use serde_json::{json, Value};
/// # tokio_test::block_on(async {
/// let add_one = make_domain_function(
///     schema::any_object(),
///     schema::any_object(),
///     |input: Value, _env| async move {
///         let n = input["n"].as_i64().unwrap_or(0);
///         Ok::<_, HandlerError>(json!({"n": n + 1}))
///     },
/// );
///
/// let composed = pipe((add_one.clone(), add_one));
/// let result = composed.call(json!({"n": 1})).await;
/// assert_eq!(result.into_data(), Some(json!({"n": 3})));
/// # });
/// ```
pub fn pipe<P: Pipe>(stages: P) -> DomainFunction<P::Output> {
    stages.pipe()
}

macro_rules! impl_pipe {
    ($a:ident: $A:ident, $b:ident: $B:ident) => {
        impl<$A, $B> Pipe for (DomainFunction<$A>, DomainFunction<$B>)
        where
            $A: Serialize + Send + 'static,
            $B: Send + 'static,
        {
            type Output = $B;

            fn pipe(self) -> DomainFunction<$B> {
                let ($a, $b) = self;
                then($a, $b)
            }
        }
    };
    ($a:ident: $A:ident $(, $rest:ident: $R:ident)+) => {
        impl<$A, $($R),+> Pipe for (DomainFunction<$A>, $(DomainFunction<$R>),+)
        where
            $A: Serialize + Send + 'static,
            ($(DomainFunction<$R>,)+): Pipe,
        {
            type Output = <($(DomainFunction<$R>,)+) as Pipe>::Output;

            fn pipe(self) -> DomainFunction<Self::Output> {
                let ($a, $($rest),+) = self;
                then($a, ($($rest,)+).pipe())
            }
        }

        impl_pipe!($($rest: $R),+);
    };
}

impl_pipe!(a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H);

/// An ordered set of domain functions that fan out over one input.
///
/// Implemented for tuples of 2 to 8 functions with arbitrary output
/// types.
pub trait FanOut {
    /// Tuple of every branch's output, in argument order
    type Output: Send + 'static;

    /// Compose the branches into a single domain function.
    fn fan_out(self) -> DomainFunction<Self::Output>;
}

/// Concurrent fan-out: every branch receives the same input and
/// environment, and all branches are in flight together. When every
/// branch succeeds the result carries the ordered tuple of outputs; when
/// any branch fails the result is a single failure whose channels
/// concatenate every branch's errors in argument order.
///
/// ```rust
/// # use cim_domain_functions::{make_domain_function, all, schema, HandlerError};
/// # use serde_json::{json, Value};
/// # tokio_test::block_on(async {
/// let double = make_domain_function(
///     schema::any_object(),
///     schema::any_object(),
///     |input: Value, _env| async move {
///         Ok::<_, HandlerError>(input["n"].as_i64().unwrap_or(0) * 2)
///     },
/// );
/// let stringify = make_domain_function(
///     schema::any_object(),
///     schema::any_object(),
///     |input: Value, _env| async move {
///         Ok::<_, HandlerError>(input["n"].to_string())
///     },
/// );
///
/// let both = all((double, stringify));
/// let result = both.call(json!({"n": 4})).await;
/// assert_eq!(result.into_data(), Some((8, "4".to_string())));
/// # });
/// ```
pub fn all<B: FanOut>(branches: B) -> DomainFunction<B::Output> {
    branches.fan_out()
}

macro_rules! impl_fan_out {
    ($($f:ident: $O:ident),+) => {
        impl<$($O),+> FanOut for ($(DomainFunction<$O>,)+)
        where
            $($O: Send + 'static,)+
        {
            type Output = ($($O,)+);

            fn fan_out(self) -> DomainFunction<($($O,)+)> {
                let ($($f,)+) = self;
                DomainFunction::from_fn(move |input: Value, environment: Value| {
                    $(let $f = $f.clone();)+
                    async move {
                        let ($($f,)+) = futures::join!(
                            $($f.call_in(input.clone(), environment.clone())),+
                        );
                        match ($($f,)+) {
                            ($(DomainResult::Success { data: $f },)+) => {
                                DomainResult::Success { data: ($($f,)+) }
                            }
                            ($($f,)+) => {
                                let errors =
                                    ErrorData::merge([$($f.into_error_data()),+]);
                                debug!(
                                    "fan-out failed: {} runtime, {} input, {} environment errors",
                                    errors.errors.len(),
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
        }
    };
}

impl_fan_out!(a: A, b: B);
impl_fan_out!(a: A, b: B, c: C);
impl_fan_out!(a: A, b: B, c: C, d: D);
impl_fan_out!(a: A, b: B, c: C, d: D, e: E);
impl_fan_out!(a: A, b: B, c: C, d: D, e: E, f: F);
impl_fan_out!(a: A, b: B, c: C, d: D, e: E, f: F, g: G);
impl_fan_out!(a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H);

/// Transform a domain function's output with a plain fallible mapper.
///
/// A failure passes through untouched and the mapper is never invoked.
/// When the mapper itself fails, the error lands as a single entry in the
/// runtime channel. Mapper failures are never validation errors, no
/// matter what error value the mapper produces.
pub fn map<O, N, M>(df: DomainFunction<O>, mapper: M) -> DomainFunction<N>
where
    O: Send + 'static,
    N: Send + 'static,
    M: Fn(O) -> Result<N, anyhow::Error> + Send + Sync + 'static,
{
    let mapper = Arc::new(mapper);
    DomainFunction::from_fn(move |input, environment| {
        let df = df.clone();
        let mapper = Arc::clone(&mapper);
        async move {
            match df.call_in(input, environment).await {
                DomainResult::Success { data } => match mapper(data) {
                    Ok(mapped) => DomainResult::Success { data: mapped },
                    Err(err) => {
                        debug!("output mapper failed: {}", err);
                        DomainResult::Failure(ErrorData::from_error_message(err.to_string()))
                    }
                },
                DomainResult::Failure(errors) => DomainResult::Failure(errors),
            }
        }
        .boxed()
    })
}

/// Transform a domain function's error payload wholesale.
///
/// A success passes through untouched and the mapper is never invoked.
/// The mapper receives the full payload (all three channels) and its
/// output replaces the payload entirely. When the mapper itself fails,
/// the attempted transformation is discarded and the result carries a
/// single runtime error instead.
pub fn map_error<O, M>(df: DomainFunction<O>, mapper: M) -> DomainFunction<O>
where
    O: Send + 'static,
    M: Fn(ErrorData) -> Result<ErrorData, anyhow::Error> + Send + Sync + 'static,
{
    let mapper = Arc::new(mapper);
    DomainFunction::from_fn(move |input, environment| {
        let df = df.clone();
        let mapper = Arc::clone(&mapper);
        async move {
            match df.call_in(input, environment).await {
                DomainResult::Success { data } => DomainResult::Success { data },
                DomainResult::Failure(errors) => match mapper(errors) {
                    Ok(mapped) => DomainResult::Failure(mapped),
                    Err(err) => {
                        debug!("error mapper failed: {}", err);
                        DomainResult::Failure(ErrorData::from_error_message(err.to_string()))
                    }
                },
            }
        }
        .boxed()
    })
}

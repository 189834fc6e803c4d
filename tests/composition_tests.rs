// Copyright 2025 Cowboy AI, LLC.

//! Combinator behavior: sequential pipelines, concurrent fan-out, and
//! output/error mapping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cim_domain_functions::{
    all, make_domain_function, map, map_error, pipe, schema, DomainFunction, ErrorData,
    HandlerError,
};
use pretty_assertions::assert_eq;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Barrier;

#[derive(Debug, Deserialize, JsonSchema)]
struct NeedsA {
    a: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NeedsB {
    b: i64,
}

fn add(delta: i64) -> DomainFunction<Value> {
    make_domain_function(
        schema::any_object(),
        schema::any_object(),
        move |input: Value, _env: Value| async move {
            let n = input["n"].as_i64().unwrap_or(0);
            Ok::<_, HandlerError>(json!({"n": n + delta}))
        },
    )
}

fn spied(counter: Arc<AtomicUsize>) -> DomainFunction<Value> {
    make_domain_function(
        schema::any_object(),
        schema::any_object(),
        move |input: Value, _env: Value| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(input)
            }
        },
    )
}

fn failing_with(message: &'static str) -> DomainFunction<Value> {
    make_domain_function(
        schema::any_object(),
        schema::any_object(),
        move |_input: Value, _env: Value| async move {
            Err::<Value, _>(HandlerError::runtime(message))
        },
    )
}

#[tokio::test]
async fn pipe_threads_each_output_into_the_next_input() {
    let composed = pipe((add(1), add(10), add(100)));
    let result = composed.call(json!({"n": 0})).await;
    assert_eq!(result.into_data(), Some(json!({"n": 111})));
}

#[tokio::test]
async fn pipe_short_circuits_on_the_first_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let first = make_domain_function(
        schema::typed::<NeedsA>(),
        schema::any_object(),
        |input: NeedsA, _env| async move { Ok::<_, HandlerError>(json!({"a": input.a})) },
    );
    let second = spied(Arc::clone(&calls));

    let composed = pipe((first.clone(), second));
    let composed_result = composed.call(json!({})).await;
    let direct_result = first.call(json!({})).await;

    assert!(composed_result.is_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(composed_result.error_data(), direct_result.error_data());
}

#[tokio::test]
async fn pipe_passes_the_environment_unchanged_to_every_stage() {
    let record_env = || {
        make_domain_function(
            schema::any_object(),
            schema::any_object(),
            |_input: Value, env: Value| async move { Ok::<_, HandlerError>(env) },
        )
    };

    let composed = pipe((record_env(), record_env()));
    let result = composed
        .call_in(json!({}), json!({"tenant": "acme"}))
        .await;

    // Stage two sees stage one's output as input but the original
    // environment, which is what it returns.
    assert_eq!(result.into_data(), Some(json!({"tenant": "acme"})));
}

#[tokio::test]
async fn fan_out_returns_outputs_in_argument_order() {
    let double = make_domain_function(
        schema::any_object(),
        schema::any_object(),
        |input: Value, _env: Value| async move {
            Ok::<_, HandlerError>(input["n"].as_i64().unwrap_or(0) * 2)
        },
    );
    let label = make_domain_function(
        schema::any_object(),
        schema::any_object(),
        |input: Value, _env: Value| async move {
            Ok::<_, HandlerError>(format!("n={}", input["n"]))
        },
    );

    let result = all((double, label)).call(json!({"n": 4})).await;

    assert_eq!(result.into_data(), Some((8, "n=4".to_string())));
}

#[tokio::test]
async fn fan_out_collects_every_branch_error_in_argument_order() {
    let first = make_domain_function(
        schema::typed::<NeedsA>(),
        schema::any_object(),
        |input: NeedsA, _env| async move { Ok::<_, HandlerError>(input.a) },
    );
    let second = make_domain_function(
        schema::typed::<NeedsB>(),
        schema::any_object(),
        |input: NeedsB, _env| async move { Ok::<_, HandlerError>(input.b) },
    );

    let result = all((first, second)).call(json!({})).await;

    assert!(result.is_failure());
    assert_eq!(result.input_errors().len(), 2);
    assert!(result.input_errors()[0].message.contains("\"a\""));
    assert!(result.input_errors()[1].message.contains("\"b\""));
    assert!(result.errors().is_empty());
}

#[tokio::test]
async fn fan_out_concatenates_runtime_errors_in_argument_order() {
    let result = all((failing_with("first"), failing_with("second")))
        .call(json!({}))
        .await;

    assert_eq!(result.errors().len(), 2);
    assert_eq!(result.errors()[0].message, "first");
    assert_eq!(result.errors()[1].message, "second");
}

#[tokio::test]
async fn fan_out_with_one_failing_branch_reports_only_its_errors() {
    let result = all((add(1), failing_with("broken branch")))
        .call(json!({"n": 0}))
        .await;

    assert!(result.is_failure());
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].message, "broken branch");
    assert!(result.input_errors().is_empty());
}

#[tokio::test]
async fn fan_out_branches_run_concurrently() {
    let barrier = Arc::new(Barrier::new(2));
    let rendezvous = |barrier: Arc<Barrier>| {
        make_domain_function(
            schema::any_object(),
            schema::any_object(),
            move |_input: Value, _env: Value| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    Ok::<_, HandlerError>(1_i64)
                }
            },
        )
    };

    let composed = all((
        rendezvous(Arc::clone(&barrier)),
        rendezvous(barrier),
    ));

    // Each branch blocks until both have started; a sequential fan-out
    // would never get past the first barrier wait.
    let result = tokio::time::timeout(Duration::from_secs(5), composed.call(json!({})))
        .await
        .expect("fan-out branches did not run concurrently");

    assert_eq!(result.into_data(), Some((1, 1)));
}

#[tokio::test]
async fn map_transforms_a_successful_output() {
    let composed = map(add(1), |v| Ok(v["n"].as_i64().unwrap_or(0) * 10));
    let result = composed.call(json!({"n": 2})).await;
    assert_eq!(result.into_data(), Some(30));
}

#[tokio::test]
async fn map_never_invokes_the_mapper_on_failure() {
    let mapped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&mapped);
    let composed = map(failing_with("boom"), move |v| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(v)
    });

    let result = composed.call(json!({})).await;

    assert!(result.is_failure());
    assert_eq!(result.errors()[0].message, "boom");
    assert_eq!(mapped.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn a_failing_mapper_is_always_a_runtime_error() {
    // Even an error value shaped like a validation signal stays in the
    // runtime channel when it comes from a mapper.
    let composed = map(add(0), |_v| -> Result<Value, anyhow::Error> {
        Err(anyhow::Error::new(HandlerError::input("not validation")))
    });

    let result = composed.call(json!({"n": 0})).await;

    assert_eq!(result.errors().len(), 1);
    assert!(result.input_errors().is_empty());
    assert!(result.environment_errors().is_empty());
}

#[tokio::test]
async fn a_panicking_mapper_is_captured() {
    let composed = map(add(0), |_v| -> Result<Value, anyhow::Error> {
        panic!("mapper blew up")
    });

    let result = composed.call(json!({"n": 0})).await;

    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].message, "mapper blew up");
}

#[tokio::test]
async fn map_error_leaves_success_untouched() {
    let touched = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&touched);
    let composed = map_error(add(1), move |errors| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(errors)
    });

    let result = composed.call(json!({"n": 0})).await;

    assert_eq!(result.into_data(), Some(json!({"n": 1})));
    assert_eq!(touched.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn map_error_replaces_the_error_payload() {
    let composed = map_error(failing_with("boom"), |mut errors: ErrorData| {
        for err in &mut errors.errors {
            err.message = format!("wrapped: {}", err.message);
        }
        Ok(errors)
    });

    let result = composed.call(json!({})).await;

    assert_eq!(result.errors()[0].message, "wrapped: boom");
}

#[tokio::test]
async fn a_failing_error_mapper_discards_the_transformation() {
    let composed = map_error(failing_with("boom"), |_errors| {
        Err(anyhow::anyhow!("mapper failed"))
    });

    let result = composed.call(json!({})).await;

    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].message, "mapper failed");
    assert!(result.input_errors().is_empty());
    assert!(result.environment_errors().is_empty());
}

#[tokio::test]
async fn composed_functions_compose_further() {
    let pipeline = pipe((add(1), add(2)));
    let nested = all((pipeline, add(10)));

    let result = nested.call(json!({"n": 0})).await;

    assert_eq!(
        result.into_data(),
        Some((json!({"n": 3}), json!({"n": 10})))
    );
}

#[tokio::test]
async fn method_chaining_mirrors_the_free_functions() {
    let composed = add(1)
        .then(add(2))
        .map(|v| Ok(v["n"].as_i64().unwrap_or(0)))
        .map_error(|errors| Ok(errors));

    let result = composed.call(json!({"n": 0})).await;

    assert_eq!(result.into_data(), Some(3));
}

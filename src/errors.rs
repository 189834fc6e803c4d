// Copyright 2025 Cowboy AI, LLC.

//! Handler error types and reclassification
//!
//! Handlers signal failure by returning a [`HandlerError`]. The enum is a
//! closed set of variants, one per error channel of the result algebra,
//! so dispatch into [`ErrorData`] is exhaustive: a handler can report a
//! late-discovered input or environment problem and it lands in the same
//! channel as a pre-handler validation failure would.

use std::any::Any;

use thiserror::Error;

use crate::result::{ErrorData, ErrorWithMessage, SchemaError};

/// Message used when a failure carries no usable textual payload.
pub const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred";

/// A failure signalled by a handler.
///
/// The `Input`, `InputList`, and `Environment` variants are routed to the
/// validation channels of [`ErrorData`]; everything else travels through
/// `Runtime`, which wraps an [`anyhow::Error`] so handlers keep `?`
/// ergonomics over arbitrary error types.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An input value turned out to be invalid while handling
    #[error("{message}")]
    Input {
        /// Description of the problem
        message: String,
        /// Field path of the offending input value
        path: Vec<String>,
    },

    /// Several input values turned out to be invalid while handling
    #[error("invalid input ({} errors)", .0.len())]
    InputList(Vec<SchemaError>),

    /// An environment value turned out to be invalid while handling
    #[error("{message}")]
    Environment {
        /// Description of the problem
        message: String,
        /// Field path of the offending environment value
        path: Vec<String>,
    },

    /// Any other failure during handling
    #[error(transparent)]
    Runtime(anyhow::Error),
}

impl HandlerError {
    /// Input error with no path.
    pub fn input(message: impl Into<String>) -> Self {
        HandlerError::Input {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Input error at the given field path.
    pub fn input_at<P, S>(message: impl Into<String>, path: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HandlerError::Input {
            message: message.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Several input errors at once.
    pub fn input_list(errors: Vec<SchemaError>) -> Self {
        HandlerError::InputList(errors)
    }

    /// Environment error with no path.
    pub fn environment(message: impl Into<String>) -> Self {
        HandlerError::Environment {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Environment error at the given field path.
    pub fn environment_at<P, S>(message: impl Into<String>, path: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HandlerError::Environment {
            message: message.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Runtime error from a plain message.
    pub fn runtime(message: impl Into<String>) -> Self {
        HandlerError::Runtime(anyhow::Error::msg(message.into()))
    }
}

// Handlers often return `anyhow::Result<T>`. A structured HandlerError
// that travelled through anyhow is recovered by downcast so it still
// reaches its proper channel; everything else is a runtime error.
impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<HandlerError>() {
            Ok(handler_error) => handler_error,
            Err(err) => HandlerError::Runtime(err),
        }
    }
}

impl From<HandlerError> for ErrorData {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Input { message, path } => {
                ErrorData::from_input_errors(vec![SchemaError::new(path, message)])
            }
            HandlerError::InputList(errors) => ErrorData::from_input_errors(errors),
            HandlerError::Environment { message, path } => {
                ErrorData::from_environment_errors(vec![SchemaError::new(path, message)])
            }
            HandlerError::Runtime(err) => ErrorData::from_error_message(err.to_string()),
        }
    }
}

/// Best-effort message extraction from a panic payload.
///
/// Only `&str` and `String` payloads carry a usable message; anything
/// else yields [`UNKNOWN_ERROR_MESSAGE`] rather than a debug rendering of
/// arbitrary data.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_ERROR_MESSAGE.to_string()
    }
}

impl ErrorData {
    /// Payload for a captured panic.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        ErrorData {
            errors: vec![ErrorWithMessage::new(panic_message(payload))],
            ..ErrorData::default()
        }
    }
}

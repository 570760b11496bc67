//! Error types for connecting to and calling the scripting gateway.

use std::{io, time::Duration};

use skyprobe_protocol::ProtocolError;
use thiserror::Error;

use crate::driver::Step;

/// The gateway link could not be established.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to gateway at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {timeout:?} connecting to gateway at {endpoint}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("gateway at {endpoint} rejected the handshake: {reason}")]
    Handshake { endpoint: String, reason: String },
}

/// A single remote call did not complete successfully.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// No method with that name accepts the given arguments.
    #[error("remote method `{method}` does not exist or rejected its arguments: {message}")]
    MethodNotFound { method: String, message: String },

    /// The method ran and threw on the remote side.
    #[error("remote call `{method}` failed: {message}")]
    Remote { method: String, message: String },

    #[error("transport failure during `{method}`: {source}")]
    Transport {
        method: String,
        #[source]
        source: io::Error,
    },

    #[error("remote call `{method}` timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("malformed reply to `{method}`: {source}")]
    Protocol {
        method: String,
        #[source]
        source: ProtocolError,
    },
}

impl RemoteCallError {
    /// Name of the remote method that failed
    pub fn method(&self) -> &str {
        match self {
            Self::MethodNotFound { method, .. }
            | Self::Remote { method, .. }
            | Self::Transport { method, .. }
            | Self::Timeout { method, .. }
            | Self::Protocol { method, .. } => method,
        }
    }
}

/// Outcome of a failed smoke-test run.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("step {step} failed after {completed} completed steps")]
    RemoteCall {
        step: Step,
        completed: usize,
        #[source]
        source: RemoteCallError,
    },
}

//! Typed surface of the remote scripting gateway.
//!
//! Only the operations the smoke test needs are declared. Each one is a
//! blocking round-trip: the returned future resolves once the remote side
//! has answered.

use async_trait::async_trait;

use crate::error::{ConnectionError, RemoteCallError};

/// The remote object through which all scripting calls are made.
#[async_trait]
pub trait EntryPoint: Send + Sync {
    /// `maximizeInterfaceWindow()`
    async fn maximize_interface_window(&self) -> Result<(), RemoteCallError>;

    /// `setStarSize(size)`
    async fn set_star_size(&self, size: f64) -> Result<(), RemoteCallError>;

    /// `sleep(seconds)`, executed by the remote application
    async fn sleep(&self, seconds: u32) -> Result<(), RemoteCallError>;
}

/// An open connection to the gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    fn entry_point(&self) -> &dyn EntryPoint;

    /// Release the connection. Failures are logged, never returned.
    async fn close(self: Box<Self>);
}

/// Opens gateway connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human-readable address of the endpoint, for logs
    fn endpoint(&self) -> String;

    async fn connect(&self) -> Result<Box<dyn Gateway>, ConnectionError>;
}

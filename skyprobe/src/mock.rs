//! In-memory gateway for tests.
//!
//! Records every connect, remote call and close in order, and can be told
//! to refuse connections or to fail a specific `setStarSize` call.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use skyprobe_protocol::methods;

use crate::{
    entry_point::{Connector, EntryPoint, Gateway},
    error::{ConnectionError, RemoteCallError},
};

/// One interaction observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    MaximizeInterfaceWindow,
    SetStarSize(f64),
    Sleep(u32),
    Close,
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<Call>>,
    refuse_connections: bool,
    /// 1-based index of the `setStarSize` call that should fail
    fail_star_size_call: Option<usize>,
}

impl MockState {
    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn star_size_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::SetStarSize(_)))
            .count()
    }
}

/// Connector handing out in-memory gateways that share one call log
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `connect` fails with a connection error
    pub fn refusing() -> Self {
        Self {
            state: Arc::new(MockState {
                refuse_connections: true,
                ..MockState::default()
            }),
        }
    }

    /// The `nth` (1-based) `setStarSize` call raises on the remote side
    pub fn failing_star_size_call(nth: usize) -> Self {
        Self {
            state: Arc::new(MockState {
                fail_star_size_call: Some(nth),
                ..MockState::default()
            }),
        }
    }

    /// Snapshot of everything observed so far
    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn endpoint(&self) -> String {
        "mock".to_string()
    }

    async fn connect(&self) -> Result<Box<dyn Gateway>, ConnectionError> {
        if self.state.refuse_connections {
            return Err(ConnectionError::Unreachable {
                endpoint: self.endpoint(),
                source: std::io::ErrorKind::ConnectionRefused.into(),
            });
        }

        self.state.record(Call::Connect);
        Ok(Box::new(MockGateway {
            entry_point: MockEntryPoint {
                state: self.state.clone(),
            },
        }))
    }
}

struct MockGateway {
    entry_point: MockEntryPoint,
}

#[async_trait]
impl Gateway for MockGateway {
    fn entry_point(&self) -> &dyn EntryPoint {
        &self.entry_point
    }

    async fn close(self: Box<Self>) {
        self.entry_point.state.record(Call::Close);
    }
}

struct MockEntryPoint {
    state: Arc<MockState>,
}

#[async_trait]
impl EntryPoint for MockEntryPoint {
    async fn maximize_interface_window(&self) -> Result<(), RemoteCallError> {
        self.state.record(Call::MaximizeInterfaceWindow);
        Ok(())
    }

    async fn set_star_size(&self, size: f64) -> Result<(), RemoteCallError> {
        self.state.record(Call::SetStarSize(size));
        if self.state.fail_star_size_call == Some(self.state.star_size_calls()) {
            return Err(RemoteCallError::Remote {
                method: methods::SET_STAR_SIZE.to_string(),
                message: format!("star size {size:?} rejected"),
            });
        }
        Ok(())
    }

    async fn sleep(&self, seconds: u32) -> Result<(), RemoteCallError> {
        self.state.record(Call::Sleep(seconds));
        Ok(())
    }
}

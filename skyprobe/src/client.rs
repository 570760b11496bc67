//! Py4J gateway client stub.
//!
//! Implements [`Connector`], [`Gateway`] and [`EntryPoint`] over a single
//! TCP connection speaking the Py4J text protocol.

use std::{io, time::Duration};

use async_trait::async_trait;
use skyprobe_protocol::{
    Argument, Command, ENTRY_POINT_ID, Reply, ReturnValue, decode_reply, methods,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::Mutex,
    time::timeout,
};
use tracing::{debug, warn};

use crate::{
    config::GatewayConfig,
    entry_point::{Connector, EntryPoint, Gateway},
    error::{ConnectionError, RemoteCallError},
};

/// Marker the gateway uses when no overload matches a call
const METHOD_MISSING_MARKER: &str = "does not exist";

/// Opens connections to a Py4J gateway
pub struct Py4jConnector {
    config: GatewayConfig,
}

impl Py4jConnector {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for Py4jConnector {
    fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    async fn connect(&self) -> Result<Box<dyn Gateway>, ConnectionError> {
        let endpoint = self.config.endpoint();
        let connect_timeout = self.config.connect_timeout();

        let stream = timeout(connect_timeout, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| ConnectionError::Timeout {
                endpoint: endpoint.clone(),
                timeout: connect_timeout,
            })?
            .map_err(|source| ConnectionError::Unreachable {
                endpoint: endpoint.clone(),
                source,
            })?;
        stream
            .set_nodelay(true)
            .map_err(|source| ConnectionError::Unreachable {
                endpoint: endpoint.clone(),
                source,
            })?;

        let (read, write) = stream.into_split();
        let mut link = Link {
            reader: BufReader::new(read),
            writer: write,
            broken: false,
        };

        if let Some(token) = &self.config.auth_token {
            authenticate(&mut link, token, &endpoint, connect_timeout).await?;
        }

        debug!("Gateway link to {} established", endpoint);

        Ok(Box::new(Py4jGateway {
            endpoint,
            entry_point: Py4jEntryPoint {
                link: Mutex::new(link),
                call_timeout: self.config.call_timeout(),
            },
        }))
    }
}

async fn authenticate(
    link: &mut Link,
    token: &str,
    endpoint: &str,
    limit: Duration,
) -> Result<(), ConnectionError> {
    let handshake_failed = |reason: String| ConnectionError::Handshake {
        endpoint: endpoint.to_string(),
        reason,
    };

    let line = timeout(limit, link.round_trip(&Command::auth(token).encode()))
        .await
        .map_err(|_| ConnectionError::Timeout {
            endpoint: endpoint.to_string(),
            timeout: limit,
        })?
        .map_err(|e| handshake_failed(e.to_string()))?;

    match decode_reply(&line) {
        Ok(Reply::Success(_)) => Ok(()),
        Ok(Reply::Error(value)) => Err(handshake_failed(describe(&value))),
        Err(e) => Err(handshake_failed(e.to_string())),
    }
}

/// Buffered halves of the gateway socket
struct Link {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    /// Set once a call timed out or failed mid-exchange. The stream may
    /// still hold the reply to that call, so it is never read again.
    broken: bool,
}

impl Link {
    /// Write one command and read its reply line
    async fn round_trip(&mut self, command: &str) -> io::Result<String> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "gateway closed the connection",
            ));
        }
        Ok(line)
    }
}

/// An open Py4J gateway connection
pub struct Py4jGateway {
    endpoint: String,
    entry_point: Py4jEntryPoint,
}

#[async_trait]
impl Gateway for Py4jGateway {
    fn entry_point(&self) -> &dyn EntryPoint {
        &self.entry_point
    }

    async fn close(self: Box<Self>) {
        let Py4jGateway {
            endpoint,
            entry_point,
        } = *self;
        let mut link = entry_point.link.into_inner();
        match link.writer.shutdown().await {
            Ok(()) => debug!("Gateway link to {} closed", endpoint),
            Err(e) => warn!("Failed to close gateway link to {}: {}", endpoint, e),
        }
    }
}

/// Client stub for the gateway entry point
pub struct Py4jEntryPoint {
    link: Mutex<Link>,
    call_timeout: Duration,
}

impl Py4jEntryPoint {
    /// Call `method` on the entry point and return the decoded value
    async fn call(&self, method: &str, args: Vec<Argument>) -> Result<ReturnValue, RemoteCallError> {
        let command = Command::call(ENTRY_POINT_ID, method, args).encode();
        debug!("Sending command: {}", command.escape_debug());

        let line = {
            let mut link = self.link.lock().await;
            if link.broken {
                return Err(RemoteCallError::Transport {
                    method: method.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::NotConnected,
                        "gateway link broken by an earlier failed call",
                    ),
                });
            }

            match timeout(self.call_timeout, link.round_trip(&command)).await {
                Ok(Ok(line)) => line,
                Ok(Err(source)) => {
                    link.broken = true;
                    return Err(RemoteCallError::Transport {
                        method: method.to_string(),
                        source,
                    });
                }
                Err(_) => {
                    link.broken = true;
                    return Err(RemoteCallError::Timeout {
                        method: method.to_string(),
                        timeout: self.call_timeout,
                    });
                }
            }
        };

        debug!("Received reply: {}", line.trim_end());

        match decode_reply(&line) {
            Ok(Reply::Success(value)) => Ok(value),
            Ok(Reply::Error(value)) => Err(remote_error(method, &value)),
            Err(source) => Err(RemoteCallError::Protocol {
                method: method.to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl EntryPoint for Py4jEntryPoint {
    async fn maximize_interface_window(&self) -> Result<(), RemoteCallError> {
        self.call(methods::MAXIMIZE_INTERFACE_WINDOW, vec![]).await?;
        Ok(())
    }

    async fn set_star_size(&self, size: f64) -> Result<(), RemoteCallError> {
        self.call(methods::SET_STAR_SIZE, vec![Argument::Double(size)])
            .await?;
        Ok(())
    }

    async fn sleep(&self, seconds: u32) -> Result<(), RemoteCallError> {
        // The gateway resolves overloads on the wire type; integers keep
        // the `sleep(int)` overload reachable.
        let seconds = i32::try_from(seconds).unwrap_or(i32::MAX);
        self.call(methods::SLEEP, vec![Argument::Integer(seconds)])
            .await?;
        Ok(())
    }
}

fn remote_error(method: &str, value: &ReturnValue) -> RemoteCallError {
    let message = describe(value);
    if message.contains(METHOD_MISSING_MARKER) {
        RemoteCallError::MethodNotFound {
            method: method.to_string(),
            message,
        }
    } else {
        RemoteCallError::Remote {
            method: method.to_string(),
            message,
        }
    }
}

/// Render an error payload for logs and error messages
fn describe(value: &ReturnValue) -> String {
    match value {
        ReturnValue::String(message) => message.clone(),
        ReturnValue::Reference { id, .. } => format!("remote exception object {id}"),
        ReturnValue::Void | ReturnValue::Null => "no details".to_string(),
        other => format!("{other:?}"),
    }
}

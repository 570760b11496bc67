//! Skyprobe Gateway Protocol
//!
//! This crate defines the client side of the Py4J text protocol spoken by
//! the Gaia Sky scripting gateway.
//!
//! # Protocol Overview
//!
//! Communication occurs over a plain TCP stream. Every command is a
//! sequence of newline-terminated lines and every reply is a single line.
//!
//! ## Commands
//!
//! - `c` - Call a method on a gateway object (the entry point is `t`)
//! - `A` - Authenticate the connection with a token

mod command;
mod reply;

pub use command::*;
pub use reply::*;

/// Default gateway port
pub const DEFAULT_PORT: u16 = 25333;

/// Default gateway address
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Object id of the gateway entry point
pub const ENTRY_POINT_ID: &str = "t";

/// Remote method names exposed by the scripting entry point
pub mod methods {
    /// Maximize the controls window
    pub const MAXIMIZE_INTERFACE_WINDOW: &str = "maximizeInterfaceWindow";
    /// Set the star point size
    pub const SET_STAR_SIZE: &str = "setStarSize";
    /// Pause the script on the remote side
    pub const SLEEP: &str = "sleep";
}

//! Skyprobe
//!
//! Drives a running Gaia Sky instance through its scripting gateway and
//! checks that the star size setter can be swept end to end.

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod driver;
pub mod entry_point;
pub mod error;
pub mod mock;
pub mod prelude;

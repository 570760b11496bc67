// Convenience re-exports: use skyprobe::prelude::*;
pub use crate::client::Py4jConnector;
pub use crate::config::{ConfigStore, Configurable, GatewayConfig};
pub use crate::driver::{RunReport, SmokePlan, Step, run_smoke_test};
pub use crate::entry_point::{Connector, EntryPoint, Gateway};
pub use crate::error::{ConnectionError, RemoteCallError, SmokeError};

pub use async_trait::async_trait;

pub mod api;
pub mod core;
pub mod samples;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::api::{ConnectionRecord, ConsoleApi, HttpApiClient, TransportError};
pub use crate::core::activity_log::{ActivityLog, ActivityLogEntry, LogEvent, LogHistory, LogKind};
pub use crate::core::connection_store::ConnectionStore;
pub use crate::core::console::{Console, PresentationAdapter};
pub use crate::core::dispatcher::{CommandDispatcher, CommandError, Confirmation, ConnectionForm};
pub use crate::core::poller::{Poller, PollerHandle};
pub use crate::storage::config::{ConfigStore, ConsoleConfig};

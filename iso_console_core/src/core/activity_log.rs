use std::fmt::{self, Display};
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};

pub const READY_MESSAGE: &str = "Console ready. Waiting for actions...";
pub const CLEARED_MESSAGE: &str = "Console cleared.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Error,
    /// Raw outbound message as the backend sent it.
    Request,
    /// Raw inbound message as the backend received it.
    Response,
}

impl Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogKind::Info => "info",
            LogKind::Success => "success",
            LogKind::Error => "error",
            LogKind::Request => "request",
            LogKind::Response => "response",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogEntry {
    /// Captured when the entry was appended, never at render time.
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub kind: LogKind,
}

impl ActivityLogEntry {
    fn now(message: String, kind: LogKind) -> Self {
        Self {
            timestamp: Local::now(),
            message,
            kind,
        }
    }

    /// `14:03:07.042`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}

#[derive(Debug, Clone)]
pub enum LogEvent {
    Appended(ActivityLogEntry),
    /// The log was wiped; the payload is the single entry that replaced it.
    Cleared(ActivityLogEntry),
}

/// Operator-facing, append-only record of what the console did.
///
/// Clones share the same underlying sequence. Entries are ordered by the
/// moment `append` ran, i.e. by completion of whatever produced them.
#[derive(Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<Vec<ActivityLogEntry>>>,
    events_tx: broadcast::Sender<LogEvent>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let ready = ActivityLogEntry::now(READY_MESSAGE.to_string(), LogKind::Info);
        Self {
            entries: Arc::new(Mutex::new(vec![ready])),
            events_tx,
        }
    }

    pub async fn append(&self, message: impl Into<String>, kind: LogKind) -> ActivityLogEntry {
        let entry = ActivityLogEntry::now(message.into(), kind);
        debug!("activity [{}] {}", entry.kind, entry.message);
        {
            let mut entries = self.entries.lock().await;
            entries.push(entry.clone());
            // Sent under the lock so subscribers see events in sequence order.
            let _ = self.events_tx.send(LogEvent::Appended(entry.clone()));
        }
        entry
    }

    pub async fn info(&self, message: impl Into<String>) -> ActivityLogEntry {
        self.append(message, LogKind::Info).await
    }

    pub async fn success(&self, message: impl Into<String>) -> ActivityLogEntry {
        self.append(message, LogKind::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> ActivityLogEntry {
        self.append(message, LogKind::Error).await
    }

    /// Replaces everything with a single "cleared" info entry.
    pub async fn clear(&self) -> ActivityLogEntry {
        let entry = ActivityLogEntry::now(CLEARED_MESSAGE.to_string(), LogKind::Info);
        {
            let mut entries = self.entries.lock().await;
            *entries = vec![entry.clone()];
            let _ = self.events_tx.send(LogEvent::Cleared(entry.clone()));
        }
        debug!("activity log cleared");
        entry
    }

    pub async fn entries(&self) -> Vec<ActivityLogEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events_tx.subscribe()
    }

    /// Read access to the entries that does not keep the event channel open.
    pub fn history(&self) -> LogHistory {
        LogHistory {
            entries: self.entries.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LogHistory {
    entries: Arc<Mutex<Vec<ActivityLogEntry>>>,
}

impl LogHistory {
    pub async fn entries(&self) -> Vec<ActivityLogEntry> {
        self.entries.lock().await.clone()
    }

    /// Current entries plus a receiver positioned right after them.
    ///
    /// Events are sent under the entries lock, so nothing is missed or seen
    /// twice across the switch.
    pub async fn resync(
        &self,
        events: &broadcast::Receiver<LogEvent>,
    ) -> (Vec<ActivityLogEntry>, broadcast::Receiver<LogEvent>) {
        let entries = self.entries.lock().await;
        (entries.clone(), events.resubscribe())
    }
}

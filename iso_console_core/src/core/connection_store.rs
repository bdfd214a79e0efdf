use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{broadcast, Mutex};

use crate::api::{ApiResponse, ConnectionRecord, ConsoleApi, TransportError};
use crate::core::activity_log::ActivityLog;

/// Last-known view of the backend's connection list.
///
/// The snapshot is a single cell that is only ever replaced as a whole.
/// `refresh` holds no lock while the list request is in flight; it swaps the
/// cell when the response arrives. Two overlapping refreshes therefore leave
/// behind whichever one *completed* last, stale or not. There is no merging.
///
/// Cloning the store is cheap and every clone shares the same snapshot.
#[derive(Clone)]
pub struct ConnectionStore {
    api: Arc<dyn ConsoleApi>,
    log: ActivityLog,
    snapshot: Arc<Mutex<Vec<ConnectionRecord>>>,
    snapshot_tx: broadcast::Sender<Vec<ConnectionRecord>>,
}

impl ConnectionStore {
    pub fn new(api: Arc<dyn ConsoleApi>, log: ActivityLog) -> Self {
        let (snapshot_tx, _) = broadcast::channel(64);
        Self {
            api,
            log,
            snapshot: Arc::new(Mutex::new(Vec::new())),
            snapshot_tx,
        }
    }

    /// Ordered copy of the current snapshot.
    pub async fn snapshot(&self) -> Vec<ConnectionRecord> {
        self.snapshot.lock().await.clone()
    }

    pub async fn get(&self, connection_id: &str) -> Option<ConnectionRecord> {
        let snapshot = self.snapshot.lock().await;
        snapshot
            .iter()
            .find(|r| r.connection_id == connection_id)
            .cloned()
    }

    pub async fn contains(&self, connection_id: &str) -> bool {
        self.get(connection_id).await.is_some()
    }

    /// Every snapshot that replaces the current one, in replacement order.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<ConnectionRecord>> {
        self.snapshot_tx.subscribe()
    }

    /// Pulls the full list and swaps it in.
    ///
    /// On failure the snapshot is untouched and one error entry goes to the
    /// activity log. Success logs nothing there.
    pub async fn refresh(&self) -> Result<(), TransportError> {
        match self.api.list_connections().await {
            Ok(records) => {
                let records = dedup_by_id(records);
                debug!("Snapshot replaced with {} connection(s)", records.len());
                let mut snapshot = self.snapshot.lock().await;
                *snapshot = records;
                let _ = self.snapshot_tx.send(snapshot.clone());
                Ok(())
            }
            Err(e) => {
                self.log
                    .error(format!("Error refreshing connections: {}", e))
                    .await;
                Err(e)
            }
        }
    }

    /// Reconciles after a mutating command resolved.
    ///
    /// Fields are never flipped locally; a successful outcome re-pulls the
    /// authoritative list instead. Failed outcomes leave the snapshot alone.
    pub async fn apply_mutation_result(&self, connection_id: &str, outcome: &ApiResponse) {
        if !outcome.success {
            debug!("'{}' mutation failed; snapshot kept", connection_id);
            return;
        }
        debug!("'{}' mutated; refreshing", connection_id);
        // A failed refresh has already been written to the activity log.
        let _ = self.refresh().await;
    }
}

/// Keeps the first record for each id so the snapshot never holds two.
fn dedup_by_id(records: Vec<ConnectionRecord>) -> Vec<ConnectionRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| {
            let first = seen.insert(r.connection_id.clone());
            if !first {
                warn!("Backend listed '{}' more than once", r.connection_id);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, connected: bool) -> ConnectionRecord {
        ConnectionRecord {
            connection_id: id.into(),
            host: "127.0.0.1".into(),
            port: 5000,
            connected,
        }
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let records = vec![record("a", true), record("b", false), record("a", false)];
        let deduped = dedup_by_id(records);
        assert_eq!(deduped, vec![record("a", true), record("b", false)]);
    }

    #[test]
    fn dedup_preserves_remote_order() {
        let records = vec![record("z", false), record("a", false), record("m", true)];
        let ids: Vec<_> = dedup_by_id(records)
            .into_iter()
            .map(|r| r.connection_id)
            .collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }
}

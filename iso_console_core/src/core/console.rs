use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::api::{ConnectionRecord, ConsoleApi, HttpApiClient, TransportError};
use crate::core::activity_log::{ActivityLog, ActivityLogEntry, LogEvent};
use crate::core::connection_store::ConnectionStore;
use crate::core::dispatcher::CommandDispatcher;
use crate::core::poller::{Poller, PollerHandle};
use crate::storage::config::ConsoleConfig;

/// A rendering strategy for the console (terminal, GUI, web, test probe...).
///
/// Implementors only draw; operator intents go to the `CommandDispatcher`.
pub trait PresentationAdapter: Send + 'static {
    fn render_connections(&mut self, snapshot: &[ConnectionRecord]);
    fn render_log_entry(&mut self, entry: &ActivityLogEntry);
    /// The log was wiped and now holds only `entry`.
    fn render_log_cleared(&mut self, entry: &ActivityLogEntry);

    /// Log events were missed; `entries` is the whole log as it stands now.
    fn render_log_resync(&mut self, entries: &[ActivityLogEntry]) {
        if let Some((first, rest)) = entries.split_first() {
            self.render_log_cleared(first);
            for entry in rest {
                self.render_log_entry(entry);
            }
        }
    }
}

/// One console session: a log, a store and a dispatcher over the same API.
#[derive(Clone)]
pub struct Console {
    log: ActivityLog,
    store: ConnectionStore,
    dispatcher: CommandDispatcher,
    poll_interval: Duration,
}

impl Console {
    pub fn new(api: Arc<dyn ConsoleApi>, poll_interval: Duration) -> Self {
        let log = ActivityLog::new();
        let store = ConnectionStore::new(api.clone(), log.clone());
        let dispatcher = CommandDispatcher::new(api, store.clone(), log.clone());
        Self {
            log,
            store,
            dispatcher,
            poll_interval,
        }
    }

    /// Builds the HTTP-backed console described by `config`.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, TransportError> {
        let api = HttpApiClient::new(&config.api_base_url, config.request_timeout())?;
        Ok(Self::new(Arc::new(api), config.poll_interval()))
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// `None` when the configured interval is zero, i.e. polling is off.
    pub fn start_polling(&self) -> Option<PollerHandle> {
        if self.poll_interval.is_zero() {
            debug!("Polling disabled");
            return None;
        }
        Some(Poller::spawn(self.store.clone(), self.poll_interval))
    }

    /// Forwards every snapshot replacement and log change to `adapter`.
    ///
    /// Only changes made after this call are forwarded, except after a lag,
    /// when the whole log is handed over again. The task runs until both the
    /// store and the log have been dropped.
    pub fn attach<A: PresentationAdapter>(&self, mut adapter: A) -> tokio::task::JoinHandle<()> {
        let mut snapshots = self.store.subscribe();
        let mut log_events = self.log.subscribe();
        let history = self.log.history();

        tokio::spawn(async move {
            let mut snapshots_open = true;
            let mut log_open = true;
            while snapshots_open || log_open {
                tokio::select! {
                    snapshot = snapshots.recv(), if snapshots_open => match snapshot {
                        Ok(records) => adapter.render_connections(&records),
                        Err(RecvError::Lagged(n)) => warn!("Renderer skipped {} snapshot(s)", n),
                        Err(RecvError::Closed) => snapshots_open = false,
                    },
                    event = log_events.recv(), if log_open => match event {
                        Ok(LogEvent::Appended(entry)) => adapter.render_log_entry(&entry),
                        Ok(LogEvent::Cleared(entry)) => adapter.render_log_cleared(&entry),
                        Err(RecvError::Lagged(n)) => {
                            warn!("Renderer missed {} log event(s), redrawing the log", n);
                            let (entries, fresh) = history.resync(&log_events).await;
                            log_events = fresh;
                            adapter.render_log_resync(&entries);
                        }
                        Err(RecvError::Closed) => log_open = false,
                    },
                }
            }
            debug!("Presentation task ended.");
        })
    }
}

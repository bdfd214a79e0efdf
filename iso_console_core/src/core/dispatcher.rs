use std::fmt::{self, Display};
use std::sync::Arc;

use log::{debug, info};

use crate::api::{ConsoleApi, ExchangeResponse, TransportError};
use crate::core::activity_log::{ActivityLog, LogKind};
use crate::core::connection_store::ConnectionStore;

/// Why an operator command did not go through.
///
/// By the time a dispatcher method returns one of these, the matching entry
/// is already in the activity log (except for `Cancelled`, which is silent).
#[derive(Debug)]
pub enum CommandError {
    /// Bad or missing input; no request was made.
    Validation(String),
    /// The backend answered `success: false`.
    Api(String),
    Transport(TransportError),
    /// The operator declined a confirmation prompt.
    Cancelled,
}

impl From<TransportError> for CommandError {
    fn from(err: TransportError) -> Self {
        CommandError::Transport(err)
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            CommandError::Api(msg) => write!(f, "Rejected by backend: {}", msg),
            CommandError::Transport(e) => write!(f, "Transport error: {}", e),
            CommandError::Cancelled => write!(f, "Cancelled by operator"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Outcome of the out-of-band "are you sure?" step for destructive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Denied,
}

/// Raw text of the "add connection" inputs, exactly as the operator typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionForm {
    pub connection_id: String,
    pub host: String,
    pub port: String,
}

impl ConnectionForm {
    pub fn new(
        connection_id: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            host: host.into(),
            port: port.into(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        self.connection_id.is_empty() && self.host.is_empty() && self.port.is_empty()
    }
}

/// Turns operator intents into API calls plus activity log entries.
///
/// Each call is independent: nothing is queued, coalesced or rate limited, and
/// two commands may be in flight at once.
#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn ConsoleApi>,
    store: ConnectionStore,
    log: ActivityLog,
}

impl CommandDispatcher {
    pub fn new(api: Arc<dyn ConsoleApi>, store: ConnectionStore, log: ActivityLog) -> Self {
        Self { api, store, log }
    }

    pub async fn add_connection(&self, form: &mut ConnectionForm) -> Result<(), CommandError> {
        let connection_id = form.connection_id.trim().to_string();
        let host = form.host.trim().to_string();
        let port = form.port.trim();

        if connection_id.is_empty() || host.is_empty() || port.is_empty() {
            return Err(self.reject("Please fill in all fields").await);
        }
        let port = match port.parse::<u16>() {
            Ok(p) if p > 0 => p,
            _ => return Err(self.reject("Port must be a number between 1 and 65535").await),
        };

        info!("Adding connection '{}' -> {}:{}", connection_id, host, port);
        match self.api.create_connection(&connection_id, &host, port).await {
            Ok(outcome) if outcome.success => {
                self.log
                    .success(format!("Connection '{}' added successfully", connection_id))
                    .await;
                form.clear();
                self.store
                    .apply_mutation_result(&connection_id, &outcome)
                    .await;
                Ok(())
            }
            Ok(outcome) => Err(self
                .api_failure("Failed to add connection", outcome.message)
                .await),
            Err(e) => Err(self.transport_failure(e).await),
        }
    }

    pub async fn remove_connection(
        &self,
        connection_id: &str,
        confirmation: Confirmation,
    ) -> Result<(), CommandError> {
        if confirmation == Confirmation::Denied {
            debug!("Removal of '{}' not confirmed", connection_id);
            return Err(CommandError::Cancelled);
        }
        if connection_id.is_empty() {
            return Err(self.reject("Please select a connection").await);
        }

        self.log
            .info(format!("Removing connection {}...", connection_id))
            .await;
        match self.api.delete_connection(connection_id).await {
            Ok(outcome) if outcome.success => {
                self.log
                    .success(format!("Connection {} removed", connection_id))
                    .await;
                self.store.apply_mutation_result(connection_id, &outcome).await;
                Ok(())
            }
            Ok(outcome) => Err(self.api_failure("Remove failed", outcome.message).await),
            Err(e) => Err(self.transport_failure(e).await),
        }
    }

    /// Does not refuse an already-connected id; disabling that action is the
    /// presentation layer's job.
    pub async fn connect(&self, connection_id: &str) -> Result<(), CommandError> {
        self.require_known(connection_id).await?;

        self.log
            .info(format!("Connecting to {}...", connection_id))
            .await;
        match self.api.connect(connection_id).await {
            Ok(outcome) if outcome.success => {
                self.log
                    .success(format!("Connected to {}", connection_id))
                    .await;
                self.store.apply_mutation_result(connection_id, &outcome).await;
                Ok(())
            }
            Ok(outcome) => Err(self.api_failure("Connection failed", outcome.message).await),
            Err(e) => Err(self.transport_failure(e).await),
        }
    }

    pub async fn disconnect(&self, connection_id: &str) -> Result<(), CommandError> {
        self.require_known(connection_id).await?;

        self.log
            .info(format!("Disconnecting from {}...", connection_id))
            .await;
        match self.api.disconnect(connection_id).await {
            Ok(outcome) if outcome.success => {
                self.log
                    .success(format!("Disconnected from {}", connection_id))
                    .await;
                self.store.apply_mutation_result(connection_id, &outcome).await;
                Ok(())
            }
            Ok(outcome) => Err(self.api_failure("Disconnect failed", outcome.message).await),
            Err(e) => Err(self.transport_failure(e).await),
        }
    }

    pub async fn send_echo(&self, selected: Option<&str>) -> Result<(), CommandError> {
        let connection_id = self.require_selection(selected).await?;

        self.log
            .info(format!("Sending echo to {}...", connection_id))
            .await;
        let result = self.api.send_echo(connection_id).await;
        self.log_exchange(result, "Echo sent successfully", "Echo failed")
            .await
    }

    pub async fn send_message(
        &self,
        selected: Option<&str>,
        message: &str,
    ) -> Result<(), CommandError> {
        let connection_id = self.require_selection(selected).await?;
        let message = message.trim();
        if message.is_empty() {
            return Err(self.reject("Please enter a message").await);
        }

        self.log
            .info(format!("Sending message to {}...", connection_id))
            .await;
        let result = self.api.send_message(connection_id, message).await;
        self.log_exchange(result, "Message sent successfully", "Send failed")
            .await
    }

    pub async fn clear_log(&self) {
        self.log.clear().await;
    }

    pub async fn refresh(&self) -> Result<(), CommandError> {
        self.store.refresh().await.map_err(CommandError::from)
    }

    async fn log_exchange(
        &self,
        result: Result<ExchangeResponse, TransportError>,
        success_message: &str,
        failure_prefix: &str,
    ) -> Result<(), CommandError> {
        match result {
            Ok(reply) if reply.success => {
                self.log.success(success_message).await;
                self.log
                    .append(
                        format!("Request: {}", reply.request.unwrap_or_default()),
                        LogKind::Request,
                    )
                    .await;
                self.log
                    .append(
                        format!("Response: {}", reply.response.unwrap_or_default()),
                        LogKind::Response,
                    )
                    .await;
                Ok(())
            }
            Ok(reply) => Err(self.api_failure(failure_prefix, reply.message).await),
            Err(e) => Err(self.transport_failure(e).await),
        }
    }

    async fn require_known(&self, connection_id: &str) -> Result<(), CommandError> {
        if connection_id.is_empty() {
            return Err(self.reject("Please select a connection").await);
        }
        if !self.store.contains(connection_id).await {
            return Err(self
                .reject(format!("Unknown connection '{}'", connection_id))
                .await);
        }
        Ok(())
    }

    async fn require_selection<'a>(
        &self,
        selected: Option<&'a str>,
    ) -> Result<&'a str, CommandError> {
        match selected {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(self.reject("Please select a connection").await),
        }
    }

    async fn reject(&self, message: impl Into<String>) -> CommandError {
        let message = message.into();
        self.log.error(message.clone()).await;
        CommandError::Validation(message)
    }

    async fn api_failure(&self, prefix: &str, message: Option<String>) -> CommandError {
        let message = message.unwrap_or_else(|| "unknown error".to_string());
        self.log.error(format!("{}: {}", prefix, message)).await;
        CommandError::Api(message)
    }

    async fn transport_failure(&self, err: TransportError) -> CommandError {
        self.log.error(format!("Error: {}", err)).await;
        CommandError::Transport(err)
    }
}

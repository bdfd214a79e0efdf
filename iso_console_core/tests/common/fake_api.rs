//! A deterministic **in‑process backend** implementing
//! `iso_console_core::api::ConsoleApi`.
//!
//! *  **From the test’s perspective**
//!    * Seed the remote connection table with `FakeApi::with_connections`.
//!    * Inspect every request the console issued via `fake_api.calls()`.
//!    * Script failures with `fail_next` / `fail_next_list`.
//!    * Hold a list request open with `gate_next_list` to control *when* a
//!      refresh completes. The gated call captures the table when it starts,
//!      so it returns exactly what a slow poll would: data that may be stale
//!      by the time it lands.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use iso_console_core::api::{
    ApiResponse, ConnectionRecord, ConsoleApi, ExchangeResponse, TransportError,
};
use tokio::sync::oneshot;

pub const ECHO_REQUEST: &str = "MTI=0800|F70=301";
pub const ECHO_RESPONSE: &str = "MTI=0810|F39=00|F70=301";
pub const SEND_RESPONSE: &str = "MTI=0210|F39=00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Create { id: String, host: String, port: u16 },
    Delete(String),
    Connect(String),
    Disconnect(String),
    Echo(String),
    Send { id: String, message: String },
}

impl ApiCall {
    pub fn is_list(&self) -> bool {
        matches!(self, ApiCall::List)
    }
}

/// What the next scripted non-list call should do instead of succeeding.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Well-formed reply with `success: false`.
    Api(Option<String>),
    /// No reply at all.
    Transport,
}

pub struct FakeApi {
    remote: Mutex<Vec<ConnectionRecord>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<VecDeque<Failure>>,
    list_failures: Mutex<usize>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

pub fn record(id: &str, port: u16, connected: bool) -> ConnectionRecord {
    ConnectionRecord {
        connection_id: id.into(),
        host: "127.0.0.1".into(),
        port,
        connected,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::with_connections(Vec::new())
    }

    pub fn with_connections(records: Vec<ConnectionRecord>) -> Self {
        Self {
            remote: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            list_failures: Mutex::new(0),
            list_gates: Mutex::new(VecDeque::new()),
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.is_list()).count()
    }

    /// Every call except `List`.
    pub fn command_calls(&self) -> Vec<ApiCall> {
        self.calls().into_iter().filter(|c| !c.is_list()).collect()
    }

    pub fn remote(&self) -> Vec<ConnectionRecord> {
        self.remote.lock().unwrap().clone()
    }

    /// Changes the backend table without going through the API.
    pub fn set_remote(&self, records: Vec<ConnectionRecord>) {
        *self.remote.lock().unwrap() = records;
    }

    pub fn fail_next(&self, failure: Failure) {
        self.failures.lock().unwrap().push_back(failure);
    }

    pub fn fail_next_list(&self) {
        *self.list_failures.lock().unwrap() += 1;
    }

    /// The next list request blocks until the returned sender fires (or is
    /// dropped).
    pub fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        tx
    }

    fn record_call(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_failure(&self) -> Option<Failure> {
        self.failures.lock().unwrap().pop_front()
    }

    /// Runs `apply` against the table unless a failure is scripted.
    fn mutate(
        &self,
        apply: impl FnOnce(&mut Vec<ConnectionRecord>) -> Result<(), String>,
    ) -> Result<ApiResponse, TransportError> {
        match self.scripted_failure() {
            Some(Failure::Api(message)) => Ok(ApiResponse {
                success: false,
                message,
            }),
            Some(Failure::Transport) => Err(TransportError::Network("connection refused".into())),
            None => {
                let mut remote = self.remote.lock().unwrap();
                Ok(match apply(&mut remote) {
                    Ok(()) => ApiResponse {
                        success: true,
                        message: Some("ok".into()),
                    },
                    Err(message) => ApiResponse {
                        success: false,
                        message: Some(message),
                    },
                })
            }
        }
    }

    fn exchange(&self, id: &str, request: String, response: &str) -> Result<ExchangeResponse, TransportError> {
        match self.scripted_failure() {
            Some(Failure::Api(message)) => Ok(ExchangeResponse {
                success: false,
                message,
                ..Default::default()
            }),
            Some(Failure::Transport) => Err(TransportError::Network("connection refused".into())),
            None => {
                let connected = self
                    .remote
                    .lock()
                    .unwrap()
                    .iter()
                    .any(|r| r.connection_id == id && r.connected);
                if connected {
                    Ok(ExchangeResponse {
                        success: true,
                        message: Some("ok".into()),
                        request: Some(request),
                        response: Some(response.to_string()),
                    })
                } else {
                    Ok(ExchangeResponse {
                        success: false,
                        message: Some(format!("Connection {id} is not connected")),
                        ..Default::default()
                    })
                }
            }
        }
    }
}

fn set_connected(
    remote: &mut [ConnectionRecord],
    id: &str,
    connected: bool,
) -> Result<(), String> {
    match remote.iter_mut().find(|r| r.connection_id == id) {
        Some(r) => {
            r.connected = connected;
            Ok(())
        }
        None => Err(format!("Connection not found: {id}")),
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, TransportError> {
        self.record_call(ApiCall::List);
        // Captured at request time, returned at completion time.
        let captured = self.remote();
        let gate = self.list_gates.lock().unwrap().pop_front();
        let fail = {
            let mut failures = self.list_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                true
            } else {
                false
            }
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if fail {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(captured)
    }

    async fn create_connection(
        &self,
        connection_id: &str,
        host: &str,
        port: u16,
    ) -> Result<ApiResponse, TransportError> {
        self.record_call(ApiCall::Create {
            id: connection_id.into(),
            host: host.into(),
            port,
        });
        self.mutate(|remote| {
            if remote.iter().any(|r| r.connection_id == connection_id) {
                return Err(format!("Connection already exists: {connection_id}"));
            }
            remote.push(ConnectionRecord {
                connection_id: connection_id.into(),
                host: host.into(),
                port,
                connected: false,
            });
            Ok(())
        })
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        self.record_call(ApiCall::Delete(connection_id.into()));
        self.mutate(|remote| {
            let before = remote.len();
            remote.retain(|r| r.connection_id != connection_id);
            if remote.len() == before {
                Err(format!("Connection not found: {connection_id}"))
            } else {
                Ok(())
            }
        })
    }

    async fn connect(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        self.record_call(ApiCall::Connect(connection_id.into()));
        self.mutate(|remote| set_connected(remote, connection_id, true))
    }

    async fn disconnect(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        self.record_call(ApiCall::Disconnect(connection_id.into()));
        self.mutate(|remote| set_connected(remote, connection_id, false))
    }

    async fn send_echo(&self, connection_id: &str) -> Result<ExchangeResponse, TransportError> {
        self.record_call(ApiCall::Echo(connection_id.into()));
        self.exchange(connection_id, ECHO_REQUEST.to_string(), ECHO_RESPONSE)
    }

    async fn send_message(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<ExchangeResponse, TransportError> {
        self.record_call(ApiCall::Send {
            id: connection_id.into(),
            message: message.into(),
        });
        self.exchange(connection_id, message.to_string(), SEND_RESPONSE)
    }
}

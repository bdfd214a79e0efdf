use serde::{Deserialize, Serialize};

/// One named connection as the backend reports it.
///
/// JSON looks like:
/// `{ "connectionId":"server1", "host":"192.168.1.100", "port":5000, "connected":false }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub connection_id: String,
    pub host: String,
    pub port: u16,
    pub connected: bool,
}

impl ConnectionRecord {
    /// `server1 (192.168.1.100:5000)`
    pub fn label(&self) -> String {
        format!("{} ({}:{})", self.connection_id, self.host, self.port)
    }

    /// Whether a "connect" action makes sense for this record.
    pub fn can_connect(&self) -> bool {
        !self.connected
    }

    /// Whether a "disconnect" action makes sense for this record.
    pub fn can_disconnect(&self) -> bool {
        self.connected
    }
}

/// Reply to create / delete / connect / disconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reply to echo / send: the raw request and response the backend exchanged
/// with the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub connection_id: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

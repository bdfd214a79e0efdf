use async_trait::async_trait;

use super::errors::TransportError;
use super::types::{ApiResponse, ConnectionRecord, ExchangeResponse};

/// The backend's REST surface, one method per remote operation.
///
/// Implementations only perform the request; they never retry and never
/// touch client-side state.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, TransportError>;

    async fn create_connection(
        &self,
        connection_id: &str,
        host: &str,
        port: u16,
    ) -> Result<ApiResponse, TransportError>;

    async fn delete_connection(&self, connection_id: &str) -> Result<ApiResponse, TransportError>;

    async fn connect(&self, connection_id: &str) -> Result<ApiResponse, TransportError>;

    async fn disconnect(&self, connection_id: &str) -> Result<ApiResponse, TransportError>;

    async fn send_echo(&self, connection_id: &str) -> Result<ExchangeResponse, TransportError>;

    async fn send_message(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<ExchangeResponse, TransportError>;
}

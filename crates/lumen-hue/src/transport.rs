//! Network access to Hue bridges
//!
//! The registry is handed one transport at construction and passes it down to
//! every bridge, so tests can substitute their own.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Default HTTP timeout for bridge requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bridge at {address} returned HTTP {status}")]
    Status { address: Ipv4Addr, status: u16 },
    #[error("Bridge error {code}: {description}")]
    Bridge { code: i64, description: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Bridge {0} is not authenticated")]
    Unauthenticated(String),
    #[error("Network access is disabled")]
    Offline,
}

/// Shared network capability used by bridges
#[async_trait]
pub trait BridgeTransport: Debug + Send + Sync {
    /// GET `path` on the bridge at `address` and decode the JSON body
    async fn get_json(&self, address: Ipv4Addr, path: &str) -> Result<Value, TransportError>;
}

/// Plain HTTP transport for the bridge REST API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BridgeTransport for HttpTransport {
    async fn get_json(&self, address: Ipv4Addr, path: &str) -> Result<Value, TransportError> {
        let url = format!("http://{}{}", address, path);
        trace!(url = %url, "Bridge request");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status {
                address,
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Transport that refuses every request, for runs that must not touch the network
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

#[async_trait]
impl BridgeTransport for OfflineTransport {
    async fn get_json(&self, _address: Ipv4Addr, _path: &str) -> Result<Value, TransportError> {
        Err(TransportError::Offline)
    }
}

/// Turn a bridge-level error payload (`[{"error": {...}}]`) into an error
pub fn check_bridge_error(body: &Value) -> Result<(), TransportError> {
    let Some(items) = body.as_array() else {
        return Ok(());
    };
    for item in items {
        if let Some(error) = item.get("error") {
            return Err(TransportError::Bridge {
                code: error.get("type").and_then(Value::as_i64).unwrap_or(0),
                description: error
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }
    Ok(())
}

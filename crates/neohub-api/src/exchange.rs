// The request/response contract the polling core consumes.
//
// One operation: opaque string in, opaque string out, or a transport
// failure. `HubSocket` is the production implementation; tests and
// alternative transports provide their own.

use async_trait::async_trait;

use crate::error::Error;
use crate::socket::HubSocket;

/// A single blocking request/response exchange with the hub.
#[async_trait]
pub trait HubExchange: Send + Sync {
    /// Send `request` and wait for the complete response payload.
    async fn exchange(&self, request: &str) -> Result<String, Error>;
}

#[async_trait]
impl HubExchange for HubSocket {
    async fn exchange(&self, request: &str) -> Result<String, Error> {
        self.send_message(request).await
    }
}

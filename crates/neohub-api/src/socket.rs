// NeoHub TCP transport
//
// The hub speaks a minimal line protocol: the client connects, writes one
// JSON request terminated by a NUL byte, and the hub answers with one JSON
// payload terminated the same way, then drops the connection. There is no
// session to keep alive -- every exchange opens a fresh stream.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::Error;

/// Terminator the hub appends to (and expects after) every payload.
const MESSAGE_TERMINATOR: u8 = 0;

/// Read buffer granularity. INFO responses for a large installation run to
/// tens of kilobytes, so reads are chunked rather than byte-at-a-time.
const READ_CHUNK: usize = 4096;

/// One logical session to a NeoHub.
///
/// Holds the address and deadline only; the TCP stream itself is opened per
/// exchange. A failed exchange leaves nothing to clean up -- the session is
/// presumed broken until the next exchange succeeds.
#[derive(Debug, Clone)]
pub struct HubSocket {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HubSocket {
    /// Create a socket for the given hub address.
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// The configured hub host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured hub port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send one request and block until the full response arrives.
    ///
    /// The entire exchange (connect, write, read) shares a single deadline.
    /// Any failure -- timeout, refused connection, reset, empty response --
    /// surfaces as an [`Error`]; the caller treats them all as "the hub is
    /// unreachable right now".
    pub async fn send_message(&self, request: &str) -> Result<String, Error> {
        debug!(host = %self.host, port = self.port, "hub exchange: {request}");

        match tokio::time::timeout(self.timeout, self.exchange_once(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }

    async fn exchange_once(&self, request: &str) -> Result<String, Error> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;

        stream.write_all(request.as_bytes()).await?;
        stream.write_all(&[MESSAGE_TERMINATOR]).await?;
        stream.flush().await?;

        let mut response: Vec<u8> = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                // EOF: some firmware closes the stream instead of writing
                // the terminator. Accept whatever arrived, if anything did.
                if response.is_empty() {
                    return Err(Error::ConnectionClosed);
                }
                break;
            }

            if let Some(pos) = chunk[..n].iter().position(|&b| b == MESSAGE_TERMINATOR) {
                response.extend_from_slice(&chunk[..pos]);
                break;
            }
            response.extend_from_slice(&chunk[..n]);
        }

        let text = String::from_utf8_lossy(&response).trim().to_owned();
        if text.is_empty() {
            return Err(Error::ConnectionClosed);
        }

        debug!(bytes = text.len(), "hub response received");
        Ok(text)
    }
}

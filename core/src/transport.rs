//! Blocking TCP transport for hand-built requests.
//!
//! One request per connection: connect with a timeout, write the request,
//! read until the peer closes, split the bytes into head and body. The socket
//! is dropped, and therefore closed, on every return path.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{Phase, TransportError};
use crate::http::HttpResponse;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct RawHttpClient {
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl Default for RawHttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT)
    }
}

impl RawHttpClient {
    pub fn new(connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            io_timeout,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.connect_timeout(), config.io_timeout())
    }

    /// Send `request` to `host:port` and read the response to end of stream.
    pub fn send(
        &self,
        host: &str,
        port: u16,
        request: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        let mut stream = self.connect(host, port)?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        stream
            .write_all(request)
            .and_then(|()| stream.flush())
            .map_err(|e| self.io_error(Phase::Write, e))?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .map_err(|e| self.io_error(Phase::Read, e))?;

        debug!(host, port, sent = request.len(), received = raw.len(), "request complete");
        Ok(HttpResponse::from_raw(&raw))
    }

    fn connect(&self, host: &str, port: u16) -> Result<TcpStream, TransportError> {
        let addr = format!("{host}:{port}");
        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                addr: addr.clone(),
                source,
            })?
            .collect();

        let mut last_err =
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses");
        for candidate in &candidates {
            match TcpStream::connect_timeout(candidate, self.connect_timeout) {
                Ok(stream) => {
                    debug!(%addr, peer = %candidate, "connected");
                    return Ok(stream);
                }
                Err(e) if is_timeout(&e) => {
                    return Err(TransportError::Timeout {
                        phase: Phase::Connect,
                        after: self.connect_timeout,
                    })
                }
                Err(e) => last_err = e,
            }
        }

        if candidates.is_empty() {
            return Err(TransportError::Resolve {
                addr,
                source: last_err,
            });
        }
        Err(TransportError::Connect {
            addr,
            source: last_err,
        })
    }

    fn io_error(&self, phase: Phase, e: io::Error) -> TransportError {
        if is_timeout(&e) {
            TransportError::Timeout {
                phase,
                after: self.io_timeout,
            }
        } else {
            TransportError::Io(e)
        }
    }
}

/// Socket timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

//! Stream factory used by the session client.
//!
//! [`AprsIsClient`](crate::AprsIsClient) never opens sockets itself; it asks
//! a [`Connector`]. Production code uses [`TcpConnector`]; tests plug in
//! in-memory pipes.

use std::future::Future;
use std::io;

use easyaprs_models::ServerCandidate;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Opens a byte stream to a server candidate.
///
/// Timeouts are applied by the caller.
pub trait Connector: Send + Sync + 'static {
    /// The stream type produced on success.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        server: &ServerCandidate,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP, resolving `host` through the system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, server: &ServerCandidate) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((server.host.as_str(), server.port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

//! Session error types.
//!
//! Failures against a single server are [`CandidateError`]s and are
//! recovered by moving on to the next candidate. [`SessionError`] is what
//! callers of the client actually see.

use std::io;
use std::time::Duration;

use easyaprs_models::ServerCandidate;

/// Why one server candidate could not be used.
#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    /// DNS failure, refused connection, or other socket error.
    #[error("connection to {server} failed: {source}")]
    Connect {
        server: ServerCandidate,
        #[source]
        source: io::Error,
    },

    /// The TCP handshake did not complete in time.
    #[error("connection to {server} timed out after {timeout:?}")]
    ConnectTimeout {
        server: ServerCandidate,
        timeout: Duration,
    },

    /// I/O failed while sending the login line or reading the reply.
    #[error("login exchange with {server} failed: {source}")]
    Login {
        server: ServerCandidate,
        #[source]
        source: io::Error,
    },

    /// The server answered without a verified `logresp`.
    #[error("login rejected by {server}")]
    LoginRejected {
        server: ServerCandidate,
        response: String,
    },
}

impl CandidateError {
    /// The server this failure belongs to.
    pub fn server(&self) -> &ServerCandidate {
        match self {
            Self::Connect { server, .. }
            | Self::ConnectTimeout { server, .. }
            | Self::Login { server, .. }
            | Self::LoginRejected { server, .. } => server,
        }
    }
}

/// Error type for all session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The client was built with an empty server list.
    #[error("no APRS-IS servers configured")]
    NoCandidates,

    /// Every candidate was tried and none accepted the login.
    #[error("all {} APRS-IS server(s) failed", .failures.len())]
    Exhausted { failures: Vec<CandidateError> },

    /// Writing a packet to the authenticated session failed. The session has
    /// been torn down; the next send reconnects.
    #[error("send to {server} failed: {source}")]
    Send {
        server: ServerCandidate,
        #[source]
        source: io::Error,
    },
}

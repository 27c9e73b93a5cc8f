//! APRS-IS session client.
//!
//! [`AprsIsClient`] owns at most one live, authenticated stream. Every
//! state transition (connect, send, disconnect) happens with the session
//! lock held, so concurrent callers never interleave bytes on the wire.
//!
//! # Session lifecycle
//!
//! ```text
//! disconnected ─connect─▶ unauthenticated ─verified logresp─▶ authenticated
//!      ▲                        │                                  │
//!      └──── rejected / error ──┘◀──────── send error / disconnect ┘
//! ```
//!
//! A failed candidate never aborts the attempt: the client moves on to the
//! next server in configured order and only reports
//! [`SessionError::Exhausted`] once the whole list has been tried.

use std::io;
use std::time::Duration;

use easyaprs_models::ServerCandidate;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::connector::{Connector, TcpConnector};
use crate::credentials::{LoginCredentials, SoftwareId};
use crate::error::{CandidateError, SessionError};

const READ_CHUNK: usize = 1024;

/// Timeouts and behaviour switches for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on the TCP handshake per candidate.
    pub connect_timeout: Duration,
    /// Pause between TCP establishment and sending the login line.
    pub login_delay: Duration,
    /// Bound on each read while waiting for `logresp`.
    pub read_timeout: Duration,
    /// When set, no network I/O happens at all; packets are only logged.
    pub dry_run: bool,
    /// Software name/version announced in the login line.
    pub software: SoftwareId,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            login_delay: Duration::from_secs(1),
            read_timeout: Duration::from_secs(5),
            dry_run: false,
            software: SoftwareId::default(),
        }
    }
}

/// Observable state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    /// No socket.
    Disconnected,
    /// TCP is up, login not yet accepted.
    Unauthenticated,
    /// Login verified; packets may be sent.
    Authenticated,
}

/// Result of a successful [`AprsIsClient::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Logged in to this server.
    Authenticated(ServerCandidate),
    /// Dry-run mode; nothing was contacted.
    DryRun,
}

struct Live<S> {
    stream: S,
    server: ServerCandidate,
}

struct Session<S> {
    state: SessionState,
    live: Option<Live<S>>,
}

/// A transmit-only APRS-IS session shared by every beacon task.
pub struct AprsIsClient<C: Connector = TcpConnector> {
    connector: C,
    credentials: LoginCredentials,
    servers: Vec<ServerCandidate>,
    options: SessionOptions,
    session: Mutex<Session<C::Stream>>,
}

impl AprsIsClient<TcpConnector> {
    /// Build a client that connects over plain TCP.
    pub fn tcp(
        credentials: LoginCredentials,
        servers: Vec<ServerCandidate>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        Self::new(TcpConnector, credentials, servers, options)
    }
}

impl<C: Connector> AprsIsClient<C> {
    /// Build a client over an arbitrary [`Connector`].
    ///
    /// `servers` is tried in order on every (re)connect and must not be
    /// empty.
    pub fn new(
        connector: C,
        credentials: LoginCredentials,
        servers: Vec<ServerCandidate>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        if servers.is_empty() {
            return Err(SessionError::NoCandidates);
        }
        Ok(Self {
            connector,
            credentials,
            servers,
            options,
            session: Mutex::new(Session {
                state: SessionState::Disconnected,
                live: None,
            }),
        })
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    /// Log in to the first candidate that accepts, dropping any existing
    /// session first.
    pub async fn connect(&self) -> Result<LoginOutcome, SessionError> {
        if self.options.dry_run {
            info!(callsign = %self.credentials.callsign, "dry run: skipping APRS-IS login");
            return Ok(LoginOutcome::DryRun);
        }

        let mut session = self.session.lock().await;
        if let Some(live) = session.live.take() {
            close_quietly(live).await;
        }
        let live = self.establish(&mut session.state).await?;
        let server = live.server.clone();
        session.live = Some(live);
        Ok(LoginOutcome::Authenticated(server))
    }

    /// Write one packet followed by `\r\n`, logging in first if needed.
    ///
    /// On a write error the session is torn down and the error returned; the
    /// next call reconnects. There is no retry within a single call.
    pub async fn send(&self, packet: &str) -> Result<(), SessionError> {
        if self.options.dry_run {
            info!(%packet, "dry run: not sent");
            return Ok(());
        }

        let mut session = self.session.lock().await;
        let mut live = match session.live.take() {
            Some(live) => live,
            None => self.establish(&mut session.state).await?,
        };

        match write_line(&mut live.stream, packet).await {
            Ok(()) => {
                info!(server = %live.server, %packet, "sent");
                session.live = Some(live);
                Ok(())
            }
            Err(source) => {
                error!(server = %live.server, error = %source, "send failed, dropping session");
                session.state = SessionState::Disconnected;
                let server = live.server.clone();
                close_quietly(live).await;
                Err(SessionError::Send { server, source })
            }
        }
    }

    /// Close the session if open. Safe to call any number of times; close
    /// errors are ignored.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(live) = session.live.take() {
            let server = live.server.clone();
            close_quietly(live).await;
            info!(%server, "disconnected from APRS-IS");
        }
        session.state = SessionState::Disconnected;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state
    }

    /// The server of the live session, if any.
    pub async fn current_server(&self) -> Option<ServerCandidate> {
        self.session
            .lock()
            .await
            .live
            .as_ref()
            .map(|live| live.server.clone())
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Candidates in failover order.
    pub fn servers(&self) -> &[ServerCandidate] {
        &self.servers
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn establish(
        &self,
        state: &mut SessionState,
    ) -> Result<Live<C::Stream>, SessionError> {
        let mut failures = Vec::new();
        for server in &self.servers {
            match self.try_candidate(server, state).await {
                Ok(stream) => {
                    *state = SessionState::Authenticated;
                    info!(%server, callsign = %self.credentials.callsign, "logged in");
                    return Ok(Live {
                        stream,
                        server: server.clone(),
                    });
                }
                Err(e) => {
                    *state = SessionState::Disconnected;
                    warn!(%server, error = %e, "APRS-IS candidate failed");
                    failures.push(e);
                }
            }
        }
        error!(attempts = failures.len(), "all APRS-IS connection attempts failed");
        Err(SessionError::Exhausted { failures })
    }

    async fn try_candidate(
        &self,
        server: &ServerCandidate,
        state: &mut SessionState,
    ) -> Result<C::Stream, CandidateError> {
        info!(%server, "connecting to APRS-IS server");
        let timeout = self.options.connect_timeout;
        let mut stream =
            match tokio::time::timeout(timeout, self.connector.connect(server)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(source)) => {
                    return Err(CandidateError::Connect {
                        server: server.clone(),
                        source,
                    })
                }
                Err(_) => {
                    return Err(CandidateError::ConnectTimeout {
                        server: server.clone(),
                        timeout,
                    })
                }
            };
        *state = SessionState::Unauthenticated;
        info!(%server, "TCP connection established");

        tokio::time::sleep(self.options.login_delay).await;
        let response = match self.login(&mut stream).await {
            Ok(response) => response,
            Err(source) => {
                shutdown_quietly(&mut stream, server).await;
                return Err(CandidateError::Login {
                    server: server.clone(),
                    source,
                });
            }
        };
        info!(%server, response = %response.trim(), "server response");

        if is_verified(&response) {
            Ok(stream)
        } else {
            shutdown_quietly(&mut stream, server).await;
            Err(CandidateError::LoginRejected {
                server: server.clone(),
                response: response.trim().to_string(),
            })
        }
    }

    async fn login(&self, stream: &mut C::Stream) -> io::Result<String> {
        let software = &self.options.software;
        info!(
            login = %self.credentials.redacted_login_line(software),
            "sending login"
        );
        stream
            .write_all(self.credentials.login_line(software).as_bytes())
            .await?;
        stream.flush().await?;
        read_login_response(stream, self.options.read_timeout).await
    }
}

/// Accumulate server output until a complete `logresp` line has arrived,
/// the peer closes, or a read times out.
async fn read_login_response<S: AsyncRead + Unpin>(
    stream: &mut S,
    read_timeout: Duration,
) -> io::Result<String> {
    let mut received = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match tokio::time::timeout(read_timeout, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                received.extend_from_slice(&chunk[..n]);
                if has_logresp_line(&String::from_utf8_lossy(&received)) {
                    break;
                }
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                debug!(timeout = ?read_timeout, "login response read timed out");
                break;
            }
        }
    }
    Ok(String::from_utf8_lossy(&received).into_owned())
}

fn has_logresp_line(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower
        .find("logresp")
        .is_some_and(|at| lower[at..].contains('\n'))
}

/// A `logresp` line whose status word is exactly `verified`.
fn is_verified(response: &str) -> bool {
    response.lines().any(|line| {
        let line = line.to_ascii_lowercase();
        line.contains("logresp")
            && line
                .split(|c: char| c.is_whitespace() || c == ',')
                .any(|word| word == "verified")
    })
}

async fn write_line<S: AsyncWrite + Unpin>(stream: &mut S, packet: &str) -> io::Result<()> {
    let mut line = String::with_capacity(packet.len() + 2);
    line.push_str(packet);
    line.push_str("\r\n");
    stream.write_all(line.as_bytes()).await?;
    stream.flush().await
}

async fn close_quietly<S: AsyncWrite + Unpin>(mut live: Live<S>) {
    shutdown_quietly(&mut live.stream, &live.server).await;
}

async fn shutdown_quietly<S: AsyncWrite + Unpin>(stream: &mut S, server: &ServerCandidate) {
    if let Err(e) = stream.shutdown().await {
        debug!(%server, error = %e, "ignoring error while closing session");
    }
}

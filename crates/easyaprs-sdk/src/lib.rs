//! # EasyAPRS SDK
//!
//! Transmit-side client for the **APRS-IS** network.
//!
//! The SDK provides:
//!
//! * [`AprsIsClient`]: owns a single authenticated TCP session, fails
//!   over across an ordered server list and reconnects on demand.
//! * [`Connector`] / [`TcpConnector`]: the seam that opens raw streams,
//!   so the session logic can run over in-memory pipes in tests.
//! * [`LoginCredentials`] and [`SoftwareId`]: what goes into the
//!   `user … pass … vers …` login line.
//! * [`SessionError`] / [`CandidateError`]: the failure taxonomy.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use easyaprs_models::ServerCandidate;
//! use easyaprs_sdk::{AprsIsClient, LoginCredentials, SessionOptions};
//!
//! # async fn run() -> Result<(), easyaprs_sdk::SessionError> {
//! let creds = LoginCredentials::new("N0CALL".parse().unwrap(), "13023");
//! let client = AprsIsClient::tcp(creds, ServerCandidate::defaults(), SessionOptions::default())?;
//!
//! client.connect().await?;
//! client.send("N0CALL>APRS,TCPIP*:=0000.00N/00000.00Er").await?;
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connector;
pub mod credentials;
pub mod error;

pub use client::{AprsIsClient, LoginOutcome, SessionOptions, SessionState};
pub use connector::{Connector, TcpConnector};
pub use credentials::{LoginCredentials, SoftwareId};
pub use error::{CandidateError, SessionError};

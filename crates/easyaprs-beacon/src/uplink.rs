//! The session operations the scheduler and lifecycle depend on.
//!
//! [`AprsIsClient`] is the production implementation; tests substitute
//! recording fakes.

use std::future::Future;

use easyaprs_sdk::{AprsIsClient, Connector, LoginOutcome, SessionError};

/// A shared, serialised path to APRS-IS.
pub trait Uplink: Send + Sync + 'static {
    fn connect(&self) -> impl Future<Output = Result<LoginOutcome, SessionError>> + Send;

    fn send(&self, packet: &str) -> impl Future<Output = Result<(), SessionError>> + Send;

    fn disconnect(&self) -> impl Future<Output = ()> + Send;
}

impl<C: Connector> Uplink for AprsIsClient<C> {
    async fn connect(&self) -> Result<LoginOutcome, SessionError> {
        AprsIsClient::connect(self).await
    }

    async fn send(&self, packet: &str) -> Result<(), SessionError> {
        AprsIsClient::send(self, packet).await
    }

    async fn disconnect(&self) {
        AprsIsClient::disconnect(self).await
    }
}

//! Beacon service lifecycle: log in once, run one task per target, and tear
//! everything down exactly once on stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use easyaprs_models::{BeaconTarget, Callsign};
use easyaprs_sdk::{LoginOutcome, SessionError};
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BeaconConfig;
use crate::scheduler::{TaskOptions, spawn_beacon};
use crate::uplink::Uplink;

/// How long `stop` waits for each task before leaving it detached.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the uplink and every beacon task for one run.
pub struct BeaconService<U: Uplink> {
    uplink: Arc<U>,
    source: Callsign,
    targets: Vec<BeaconTarget>,
    staggered: bool,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<(String, JoinHandle<()>)>>,
    stopped: AtomicBool,
    join_timeout: Duration,
}

impl<U: Uplink> BeaconService<U> {
    pub fn new(uplink: Arc<U>, config: &BeaconConfig) -> Self {
        Self {
            uplink,
            source: config.identity.beacon.clone(),
            targets: config.targets().cloned().collect(),
            staggered: config.staggered,
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            stopped: AtomicBool::new(false),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    #[allow(dead_code)] // used in tests
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Log in, then spawn one task per target.
    ///
    /// Returns the number of tasks started. A failed initial login starts
    /// nothing and is returned to the caller.
    pub async fn start(&self) -> Result<usize, SessionError> {
        if self.shutdown.is_cancelled() {
            info!("stop already requested; not logging in");
            return Ok(0);
        }

        match self.uplink.connect().await? {
            LoginOutcome::Authenticated(server) => info!(%server, "APRS-IS session ready"),
            LoginOutcome::DryRun => info!("dry run: packets will be logged, not sent"),
        }

        let mut tasks = self.tasks.lock().await;
        if self.shutdown.is_cancelled() {
            // stop() ran while we were logging in and may already have
            // disconnected; the session opened above is ours to close.
            drop(tasks);
            self.uplink.disconnect().await;
            info!("stop requested during startup; no beacon tasks started");
            return Ok(0);
        }

        for target in &self.targets {
            let options = TaskOptions {
                source: self.source.clone(),
                staggered: self.staggered,
            };
            let label = target.label().to_string();
            let handle = spawn_beacon(
                target.clone(),
                options,
                self.uplink.clone(),
                self.shutdown.child_token(),
            );
            tasks.push((label, handle));
        }

        info!(tasks = tasks.len(), "beacon tasks started");
        Ok(tasks.len())
    }

    /// Signal every task to stop, close the session and wait (bounded) for
    /// the tasks to finish. Only the first call does anything.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            debug!("stop already requested");
            return;
        }
        info!("stopping beacon");

        self.shutdown.cancel();
        self.uplink.disconnect().await;

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        let timeout = self.join_timeout;
        let results = join_all(tasks.into_iter().map(|(label, handle)| async move {
            (label, tokio::time::timeout(timeout, handle).await)
        }))
        .await;

        for (label, result) in results {
            match result {
                Ok(Ok(())) => debug!(beacon = %label, "beacon task joined"),
                Ok(Err(e)) => error!(beacon = %label, error = %e, "beacon task ended abnormally"),
                Err(_) => warn!(beacon = %label, ?timeout, "beacon task did not stop in time, leaving it detached"),
            }
        }

        // A task that was mid-send may have logged in again after the first
        // disconnect.
        self.uplink.disconnect().await;
        info!("beacon stopped");
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("shutdown signal received (interrupt)"),
        _ = terminate => info!("shutdown signal received (terminate)"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    use easyaprs_models::ServerCandidate;
    use easyaprs_sdk::{AprsIsClient, CandidateError, LoginCredentials, SessionOptions, SessionState};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::config::RawConfig;

    #[derive(Default)]
    struct FakeUplink {
        refuse_login: bool,
        login_delay: Duration,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
        packets: StdMutex<Vec<String>>,
    }

    impl Uplink for FakeUplink {
        async fn connect(&self) -> Result<LoginOutcome, SessionError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.login_delay).await;
            if self.refuse_login {
                let server = ServerCandidate::new("a.example", 14580);
                return Err(SessionError::Exhausted {
                    failures: vec![CandidateError::LoginRejected {
                        server,
                        response: "# logresp N0CALL unverified".into(),
                    }],
                });
            }
            Ok(LoginOutcome::Authenticated(ServerCandidate::new("a.example", 14580)))
        }

        async fn send(&self, packet: &str) -> Result<(), SessionError> {
            self.packets.lock().unwrap().push(packet.to_string());
            Ok(())
        }

        async fn disconnect(&self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn config() -> BeaconConfig {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "callsign": "9M2PJU",
                "passcode": "12970",
                "latitude": 3.139,
                "longitude": 101.6869,
                "comment": "/test",
                "interval": 1,
                "beacons": [
                    {"name": "ALPHA", "latitude": 3.0, "longitude": 101.0, "interval": 1},
                    {"name": "BRAVO", "latitude": 3.5, "longitude": 101.5, "interval": 1}
                ]
            }"#,
        )
        .unwrap();
        BeaconConfig::try_from(raw).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn start_spawns_one_task_per_target() {
        let uplink = Arc::new(FakeUplink::default());
        let service = BeaconService::new(uplink.clone(), &config());

        assert_eq!(service.start().await.unwrap(), 3);
        tokio::time::sleep(Duration::from_secs(1)).await;
        service.stop().await;

        let packets = uplink.packets.lock().unwrap().clone();
        assert_eq!(packets.len(), 3);
        assert!(packets.contains(&"9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Er/test".to_string()));
        assert!(packets.iter().any(|p| p.contains(":;ALPHA    *111111z")));
        assert!(packets.iter().any(|p| p.contains(":;BRAVO    *111111z")));
        assert_eq!(uplink.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_login_starts_nothing() {
        let uplink = Arc::new(FakeUplink {
            refuse_login: true,
            ..Default::default()
        });
        let service = BeaconService::new(uplink.clone(), &config());

        let err = service.start().await.unwrap_err();
        assert!(matches!(err, SessionError::Exhausted { .. }));
        assert!(service.tasks.lock().await.is_empty());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(uplink.packets.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let uplink = Arc::new(FakeUplink::default());
        let service = BeaconService::new(uplink.clone(), &config());
        service.start().await.unwrap();

        service.stop().await;
        service.stop().await;
        service.stop().await;

        assert!(service.stopped.load(Ordering::SeqCst));
        // First stop disconnects before and after joining; later calls are no-ops.
        assert_eq!(uplink.disconnects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_prevents_tasks() {
        let uplink = Arc::new(FakeUplink::default());
        let service = BeaconService::new(uplink.clone(), &config());

        service.stop().await;
        assert_eq!(service.start().await.unwrap(), 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(uplink.packets.lock().unwrap().is_empty());
        assert_eq!(uplink.connects.load(Ordering::SeqCst), 0);
        assert!(uplink.disconnects.load(Ordering::SeqCst) >= uplink.connects.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_login_closes_the_new_session() {
        let uplink = Arc::new(FakeUplink {
            login_delay: Duration::from_secs(30),
            ..Default::default()
        });
        let service = Arc::new(BeaconService::new(uplink.clone(), &config()));

        let starting = tokio::spawn({
            let service = service.clone();
            async move { service.start().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        service.stop().await;

        assert_eq!(starting.await.unwrap().unwrap(), 0);
        assert_eq!(uplink.connects.load(Ordering::SeqCst), 1);
        assert_eq!(uplink.disconnects.load(Ordering::SeqCst), 3);
        assert!(uplink.packets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stop_before_start_leaves_real_client_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        tokio::spawn({
            let accepted = accepted.clone();
            async move {
                while let Ok((mut sock, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let mut buf = [0u8; 256];
                    let _ = sock.read(&mut buf).await;
                    let _ = sock.write_all(b"# logresp N0CALL verified, server T2TEST\r\n").await;
                }
            }
        });

        let client = AprsIsClient::tcp(
            LoginCredentials::new("N0CALL".parse().unwrap(), "13023"),
            vec![ServerCandidate::new("127.0.0.1", port)],
            SessionOptions {
                login_delay: Duration::ZERO,
                read_timeout: Duration::from_millis(200),
                ..SessionOptions::default()
            },
        )
        .unwrap();
        let client = Arc::new(client);
        let service = BeaconService::new(client.clone(), &config());

        service.stop().await;
        assert_eq!(service.start().await.unwrap(), 0);
        assert_eq!(client.state().await, SessionState::Disconnected);
        assert_eq!(accepted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn no_packets_after_stop() {
        let uplink = Arc::new(FakeUplink::default());
        let service = BeaconService::new(uplink.clone(), &config())
            .with_join_timeout(Duration::from_millis(100));
        service.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(90)).await;
        service.stop().await;

        let sent = uplink.packets.lock().unwrap().len();
        assert_eq!(sent, 6, "two rounds of three targets");
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(uplink.packets.lock().unwrap().len(), sent);
    }
}

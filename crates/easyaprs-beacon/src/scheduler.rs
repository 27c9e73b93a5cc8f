//! Beacon scheduling.
//!
//! Each target runs as its own task: render the packet, hand it to the
//! uplink, sleep for the target's interval, repeat until shutdown. Tasks
//! share one uplink and never coordinate with each other, so packets from
//! different targets interleave arbitrarily while each target's own packets
//! stay in order.

use std::sync::Arc;
use std::time::Duration;

use easyaprs_models::{BeaconTarget, Callsign};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::uplink::Uplink;

/// Per-task settings that do not belong to the target itself.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// Packet source callsign.
    pub source: Callsign,
    /// Delay the first transmission by a random fraction of the interval.
    pub staggered: bool,
}

/// Spawn the task for one target. It stops when `shutdown` is cancelled.
pub fn spawn_beacon<U: Uplink>(
    target: BeaconTarget,
    options: TaskOptions,
    uplink: Arc<U>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_beacon(target, options, uplink, shutdown))
}

async fn run_beacon<U: Uplink>(
    target: BeaconTarget,
    options: TaskOptions,
    uplink: Arc<U>,
    shutdown: CancellationToken,
) {
    // Read once; configuration changes require a restart.
    let interval = target.interval.as_duration();
    let label = target.label().to_string();
    info!(beacon = %label, interval = %target.interval, "beacon task started");

    if options.staggered {
        let delay = stagger_delay(interval);
        info!(beacon = %label, delay_secs = delay.as_secs(), "staggering first transmission");
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(beacon = %label, "beacon task stopped");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    while !shutdown.is_cancelled() {
        let packet = target.render(&options.source);
        match uplink.send(&packet).await {
            Ok(()) => debug!(beacon = %label, "beacon delivered"),
            Err(e) => warn!(beacon = %label, error = %e, "beacon not delivered, retrying next interval"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(beacon = %label, "beacon task stopped");
}

fn stagger_delay(interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }
    rand::thread_rng().gen_range(Duration::ZERO..interval)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use easyaprs_models::{Interval, Position, ServerCandidate, Symbol};
    use easyaprs_sdk::{LoginOutcome, SessionError};
    use tokio::sync::Notify;

    use super::*;

    /// Records packets; optionally cancels `stop_after_first` on the first send
    /// and can be told to fail every send.
    #[derive(Default)]
    struct RecordingUplink {
        packets: StdMutex<Vec<String>>,
        sends: AtomicUsize,
        fail: bool,
        stop_after_first: Option<CancellationToken>,
        sent: Notify,
    }

    impl Uplink for RecordingUplink {
        async fn connect(&self) -> Result<LoginOutcome, SessionError> {
            Ok(LoginOutcome::DryRun)
        }

        async fn send(&self, packet: &str) -> Result<(), SessionError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            self.packets.lock().unwrap().push(packet.to_string());
            if let Some(token) = &self.stop_after_first {
                token.cancel();
            }
            self.sent.notify_one();
            if self.fail {
                return Err(SessionError::Exhausted { failures: Vec::new() });
            }
            Ok(())
        }

        async fn disconnect(&self) {}
    }

    fn target(minutes: u32) -> BeaconTarget {
        BeaconTarget::main_station(
            Position::new(3.1390, 101.6869),
            Symbol::new('/', 'r'),
            "/test",
            Interval::from_minutes(minutes).unwrap(),
        )
    }

    fn options(staggered: bool) -> TaskOptions {
        TaskOptions {
            source: "9M2PJU".parse().unwrap(),
            staggered,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_exactly_one_send() {
        let shutdown = CancellationToken::new();
        let uplink = Arc::new(RecordingUplink {
            stop_after_first: Some(shutdown.clone()),
            ..Default::default()
        });

        spawn_beacon(target(1), options(false), uplink.clone(), shutdown)
            .await
            .unwrap();

        assert_eq!(uplink.sends.load(Ordering::SeqCst), 1);
        assert_eq!(
            uplink.packets.lock().unwrap()[0],
            "9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Er/test"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn external_stop_interrupts_interval_sleep() {
        let shutdown = CancellationToken::new();
        let uplink = Arc::new(RecordingUplink::default());
        let handle = spawn_beacon(target(1440), options(false), uplink.clone(), shutdown.clone());

        uplink.sent.notified().await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(uplink.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeats_every_interval_even_when_sends_fail() {
        let shutdown = CancellationToken::new();
        let uplink = Arc::new(RecordingUplink {
            fail: true,
            ..Default::default()
        });
        let handle = spawn_beacon(target(1), options(false), uplink.clone(), shutdown.clone());

        // Sends at t = 0s, 60s and 120s.
        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(uplink.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stagger_delays_only_the_first_send() {
        let shutdown = CancellationToken::new();
        let uplink = Arc::new(RecordingUplink::default());
        let handle = spawn_beacon(target(10), options(true), uplink.clone(), shutdown.clone());

        // The random delay is under one interval, so exactly one send lands
        // in the first interval and exactly one more in the second.
        tokio::time::sleep(Duration::from_secs(600)).await;
        let first = uplink.sends.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(600)).await;
        let second = uplink.sends.load(Ordering::SeqCst);
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_sends_nothing() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let uplink = Arc::new(RecordingUplink::default());

        spawn_beacon(target(1), options(true), uplink.clone(), shutdown.clone())
            .await
            .unwrap();
        spawn_beacon(target(1), options(false), uplink.clone(), shutdown)
            .await
            .unwrap();

        assert_eq!(uplink.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_client_is_a_valid_uplink() {
        let client = easyaprs_sdk::AprsIsClient::tcp(
            easyaprs_sdk::LoginCredentials::new("N0CALL".parse().unwrap(), ""),
            ServerCandidate::defaults(),
            easyaprs_sdk::SessionOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();
        let shutdown = CancellationToken::new();
        let uplink = Arc::new(client);
        let handle = spawn_beacon(target(1), options(false), uplink, shutdown.clone());
        shutdown.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn stagger_delay_is_below_interval() {
        let interval = Duration::from_secs(60);
        for _ in 0..100 {
            assert!(stagger_delay(interval) < interval);
        }
        assert_eq!(stagger_delay(Duration::ZERO), Duration::ZERO);
    }
}

// ── Polling supervisor ──
//
// Owns the connection to one hub and the two recurring timers that poll
// it: a slow timer at the configured interval, and a fast timer that only
// acts while a burst is active. Commands issued through the gateway reset
// the burst counter so status feedback arrives quickly after a change,
// while the hub idles at the slow cadence otherwise.
//
// Concurrency contract: every outbound exchange -- slow cycle, fast-entered
// cycle, command send -- runs under the single `connection` mutex. The
// burst counter is the only state touched outside it: an atomic with an
// unconditional store for reset and a decrement-if-positive for cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use neohub_api::responses::{DcbResponse, InfoResponse};
use neohub_api::{HubExchange, HubSocket, requests};

use crate::config::{FAST_POLL_CYCLES, FAST_POLL_INTERVAL_SECS, HubConfig};
use crate::dispatch::SinkRegistry;
use crate::error::CoreError;
use crate::health::{HubHealth, OfflineCause};
use crate::model::{StatusSnapshot, TemperatureUnit};

/// Supervises one hub connection: dual-rate polling, snapshot dispatch,
/// and the command gateway.
///
/// Cheaply cloneable; all clones share the same state. Construct with
/// [`new`](Self::new), then [`start`](Self::start) to arm the timers.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    config: HubConfig,
    registry: Arc<dyn SinkRegistry>,
    /// Exchange implementation supplied at construction instead of the
    /// default socket (tests, alternative transports).
    custom_exchange: Option<Arc<dyn HubExchange>>,
    /// The live connection, doubling as the one-exchange-in-flight guard.
    /// `None` until `start()` installs it.
    connection: Mutex<Option<Arc<dyn HubExchange>>>,
    /// Fast-cadence cycles remaining in the current burst.
    fast_polls_remaining: AtomicU32,
    health: watch::Sender<HubHealth>,
    last_poll: watch::Sender<Option<DateTime<Utc>>>,
    cancel: Mutex<CancellationToken>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Supervisor {
    /// Create a supervisor that will open a [`HubSocket`] to the configured
    /// address when started.
    pub fn new(config: HubConfig, registry: Arc<dyn SinkRegistry>) -> Self {
        Self::build(config, registry, None)
    }

    /// Create a supervisor over a caller-supplied exchange implementation.
    pub fn with_exchange(
        config: HubConfig,
        registry: Arc<dyn SinkRegistry>,
        exchange: Arc<dyn HubExchange>,
    ) -> Self {
        Self::build(config, registry, Some(exchange))
    }

    fn build(
        config: HubConfig,
        registry: Arc<dyn SinkRegistry>,
        custom_exchange: Option<Arc<dyn HubExchange>>,
    ) -> Self {
        let (health, _) = watch::channel(HubHealth::Unknown);
        let (last_poll, _) = watch::channel(None);

        Self {
            inner: Arc::new(SupervisorInner {
                config,
                registry,
                custom_exchange,
                connection: Mutex::new(None),
                fast_polls_remaining: AtomicU32::new(0),
                health,
                last_poll,
                cancel: Mutex::new(CancellationToken::new()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The configuration this supervisor was built with.
    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Validate the configuration, install the connection, and arm both
    /// polling timers.
    ///
    /// On a validation failure the health state becomes
    /// `Offline(Configuration)` and nothing is armed -- that is terminal
    /// for this supervisor. On success the health state is `Unknown` until
    /// the first poll resolves it, and a fast-polling burst is triggered
    /// immediately so the first real status does not wait a full slow
    /// interval.
    ///
    /// If the timers are already live they are left alone; everything else
    /// still runs, mirroring a host framework re-initializing a handler.
    pub async fn start(&self) -> Result<(), CoreError> {
        if let Err(err) = self.inner.config.validate() {
            if let CoreError::Config { message } = &err {
                self.set_health(HubHealth::Offline(OfflineCause::Configuration {
                    reason: message.clone(),
                }));
            }
            return Err(err);
        }

        let mut tasks = self.inner.tasks.lock().await;

        let exchange: Arc<dyn HubExchange> = match &self.inner.custom_exchange {
            Some(exchange) => Arc::clone(exchange),
            None => Arc::new(HubSocket::new(
                self.inner.config.host.clone(),
                self.inner.config.port,
                self.inner.config.timeout,
            )),
        };
        *self.inner.connection.lock().await = Some(exchange);

        self.inner
            .fast_polls_remaining
            .store(FAST_POLL_CYCLES, Ordering::SeqCst);

        if tasks.is_empty() {
            debug!(
                host = %self.inner.config.host,
                interval = self.inner.config.poll_interval_secs,
                "start background polling"
            );

            let cancel = {
                let mut guard = self.inner.cancel.lock().await;
                if guard.is_cancelled() {
                    *guard = CancellationToken::new();
                }
                guard.clone()
            };

            let slow = Duration::from_secs(self.inner.config.poll_interval_secs);
            let fast = Duration::from_secs(FAST_POLL_INTERVAL_SECS);
            tasks.push(tokio::spawn(slow_poll_task(
                self.clone(),
                slow,
                cancel.clone(),
            )));
            tasks.push(tokio::spawn(fast_poll_task(self.clone(), fast, cancel)));
        } else {
            debug!("polling timers already running");
        }
        drop(tasks);

        self.set_health(HubHealth::Unknown);
        self.start_fast_polling_burst();
        Ok(())
    }

    /// Cancel both timers and wait for them to wind down.
    ///
    /// Idempotent and callable from any task. An exchange already in
    /// flight is not interrupted; no further cycles run afterwards.
    pub async fn stop(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        self.inner.cancel.lock().await.cancel();

        if tasks.is_empty() {
            return;
        }

        debug!("stop background polling");
        for task in tasks.drain(..) {
            let _ = task.await;
        }
    }

    // ── Burst trigger ────────────────────────────────────────────────

    /// Reset the burst window to its full length.
    ///
    /// Device handlers call this after changing a channel value so the
    /// next several polls run at the fast cadence. Safe from any task at
    /// any time; concurrent callers all write the same maximum.
    pub fn start_fast_polling_burst(&self) {
        self.inner
            .fast_polls_remaining
            .store(FAST_POLL_CYCLES, Ordering::SeqCst);
    }

    /// Fast-cadence cycles left in the current burst.
    pub fn fast_polls_remaining(&self) -> u32 {
        self.inner.fast_polls_remaining.load(Ordering::SeqCst)
    }

    // ── Command gateway ──────────────────────────────────────────────

    /// Forward an opaque command string to the hub.
    ///
    /// Exactly three outcomes: `Ok(())` (sent; a fast-polling burst is
    /// triggered to confirm the change), `Err(NotInitialized)` (called
    /// before [`start`](Self::start); no transport attempted), or
    /// `Err(Communication)` (transport fault; the hub is marked offline).
    pub async fn send_command(&self, command: &str) -> Result<(), CoreError> {
        let connection = self.inner.connection.lock().await;
        let Some(exchange) = connection.as_ref() else {
            return Err(CoreError::NotInitialized);
        };

        match exchange.exchange(command).await {
            Ok(_) => {
                drop(connection);
                self.start_fast_polling_burst();
                Ok(())
            }
            Err(err) => {
                self.set_health(HubHealth::Offline(OfflineCause::Communication));
                warn!(command, error = %err, "sending command to hub failed");
                Err(err.into())
            }
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to health-state changes.
    pub fn health(&self) -> watch::Receiver<HubHealth> {
        self.inner.health.subscribe()
    }

    /// The health state right now.
    pub fn current_health(&self) -> HubHealth {
        self.inner.health.borrow().clone()
    }

    /// Subscribe to the timestamp of the most recent successful poll.
    pub fn last_poll(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_poll.subscribe()
    }

    // ── Poll cycle ───────────────────────────────────────────────────

    /// One full poll cycle: status query, optional unit query, dispatch.
    ///
    /// Entered by the slow timer on schedule and by the fast timer while a
    /// burst is active; the `connection` guard makes the two (and any
    /// concurrent command send) mutually exclusive. Every outcome ends by
    /// consuming one burst credit.
    async fn run_poll_cycle(&self) {
        let connection = self.inner.connection.lock().await;
        match connection.as_ref() {
            Some(exchange) => {
                if let Some(snapshot) = self.poll_status(exchange.as_ref()).await {
                    let unit = self.poll_temperature_unit(exchange.as_ref()).await;

                    let sinks = self.inner.registry.sinks();
                    debug!(
                        devices = snapshot.len(),
                        sinks = sinks.len(),
                        "dispatching status snapshot"
                    );
                    for sink in &sinks {
                        sink.on_poll(&snapshot, unit);
                    }

                    self.inner.last_poll.send_replace(Some(Utc::now()));
                }
            }
            None => warn!("poll cycle before initialization"),
        }
        drop(connection);

        // Consume one burst credit, never dipping below zero.
        let _ = self
            .inner
            .fast_polls_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Send the status query and decode it.
    ///
    /// Transport fault, decode failure, and an empty device list are all
    /// the same outcome: the hub goes offline and the cycle dispatches
    /// nothing. A usable snapshot flips the hub (back) online.
    async fn poll_status(&self, exchange: &dyn HubExchange) -> Option<StatusSnapshot> {
        let raw = match exchange.exchange(requests::CMD_INFO).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "status poll failed");
                self.set_health(HubHealth::Offline(OfflineCause::Communication));
                return None;
            }
        };

        let info = match InfoResponse::parse(&raw) {
            Ok(info) => info,
            Err(err) => {
                warn!(error = %err, "status poll returned an undecodable payload");
                self.set_health(HubHealth::Offline(OfflineCause::Communication));
                return None;
            }
        };

        if info.devices.is_empty() {
            warn!("status poll found no devices");
            self.set_health(HubHealth::Offline(OfflineCause::Communication));
            return None;
        }

        let already_online = self.inner.health.borrow().is_online();
        if !already_online {
            self.set_health(HubHealth::Online);
        }

        Some(StatusSnapshot::from(info))
    }

    /// Fetch the hub-wide temperature unit for this cycle.
    ///
    /// Non-fatal: any failure falls back to Celsius without retry, and the
    /// cycle carries on.
    async fn poll_temperature_unit(&self, exchange: &dyn HubExchange) -> TemperatureUnit {
        let raw = match exchange.exchange(requests::CMD_READ_DCB).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "unit poll failed, assuming Celsius");
                return TemperatureUnit::default();
            }
        };

        match DcbResponse::parse(&raw) {
            Ok(dcb) if dcb.fahrenheit() => TemperatureUnit::Fahrenheit,
            Ok(_) => TemperatureUnit::Celsius,
            Err(err) => {
                warn!(error = %err, "unit poll returned an undecodable payload, assuming Celsius");
                TemperatureUnit::default()
            }
        }
    }

    fn set_health(&self, next: HubHealth) {
        self.inner.health.send_replace(next);
    }
}

// ── Timer tasks ─────────────────────────────────────────────────────

/// Slow-cadence timer: one poll cycle per configured interval. The first
/// cycle runs one full period after start -- no immediate tick.
async fn slow_poll_task(supervisor: Supervisor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => supervisor.run_poll_cycle().await,
        }
    }
}

/// Fast-cadence timer: enters the shared poll cycle only while burst
/// credits remain, otherwise the tick is a no-op.
async fn fast_poll_task(supervisor: Supervisor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if supervisor.fast_polls_remaining() > 0 {
                    supervisor.run_poll_cycle().await;
                }
            }
        }
    }
}

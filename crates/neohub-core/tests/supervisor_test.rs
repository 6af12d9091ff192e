// Integration tests for the polling supervisor.
//
// Timer cadence is exercised under tokio's paused clock: virtual time
// advances only while every task is idle, and the scripted exchange never
// touches real I/O, so tick counts are exact. Poll timers fire at
// t = period, 2*period, ... (no immediate tick), which the assertions
// below rely on. FAST_POLL_INTERVAL_SECS = 5 and FAST_POLL_CYCLES = 10
// throughout.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use neohub_api::{Error as ApiError, HubExchange, requests};
use neohub_core::{
    FAST_POLL_CYCLES, HubConfig, HubHealth, OfflineCause, SinkSet, StatusSink, StatusSnapshot,
    Supervisor, TemperatureUnit,
};

// ── Scripted exchange ───────────────────────────────────────────────

/// In-memory hub: serves INFO/READ_DCB from a script and records
/// everything else as a forwarded command.
#[derive(Default)]
struct MockHub {
    info_polls: AtomicU32,
    commands: Mutex<Vec<String>>,
    device_names: Mutex<Vec<String>>,
    /// Fail this many upcoming INFO exchanges with a transport error.
    fail_next_polls: AtomicU32,
    /// Serve undecodable garbage for INFO.
    garble_polls: AtomicBool,
    fail_commands: AtomicBool,
    fail_dcb: AtomicBool,
    fahrenheit: AtomicBool,
}

impl MockHub {
    fn with_devices(names: &[&str]) -> Arc<Self> {
        let hub = Self::default();
        *hub.device_names.lock().expect("lock") =
            names.iter().map(|n| (*n).to_owned()).collect();
        Arc::new(hub)
    }

    fn comm_error() -> ApiError {
        ApiError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "simulated reset",
        ))
    }

    fn info_json(&self) -> String {
        let devices: Vec<String> = self
            .device_names
            .lock()
            .expect("lock")
            .iter()
            .map(|name| format!(r#"{{"device":"{name}","CURRENT_TEMPERATURE":"21.0"}}"#))
            .collect();
        format!(r#"{{"devices":[{}]}}"#, devices.join(","))
    }

    fn polls(&self) -> u32 {
        self.info_polls.load(Ordering::SeqCst)
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("lock").clone()
    }
}

#[async_trait]
impl HubExchange for MockHub {
    async fn exchange(&self, request: &str) -> Result<String, ApiError> {
        if request == requests::CMD_INFO {
            self.info_polls.fetch_add(1, Ordering::SeqCst);

            let failed = self
                .fail_next_polls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(Self::comm_error());
            }
            if self.garble_polls.load(Ordering::SeqCst) {
                return Ok("{not json".into());
            }
            Ok(self.info_json())
        } else if request == requests::CMD_READ_DCB {
            if self.fail_dcb.load(Ordering::SeqCst) {
                return Err(Self::comm_error());
            }
            if self.fahrenheit.load(Ordering::SeqCst) {
                Ok(r#"{"CORF":"F"}"#.into())
            } else {
                Ok(r#"{"CORF":"C"}"#.into())
            }
        } else {
            self.commands.lock().expect("lock").push(request.to_owned());
            if self.fail_commands.load(Ordering::SeqCst) {
                return Err(Self::comm_error());
            }
            Ok(r#"{"result":"success"}"#.into())
        }
    }
}

// ── Recording sink ──────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    calls: AtomicU32,
    last_device_count: AtomicU32,
    last_unit: Mutex<Option<TemperatureUnit>>,
}

impl RecordingSink {
    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_unit(&self) -> Option<TemperatureUnit> {
        *self.last_unit.lock().expect("lock")
    }
}

impl StatusSink for RecordingSink {
    fn on_poll(&self, snapshot: &StatusSnapshot, unit: TemperatureUnit) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_device_count
            .store(u32::try_from(snapshot.len()).expect("snapshot size"), Ordering::SeqCst);
        *self.last_unit.lock().expect("lock") = Some(unit);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn config(interval_secs: u64) -> HubConfig {
    HubConfig {
        host: "10.0.0.5".into(),
        port: 4242,
        poll_interval_secs: interval_secs,
        ..HubConfig::default()
    }
}

fn supervisor_over(hub: &Arc<MockHub>, interval_secs: u64) -> (Supervisor, Arc<SinkSet>) {
    let sinks = Arc::new(SinkSet::new());
    let supervisor =
        Supervisor::with_exchange(config(interval_secs), sinks.clone(), hub.clone());
    (supervisor, sinks)
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn invalid_host_is_configuration_error_and_arms_nothing() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let sinks = Arc::new(SinkSet::new());
    let supervisor = Supervisor::with_exchange(
        HubConfig {
            host: "  ".into(),
            ..config(30)
        },
        sinks,
        hub.clone(),
    );

    let err = supervisor.start().await.unwrap_err();
    assert!(err.to_string().contains("host"), "got {err}");
    assert!(matches!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Configuration { .. })
    ));

    // No timers were armed: nothing ever reaches the exchange.
    advance(300).await;
    assert_eq!(hub.polls(), 0);
    assert_eq!(supervisor.fast_polls_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn invalid_interval_is_configuration_error() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 61);

    assert!(supervisor.start().await.is_err());
    let HubHealth::Offline(OfflineCause::Configuration { reason }) = supervisor.current_health()
    else {
        panic!("expected configuration error");
    };
    assert!(reason.contains("poll_interval_secs"), "got {reason}");
}

#[tokio::test(start_paused = true)]
async fn valid_start_is_unknown_with_full_burst_and_no_immediate_tick() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 30);

    supervisor.start().await.expect("valid config");
    assert_eq!(supervisor.current_health(), HubHealth::Unknown);
    assert_eq!(supervisor.fast_polls_remaining(), FAST_POLL_CYCLES);

    // Both timers delay one full period before their first tick.
    advance(4).await;
    assert_eq!(hub.polls(), 0);

    supervisor.stop().await;
}

// ── Burst cadence ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_polls_at_fast_cadence_then_reverts_to_slow() {
    let hub = MockHub::with_devices(&["Living Room", "Bathroom"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 60);

    supervisor.start().await.expect("valid config");

    // Fast ticks at t = 5, 10, ..., 50 burn the 10 burst credits.
    advance(57).await;
    assert_eq!(hub.polls(), 10);
    assert_eq!(supervisor.fast_polls_remaining(), 0);

    // t = 55 fast tick: burst exhausted, no poll. t = 60: slow tick polls
    // (and the same-instant fast tick stays idle).
    advance(5).await;
    assert_eq!(hub.polls(), 11);
    assert_eq!(supervisor.fast_polls_remaining(), 0);

    // Fast ticks through t = 115 all stay idle; t = 120 is the next slow poll.
    advance(57).await;
    assert_eq!(hub.polls(), 11);
    advance(3).await;
    assert_eq!(hub.polls(), 12);

    supervisor.stop().await;
}

// ── Failure followed by fast-cadence recovery ───────────────────────

#[tokio::test(start_paused = true)]
async fn failed_poll_goes_offline_then_recovers_on_fast_cadence() {
    let hub = MockHub::with_devices(&["Living Room", "Bathroom"]);
    hub.fail_next_polls.store(1, Ordering::SeqCst);

    let (supervisor, sinks) = supervisor_over(&hub, 30);
    let living = Arc::new(RecordingSink::default());
    let bathroom = Arc::new(RecordingSink::default());
    sinks.register("Living Room", living.clone());
    sinks.register("Bathroom", bathroom.clone());

    supervisor.start().await.expect("valid config");

    // First fast tick at t = 5 fails: offline, one credit consumed, no dispatch.
    advance(7).await;
    assert_eq!(hub.polls(), 1);
    assert_eq!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Communication)
    );
    assert_eq!(supervisor.fast_polls_remaining(), FAST_POLL_CYCLES - 1);
    assert_eq!(living.calls(), 0);
    assert_eq!(bathroom.calls(), 0);

    // Second fast tick at t = 10 succeeds with 2 devices: online, both
    // sinks called exactly once with the full snapshot.
    advance(5).await;
    assert_eq!(hub.polls(), 2);
    assert_eq!(supervisor.current_health(), HubHealth::Online);
    assert_eq!(living.calls(), 1);
    assert_eq!(bathroom.calls(), 1);
    assert_eq!(living.last_device_count.load(Ordering::SeqCst), 2);
    assert_eq!(living.last_unit(), Some(TemperatureUnit::Celsius));

    supervisor.stop().await;
}

// ── Failure modes never dispatch ────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn undecodable_status_never_dispatches() {
    let hub = MockHub::with_devices(&["Living Room"]);
    hub.garble_polls.store(true, Ordering::SeqCst);

    let (supervisor, sinks) = supervisor_over(&hub, 30);
    let sink = Arc::new(RecordingSink::default());
    sinks.register("Living Room", sink.clone());

    supervisor.start().await.expect("valid config");
    advance(27).await;

    assert!(hub.polls() >= 5);
    assert_eq!(sink.calls(), 0);
    assert_eq!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Communication)
    );

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn empty_device_list_is_a_communication_error() {
    let hub = MockHub::with_devices(&[]);
    let (supervisor, sinks) = supervisor_over(&hub, 30);
    let sink = Arc::new(RecordingSink::default());
    sinks.register("Living Room", sink.clone());

    supervisor.start().await.expect("valid config");
    advance(7).await;

    assert_eq!(hub.polls(), 1);
    assert_eq!(sink.calls(), 0);
    assert_eq!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Communication)
    );

    supervisor.stop().await;
}

// ── Secondary (unit) request ────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn dcb_failure_falls_back_to_celsius_without_aborting() {
    let hub = MockHub::with_devices(&["Living Room"]);
    hub.fail_dcb.store(true, Ordering::SeqCst);

    let (supervisor, sinks) = supervisor_over(&hub, 30);
    let sink = Arc::new(RecordingSink::default());
    sinks.register("Living Room", sink.clone());

    supervisor.start().await.expect("valid config");
    advance(7).await;

    assert_eq!(sink.calls(), 1);
    assert_eq!(sink.last_unit(), Some(TemperatureUnit::Celsius));
    assert_eq!(supervisor.current_health(), HubHealth::Online);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn fahrenheit_setting_reaches_sinks() {
    let hub = MockHub::with_devices(&["Living Room"]);
    hub.fahrenheit.store(true, Ordering::SeqCst);

    let (supervisor, sinks) = supervisor_over(&hub, 30);
    let sink = Arc::new(RecordingSink::default());
    sinks.register("Living Room", sink.clone());

    supervisor.start().await.expect("valid config");
    advance(7).await;

    assert_eq!(sink.last_unit(), Some(TemperatureUnit::Fahrenheit));

    supervisor.stop().await;
}

// ── Command gateway ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn command_resets_an_exhausted_burst() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 60);

    supervisor.start().await.expect("valid config");
    advance(57).await;
    assert_eq!(supervisor.fast_polls_remaining(), 0);
    assert_eq!(hub.polls(), 10);

    supervisor.send_command("set:20.5").await.expect("sent");
    assert_eq!(supervisor.fast_polls_remaining(), FAST_POLL_CYCLES);
    assert_eq!(hub.commands(), vec!["set:20.5".to_owned()]);

    // t = 60: the slow tick polls, and the revived burst makes the
    // same-instant fast tick poll as well.
    advance(6).await;
    assert_eq!(hub.polls(), 12);
    assert_eq!(supervisor.fast_polls_remaining(), FAST_POLL_CYCLES - 2);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_commands_pin_the_counter_at_maximum() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 30);

    supervisor.start().await.expect("valid config");
    for i in 0..3 {
        supervisor
            .send_command(&format!("set:{i}"))
            .await
            .expect("sent");
        assert_eq!(supervisor.fast_polls_remaining(), FAST_POLL_CYCLES);
    }
    assert_eq!(hub.commands().len(), 3);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn command_before_start_is_not_initialized() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 30);

    let err = supervisor.send_command("set:20.5").await.unwrap_err();
    assert!(matches!(err, neohub_core::CoreError::NotInitialized));

    // No transport was attempted.
    assert_eq!(hub.polls(), 0);
    assert!(hub.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn command_transport_failure_marks_offline() {
    let hub = MockHub::with_devices(&["Living Room"]);
    hub.fail_commands.store(true, Ordering::SeqCst);

    let (supervisor, _sinks) = supervisor_over(&hub, 30);
    supervisor.start().await.expect("valid config");

    let err = supervisor.send_command("set:20.5").await.unwrap_err();
    assert!(matches!(err, neohub_core::CoreError::Communication { .. }));
    assert_eq!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Communication)
    );
    assert_eq!(hub.commands().len(), 1);

    supervisor.stop().await;
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_halts_polling_and_is_idempotent() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 30);

    supervisor.start().await.expect("valid config");
    advance(12).await;
    let polled = hub.polls();
    assert!(polled >= 2);

    supervisor.stop().await;
    advance(300).await;
    assert_eq!(hub.polls(), polled);

    // Safe to call again, and before any start on a fresh instance.
    supervisor.stop().await;
    let (fresh, _sinks) = supervisor_over(&hub, 30);
    fresh.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_resumes_polling() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 30);

    supervisor.start().await.expect("valid config");
    advance(7).await;
    supervisor.stop().await;
    let polled = hub.polls();
    assert!(polled >= 1);

    supervisor.start().await.expect("restart");
    assert_eq!(supervisor.current_health(), HubHealth::Unknown);
    advance(7).await;
    assert!(hub.polls() > polled);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_start_spawns_no_second_timer_pair() {
    let hub = MockHub::with_devices(&["Living Room"]);
    let (supervisor, _sinks) = supervisor_over(&hub, 60);

    supervisor.start().await.expect("valid config");
    supervisor.start().await.expect("second start is benign");

    // One fast timer only: exactly one poll per fast period.
    advance(7).await;
    assert_eq!(hub.polls(), 1);

    supervisor.stop().await;
}

// ── Health recovery across cycles ───────────────────────────────────

#[tokio::test(start_paused = true)]
async fn health_returns_online_only_after_a_successful_poll() {
    let hub = MockHub::with_devices(&["Living Room"]);
    hub.fail_next_polls.store(2, Ordering::SeqCst);

    let (supervisor, _sinks) = supervisor_over(&hub, 30);
    let mut health = supervisor.health();

    supervisor.start().await.expect("valid config");
    advance(12).await; // t = 5, 10 both fail
    assert_eq!(
        supervisor.current_health(),
        HubHealth::Offline(OfflineCause::Communication)
    );

    advance(5).await; // t = 15 succeeds
    assert_eq!(supervisor.current_health(), HubHealth::Online);

    // The watch channel observed the final transition.
    assert!(health.has_changed().expect("sender alive"));
    assert_eq!(*health.borrow_and_update(), HubHealth::Online);

    supervisor.stop().await;
}

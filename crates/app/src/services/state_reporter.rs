//! State reporter: turns host state changes into debounced state reports.
//!
//! Events for linked, eligible devices mark the device dirty. The first
//! dirty mark of a window arms a timer; when it fires, everything marked in
//! the meantime goes out in a single report.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use homelink_domain::capability::CapabilityRegistry;
use homelink_domain::event::HostEvent;
use homelink_domain::id::DeviceId;
use homelink_domain::smarthome::{DeviceStatus, ReportStateRequest};

use super::log_uplink_failure;
use super::session::Session;
use crate::ports::{DeviceHost, KeyValueStore, Uplink};

/// Devices waiting for the next flush.
#[derive(Debug, Default)]
struct ReportQueue {
    pending: BTreeSet<DeviceId>,
    armed: bool,
}

pub struct StateReporter<H, S, U> {
    host: H,
    session: Arc<Session<S>>,
    registry: Arc<CapabilityRegistry>,
    uplink: U,
    debounce: Duration,
    queue: Mutex<ReportQueue>,
    flush_lock: tokio::sync::Mutex<()>,
}

impl<H, S, U> StateReporter<H, S, U>
where
    H: DeviceHost + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    pub fn new(
        host: H,
        session: Arc<Session<S>>,
        registry: Arc<CapabilityRegistry>,
        uplink: U,
        debounce: Duration,
    ) -> Self {
        Self {
            host,
            session,
            registry,
            uplink,
            debounce,
            queue: Mutex::new(ReportQueue::default()),
            flush_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Consume host events until the host's channel closes.
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut events = BroadcastStream::new(self.host.subscribe());
        tokio::spawn(async move {
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => this.handle_event(event).await,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "state listener lagged behind host events");
                    }
                }
            }
            tracing::debug!("host event stream closed");
        })
    }

    /// Queue a report for the event's device if it is eligible and linked.
    pub async fn handle_event(self: &Arc<Self>, event: HostEvent) {
        let Some(id) = event.source else {
            return;
        };

        let device = match self.host.get_device(&id).await {
            Ok(Some(device)) => device,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(device_id = %id, error = ?err, "host lookup failed");
                return;
            }
        };
        if !device.is_syncable() {
            return;
        }

        match self.session.is_linked(&id).await {
            Ok(true) => self.mark_dirty(id),
            Ok(false) => {}
            Err(err) => tracing::warn!(device_id = %id, error = ?err, "failed to read link"),
        }
    }

    /// Add `id` to the next report, arming the debounce timer if idle.
    pub fn mark_dirty(self: &Arc<Self>, id: DeviceId) {
        let arm = {
            let mut queue = self.queue();
            queue.pending.insert(id);
            !std::mem::replace(&mut queue.armed, true)
        };
        if !arm {
            return;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.debounce).await;
            this.queue().armed = false;
            this.flush_now().await;
        });
    }

    /// Ids waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> Vec<DeviceId> {
        self.queue().pending.iter().cloned().collect()
    }

    /// Report every pending device now.
    ///
    /// The queue is emptied before any outbound call; an empty report
    /// makes no call at all.
    #[tracing::instrument(skip(self))]
    pub async fn flush_now(&self) {
        let _serialized = self.flush_lock.lock().await;
        let pending = std::mem::take(&mut self.queue().pending);
        if pending.is_empty() {
            return;
        }

        let mut report = ReportStateRequest::new(self.session.agent_user_id().clone());
        for id in pending {
            let device = match self.host.get_device(&id).await {
                Ok(Some(device)) => device,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(device_id = %id, error = ?err, "host lookup failed");
                    continue;
                }
            };
            let Some(result) = self.registry.query(&device) else {
                continue;
            };
            let status = match result {
                Ok(states) => DeviceStatus::reported(states),
                Err(err) => {
                    tracing::warn!(device_id = %id, error = %err, "query failed, reporting offline");
                    DeviceStatus::offline()
                }
            };
            report.insert(id, status);
        }

        if report.is_empty() {
            tracing::debug!("nothing to report");
            return;
        }

        let devices = report.states().len();
        tracing::debug!(request_id = %report.request_id, devices, "reporting state");
        match self.uplink.report_state(&report).await {
            Ok(()) => tracing::info!(devices, "state reported"),
            Err(err) => log_uplink_failure("report state", &err),
        }
    }

    fn queue(&self) -> MutexGuard<'_, ReportQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use crate::services::testing::{RecordingUplink, StubHost};
    use homelink_domain::device::{Capability, Device, DeviceState, DeviceType};
    use homelink_domain::error::HomelinkError;
    use homelink_domain::id::AgentUserId;
    use homelink_domain::smarthome::DeviceStates;
    use serde_json::json;
    use tokio::sync::Notify;

    type Reporter = StateReporter<Arc<StubHost>, InMemoryKeyValueStore, Arc<RecordingUplink>>;

    struct Fixture {
        host: Arc<StubHost>,
        uplink: Arc<RecordingUplink>,
        session: Arc<Session<InMemoryKeyValueStore>>,
        reporter: Arc<Reporter>,
    }

    async fn fixture(host: StubHost, uplink: RecordingUplink) -> Fixture {
        let host = Arc::new(host);
        let uplink = Arc::new(uplink);
        let session = Arc::new(Session::load(InMemoryKeyValueStore::new()).await.unwrap());
        let reporter = Arc::new(StateReporter::new(
            Arc::clone(&host),
            Arc::clone(&session),
            Arc::new(CapabilityRegistry::builtin()),
            Arc::clone(&uplink),
            Duration::from_millis(2000),
        ));
        Fixture {
            host,
            uplink,
            session,
            reporter,
        }
    }

    fn outlet(id: &str, on: Option<bool>) -> Device {
        Device::builder()
            .id(id)
            .name(id)
            .device_type(DeviceType::Outlet)
            .capability(Capability::OnOff)
            .state(DeviceState {
                on,
                ..DeviceState::default()
            })
            .build()
            .unwrap()
    }

    fn changed(id: &str) -> HostEvent {
        HostEvent::state_changed(DeviceId::new(id), Capability::OnOff, json!({}))
    }

    async fn link(f: &Fixture, ids: &[&str]) {
        for id in ids {
            f.session.mark_linked(&DeviceId::new(*id)).await.unwrap();
        }
    }

    fn reported_ids(report: &ReportStateRequest) -> Vec<&str> {
        report.states().keys().map(DeviceId::as_str).collect()
    }

    /// Uplink whose first report blocks until `gate` is notified.
    #[derive(Default)]
    struct GatedUplink {
        entered: Notify,
        gate: Notify,
        reports: Mutex<Vec<ReportStateRequest>>,
    }

    impl Uplink for GatedUplink {
        async fn report_state(&self, report: &ReportStateRequest) -> Result<(), HomelinkError> {
            let first = {
                let mut reports = self.reports.lock().unwrap();
                reports.push(report.clone());
                reports.len() == 1
            };
            if first {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            Ok(())
        }

        async fn request_sync(&self, _agent_user_id: &AgentUserId) -> Result<(), HomelinkError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_coalesce_events_within_window_into_one_report() {
        let host = StubHost::new([
            outlet("a", Some(true)),
            outlet("b", Some(false)),
            outlet("c", Some(true)),
        ]);
        let f = fixture(host, RecordingUplink::default()).await;
        link(&f, &["a", "b", "c"]).await;
        let listener = f.reporter.spawn_listener();

        for id in ["a", "b", "a", "c"] {
            f.host.emit(changed(id));
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(f.uplink.reports().is_empty());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let reports = f.uplink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reported_ids(&reports[0]), vec!["a", "b", "c"]);
        assert!(f.reporter.pending().is_empty());
        listener.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_unlinked_opted_out_and_sourceless_events() {
        let mut opted_out = outlet("hidden", Some(true));
        opted_out
            .metadata
            .insert("syncWithGoogleHome".to_string(), json!(false));
        let host = StubHost::new([outlet("unlinked", Some(true)), opted_out]);
        let f = fixture(host, RecordingUplink::default()).await;
        link(&f, &["hidden"]).await;

        f.reporter.handle_event(changed("unlinked")).await;
        f.reporter.handle_event(changed("hidden")).await;
        f.reporter.handle_event(changed("ghost")).await;
        f.reporter
            .handle_event(HostEvent::host_wide(json!({})))
            .await;

        assert!(f.reporter.pending().is_empty());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(f.uplink.reports().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_report_devices_linked_under_previous_token() {
        let f = fixture(StubHost::new([outlet("a", Some(true))]), RecordingUplink::default()).await;
        link(&f, &["a"]).await;
        f.session.reset_link().await.unwrap();

        f.reporter.handle_event(changed("a")).await;

        assert!(f.reporter.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_arm_a_new_window_after_flush() {
        let f = fixture(StubHost::new([outlet("a", Some(true))]), RecordingUplink::default()).await;

        f.reporter.mark_dirty(DeviceId::new("a"));
        tokio::time::sleep(Duration::from_millis(2100)).await;
        f.reporter.mark_dirty(DeviceId::new("a"));
        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert_eq!(f.uplink.reports().len(), 2);
    }

    #[tokio::test]
    async fn should_make_no_outbound_call_for_empty_flush() {
        let f = fixture(StubHost::new([]), RecordingUplink::default()).await;

        f.reporter.flush_now().await;

        assert!(f.uplink.reports().is_empty());
    }

    #[tokio::test]
    async fn should_skip_missing_and_unsupported_devices_when_flushing() {
        let thermostat = Device::builder()
            .id("thermo")
            .name("Thermostat")
            .build()
            .unwrap();
        let f = fixture(StubHost::new([thermostat]), RecordingUplink::default()).await;
        f.reporter.queue().pending.extend([DeviceId::new("thermo"), DeviceId::new("ghost")]);

        f.reporter.flush_now().await;

        assert!(f.uplink.reports().is_empty());
        assert!(f.reporter.pending().is_empty());
    }

    #[tokio::test]
    async fn should_report_offline_when_query_fails() {
        let f = fixture(
            StubHost::new([outlet("ok", Some(true)), outlet("broken", None)]),
            RecordingUplink::default(),
        )
        .await;
        f.reporter
            .queue()
            .pending
            .extend([DeviceId::new("ok"), DeviceId::new("broken")]);

        f.reporter.flush_now().await;

        let reports = f.uplink.reports();
        let states = reports[0].states();
        assert_eq!(states[&DeviceId::new("broken")], DeviceStatus::offline());
        assert_eq!(
            states[&DeviceId::new("ok")],
            DeviceStatus::reported(DeviceStates {
                on: Some(true),
                ..DeviceStates::default()
            })
        );
        assert_eq!(
            reports[0].agent_user_id,
            f.session.agent_user_id().clone()
        );
    }

    #[tokio::test]
    async fn should_clear_queue_even_when_uplink_has_no_credential() {
        let f = fixture(
            StubHost::new([outlet("a", Some(true))]),
            RecordingUplink::without_credential(),
        )
        .await;
        f.reporter.queue().pending.insert(DeviceId::new("a"));

        f.reporter.flush_now().await;

        assert!(f.reporter.pending().is_empty());
        assert!(f.uplink.reports().is_empty());
    }

    #[tokio::test]
    async fn should_take_queue_before_outbound_call_starts() {
        let host = Arc::new(StubHost::new([
            outlet("a", Some(true)),
            outlet("b", Some(false)),
        ]));
        let uplink = Arc::new(GatedUplink::default());
        let session = Arc::new(Session::load(InMemoryKeyValueStore::new()).await.unwrap());
        let reporter = Arc::new(StateReporter::new(
            host,
            session,
            Arc::new(CapabilityRegistry::builtin()),
            Arc::clone(&uplink),
            Duration::from_secs(3600),
        ));
        reporter.queue().pending.insert(DeviceId::new("a"));

        let first = tokio::spawn({
            let reporter = Arc::clone(&reporter);
            async move { reporter.flush_now().await }
        });
        uplink.entered.notified().await;

        // the blocked report already owns "a", so only "b" is queued
        reporter.mark_dirty(DeviceId::new("b"));
        assert_eq!(reporter.pending(), vec![DeviceId::new("b")]);

        uplink.gate.notify_one();
        first.await.unwrap();
        reporter.flush_now().await;

        let reports = uplink.reports.lock().unwrap().clone();
        assert_eq!(reports.len(), 2);
        assert_eq!(reported_ids(&reports[0]), vec!["a"]);
        assert_eq!(reported_ids(&reports[1]), vec!["b"]);
        assert!(reporter.pending().is_empty());
    }
}

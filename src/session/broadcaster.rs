use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::clock::Timeline;
use super::trail::{FlightTrail, TrackSample};
use crate::czml::{document_packet, encode_frame, placement_packet, track_packet, StreamSettings};
use crate::telemetry::StateStore;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Frames buffered between a session and its HTTP response body.
pub const FRAME_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Streaming,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The session token was cancelled, usually by server shutdown.
    Cancelled,
    /// The client went away.
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub ticks: u64,
    pub trail_len: usize,
    pub reason: CloseReason,
}

/// Streams one client's view of the shared telemetry.
///
/// Emits the document packet and a static placement packet, then one track
/// packet per tick until the token is cancelled or the frame receiver is
/// dropped. The store snapshot is always copied out before a frame is sent,
/// so a slow client never holds a store lock.
pub struct SessionBroadcaster {
    id: Uuid,
    store: StateStore,
    settings: Arc<StreamSettings>,
    timeline: Timeline,
    state: SessionState,
    flight_time: u64,
    trail: FlightTrail,
}

impl SessionBroadcaster {
    pub fn new(store: StateStore, settings: Arc<StreamSettings>, timeline: Timeline) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            settings,
            timeline,
            state: SessionState::Starting,
            flight_time: 0,
            trail: FlightTrail::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub async fn run(
        mut self,
        frames: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> SessionSummary {
        log::info!("Session {} opened", self.id);

        let epoch = self.timeline.now();
        let reason = match self.start(&frames, &cancel, epoch).await {
            Ok(()) => self.stream(&frames, &cancel, epoch).await,
            Err(reason) => reason,
        };

        self.state = SessionState::Closed;
        cancel.cancel();

        log::info!(
            "Session {} closed ({:?}) after {} ticks",
            self.id,
            reason,
            self.flight_time
        );

        SessionSummary {
            id: self.id,
            ticks: self.flight_time,
            trail_len: self.trail.len(),
            reason,
        }
    }

    async fn start(
        &mut self,
        frames: &mpsc::Sender<String>,
        cancel: &CancellationToken,
        epoch: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), CloseReason> {
        let document = document_packet(&self.settings, epoch);
        self.emit(frames, cancel, &document).await?;

        let snapshot = self.store.snapshot();
        let placement = placement_packet(&snapshot, &self.settings, epoch);
        self.emit(frames, cancel, &placement).await
    }

    async fn stream(
        &mut self,
        frames: &mpsc::Sender<String>,
        cancel: &CancellationToken,
        epoch: chrono::DateTime<chrono::Utc>,
    ) -> CloseReason {
        self.state = SessionState::Streaming;

        let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return CloseReason::Cancelled,
                _ = frames.closed() => return CloseReason::Disconnected,
                _ = ticker.tick() => {}
            }

            if let Err(reason) = self.tick(frames, cancel, epoch).await {
                return reason;
            }
        }
    }

    async fn tick(
        &mut self,
        frames: &mpsc::Sender<String>,
        cancel: &CancellationToken,
        epoch: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), CloseReason> {
        self.flight_time += 1;
        let snapshot = self.store.snapshot();

        let sample = TrackSample::from_snapshot(self.flight_time, &snapshot);
        let sample = match self.trail.push(sample) {
            Ok(sample) => *sample,
            Err(e) => {
                log::error!("Session {}: {}", self.id, e);
                return Ok(());
            }
        };

        let packet = track_packet(&sample, &self.settings, epoch);
        self.emit(frames, cancel, &packet).await
    }

    /// Encodes and sends one record. Encoding failures drop the record.
    async fn emit<T: Serialize + Sync>(
        &self,
        frames: &mpsc::Sender<String>,
        cancel: &CancellationToken,
        record: &T,
    ) -> Result<(), CloseReason> {
        let id = Timeline::frame_id(self.timeline.now());
        let frame = match encode_frame(id, record) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Session {}: dropping record: {}", self.id, e);
                return Ok(());
            }
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(CloseReason::Cancelled),
            sent = frames.send(frame) => sent.map_err(|_| CloseReason::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Position, Quaternion};
    use serde_json::{json, Value};
    use tokio::task::JoinHandle;

    struct Harness {
        store: StateStore,
        cancel: CancellationToken,
        rx: mpsc::Receiver<String>,
        handle: JoinHandle<SessionSummary>,
    }

    fn spawn_session(store: &StateStore, capacity: usize) -> Harness {
        let (tx, rx) = mpsc::channel(capacity);
        let cancel = CancellationToken::new();
        let session = SessionBroadcaster::new(
            store.clone(),
            Arc::new(StreamSettings::default()),
            Timeline::default(),
        );
        assert_eq!(session.state(), SessionState::Starting);
        let handle = tokio::spawn(session.run(tx, cancel.clone()));
        Harness {
            store: store.clone(),
            cancel,
            rx,
            handle,
        }
    }

    fn parse_frame(frame: &str) -> (i64, Value) {
        let body = frame.strip_suffix("\n\n").expect("frame terminator");
        let (id_line, data_line) = body.split_once('\n').expect("two lines");
        let id = id_line.strip_prefix("id: ").unwrap().parse().unwrap();
        let data = serde_json::from_str(data_line.strip_prefix("data: ").unwrap()).unwrap();
        (id, data)
    }

    async fn next_record(rx: &mut mpsc::Receiver<String>) -> Value {
        let frame = rx.recv().await.expect("session ended early");
        parse_frame(&frame).1
    }

    fn flight_time(record: &Value) -> f64 {
        record["position"]["cartographicDegrees"][0].as_f64().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_and_placement_precede_ticks() {
        let store = StateStore::new();
        let mut h = spawn_session(&store, FRAME_BUFFER);

        let document = next_record(&mut h.rx).await;
        assert_eq!(document["id"], "document");
        assert!(document.get("clock").is_some());

        let placement = next_record(&mut h.rx).await;
        assert_eq!(placement["id"], "drone");
        assert!(placement.get("model").is_some());
        assert!(placement.get("path").is_none());

        let tick = next_record(&mut h.rx).await;
        assert!(tick.get("model").is_none());
        assert!(tick.get("path").is_some());
        assert_eq!(flight_time(&tick), 1.0);

        h.cancel.cancel();
        let summary = h.handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flight_time_increments_by_one() {
        let store = StateStore::new();
        let mut h = spawn_session(&store, FRAME_BUFFER);
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;

        for expected in 1..=5 {
            let tick = next_record(&mut h.rx).await;
            assert_eq!(flight_time(&tick), expected as f64);
        }

        h.cancel.cancel();
        let summary = h.handle.await.unwrap();
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.trail_len, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_golden_track_record() {
        let store = StateStore::new();
        store.set_position(Position::new(139.767, 35.681, 50.0));
        store.set_orientation(Quaternion::new(0.0, 0.0, 0.0, 1.0));

        let mut h = spawn_session(&store, FRAME_BUFFER);
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;

        let tick = next_record(&mut h.rx).await;
        assert_eq!(
            tick["position"]["cartographicDegrees"],
            json!([2.0, 139.767, 35.681, 50.0])
        );
        assert_eq!(
            tick["orientation"]["unitQuaternion"],
            json!([2.0, 0.0, 0.0, 0.0, 1.0])
        );
        h.cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_without_telemetry_are_not_suppressed() {
        let store = StateStore::new();
        let mut h = spawn_session(&store, FRAME_BUFFER);

        let placement = {
            next_record(&mut h.rx).await;
            next_record(&mut h.rx).await
        };
        assert_eq!(placement["position"]["cartographicDegrees"], json!([]));

        let tick = next_record(&mut h.rx).await;
        assert_eq!(tick["position"]["cartographicDegrees"], json!([1.0]));
        assert_eq!(tick["orientation"]["unitQuaternion"], json!([1.0]));
        h.cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_store_updates() {
        let store = StateStore::new();
        store.set_position(Position::new(1.0, 2.0, 3.0));
        let mut h = spawn_session(&store, FRAME_BUFFER);
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;

        for i in 1..=3 {
            h.store
                .set_orientation(Quaternion::new(0.0, 0.0, 0.0, i as f64));
            let tick = next_record(&mut h.rx).await;
            assert_eq!(
                tick["position"]["cartographicDegrees"],
                json!([i as f64, 1.0, 2.0, 3.0])
            );
            assert_eq!(
                tick["orientation"]["unitQuaternion"],
                json!([i as f64, 0.0, 0.0, 0.0, i as f64])
            );
        }
        h.cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_closes_session() {
        let store = StateStore::new();
        let mut h = spawn_session(&store, FRAME_BUFFER);
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;
        next_record(&mut h.rx).await;

        drop(h.rx);

        let summary = h.handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::Disconnected);
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.trail_len, 1);
        assert!(h.cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_client_is_stalled() {
        let store = StateStore::new();
        // Room for the document only; the placement send blocks.
        let h = spawn_session(&store, 1);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!h.handle.is_finished());

        h.cancel.cancel();
        let summary = h.handle.await.unwrap();
        assert_eq!(summary.reason, CloseReason::Cancelled);
        assert_eq!(summary.ticks, 0);
        drop(h.rx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_keep_independent_counters() {
        let store = StateStore::new();
        let mut first = spawn_session(&store, FRAME_BUFFER);
        for _ in 0..5 {
            next_record(&mut first.rx).await;
        }

        let mut second = spawn_session(&store, FRAME_BUFFER);
        next_record(&mut second.rx).await;
        next_record(&mut second.rx).await;

        assert_eq!(flight_time(&next_record(&mut second.rx).await), 1.0);
        assert_eq!(flight_time(&next_record(&mut first.rx).await), 4.0);
        assert_eq!(flight_time(&next_record(&mut second.rx).await), 2.0);

        first.cancel.cancel();
        second.cancel.cancel();
        let first = first.handle.await.unwrap();
        let second = second.handle.await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(first.ticks >= 4);
        assert!(second.ticks >= 2);
        assert_eq!(first.trail_len as u64, first.ticks);
        assert_eq!(second.trail_len as u64, second.ticks);
    }

    #[test]
    fn test_frame_ids_parse() {
        let (id, data) = parse_frame("id: 7\ndata: {\"id\":\"drone\"}\n\n");
        assert_eq!(id, 7);
        assert_eq!(data, json!({"id": "drone"}));
    }
}

use std::sync::{Arc, PoisonError, RwLock};

use super::types::{Position, Quaternion, TelemetrySnapshot, TelemetryUpdate};

/// Last known position and orientation, shared by the ingestion workers and
/// every streaming session.
///
/// Each field has its own lock, so a position write never waits on an
/// orientation write and a snapshot may pair values from different instants.
/// Readers get a copy and hold no lock once `snapshot` returns.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<Fields>,
}

#[derive(Debug, Default)]
struct Fields {
    position: RwLock<Option<Position>>,
    orientation: RwLock<Option<Quaternion>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, position: Position) {
        let mut slot = self
            .inner
            .position
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(position);
    }

    pub fn set_orientation(&self, orientation: Quaternion) {
        let mut slot = self
            .inner
            .orientation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(orientation);
    }

    pub fn apply(&self, update: TelemetryUpdate) {
        match update {
            TelemetryUpdate::Position(position) => self.set_position(position),
            TelemetryUpdate::Attitude(orientation) => self.set_orientation(orientation),
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let position = *self
            .inner
            .position
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let orientation = *self
            .inner
            .orientation
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        TelemetrySnapshot {
            position,
            orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_store_has_no_fields() {
        let store = StateStore::new();
        assert_eq!(store.snapshot(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_fields_update_independently() {
        let store = StateStore::new();
        store.set_position(Position::new(1.0, 2.0, 3.0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.position, Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(snapshot.orientation, None);

        store.apply(Quaternion::new(0.0, 0.0, 0.0, 1.0).into());
        let snapshot = store.snapshot();
        assert_eq!(snapshot.position, Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(snapshot.orientation, Some(Quaternion::new(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_last_write_wins() {
        let store = StateStore::new();
        store.set_position(Position::new(1.0, 1.0, 1.0));
        store.set_position(Position::new(2.0, 2.0, 2.0));
        assert_eq!(store.snapshot().position, Some(Position::new(2.0, 2.0, 2.0)));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = StateStore::new();
        store.set_position(Position::new(1.0, 2.0, 3.0));
        let before = store.snapshot();
        store.set_position(Position::new(4.0, 5.0, 6.0));
        assert_eq!(before.position, Some(Position::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_concurrent_writers_never_tear_a_field() {
        let store = StateStore::new();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..1_000 {
                        let v = (w * 10_000 + i) as f64;
                        store.set_position(Position::new(v, v, v));
                        store.set_orientation(Quaternion::new(v, v, v, v));
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let snapshot = store.snapshot();
                    if let Some(p) = snapshot.position {
                        assert_eq!(p.longitude_deg, p.latitude_deg);
                        assert_eq!(p.latitude_deg, p.absolute_altitude_m);
                    }
                    if let Some(q) = snapshot.orientation {
                        assert!(q.x == q.y && q.y == q.z && q.z == q.w);
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        // Each writer's final write is one of these; whichever finished last wins.
        let finals: Vec<f64> = (0..4).map(|w| (w * 10_000 + 999) as f64).collect();
        let snapshot = store.snapshot();
        let p = snapshot.position.unwrap();
        assert!(finals.contains(&p.longitude_deg));
        let q = snapshot.orientation.unwrap();
        assert!(finals.contains(&q.w));
    }

    #[test]
    fn test_sequential_writes_from_threads_keep_latest() {
        let store = StateStore::new();
        for i in 0..10 {
            let handle = {
                let store = store.clone();
                thread::spawn(move || store.set_position(Position::new(i as f64, 0.0, 0.0)))
            };
            handle.join().unwrap();
            assert_eq!(store.snapshot().position.unwrap().longitude_deg, i as f64);
        }
    }
}

use thiserror::Error;

use crate::telemetry::{Position, Quaternion, TelemetrySnapshot};

/// One point of a session's track, tagged with seconds since the session epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub flight_time: u64,
    pub position: Option<Position>,
    pub orientation: Option<Quaternion>,
}

impl TrackSample {
    pub fn from_snapshot(flight_time: u64, snapshot: &TelemetrySnapshot) -> Self {
        Self {
            flight_time,
            position: snapshot.position,
            orientation: snapshot.orientation,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrailError {
    #[error("sample at t={got} does not follow t={last}")]
    OutOfOrder { last: u64, got: u64 },
}

/// Samples accumulated by one session, strictly increasing by flight time.
#[derive(Debug, Default)]
pub struct FlightTrail {
    samples: Vec<TrackSample>,
}

impl FlightTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: TrackSample) -> Result<&TrackSample, TrailError> {
        if let Some(last) = self.samples.last() {
            if sample.flight_time <= last.flight_time {
                return Err(TrailError::OutOfOrder {
                    last: last.flight_time,
                    got: sample.flight_time,
                });
            }
        }
        self.samples.push(sample);
        Ok(&self.samples[self.samples.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&TrackSample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }
}

use chrono::{DateTime, Duration, Utc};

/// Wall clock used for every timestamp a session emits.
///
/// The offset is read from config once at startup and applied uniformly to
/// timeline bounds, epochs and frame ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeline {
    offset: Duration,
}

impl Timeline {
    pub fn new(offset: Duration) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        now.checked_add_signed(self.offset).unwrap_or(now)
    }

    /// Unix nanoseconds, used as the event-stream record id.
    pub fn frame_id(time: DateTime<Utc>) -> i64 {
        time.timestamp_nanos_opt().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_is_applied() {
        let timeline = Timeline::new(Duration::hours(-9));
        let expected = Utc::now() - Duration::hours(9);
        let delta = (timeline.now() - expected).num_seconds().abs();
        assert!(delta <= 1);
    }

    #[test]
    fn test_frame_id_is_unix_nanos() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(Timeline::frame_id(time), 1_714_564_800_000_000_000);
    }
}

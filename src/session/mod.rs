mod broadcaster;
mod clock;
mod trail;

pub use broadcaster::{
    CloseReason, SessionBroadcaster, SessionState, SessionSummary, FRAME_BUFFER, TICK_INTERVAL,
};
pub use clock::Timeline;
pub use trail::{FlightTrail, TrackSample, TrailError};

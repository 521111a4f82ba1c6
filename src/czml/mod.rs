mod encoder;
mod error;
mod style;
mod types;

pub use encoder::{
    document_packet, encode_frame, format_time, placement_packet, track_packet, CLOCK_MULTIPLIER,
    CLOCK_RANGE, CLOCK_STEP, DOCUMENT_VERSION,
};
pub use error::CzmlError;
pub use style::{ModelStyle, PathStyle, StreamSettings};
pub use types::{
    Clock, Document, Material, ModelProperty, OrientationProperty, Packet, PathProperty,
    PositionProperty, SolidColor,
};

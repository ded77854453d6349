pub mod audio;
pub mod beam;
pub mod capture;
pub mod config;
pub mod telemetry;

pub use beam::{
    start_beam_tracker, BeamSmoother, BeamTracker, BeamUpdate, DirectionReading, DirectionSource,
    FixedDirection,
};
pub use capture::{CaptureSession, CaptureStats, StopCause};

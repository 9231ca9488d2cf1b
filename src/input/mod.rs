//! Brush input sources: smoothing, remote control and gaze feed

mod brush;
pub mod control;
pub mod gaze;

pub use brush::BrushSmoother;
pub use control::{parse_command, Command, Controller};
pub use gaze::{parse_sample, GazeFeed, GazeSample};

//! Branching paint strokes grown from a brush path.
//!
//! [`Painter`] is the entry point: feed it brush positions and start/stop
//! signals, ask it for new tools and colors, and render into a [`Canvas`] or
//! any other [`Surface`].

pub mod clock;
pub mod color;
pub mod config;
pub mod display;
pub mod geometry;
pub mod growth;
pub mod history;
pub mod hull;
pub mod input;
pub mod painter;
pub mod preview;
pub mod render;
pub mod tool;

pub use clock::{Clock, ManualClock, SystemClock, TickScheduler};
pub use color::Color;
pub use config::{ConfigError, PaintConfig};
pub use geometry::Point;
pub use growth::{Blob, GrowthConfig, GrowthModel, GrowthState, Stroke};
pub use history::History;
pub use hull::{convex_hull, Hull};
pub use painter::Painter;
pub use preview::render_preview;
pub use render::{Canvas, DrawLog, RenderConfig, Renderer, Surface};
pub use tool::{Opacities, Tool, ToolError, ToolGenerator, ToolParams};

//! The painting core behind one brush
//!
//! `Painter` wires growth, rendering and the tool/color memories together and
//! owns everything that is random or time-dependent, so an embedding loop
//! only feeds it brush positions and commands.

use crate::clock::{Clock, SystemClock};
use crate::color::{self, Color};
use crate::config::{ConfigError, PaintConfig};
use crate::geometry::Point;
use crate::growth::GrowthModel;
use crate::history::History;
use crate::hull::Hull;
use crate::render::{Canvas, Renderer, Surface};
use crate::tool::{Tool, ToolGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info};

pub struct Painter {
    config: PaintConfig,
    rng: StdRng,
    clock: Box<dyn Clock>,
    model: GrowthModel,
    renderer: Renderer,
    generator: ToolGenerator,
    tools: History<Tool>,
    colors: History<Color>,
    /// Selected tool as remembered in the tool history
    base_tool: Tool,
    color: Color,
    /// `base_tool` painting in `color`
    active: Tool,
    stroke_started: Option<Duration>,
}

impl Painter {
    pub fn new(config: PaintConfig, mut rng: StdRng, clock: impl Clock + 'static) -> Self {
        let generator = ToolGenerator::new(config.preferred_hues.clone());
        let base_tool = generator.generate(&mut rng);
        let color = base_tool.color();

        let mut tools = History::new();
        tools.record_usage(&base_tool, Duration::ZERO);
        let mut colors = History::new();
        colors.record_usage(&color, Duration::ZERO);

        Self {
            model: GrowthModel::new(config.growth),
            renderer: Renderer::new(&config.render),
            config,
            rng,
            clock: Box::new(clock),
            generator,
            tools,
            colors,
            base_tool,
            color,
            active: base_tool,
            stroke_started: None,
        }
    }

    /// Validate `config` and seed from it (or from entropy), on the system clock
    pub fn from_config(config: PaintConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::new(config, rng, SystemClock::new()))
    }

    pub fn config(&self) -> &PaintConfig {
        &self.config
    }

    /// The tool strokes are painted with
    pub fn tool(&self) -> &Tool {
        &self.active
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn model(&self) -> &GrowthModel {
        &self.model
    }

    pub fn is_painting(&self) -> bool {
        self.model.is_growing()
    }

    pub fn tool_history(&self) -> &History<Tool> {
        &self.tools
    }

    pub fn color_history(&self) -> &History<Color> {
        &self.colors
    }

    // ========================================================================
    // Strokes
    // ========================================================================

    /// Put the brush down at `point`. Returns false if already painting or
    /// if the start lies inside the previous stroke's last blob and that is
    /// forbidden by config.
    pub fn start_stroke(&mut self, point: Point) -> bool {
        if self.model.is_growing() {
            return false;
        }
        if self.config.forbid_start_inside_hull && self.inside_last_blob(&point) {
            debug!(x = point.x, y = point.y, "stroke start refused inside previous blob");
            return false;
        }
        if !self.model.start_stroke(point, &self.active, &mut self.rng) {
            return false;
        }
        self.stroke_started = Some(self.clock.now());
        info!(x = point.x, y = point.y, "stroke started");
        true
    }

    fn inside_last_blob(&self, point: &Point) -> bool {
        self.model
            .stroke()
            .and_then(|s| s.last())
            .is_some_and(|blob| Hull::from_points(blob.leaves()).contains(point))
    }

    /// Grow the active stroke toward `brush`
    pub fn tick(&mut self, brush: Point) -> bool {
        self.model.tick(brush, &self.active, &mut self.rng)
    }

    /// Lift the brush, crediting the elapsed time to the tool and color
    pub fn stop_stroke(&mut self) -> bool {
        if !self.model.stop_stroke() {
            return false;
        }
        let elapsed = self
            .stroke_started
            .take()
            .map_or(Duration::ZERO, |start| self.clock.now().saturating_sub(start));
        self.tools.record_usage(&self.base_tool, elapsed);
        self.colors.record_usage(&self.color, elapsed);
        info!(elapsed_ms = elapsed.as_millis() as u64, "stroke stopped");
        true
    }

    // ========================================================================
    // Tool and color changes
    // ========================================================================

    /// Recall a remembered tool or invent one. The tool brings its own color.
    pub fn select_or_generate_tool(&mut self) -> Tool {
        let generator = &self.generator;
        let next = self.tools.select(
            &self.base_tool,
            |rng| generator.generate(rng),
            self.config.memory_threshold,
            &mut self.rng,
        );
        self.base_tool = next;
        self.color = next.color();
        self.colors.record_usage(&self.color, Duration::ZERO);
        self.active = next;
        info!(
            branches = next.params().branches_max,
            length = next.params().branch_length,
            remembered = self.tools.len(),
            "tool selected"
        );
        self.active
    }

    /// Recall a remembered color or invent one for the current tool
    pub fn select_or_generate_color(&mut self) -> Color {
        let hues = (!self.config.preferred_hues.is_empty()).then_some(self.config.preferred_hues.as_slice());
        let next = self.colors.select(
            &self.color,
            |rng| color::generate(None, 0.0, hues, rng),
            self.config.memory_threshold,
            &mut self.rng,
        );
        self.color = next;
        self.active = self.base_tool.with_color(next);
        info!(r = next.r, g = next.g, b = next.b, remembered = self.colors.len(), "color selected");
        next
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw the current stroke (active or just finished) onto `surface`
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(stroke) = self.model.stroke() {
            self.renderer.render(stroke, &self.active, surface, &mut self.rng);
        }
    }

    /// Paint this tick's growth onto `canvas` with its drop shadow.
    /// Does nothing while the brush is up.
    pub fn render_frame(&mut self, canvas: &mut Canvas) -> bool {
        if !self.model.is_growing() {
            return false;
        }
        let Some(stroke) = self.model.stroke() else {
            return false;
        };
        let layer = canvas.begin_layer();
        self.renderer.render(stroke, &self.active, layer, &mut self.rng);
        let shadow = color::generate(
            Some(self.active.color()),
            self.active.params().color_variation,
            None,
            &mut self.rng,
        );
        canvas.commit_layer(shadow);
        true
    }

    pub fn clear(&mut self, canvas: &mut Canvas) {
        canvas.clear();
        info!("canvas cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::render::DrawLog;
    use crate::tool::ToolParams;

    fn painter_with(config: PaintConfig, seed: u64) -> (Painter, ManualClock) {
        let clock = ManualClock::new();
        let painter = Painter::new(config, StdRng::seed_from_u64(seed), clock.clone());
        (painter, clock)
    }

    #[test]
    fn test_start_is_idempotent() {
        let (mut p, _) = painter_with(PaintConfig::default(), 1);
        assert!(p.start_stroke(Point::new(10.0, 10.0)));
        let before = p.model().stroke().cloned();
        assert!(!p.start_stroke(Point::new(90.0, 90.0)));
        assert_eq!(p.model().stroke().cloned(), before);
        assert!(p.is_painting());
    }

    #[test]
    fn test_stop_records_usage() {
        let (mut p, clock) = painter_with(PaintConfig::default(), 2);
        let tool = p.tool_history().entries()[0].0;
        p.start_stroke(Point::new(5.0, 5.0));
        clock.advance(Duration::from_millis(1500));
        assert!(p.stop_stroke());
        assert!(!p.stop_stroke());
        assert_eq!(p.tool_history().usage(&tool), Some(Duration::from_millis(1500)));
        assert_eq!(p.color_history().usage(&p.color()), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_color_change_keeps_tool_shape() {
        let (mut p, _) = painter_with(PaintConfig::default(), 3);
        let before = *p.tool();
        let color = p.select_or_generate_color();
        assert_eq!(p.tool().color(), color);
        assert_eq!(p.tool().params().branch_length, before.params().branch_length);
        assert_eq!(p.tool().opacity(), before.opacity());
    }

    #[test]
    fn test_tool_change_adopts_tool_color() {
        let (mut p, _) = painter_with(PaintConfig::default(), 4);
        let tool = p.select_or_generate_tool();
        assert_eq!(p.color(), tool.color());
        assert_eq!(*p.tool(), tool);
    }

    #[test]
    fn test_render_while_idle_draws_nothing() {
        let (mut p, _) = painter_with(PaintConfig::default(), 5);
        let mut log = DrawLog::new();
        p.render(&mut log);
        assert!(log.is_empty());

        let mut canvas = Canvas::new(64, 64, &p.config().render);
        assert!(!p.render_frame(&mut canvas));
    }

    #[test]
    fn test_render_frame_lays_down_paint() {
        let config = PaintConfig {
            width: 64,
            height: 64,
            ..PaintConfig::default()
        };
        let (mut p, _) = painter_with(config, 6);
        let mut canvas = Canvas::new(64, 64, &p.config().render);
        p.start_stroke(Point::new(32.0, 32.0));
        for _ in 0..5 {
            p.tick(Point::new(32.0, 32.0));
            assert!(p.render_frame(&mut canvas));
        }
        let untouched = (0..64)
            .flat_map(|y| (0..64).map(move |x| (x, y)))
            .all(|(x, y)| canvas.paint().get_pixel(x, y) == Some((255, 255, 255)));
        assert!(!untouched);
    }

    #[test]
    fn test_forbid_start_inside_previous_blob() {
        let config = PaintConfig {
            forbid_start_inside_hull: true,
            ..PaintConfig::default()
        };
        let (mut p, _) = painter_with(config, 7);
        // Straight, untwisted spokes always ring the center
        let spokes = Tool::new(
            ToolParams {
                branches_max: 6,
                branches_variety: 0.0,
                branch_length: 10.0,
                branch_straightness: 1.0,
                rotation: 0.0,
                ..ToolParams::default()
            },
            *Tool::default().opacity(),
        )
        .unwrap();
        p.base_tool = spokes;
        p.active = spokes;

        let center = Point::new(100.0, 100.0);
        assert!(p.start_stroke(center));
        for _ in 0..5 {
            p.tick(center);
        }
        assert!(p.stop_stroke());

        assert!(!p.start_stroke(center));
        assert!(!p.is_painting());
        assert!(p.start_stroke(Point::new(10_000.0, 10_000.0)));
    }

    #[test]
    fn test_start_inside_previous_blob_allowed_by_default() {
        let (mut p, _) = painter_with(PaintConfig::default(), 7);
        let center = Point::new(100.0, 100.0);
        p.start_stroke(center);
        for _ in 0..5 {
            p.tick(center);
        }
        p.stop_stroke();
        assert!(p.start_stroke(center));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = PaintConfig {
            tick_hz: 0,
            ..PaintConfig::default()
        };
        assert!(Painter::from_config(config).is_err());
        assert!(Painter::from_config(PaintConfig {
            seed: Some(9),
            ..PaintConfig::default()
        })
        .is_ok());
    }
}

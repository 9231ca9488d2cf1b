use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tendril::render::DrawOp;
use tendril::{
    Canvas, DrawLog, GrowthConfig, GrowthModel, ManualClock, Opacities, PaintConfig, Painter, Point, Renderer,
    Surface, TickScheduler, Tool, ToolParams,
};

fn dab_tool(branch_length: f64) -> Tool {
    let params = ToolParams {
        branches_max: 3,
        branches_variety: 0.0,
        branch_length,
        ..ToolParams::default()
    };
    let opacity = Opacities {
        center_fill: 1.0,
        ..Opacities::default()
    };
    Tool::new(params, opacity).unwrap()
}

#[test]
fn test_evicted_blob_is_not_rendered() {
    let tool = dab_tool(4.0);
    let config = GrowthConfig {
        max_blobs: 3,
        ..GrowthConfig::default()
    };
    let mut model = GrowthModel::new(config);
    let mut rng = StdRng::seed_from_u64(10);

    let first = Point::new(0.0, 0.0);
    model.start_stroke(first, &tool, &mut rng);
    // Each step is far beyond the tool spacing, so every tick seeds a blob
    for i in 1..=3 {
        model.tick(Point::new(100.0 * i as f64, 0.0), &tool, &mut rng);
    }

    let stroke = model.stroke().unwrap();
    assert_eq!(stroke.len(), 3);
    assert_eq!(stroke.evicted(), 1);

    let mut log = DrawLog::new();
    Renderer::default().render(stroke, &tool, &mut log, &mut rng);
    assert!(!log.touches(first));
    assert_eq!(
        log.ellipse_centers(),
        vec![Point::new(100.0, 0.0), Point::new(200.0, 0.0), Point::new(300.0, 0.0)]
    );
}

#[test]
fn test_restarted_strokes_are_reproducible() {
    let tool = Tool::default();
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = GrowthModel::default();
        let mut shapes = Vec::new();
        for _ in 0..2 {
            model.start_stroke(Point::new(40.0, 40.0), &tool, &mut rng);
            for t in 0..6 {
                model.tick(Point::new(40.0 + 10.0 * t as f64, 40.0), &tool, &mut rng);
            }
            model.stop_stroke();
            shapes.push(model.stroke().cloned());
        }
        shapes
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn test_painter_session() {
    let config = PaintConfig {
        width: 96,
        height: 96,
        seed: Some(5),
        memory_threshold: 0,
        ..PaintConfig::default()
    };
    let clock = ManualClock::new();
    let mut painter = Painter::new(config.clone(), StdRng::seed_from_u64(5), clock.clone());
    let mut canvas = Canvas::new(config.width, config.height, &config.render);
    let mut ticks = TickScheduler::new(config.tick_hz);

    for stroke in 0..3 {
        let start = Point::new(20.0 + 20.0 * stroke as f64, 48.0);
        assert!(painter.start_stroke(start));
        for frame in 0..10 {
            clock.advance(Duration::from_millis(40));
            for _ in 0..ticks.advance(Duration::from_millis(40)) {
                painter.tick(start + Point::new(frame as f64, 0.0));
                painter.render_frame(&mut canvas);
            }
        }
        assert!(painter.stop_stroke());
        painter.select_or_generate_color();
        painter.select_or_generate_tool();
    }

    assert!(!painter.is_painting());
    assert!(painter.tool_history().len() >= 1);
    assert!(painter
        .tool_history()
        .entries()
        .iter()
        .any(|(_, usage)| *usage >= Duration::from_millis(400)));

    let rgba = canvas.paint().to_rgba();
    assert_eq!(rgba.len(), 96 * 96 * 4);
    assert!(rgba.chunks_exact(4).any(|px| px[..3] != [255, 255, 255]));

    painter.clear(&mut canvas);
    assert!(canvas.paint().to_rgba().chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
}

#[test]
fn test_painter_renders_to_any_surface() {
    let mut painter = Painter::new(PaintConfig::default(), StdRng::seed_from_u64(12), ManualClock::new());
    painter.start_stroke(Point::new(50.0, 50.0));
    painter.tick(Point::new(50.0, 50.0));

    let mut log = DrawLog::new();
    log.clear(tendril::Color::WHITE);
    painter.render(&mut log);
    assert!(log.len() > 1);
    assert!(!matches!(log.ops()[1], DrawOp::Clear(_)));
}

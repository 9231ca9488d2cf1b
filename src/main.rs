use sdl2::keyboard::Keycode;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tendril::clock::{Clock, FpsCounter, SystemClock, TickScheduler};
use tendril::config::{PaintConfig, DEFAULT_CONFIG_FILE};
use tendril::display::{Display, InputEvent, RenderTarget};
use tendril::input::{BrushSmoother, Command, Controller, GazeFeed};
use tendril::{Canvas, Painter};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line options; anything given here overrides the config file
#[derive(Default)]
struct Args {
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    mqtt: Option<String>,
    no_vsync: bool,
}

fn print_help() {
    println!("Usage: tendril [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --width W, -w W           Set window width");
    println!("  --height H, -h H          Set window height");
    println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
    println!("  --seed N                  Seed the random generator");
    println!("  --config PATH             Config file (default: {})", DEFAULT_CONFIG_FILE);
    println!("  --mqtt HOST               Follow the gaze feed on HOST");
    println!("  --no-vsync                Disable VSync for uncapped framerate");
    println!("  --help                    Show this help message");
    println!();
    println!("Controls:");
    println!("  Left drag  - Paint");
    println!("  T          - Change tool");
    println!("  C          - Change color");
    println!("  Space      - Clear");
    println!("  S          - Save PNG");
    println!("  F          - Toggle FPS in title");
    println!("  Escape     - Quit");
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => parsed.no_vsync = true,
            "--width" | "-w" => {
                parsed.width = value.and_then(|v| v.parse().ok()).or(parsed.width);
                i += 1;
            },
            "--height" | "-h" => {
                parsed.height = value.and_then(|v| v.parse().ok()).or(parsed.height);
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 1920x1080
                if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        parsed.width = Some(w);
                        parsed.height = Some(h);
                    }
                }
                i += 1;
            },
            "--seed" => {
                parsed.seed = value.and_then(|v| v.parse().ok()).or(parsed.seed);
                i += 1;
            },
            "--config" => {
                parsed.config = value.map(PathBuf::from);
                i += 1;
            },
            "--mqtt" => {
                parsed.mqtt = value.cloned();
                i += 1;
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    parsed
}

fn load_config(args: &Args) -> Result<PaintConfig, String> {
    let mut config = match &args.config {
        Some(path) => PaintConfig::load(path),
        None => PaintConfig::load_or_default(DEFAULT_CONFIG_FILE),
    }
    .map_err(|e| e.to_string())?;

    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn save_png(canvas: &Canvas) -> Result<PathBuf, String> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_secs();
    let path = PathBuf::from(format!("tendril-{}.png", stamp));
    let paint = canvas.paint();
    let image = image::RgbaImage::from_raw(paint.width(), paint.height(), paint.to_rgba())
        .ok_or_else(|| "pixel buffer size mismatch".to_string())?;
    image.save(&path).map_err(|e| e.to_string())?;
    Ok(path)
}

fn key_command(key: Keycode) -> Option<Command> {
    match key {
        Keycode::T => Some(Command::Tool),
        Keycode::C => Some(Command::Color),
        Keycode::Space => Some(Command::Clear),
        Keycode::S => Some(Command::Save),
        Keycode::F => Some(Command::ToggleFps),
        Keycode::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Apply a key or socket command. Returns false on quit.
fn apply(command: Command, painter: &mut Painter, canvas: &mut Canvas, show_fps: &mut bool) -> bool {
    match command {
        Command::Tool => {
            painter.select_or_generate_tool();
        },
        Command::Color => {
            painter.select_or_generate_color();
        },
        Command::Clear => painter.clear(canvas),
        Command::Save => match save_png(canvas) {
            Ok(path) => info!(path = %path.display(), "saved painting"),
            Err(e) => error!(error = %e, "failed to save painting"),
        },
        Command::ToggleFps => *show_fps = !*show_fps,
        Command::Quit => return false,
    }
    true
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args();
    let config = load_config(&args)?;
    let (width, height) = (config.width, config.height);

    let (mut display, texture_creator) = Display::with_options("tendril", width, height, !args.no_vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut canvas = Canvas::new(width, height, &config.render);

    let mut scheduler = TickScheduler::new(config.tick_hz);
    let mut brush = BrushSmoother::new(config.smoothing_window);
    let mut painter = Painter::from_config(config).map_err(|e| e.to_string())?;

    let controller = match Controller::new(tendril::input::control::SOCKET_PATH) {
        Ok(c) => {
            info!(path = %c.socket_path().display(), "remote control enabled");
            Some(c)
        },
        Err(e) => {
            warn!(error = %e, "remote control disabled");
            None
        },
    };
    let gaze = match &args.mqtt {
        Some(host) => Some(GazeFeed::connect(host, "")?),
        None => None,
    };

    let frame_clock = SystemClock::new();
    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = false;
    let mut frames: u64 = 0;

    info!(width, height, vsync = !args.no_vsync, "tendril started");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick(frame_clock.now());
        frames += 1;

        let mut commands = Vec::new();
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => commands.extend(key_command(key)),
                InputEvent::BrushDown(p) => {
                    brush.reset();
                    brush.push(p);
                    painter.start_stroke(p);
                },
                InputEvent::BrushMove(p) => {
                    if painter.is_painting() {
                        brush.push(p);
                    }
                },
                InputEvent::BrushUp => {
                    painter.stop_stroke();
                    brush.reset();
                },
            }
        }

        if let Some(controller) = &controller {
            commands.extend(controller.poll());
        }
        for command in commands {
            if !apply(command, &mut painter, &mut canvas, &mut show_fps) {
                break 'main;
            }
        }

        if let Some(gaze) = &gaze {
            for sample in gaze.poll() {
                if sample.down {
                    if !painter.is_painting() {
                        brush.reset();
                        painter.start_stroke(sample.point);
                    }
                    brush.push(sample.point);
                } else if painter.stop_stroke() {
                    brush.reset();
                }
            }
        }

        for _ in 0..scheduler.advance(std::time::Duration::from_secs_f32(dt)) {
            if let Some(p) = brush.position() {
                painter.tick(p);
                painter.render_frame(&mut canvas);
            }
        }

        if frames % 30 == 0 {
            let title = if show_fps {
                format!("tendril - {:.0} fps", avg_fps)
            } else {
                "tendril".to_string()
            };
            display.set_title(&title)?;
        }

        display.present(&mut target, canvas.paint())?;
    }

    Ok(())
}

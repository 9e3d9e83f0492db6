// Accessors kept for tests and debugging
#![allow(dead_code)]

mod config;
mod display;
mod effects;
mod error;
mod input;
mod logging;
mod math;
mod particles;
mod physics;
mod remote;
mod scheduler;
mod sizing;
mod util;

use std::path::PathBuf;

use config::{FieldConfig, MqttConfig};
use display::{Display, InputEvent, Screen, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use effects::ParticleField;
use error::{Error, Result};
use remote::PointerFeed;
use scheduler::FrameScheduler;
use sdl2::keyboard::Keycode;
use util::FpsCounter;

/// Command line options; anything set here overrides the config file
#[derive(Debug, Default)]
struct Args {
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    config: Option<PathBuf>,
    seed: Option<u64>,
    mqtt: Option<MqttConfig>,
    show_fps: bool,
    dump_config: Option<PathBuf>,
}

fn print_help() {
    println!("Usage: glowfield [OPTIONS]");
    println!();
    println!("Options:");
    println!(
        "  --width W, -w W           Set window width (default: {})",
        DEFAULT_WIDTH
    );
    println!(
        "  --height H, -h H          Set window height (default: {})",
        DEFAULT_HEIGHT
    );
    println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
    println!("  --no-vsync                Disable VSync for uncapped framerate");
    println!(
        "  --config PATH             Load settings from JSON (default: {} if present)",
        config::DEFAULT_CONFIG_PATH
    );
    println!("  --seed N                  Seed the particle RNG for a reproducible run");
    println!("  --mqtt HOST[:PORT]        Follow pointer positions published over MQTT");
    println!("  --fps                     Log frame rate once per second");
    println!("  --dump-config PATH        Write the effective config as JSON and exit");
    println!("  --help                    Show this help message");
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => parsed.no_vsync = true,
            "--fps" => parsed.show_fps = true,
            "--width" | "-w" => {
                parsed.width = value.and_then(|v| v.parse().ok()).or(parsed.width);
                i += 1;
            },
            "--height" | "-h" => {
                parsed.height = value.and_then(|v| v.parse().ok()).or(parsed.height);
                i += 1;
            },
            "--resolution" | "-r" => {
                // Parse WxH format (e.g., 1920x1080)
                if let Some((w, h)) = value.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                        parsed.width = Some(w);
                        parsed.height = Some(h);
                    }
                }
                i += 1;
            },
            "--config" => {
                parsed.config = value.map(PathBuf::from);
                i += 1;
            },
            "--seed" => {
                parsed.seed = value.and_then(|v| v.parse().ok());
                i += 1;
            },
            "--mqtt" => {
                parsed.mqtt = value.and_then(|v| MqttConfig::from_address(v));
                if parsed.mqtt.is_none() {
                    eprintln!("Ignoring invalid --mqtt address");
                }
                i += 1;
            },
            "--dump-config" => {
                parsed.dump_config = value.map(PathBuf::from);
                i += 1;
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => eprintln!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    let args = parse_args();
    let _logger = logging::setup()?;

    let mut config = FieldConfig::resolve(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(mut mqtt) = args.mqtt.clone() {
        // keep a topic chosen in the config file
        if let Some(existing) = &config.mqtt {
            mqtt.topic = existing.topic.clone();
        }
        config.mqtt = Some(mqtt);
    }

    if let Some(path) = &args.dump_config {
        config.save(path)?;
        log::info!("Config written to {}", path.display());
        return Ok(());
    }

    let width = args.width.unwrap_or(DEFAULT_WIDTH);
    let height = args.height.unwrap_or(DEFAULT_HEIGHT);
    let vsync = !args.no_vsync;

    let (display, texture_creator) = Display::with_options("glowfield", width, height, vsync)?;
    let mut screen = Screen::new(display, &texture_creator)?;

    log::info!(
        "Window {}x{}, vsync {}",
        width,
        height,
        if vsync { "on" } else { "off (uncapped)" }
    );
    log::info!("Move the mouse or drag a finger to gather particles. F toggles FPS, Escape quits.");

    let mut field = ParticleField::new(&config, width, height);
    let pointer = field.pointer_sender();

    // The feed stops on its own once the field is dropped
    let _feed = config.mqtt.as_ref().and_then(|mqtt| {
        PointerFeed::connect(mqtt, pointer.clone())
            .map_err(|e| log::warn!("Continuing without remote pointer: {}", e))
            .ok()
    });

    let mut scheduler = FrameScheduler::new(config.time_step);
    let cancel = scheduler.cancel_handle();

    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = args.show_fps;
    let mut fps_elapsed = 0.0;

    let result = scheduler.run(&mut field, &mut screen, |screen| {
        let (dt, avg_fps) = fps_counter.tick();
        if show_fps {
            fps_elapsed += dt;
            if fps_elapsed >= 1.0 {
                fps_elapsed = 0.0;
                let (min_fps, max_fps) = fps_counter.min_max_fps();
                log::info!(
                    "FPS {:.0} avg  {:.0} min  {:.0} max  {:.1}ms",
                    avg_fps,
                    min_fps,
                    max_fps,
                    fps_counter.avg_frame_time_ms()
                );
            }
        }

        for event in screen.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => cancel.cancel(),
                InputEvent::KeyDown(Keycode::F) => {
                    show_fps = !show_fps;
                    fps_elapsed = 0.0;
                },
                InputEvent::KeyDown(_) => {},
                InputEvent::MouseMove { x, y } => {
                    pointer.moved(x as f32, y as f32);
                },
                InputEvent::TouchMove { x, y } => {
                    pointer.moved(x, y);
                },
                InputEvent::Resized { width, height } => screen.resize(width, height)?,
            }
        }
        Ok(())
    });

    match result {
        Err(Error::SurfaceLost(reason)) => {
            log::warn!("Drawing surface lost ({}), stopping", reason);
            Ok(())
        },
        other => other,
    }
}

use lcd_eyes::config::EyeConfig;
use lcd_eyes::driver::{ColorDepth, PanelDriver, SimulatedPanels};
use lcd_eyes::expression::{presets, Composer};
use lcd_eyes::sequencer::{AnimationSequencer, RunOutcome, StopSignal};
use log::info;
use std::path::PathBuf;

/// Command line overrides on top of the config file
#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    depth: Option<ColorDepth>,
    brightness: Option<u8>,
    cycles: Option<u32>,
    preview: bool,
}

fn print_help() {
    println!("Usage: lcd-eyes [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config PATH       Load settings from a JSON file");
    println!("  --depth 12|18       Panel color depth (default: 12)");
    println!("  --brightness N      Backlight level 0-10 (default: 7)");
    println!("  --cycles N          Expression cycles to play, 0 = forever (default: 0)");
    if cfg!(feature = "sdl-preview") {
        println!("  --preview           Show both eyes in a window");
    }
    println!("  --help              Show this help message");
    println!();
    println!("Set RUST_LOG=debug for per-frame logging.");
}

/// Fetch and parse the value following a flag
fn flag_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String> {
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| format!("{} needs a value", flag))?;
    raw.parse::<T>()
        .map_err(|_| format!("invalid value for {}: {}", flag, raw))
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => cli.config = Some(flag_value(&args, &mut i, "--config")?),
            "--depth" | "-d" => {
                let bits: u32 = flag_value(&args, &mut i, "--depth")?;
                let depth = ColorDepth::from_bits(bits)
                    .ok_or_else(|| format!("unsupported color depth: {} (use 12 or 18)", bits))?;
                cli.depth = Some(depth);
            },
            "--brightness" | "-b" => cli.brightness = Some(flag_value(&args, &mut i, "--brightness")?),
            "--cycles" | "-n" => cli.cycles = Some(flag_value(&args, &mut i, "--cycles")?),
            "--preview" => cli.preview = true,
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => return Err(format!("unknown option: {} (see --help)", other)),
        }
        i += 1;
    }

    Ok(cli)
}

fn load_config(cli: &CliArgs) -> Result<EyeConfig, String> {
    let mut config = match &cli.config {
        Some(path) => EyeConfig::load(path).map_err(|e| e.to_string())?,
        None => EyeConfig::default(),
    };
    if let Some(depth) = cli.depth {
        config.color_depth = depth;
    }
    if let Some(brightness) = cli.brightness {
        config.brightness = brightness;
    }
    if let Some(cycles) = cli.cycles {
        config.cycles = cycles;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

#[cfg(feature = "sdl-preview")]
fn open_panels(cli: &CliArgs) -> SimulatedPanels {
    if cli.preview {
        SimulatedPanels::new().with_preview(2)
    } else {
        SimulatedPanels::new()
    }
}

#[cfg(not(feature = "sdl-preview"))]
fn open_panels(cli: &CliArgs) -> SimulatedPanels {
    if cli.preview {
        log::warn!("Built without the sdl-preview feature; --preview ignored");
    }
    SimulatedPanels::new()
}

/// Ctrl-C or a service stop ends the animation between frames
#[cfg(unix)]
fn watch_termination(stop: &StopSignal) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    stop.stop_on_signals(&[SIGINT, SIGTERM])
}

#[cfg(not(unix))]
fn watch_termination(_stop: &StopSignal) -> std::io::Result<()> {
    Ok(())
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args()?;
    let config = load_config(&cli)?;

    let mut panels = open_panels(&cli);
    panels
        .init(config.color_depth)
        .map_err(|e| e.to_string())?;
    panels
        .set_brightness(config.brightness)
        .map_err(|e| e.to_string())?;

    let stages = presets::cycle(&config.preset_options());
    let composer = Composer::new(config.particle_count, config.seed);
    let stop = StopSignal::new();
    watch_termination(&stop).map_err(|e| format!("failed to install signal handler: {}", e))?;
    let mut sequencer = AnimationSequencer::new(panels, composer, stop);

    info!(
        "Playing {} stages per cycle ({})",
        stages.len(),
        if config.cycles == 0 {
            "looping".to_string()
        } else {
            format!("{} cycles", config.cycles)
        }
    );

    let mut played = 0;
    while config.cycles == 0 || played < config.cycles {
        match sequencer.run(&stages).map_err(|e| e.to_string())? {
            RunOutcome::Completed => played += 1,
            // driver already released
            RunOutcome::Stopped => return Ok(()),
        }
    }

    sequencer
        .driver_mut()
        .release()
        .map_err(|e| e.to_string())?;
    info!("Done after {} cycles, {} frames", played, sequencer.frame_index());
    Ok(())
}

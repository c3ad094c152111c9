use std::{
    fmt::Display,
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::{value_parser, Arg, ArgAction, Command};

pub mod component;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod surface;
pub mod util;

pub use crate::core::{Camera, Color, Scene, Viewport};
pub use component::ParticleBackground;
pub use config::{FieldConfig, Style};
pub use error::FieldError;
pub use host::Host;
pub use util::format_mat4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Window,
    Terminal,
    Headless,
}

/// Rolling frame timing, shown in the window title and logged by the
/// headless surface.
pub struct Metrics {
    pub last_frame: Instant,
    pub fps_counter: u32,
    pub fps_update_timer: Instant,
    pub current_fps: f32,
    pub frame_times: Vec<f32>,
}

const METRICS_WINDOW: usize = 120;

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fps_counter: 0,
            fps_update_timer: Instant::now(),
            current_fps: 0.0,
            frame_times: Vec::with_capacity(METRICS_WINDOW),
        }
    }

    /// Records a frame that finished now.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.update(delta);
    }

    pub fn update(&mut self, frame_delta: Duration) {
        self.fps_counter += 1;
        self.frame_times.push(frame_delta.as_secs_f32() * 1000.0);
        if self.frame_times.len() > METRICS_WINDOW {
            self.frame_times.remove(0);
        }
        if self.fps_update_timer.elapsed() >= Duration::from_secs(1) {
            self.current_fps = self.fps_counter as f32;
            self.fps_counter = 0;
            self.fps_update_timer = Instant::now();
        }
    }

    pub fn average_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.average_ms(),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

/// Everything `main` needs after argument parsing.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: DisplayTarget,
    pub viewport: Viewport,
    pub config: FieldConfig,
    pub style: Style,
    /// Frames to render before exiting. Only the headless target honours it.
    pub frames: u64,
    /// Frame rate the window and terminal drivers pace themselves to.
    pub fps: usize,
    pub log_file: PathBuf,
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: DisplayTarget::Window,
            viewport: Viewport::new(1280, 720),
            config: FieldConfig::default(),
            style: Style::default(),
            frames: 600,
            fps: 60,
            log_file: PathBuf::from("particle_field.log"),
            verbose: false,
        }
    }
}

pub fn create_clap_command() -> Command {
    Command::new("particle_field")
        .about("Animated particle field with proximity links")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Where log output goes (default: particle_field.log)")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about("Render the particle field in a window, the terminal, or off-screen")
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .value_name("MODE")
                        .help("Specify the mode ('window', 'terminal', 'headless', or 'w', 't', 'h')")
                        .value_parser(["window", "terminal", "headless", "w", "t", "h"]),
                )
                .arg(
                    Arg::new("width")
                        .short('W')
                        .long("width")
                        .value_name("PX")
                        .help("Initial viewport width (window and headless)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("height")
                        .short('H')
                        .long("height")
                        .value_name("PX")
                        .help("Initial viewport height (window and headless)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .value_name("N")
                        .help("Seed for the particle cloud; random when omitted")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("frames")
                        .short('n')
                        .long("frames")
                        .value_name("N")
                        .help("Frames to render in headless mode")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("fps")
                        .long("fps")
                        .value_name("N")
                        .help("Target frame rate")
                        .value_parser(clap::builder::RangedU64ValueParser::<usize>::new().range(1..=1000)),
                )
                .arg(
                    Arg::new("point-size")
                        .long("point-size")
                        .value_name("PX")
                        .help("Side of the square drawn per particle")
                        .value_parser(value_parser!(u32)),
                ),
        )
}

pub fn handle_clap_matches(matches: &clap::ArgMatches) -> RunOptions {
    let mut options = RunOptions::default();

    if let Some(path) = matches.get_one::<PathBuf>("log-file") {
        options.log_file = path.clone();
    }
    options.verbose = matches.get_flag("verbose");

    // Default behavior when no subcommand is provided: window with defaults
    let Some(("run", sub_matches)) = matches.subcommand() else {
        return options;
    };

    // global args are also visible on the subcommand
    if let Some(path) = sub_matches.get_one::<PathBuf>("log-file") {
        options.log_file = path.clone();
    }
    options.verbose |= sub_matches.get_flag("verbose");

    options.target = match sub_matches.get_one::<String>("mode").map(|s| s.as_str()) {
        Some("terminal") | Some("t") => DisplayTarget::Terminal,
        Some("headless") | Some("h") => DisplayTarget::Headless,
        _ => DisplayTarget::Window,
    };
    if let Some(&width) = sub_matches.get_one::<usize>("width") {
        options.viewport.width = width;
    }
    if let Some(&height) = sub_matches.get_one::<usize>("height") {
        options.viewport.height = height;
    }
    options.config.seed = sub_matches.get_one::<u64>("seed").copied();
    if let Some(&frames) = sub_matches.get_one::<u64>("frames") {
        options.frames = frames;
    }
    if let Some(&fps) = sub_matches.get_one::<usize>("fps") {
        options.fps = fps;
    }
    if let Some(&size) = sub_matches.get_one::<u32>("point-size") {
        options.style.point_size = size;
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunOptions {
        let matches = create_clap_command()
            .try_get_matches_from(args)
            .expect("valid arguments");
        handle_clap_matches(&matches)
    }

    #[test]
    fn no_subcommand_runs_the_window_with_defaults() {
        let options = parse(&["particle_field"]);
        assert_eq!(options.target, DisplayTarget::Window);
        assert_eq!(options.config, FieldConfig::default());
        assert_eq!(options.style, Style::default());
    }

    #[test]
    fn run_flags_override_defaults() {
        let options = parse(&[
            "particle_field",
            "run",
            "-m",
            "h",
            "-W",
            "320",
            "-H",
            "200",
            "--seed",
            "5",
            "--frames",
            "12",
            "--point-size",
            "3",
            "--verbose",
            "--log-file",
            "out.log",
        ]);
        assert_eq!(options.target, DisplayTarget::Headless);
        assert_eq!(options.viewport, Viewport::new(320, 200));
        assert_eq!(options.config.seed, Some(5));
        assert_eq!(options.frames, 12);
        assert_eq!(options.style.point_size, 3);
        assert!(options.verbose);
        assert_eq!(options.log_file, PathBuf::from("out.log"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(create_clap_command()
            .try_get_matches_from(["particle_field", "run", "--mode", "vr"])
            .is_err());
    }

    #[test]
    fn metrics_keep_a_bounded_window() {
        let mut metrics = Metrics::new();
        for _ in 0..(METRICS_WINDOW + 30) {
            metrics.update(Duration::from_millis(4));
        }
        assert_eq!(metrics.frame_times.len(), METRICS_WINDOW);
        assert!((metrics.average_ms() - 4.0).abs() < 1e-3);
    }
}

// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  plexrain --effect rain --intensity medium --tier auto --color green --glyphs matrix --connect-dist 14 --mouse-radius 12";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        format!("\x1b[1;36m{}\x1b[0m", DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "plexrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'e',
        long = "effect",
        default_value = "rain",
        help_heading = "GENERAL",
        help = "Effect (rain, net, drift, duo)"
    )]
    pub effect: String,

    #[arg(
        short = 'I',
        long = "intensity",
        default_value = "medium",
        help_heading = "APPEARANCE",
        help = "Visual intensity level (low, medium, high)"
    )]
    pub intensity: String,

    #[arg(
        long = "tier",
        default_value = "auto",
        help_heading = "PERFORMANCE",
        help = "Capability tier (auto, low, medium, high). Auto profiles the host"
    )]
    pub tier: String,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "glyphs",
        default_value = "matrix",
        help_heading = "APPEARANCE",
        help = "Glyph set for the rain (see --list-glyphs)"
    )]
    pub glyphs: String,

    #[arg(
        long = "transparent",
        help_heading = "APPEARANCE",
        help = "Keep the terminal's own background"
    )]
    pub transparent: bool,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,8,24). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'd',
        long = "density",
        help_heading = "PERFORMANCE",
        help = "Density override (min 0.05 max 5.0); default comes from intensity and tier"
    )]
    pub density: Option<f32>,

    #[arg(
        short = 'S',
        long = "speed",
        help_heading = "PERFORMANCE",
        help = "Speed override (min 0.05 max 10.0); default comes from intensity and tier"
    )]
    pub speed: Option<f32>,

    #[arg(
        short = 'f',
        long = "fps",
        help_heading = "PERFORMANCE",
        help = "Target FPS override (min 1 max 240); default comes from the tier"
    )]
    pub fps: Option<f64>,

    #[arg(
        short = 'p',
        long = "particles",
        help_heading = "PERFORMANCE",
        help = "Requested particle count (clamped to a safety ceiling)"
    )]
    pub particles: Option<usize>,

    #[arg(
        long = "connect-dist",
        default_value_t = 14.0,
        help_heading = "APPEARANCE",
        help = "Connection edge threshold in cells (min 1 max 200)"
    )]
    pub connect_dist: f32,

    #[arg(
        long = "mouse-radius",
        default_value_t = 12.0,
        help_heading = "INPUT",
        help = "Pointer attraction/highlight radius in cells (min 1 max 200)"
    )]
    pub mouse_radius: f32,

    #[arg(
        long = "no-mouse",
        help_heading = "INPUT",
        help = "Do not capture mouse events"
    )]
    pub no_mouse: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "RNG seed for reproducible runs"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "list-glyphs",
        help_heading = "HELP",
        help = "List available glyph sets and exit"
    )]
    pub list_glyphs: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR THEMES:\x1b[0m");
    } else {
        println!("AVAILABLE COLOR THEMES:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("green        Classic green rain");
    println!("cyan         Cold cyan");
    println!("violet       Violet haze");
    println!("amber        Amber phosphor");
    println!("crimson      Crimson");
    println!("ice          Ice blue");
    println!("aurora       Aurora green-to-violet");
    println!("mono         Grayscale");
}

pub fn print_list_glyphs() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE GLYPH SETS:\x1b[0m");
    } else {
        println!("AVAILABLE GLYPH SETS:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("matrix       Half-width katakana + digits (alias: katakana)");
    println!("ascii        Printable ASCII");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("code         Letters + digits + code punctuation");
}

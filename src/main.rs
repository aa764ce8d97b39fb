// Copyright (c) 2026 rezky_nightky

mod capability;
mod config;
mod frame;
mod glyphs;
mod input;
mod palette;
mod particles;
mod rain;
mod runtime;
mod scheduler;
mod settings;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::capability::{CapabilityTier, EnvCapability, Profiler};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, print_list_glyphs, Args,
};
use crate::frame::Frame;
use crate::glyphs::{build_glyphs, glyph_set_from_str};
use crate::input::{throttle_for_tier, InputTracker, PointerState};
use crate::palette::{build_palette, Palette};
use crate::particles::ParticleField;
use crate::rain::RainField;
use crate::runtime::{BoundaryPolicy, ColorMode, ColorScheme, EffectMode, Intensity};
use crate::scheduler::{sim_delta_cap, FrameClock, PressureGauge};
use crate::settings::{resolve, EffectSettings};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const DEFAULT_SEED: u64 = 0x1234567;

fn build_info() -> &'static str {
    env!("PLEXRAIN_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            8 => ColorMode::Color256,
            24 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,8,24)", m);
                std::process::exit(1);
            }
        };
    }
    detect_color_mode_auto()
}

fn parse_color_scheme(s: &str) -> Result<ColorScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" => Ok(ColorScheme::Green),
        "cyan" => Ok(ColorScheme::Cyan),
        "violet" | "purple" => Ok(ColorScheme::Violet),
        "amber" | "gold" => Ok(ColorScheme::Amber),
        "crimson" | "red" => Ok(ColorScheme::Crimson),
        "ice" => Ok(ColorScheme::Ice),
        "aurora" => Ok(ColorScheme::Aurora),
        "mono" | "gray" | "grey" => Ok(ColorScheme::Mono),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

fn parse_intensity(s: &str) -> Result<Intensity, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Intensity::Low),
        "medium" | "med" => Ok(Intensity::Medium),
        "high" => Ok(Intensity::High),
        _ => Err(format!("invalid intensity: {} (low, medium, high)", s)),
    }
}

fn parse_effect_mode(s: &str) -> Result<EffectMode, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "rain" | "matrix" => Ok(EffectMode::Rain),
        "net" | "network" | "plexus" => Ok(EffectMode::Net),
        "drift" => Ok(EffectMode::Drift),
        "duo" | "both" => Ok(EffectMode::Duo),
        _ => Err(format!("invalid effect: {} (rain, net, drift, duo)", s)),
    }
}

fn parse_tier_choice(s: &str) -> Result<Option<Intensity>, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(None),
        "low" => Ok(Some(Intensity::Low)),
        "medium" | "med" => Ok(Some(Intensity::Medium)),
        "high" => Ok(Some(Intensity::High)),
        _ => Err(format!("invalid tier: {} (auto, low, medium, high)", s)),
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Overrides {
    density: Option<f32>,
    speed: Option<f32>,
    fps: Option<f64>,
}

fn resolved_settings(level: Intensity, tier: &CapabilityTier, ov: &Overrides) -> EffectSettings {
    let mut s = resolve(level, tier);
    if let Some(d) = ov.density {
        s.density = d;
    }
    if let Some(v) = ov.speed {
        s.speed = v;
    }
    if let Some(f) = ov.fps {
        s.target_fps = f;
    }
    s
}

struct Stage {
    mode: EffectMode,
    rain: Option<RainField>,
    net: Option<ParticleField>,
}

impl Stage {
    #[allow(clippy::too_many_arguments)]
    fn build(
        mode: EffectMode,
        settings: EffectSettings,
        glyph_pool: &[char],
        connect_dist: f32,
        mouse_radius: f32,
        particle_hint: Option<usize>,
        cols: u16,
        rows: u16,
        seed: u64,
    ) -> Self {
        let rain = mode.wants_rain().then(|| {
            RainField::new(
                settings,
                glyph_pool.to_vec(),
                mouse_radius,
                cols,
                rows,
                seed,
            )
        });
        let net = mode.wants_particles().then(|| {
            let policy = if mode == EffectMode::Drift {
                BoundaryPolicy::Wrap
            } else {
                BoundaryPolicy::Reflect
            };
            ParticleField::new(
                policy,
                settings,
                connect_dist,
                mouse_radius,
                particle_hint,
                cols,
                rows,
                seed ^ 0x9E37_79B9,
            )
        });
        Self { mode, rain, net }
    }

    fn tick(&mut self, dt: f32, pointer: &PointerState) {
        if let Some(rain) = &mut self.rain {
            rain.tick(dt, pointer);
        }
        if let Some(net) = &mut self.net {
            // The drift layer is decorative; it never reacts to the pointer.
            let p = if self.mode == EffectMode::Drift {
                PointerState::outside()
            } else {
                *pointer
            };
            net.step(dt, &p);
        }
    }

    fn draw(&self, frame: &mut Frame, palette: &Palette, pointer: &PointerState) {
        if let Some(rain) = &self.rain {
            rain.draw(frame, palette, pointer);
        }
        if let Some(net) = &self.net {
            net.draw(frame, palette, pointer);
        }
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.list_glyphs {
        print_list_glyphs();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);

    let level = match parse_intensity(&args.intensity) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut mode = match parse_effect_mode(&args.effect) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let tier_choice = match parse_tier_choice(&args.tier) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut scheme = match parse_color_scheme(&args.color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let glyph_set = match glyph_set_from_str(&args.glyphs) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let glyph_pool = build_glyphs(glyph_set);

    let connect_dist = require_f32_range("--connect-dist", args.connect_dist, 1.0, 200.0);
    let mouse_radius = require_f32_range("--mouse-radius", args.mouse_radius, 1.0, 200.0);

    let mut overrides = Overrides {
        density: args.density.map(|d| require_f32_range("--density", d, 0.05, 5.0)),
        speed: args.speed.map(|s| require_f32_range("--speed", s, 0.05, 10.0)),
        fps: args.fps.map(|f| require_f64_range("--fps", f, 1.0, 240.0)),
    };

    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });

    let mut seed = args.seed.unwrap_or(DEFAULT_SEED);

    let mut term = Terminal::new(!args.no_mouse)?;
    let (w, h) = term.size()?;

    let mut profiler = Profiler::new(Box::new(EnvCapability), w, h);
    let mut tier = match tier_choice {
        Some(forced) => CapabilityTier::forced(forced, w, h),
        None => *profiler.tier(),
    };

    let mut eff_settings = resolved_settings(level, &tier, &overrides);
    let mut palette = build_palette(scheme, color_mode, args.transparent);
    let mut frame = Frame::new(w, h, palette.bg);
    frame.fill(palette.bg);

    let mut stage = Stage::build(
        mode,
        eff_settings,
        &glyph_pool,
        connect_dist,
        mouse_radius,
        args.particles,
        w,
        h,
        seed,
    );

    let mut tracker = InputTracker::new(throttle_for_tier(&tier));

    let start_time = Instant::now();
    let end_time = duration_s.and_then(|s| {
        if s <= 0.0 {
            return None;
        }
        Some(start_time + Duration::from_secs_f64(s))
    });

    let mut clock = FrameClock::new(eff_settings.target_fps, Instant::now());
    let mut gauge = PressureGauge::new();
    let mut last_tick = Instant::now();
    let mut paused = false;
    let mut resize_pending = false;

    let mut perf_frames: u64 = 0;
    let mut perf_drawn_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;
    let mut perf_pressure_sum: f64 = 0.0;
    let mut perf_pressure_max: f32 = 0.0;

    while !clock.is_cancelled() {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            clock.cancel();
            break;
        }

        let mut rebuild_stage = false;
        let mut refill_frame = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let now = Instant::now();
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        frame.resize(nw, nh);
                        profiler.note_resize(now, nw, nh);
                        resize_pending = true;
                    }
                    Event::Mouse(m) => {
                        tracker.track_mouse(&m, now);
                    }
                    Event::FocusLost => tracker.mark_outside(),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            clock.cancel();
                            break;
                        }
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => clock.cancel(),
                            KeyCode::Char(' ') => {
                                seed = seed.wrapping_add(1);
                                rebuild_stage = true;
                                refill_frame = true;
                            }
                            KeyCode::Char('p') => {
                                paused = !paused;
                                last_tick = now;
                            }
                            KeyCode::Tab => {
                                mode = match mode {
                                    EffectMode::Rain => EffectMode::Net,
                                    EffectMode::Net => EffectMode::Drift,
                                    EffectMode::Drift => EffectMode::Duo,
                                    EffectMode::Duo => EffectMode::Rain,
                                };
                                rebuild_stage = true;
                                refill_frame = true;
                            }
                            KeyCode::Up => {
                                overrides.speed =
                                    Some((eff_settings.speed * 1.25).clamp(0.05, 10.0));
                                rebuild_stage = true;
                            }
                            KeyCode::Down => {
                                overrides.speed =
                                    Some((eff_settings.speed / 1.25).clamp(0.05, 10.0));
                                rebuild_stage = true;
                            }
                            KeyCode::Char('+') | KeyCode::Char('=') => {
                                overrides.density =
                                    Some((eff_settings.density + 0.25).clamp(0.05, 5.0));
                                rebuild_stage = true;
                            }
                            KeyCode::Char('-') => {
                                overrides.density =
                                    Some((eff_settings.density - 0.25).clamp(0.05, 5.0));
                                rebuild_stage = true;
                            }
                            KeyCode::Char('1') => {
                                scheme = ColorScheme::Green;
                                refill_frame = true;
                            }
                            KeyCode::Char('2') => {
                                scheme = ColorScheme::Cyan;
                                refill_frame = true;
                            }
                            KeyCode::Char('3') => {
                                scheme = ColorScheme::Violet;
                                refill_frame = true;
                            }
                            KeyCode::Char('4') => {
                                scheme = ColorScheme::Amber;
                                refill_frame = true;
                            }
                            KeyCode::Char('5') => {
                                scheme = ColorScheme::Crimson;
                                refill_frame = true;
                            }
                            KeyCode::Char('6') => {
                                scheme = ColorScheme::Ice;
                                refill_frame = true;
                            }
                            KeyCode::Char('7') => {
                                scheme = ColorScheme::Aurora;
                                refill_frame = true;
                            }
                            KeyCode::Char('0') => {
                                scheme = ColorScheme::Mono;
                                refill_frame = true;
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if clock.is_cancelled() || rebuild_stage || refill_frame {
                break;
            }

            let now = Instant::now();
            if let Some(fresh) = profiler.poll(now) {
                if tier_choice.is_none() {
                    tier = fresh;
                }
                rebuild_stage = true;
                refill_frame = true;
                resize_pending = false;
                break;
            }

            if clock.due(now) {
                break;
            }

            let mut timeout = clock.timeout(now);
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if clock.is_cancelled() {
            break;
        }

        if rebuild_stage || refill_frame {
            let now = Instant::now();
            eff_settings = resolved_settings(level, &tier, &overrides);
            clock.set_target_fps(eff_settings.target_fps, now);
            tracker.set_throttle(throttle_for_tier(&tier));
            palette = build_palette(scheme, color_mode, args.transparent);
            if rebuild_stage {
                stage = Stage::build(
                    mode,
                    eff_settings,
                    &glyph_pool,
                    connect_dist,
                    mouse_radius,
                    args.particles,
                    frame.width,
                    frame.height,
                    seed,
                );
            }
            frame.fill(palette.bg);
            last_tick = now;
        }

        // While a resize is settling, the grid is not yet ready; skip
        // simulation until the debounced profile lands.
        if resize_pending || frame.width == 0 || frame.height == 0 {
            continue;
        }

        let work_start = Instant::now();
        if paused {
            last_tick = work_start;
        } else {
            let elapsed = work_start.saturating_duration_since(last_tick);
            let capped = elapsed.min(sim_delta_cap(clock.period(), gauge.value()));
            last_tick = work_start;

            let pointer = tracker.pointer();
            stage.tick(capped.as_secs_f32(), &pointer);
            stage.draw(&mut frame, &palette, &pointer);
        }

        let did_draw = frame.has_changes();
        if did_draw {
            term.present(&mut frame)?;
        }
        let work = work_start.elapsed();
        gauge.record(work, clock.period());

        if args.perf_stats {
            perf_frames = perf_frames.saturating_add(1);
            if did_draw {
                perf_drawn_frames = perf_drawn_frames.saturating_add(1);
            }
            perf_work_sum_s += work.as_secs_f64();
            perf_work_max_s = perf_work_max_s.max(work.as_secs_f32());
            perf_pressure_sum += gauge.value() as f64;
            perf_pressure_max = perf_pressure_max.max(gauge.value());
        }
    }

    if args.perf_stats {
        drop(term);
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", eff_settings.target_fps);
        println!("  avg_fps: {:.3}", perf_frames as f64 / elapsed_s);
        println!("  frames: {}", perf_frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            perf_drawn_frames,
            perf_drawn_frames as f64 / frames as f64 * 100.0
        );
        println!(
            "  avg_work_ms: {:.3}",
            perf_work_sum_s / frames as f64 * 1000.0
        );
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
        println!(
            "  avg_perf_pressure: {:.3}",
            perf_pressure_sum / frames as f64
        );
        println!("  max_perf_pressure: {:.3}", perf_pressure_max);
    }

    Ok(())
}

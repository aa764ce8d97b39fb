// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, ColorScheme};

/// A ramp from dimmest trail color to brightest head color, pre-quantized
/// for the active color mode.
#[derive(Clone, Debug)]
pub struct Palette {
    pub colors: Vec<Color>,
    pub bg: Option<Color>,
}

impl Palette {
    /// Map a 0..1 brightness value onto the ramp.
    pub fn color_at(&self, t: f32) -> Option<Color> {
        if self.colors.is_empty() {
            return None;
        }
        let last = self.colors.len() - 1;
        let idx = (t.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.colors.get(idx).copied()
    }

    pub fn head(&self) -> Option<Color> {
        self.colors.last().copied()
    }
}

const RAMP_STEPS: usize = 8;

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn gradient_from_stops(stops: &[(u8, u8, u8)], steps: usize) -> Vec<(u8, u8, u8)> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segs = stops.len() - 1;
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        let pos = (i as f32) / ((steps - 1) as f32) * (segs as f32);
        let seg = (pos.floor() as usize).min(segs - 1);
        let t = pos - seg as f32;
        let (r0, g0, b0) = stops[seg];
        let (r1, g1, b1) = stops[seg + 1];
        out.push((lerp_u8(r0, r1, t), lerp_u8(g0, g1, t), lerp_u8(b0, b1, t)));
    }
    out
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn ansi256_cube_level(v: u8) -> (u8, u8) {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let idx = (((v as u16) * 5 + 127) / 255) as u8;
    (idx, LEVELS[idx as usize])
}

fn rgb_to_ansi256(rgb: (u8, u8, u8)) -> u8 {
    let (ri, rv) = ansi256_cube_level(rgb.0);
    let (gi, gv) = ansi256_cube_level(rgb.1);
    let (bi, bv) = ansi256_cube_level(rgb.2);
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;
    let cube_d = dist2(rgb, (rv, gv, bv));

    let mut gray_idx = 16u8;
    let mut gray_d = dist2(rgb, (0, 0, 0));
    for g in 0..24u8 {
        let v = 8 + 10 * g;
        let d = dist2(rgb, (v, v, v));
        if d < gray_d {
            gray_d = d;
            gray_idx = 232 + g;
        }
    }
    let white_d = dist2(rgb, (255, 255, 255));
    if white_d < gray_d {
        gray_d = white_d;
        gray_idx = 231;
    }

    if gray_d < cube_d {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(rgb: (u8, u8, u8)) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, ref_rgb) in TABLE {
        let d = dist2(rgb, ref_rgb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn quantize(mode: ColorMode, rgb: &[(u8, u8, u8)]) -> Vec<Color> {
    match mode {
        ColorMode::Mono => vec![Color::White],
        ColorMode::TrueColor => rgb
            .iter()
            .map(|&(r, g, b)| Color::Rgb { r, g, b })
            .collect(),
        ColorMode::Color256 => rgb
            .iter()
            .map(|&c| Color::AnsiValue(rgb_to_ansi256(c)))
            .collect(),
        ColorMode::Color16 => rgb.iter().map(|&c| rgb_to_color16(c)).collect(),
    }
}

fn scheme_stops(scheme: ColorScheme) -> &'static [(u8, u8, u8)] {
    match scheme {
        ColorScheme::Green => &[(8, 28, 12), (20, 88, 32), (48, 180, 72), (180, 255, 200)],
        ColorScheme::Cyan => &[(6, 26, 32), (16, 92, 110), (40, 190, 214), (200, 250, 255)],
        ColorScheme::Violet => &[(22, 10, 36), (78, 38, 130), (150, 92, 224), (232, 214, 255)],
        ColorScheme::Amber => &[(38, 22, 4), (128, 78, 12), (230, 160, 32), (255, 236, 190)],
        ColorScheme::Crimson => &[(32, 6, 10), (110, 18, 30), (210, 44, 62), (255, 204, 212)],
        ColorScheme::Ice => &[(14, 20, 34), (52, 84, 130), (130, 176, 220), (235, 245, 255)],
        ColorScheme::Aurora => &[(10, 24, 30), (22, 120, 96), (96, 200, 120), (214, 160, 255)],
        ColorScheme::Mono => &[(40, 40, 40), (120, 120, 120), (200, 200, 200), (255, 255, 255)],
    }
}

pub fn build_palette(scheme: ColorScheme, mode: ColorMode, transparent_bg: bool) -> Palette {
    let bg = if transparent_bg {
        None
    } else {
        Some(match mode {
            ColorMode::Color16 => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            _ => Color::AnsiValue(16),
        })
    };

    let rgb = gradient_from_stops(scheme_stops(scheme), RAMP_STEPS);
    Palette {
        colors: quantize(mode, &rgb),
        bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_has_expected_length_and_endpoints() {
        let p = build_palette(ColorScheme::Green, ColorMode::TrueColor, false);
        assert_eq!(p.colors.len(), RAMP_STEPS);
        assert_eq!(p.color_at(0.0), p.colors.first().copied());
        assert_eq!(p.color_at(1.0), p.head());
        assert_eq!(p.color_at(2.0), p.head());
    }

    #[test]
    fn mono_mode_collapses_to_white() {
        let p = build_palette(ColorScheme::Violet, ColorMode::Mono, true);
        assert_eq!(p.colors, vec![Color::White]);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn ansi256_maps_primaries_into_cube() {
        let idx = rgb_to_ansi256((255, 0, 0));
        assert_eq!(idx, 16 + 36 * 5);
        let gray = rgb_to_ansi256((128, 128, 128));
        assert!((232..=255).contains(&gray));
    }
}

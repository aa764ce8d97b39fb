// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::frame::{Cell, Frame};
use crate::glyphs::{EASTER_EGGS, SNIPPETS};
use crate::input::PointerState;
use crate::palette::Palette;
use crate::settings::EffectSettings;

/// Heat below this renders as background and is dropped from the trail.
const HEAT_FLOOR: f32 = 0.05;

/// Per-frame chance a column re-rolls its glyph, and, within a re-roll,
/// the chance it streams a code snippet instead of a single character.
const REROLL_CHANCE: f32 = 0.07;
const SNIPPET_CHANCE: f32 = 0.15;
/// Rare token substitution. Cosmetic; drawn exactly like a snippet.
const EASTER_CHANCE: f32 = 0.001;

/// Once a drop has run past the bottom edge it parks there; each frame
/// this gate decides whether it restarts, so columns desynchronize
/// instead of resetting in a curtain.
const RESET_GATE: f32 = 0.04;
const PARK_MARGIN: f32 = 2.0;

/// Per-column fall speed band in cells/sec, before the speed knob.
const SPEED_LOW: f32 = 4.0;
const SPEED_HIGH: f32 = 14.0;

const POINTER_SPEED_BOOST: f32 = 1.6;
const POINTER_BRIGHT_BOOST: f32 = 0.25;

#[derive(Clone, Debug)]
pub struct RainColumn {
    pub active: bool,
    pub drop_y: f32,
    pub fall_speed: f32,
    pub glyph: char,
    snippet: Option<&'static str>,
    snippet_pos: usize,
}

pub struct RainField {
    cols: u16,
    rows: u16,
    settings: EffectSettings,
    mouse_radius: f32,
    columns: Vec<RainColumn>,
    heat: Vec<f32>,
    glyph_grid: Vec<char>,
    glyphs: Vec<char>,
    rng: StdRng,
    rand_unit: Uniform<f32>,
}

impl RainField {
    pub fn new(
        settings: EffectSettings,
        glyphs: Vec<char>,
        mouse_radius: f32,
        cols: u16,
        rows: u16,
        seed: u64,
    ) -> Self {
        let mut glyphs = glyphs;
        if glyphs.is_empty() {
            glyphs.push('0');
            glyphs.push('1');
        }
        let mut field = Self {
            cols,
            rows,
            settings,
            mouse_radius: mouse_radius.max(1.0),
            columns: Vec::new(),
            heat: Vec::new(),
            glyph_grid: Vec::new(),
            glyphs,
            rng: StdRng::seed_from_u64(seed),
            rand_unit: Uniform::new(0.0f32, 1.0).expect("valid range"),
        };
        field.populate();
        field
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    fn random_glyph(&mut self) -> char {
        let idx = Uniform::new(0usize, self.glyphs.len())
            .expect("valid range")
            .sample(&mut self.rng);
        self.glyphs[idx]
    }

    fn random_speed(&mut self) -> f32 {
        let band = Uniform::new_inclusive(SPEED_LOW, SPEED_HIGH).expect("valid range");
        band.sample(&mut self.rng) * self.settings.speed.max(0.05)
    }

    fn populate(&mut self) {
        let len = self.cols as usize * self.rows as usize;
        self.heat.clear();
        self.heat.resize(len, 0.0);
        self.glyph_grid.clear();
        self.glyph_grid.resize(len, ' ');
        self.columns.clear();

        if self.cols == 0 || self.rows == 0 {
            return;
        }

        let rows_f = self.rows as f32;
        let active_fraction = self.settings.density.clamp(0.0, 1.0);
        for _ in 0..self.cols {
            let active = self.rand_unit.sample(&mut self.rng) < active_fraction;
            let start = -(self.rand_unit.sample(&mut self.rng) * rows_f);
            let fall_speed = self.random_speed();
            let glyph = self.random_glyph();
            self.columns.push(RainColumn {
                active,
                drop_y: start,
                fall_speed,
                glyph,
                snippet: None,
                snippet_pos: 0,
            });
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.cols as usize + x as usize
    }

    /// Advance every column by `dt` seconds and decay the trails.
    pub fn tick(&mut self, dt: f32, pointer: &PointerState) {
        if dt <= 0.0 || self.cols == 0 || self.rows == 0 {
            return;
        }

        let keep = 1.0 - self.settings.trail_fade;
        for h in &mut self.heat {
            if *h > 0.0 {
                *h *= keep;
                if *h < HEAT_FLOOR {
                    *h = 0.0;
                }
            }
        }

        let rows_f = self.rows as f32;
        let park_limit = rows_f + PARK_MARGIN;

        for c in 0..self.columns.len() {
            if !self.columns[c].active {
                continue;
            }

            if self.rand_unit.sample(&mut self.rng) < EASTER_CHANCE {
                let pick = Uniform::new(0usize, EASTER_EGGS.len())
                    .expect("valid range")
                    .sample(&mut self.rng);
                self.columns[c].snippet = Some(EASTER_EGGS[pick]);
                self.columns[c].snippet_pos = 0;
            } else if self.rand_unit.sample(&mut self.rng) < REROLL_CHANCE {
                if self.rand_unit.sample(&mut self.rng) < SNIPPET_CHANCE {
                    let pick = Uniform::new(0usize, SNIPPETS.len())
                        .expect("valid range")
                        .sample(&mut self.rng);
                    self.columns[c].snippet = Some(SNIPPETS[pick]);
                    self.columns[c].snippet_pos = 0;
                } else {
                    self.columns[c].snippet = None;
                    self.columns[c].glyph = self.random_glyph();
                }
            }

            let mut speed = self.columns[c].fall_speed;
            if pointer.inside && (pointer.x - c as f32).abs() < self.mouse_radius {
                speed *= POINTER_SPEED_BOOST;
            }

            let prev = self.columns[c].drop_y;
            let next = (prev + speed * dt).min(park_limit);
            self.columns[c].drop_y = next;

            // Stamp heat into every cell the head crossed this frame.
            let from = prev.ceil().max(0.0) as i32;
            let to = next.floor().min(rows_f - 1.0) as i32;
            for y in from..=to {
                if y < 0 {
                    continue;
                }
                let snippet = self.columns[c].snippet;
                let ch = match snippet {
                    Some(s) => {
                        let bytes = s.as_bytes();
                        let b = bytes[self.columns[c].snippet_pos % bytes.len()];
                        self.columns[c].snippet_pos += 1;
                        b as char
                    }
                    None => self.columns[c].glyph,
                };
                let idx = self.index(c as u16, y as u16);
                self.heat[idx] = 1.0;
                self.glyph_grid[idx] = ch;
            }

            if next >= rows_f && self.rand_unit.sample(&mut self.rng) < RESET_GATE {
                let start = -(self.rand_unit.sample(&mut self.rng) * rows_f * 0.5);
                self.columns[c].drop_y = start;
                self.columns[c].fall_speed = self.random_speed();
                self.columns[c].snippet = None;
                self.columns[c].glyph = self.random_glyph();
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette, pointer: &PointerState) {
        if self.cols == 0 || self.rows == 0 {
            return;
        }
        let bg = palette.bg;
        let bold_heads = self.settings.glow >= 3.0;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let idx = self.index(x, y);
                let h = self.heat[idx];
                if h <= 0.0 {
                    frame.clear_cell(x, y);
                    continue;
                }

                let is_head = h >= 0.995;
                let mut t = h * self.settings.opacity;
                if pointer.inside {
                    let dx = pointer.x - x as f32;
                    let dy = pointer.y - y as f32;
                    if (dx * dx + dy * dy).sqrt() < self.mouse_radius {
                        t += POINTER_BRIGHT_BOOST;
                    }
                }

                let fg = if is_head {
                    palette.head()
                } else {
                    palette.color_at(t.clamp(0.0, 1.0))
                };
                let Some(fg) = fg else {
                    continue;
                };

                frame.set(
                    x,
                    y,
                    Cell {
                        ch: self.glyph_grid[idx],
                        fg: Some(fg),
                        bg,
                        bold: is_head && bold_heads,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTier;
    use crate::glyphs::{build_glyphs, GlyphSet};
    use crate::runtime::Intensity;
    use crate::settings::resolve;

    fn settings() -> EffectSettings {
        resolve(
            Intensity::High,
            &CapabilityTier::forced(Intensity::High, 200, 60),
        )
    }

    fn field(cols: u16, rows: u16, seed: u64) -> RainField {
        RainField::new(
            settings(),
            build_glyphs(GlyphSet::Binary),
            8.0,
            cols,
            rows,
            seed,
        )
    }

    #[test]
    fn drops_park_then_reset_to_nonpositive_offsets() {
        let mut f = field(20, 10, 42);
        let rows_f = 10.0f32;
        let pointer = PointerState::outside();

        let mut parked = vec![false; 20];
        let mut reset = vec![false; 20];

        for _ in 0..4000 {
            f.tick(0.1, &pointer);
            for (i, c) in f.columns().iter().enumerate() {
                assert!(
                    c.drop_y <= rows_f + PARK_MARGIN,
                    "drop grew past the park limit: {}",
                    c.drop_y
                );
                if c.drop_y >= rows_f {
                    parked[i] = true;
                }
                if parked[i] && c.drop_y <= 0.0 {
                    reset[i] = true;
                }
            }
        }

        for (i, c) in f.columns().iter().enumerate() {
            if c.active {
                assert!(parked[i], "column {} never reached the bottom", i);
                assert!(reset[i], "column {} never reset after parking", i);
            }
        }
    }

    #[test]
    fn trails_decay_when_no_head_rewrites_them() {
        let mut s = settings();
        s.density = 0.0;
        let mut f = RainField::new(s, build_glyphs(GlyphSet::Binary), 8.0, 10, 10, 1);

        let idx = f.index(3, 3);
        f.heat[idx] = 1.0;
        f.tick(0.1, &PointerState::outside());
        let once = f.heat[idx];
        assert!(once < 1.0 && once > 0.0);

        for _ in 0..200 {
            f.tick(0.1, &PointerState::outside());
        }
        assert_eq!(f.heat[idx], 0.0);
    }

    #[test]
    fn snippets_eventually_stream_ascii() {
        let mut f = field(30, 12, 9);
        let pointer = PointerState::outside();
        let mut saw_snippet = false;

        for _ in 0..2000 {
            f.tick(0.05, &pointer);
            if f.columns().iter().any(|c| c.snippet.is_some()) {
                saw_snippet = true;
                break;
            }
        }
        assert!(saw_snippet, "no snippet column after 2000 frames");

        for ch in &f.glyph_grid {
            assert!(*ch == ' ' || ch.is_ascii() || f.glyphs.contains(ch));
        }
    }

    #[test]
    fn pointer_proximity_speeds_up_the_local_column() {
        let mut plain = field(30, 40, 5);
        let mut boosted = field(30, 40, 5);

        let outside = PointerState::outside();
        let over_col3 = PointerState {
            x: 3.0,
            y: 5.0,
            inside: true,
        };

        plain.tick(0.1, &outside);
        boosted.tick(0.1, &over_col3);

        assert!(boosted.columns()[3].drop_y > plain.columns()[3].drop_y);
        // Columns outside the radius are untouched by the boost.
        assert_eq!(plain.columns()[29].drop_y, boosted.columns()[29].drop_y);
    }

    #[test]
    fn zero_sized_viewport_is_a_no_op() {
        let mut f = field(0, 0, 3);
        f.tick(0.1, &PointerState::outside());
        assert!(f.columns().is_empty());

        let mut frame = Frame::new(0, 0, None);
        let palette = crate::palette::build_palette(
            crate::runtime::ColorScheme::Green,
            crate::runtime::ColorMode::TrueColor,
            false,
        );
        f.draw(&mut frame, &palette, &PointerState::outside());
    }
}

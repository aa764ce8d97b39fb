// Copyright (c) 2026 rezky_nightky

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::frame::{Cell, Frame};
use crate::input::PointerState;
use crate::palette::Palette;
use crate::runtime::BoundaryPolicy;
use crate::settings::EffectSettings;

/// Hard ceiling on the pool, whatever the density or hint asks for.
/// The connection pass is O(n²) over this pool.
pub const MAX_PARTICLES: usize = 360;
const MIN_PARTICLES: usize = 4;

/// Viewport cells per particle at density 1.0.
const AREA_PER_PARTICLE: f32 = 110.0;

const FRICTION: f32 = 0.985;
const MAX_SPEED: f32 = 28.0;
const BASE_DRIFT_SPEED: f32 = 6.0;
const ATTRACT_GAIN: f32 = 36.0;
const NUDGE_CAP: f32 = 3.0;

const EDGE_GLYPH: char = '\u{00B7}';

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub alpha: f32,
}

/// One connection between two particles inside the threshold. Pairs are
/// unordered (a < b), so symmetry holds by construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

pub struct ParticleField {
    width: f32,
    height: f32,
    boundary: BoundaryPolicy,
    settings: EffectSettings,
    connect_dist: f32,
    mouse_radius: f32,
    count_hint: Option<usize>,
    particles: Vec<Particle>,
    edges: Vec<Edge>,
    rng: StdRng,
}

impl ParticleField {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        boundary: BoundaryPolicy,
        settings: EffectSettings,
        connect_dist: f32,
        mouse_radius: f32,
        count_hint: Option<usize>,
        cols: u16,
        rows: u16,
        seed: u64,
    ) -> Self {
        let mut field = Self {
            width: cols as f32,
            height: rows as f32,
            boundary,
            settings,
            connect_dist: connect_dist.max(1.0),
            mouse_radius: mouse_radius.max(1.0),
            count_hint,
            particles: Vec::new(),
            edges: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        field.populate();
        field
    }

    #[allow(dead_code)]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[allow(dead_code)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[allow(dead_code)]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn target_count(&self) -> usize {
        let area = self.width * self.height;
        if area <= 0.0 {
            return 0;
        }
        let from_density = (self.settings.density * area / AREA_PER_PARTICLE).round() as usize;
        self.count_hint
            .unwrap_or(from_density)
            .clamp(MIN_PARTICLES, MAX_PARTICLES)
    }

    fn populate(&mut self) {
        self.particles.clear();
        self.edges.clear();
        if self.width < 1.0 || self.height < 1.0 {
            return;
        }

        let count = self.target_count();
        let rand_x = Uniform::new(0.0f32, self.width).expect("valid range");
        let rand_y = Uniform::new(0.0f32, self.height).expect("valid range");
        let speed_band = BASE_DRIFT_SPEED * self.settings.speed;
        let rand_vel = Uniform::new_inclusive(-speed_band, speed_band).expect("valid range");
        let rand_radius = Uniform::new(0.5f32, 2.0).expect("valid range");
        let rand_alpha = Uniform::new(0.25f32, 0.9).expect("valid range");

        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle {
                x: rand_x.sample(&mut self.rng),
                y: rand_y.sample(&mut self.rng),
                vx: rand_vel.sample(&mut self.rng),
                vy: rand_vel.sample(&mut self.rng),
                radius: rand_radius.sample(&mut self.rng),
                alpha: rand_alpha.sample(&mut self.rng),
            });
        }
    }

    /// Advance the pool by `dt` seconds and rebuild the connection set.
    pub fn step(&mut self, dt: f32, pointer: &PointerState) {
        if dt <= 0.0 || self.width < 1.0 || self.height < 1.0 {
            return;
        }

        for p in &mut self.particles {
            if pointer.inside {
                let dx = pointer.x - p.x;
                let dy = pointer.y - p.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 1e-3 && dist < self.mouse_radius {
                    let pull = (self.mouse_radius - dist) / self.mouse_radius;
                    let mut dvx = dx / dist * ATTRACT_GAIN * pull * dt;
                    let mut dvy = dy / dist * ATTRACT_GAIN * pull * dt;
                    let mag = (dvx * dvx + dvy * dvy).sqrt();
                    if mag > NUDGE_CAP {
                        let scale = NUDGE_CAP / mag;
                        dvx *= scale;
                        dvy *= scale;
                    }
                    p.vx += dvx;
                    p.vy += dvy;
                }
            }

            // Damping first, then a hard cap: attraction can never
            // accumulate past MAX_SPEED no matter how long the session.
            p.vx *= FRICTION;
            p.vy *= FRICTION;
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            if speed > MAX_SPEED {
                let scale = MAX_SPEED / speed;
                p.vx *= scale;
                p.vy *= scale;
            }

            p.x += p.vx * dt;
            p.y += p.vy * dt;

            match self.boundary {
                BoundaryPolicy::Reflect => {
                    if p.x < 0.0 {
                        p.x = 0.0;
                        p.vx = p.vx.abs();
                    } else if p.x > self.width - 1.0 {
                        p.x = self.width - 1.0;
                        p.vx = -p.vx.abs();
                    }
                    if p.y < 0.0 {
                        p.y = 0.0;
                        p.vy = p.vy.abs();
                    } else if p.y > self.height - 1.0 {
                        p.y = self.height - 1.0;
                        p.vy = -p.vy.abs();
                    }
                }
                BoundaryPolicy::Wrap => {
                    p.x = p.x.rem_euclid(self.width);
                    p.y = p.y.rem_euclid(self.height);
                }
            }
        }

        self.recompute_edges();
    }

    fn recompute_edges(&mut self) {
        self.edges.clear();
        let base = self.settings.opacity;
        let threshold = self.connect_dist;
        let t2 = threshold * threshold;

        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let dx = self.particles[i].x - self.particles[j].x;
                let dy = self.particles[i].y - self.particles[j].y;
                let d2 = dx * dx + dy * dy;
                if d2 >= t2 {
                    continue;
                }
                let dist = d2.sqrt();
                self.edges.push(Edge {
                    a: i,
                    b: j,
                    alpha: (1.0 - dist / threshold) * base,
                });
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, palette: &Palette, pointer: &PointerState) {
        let bg = palette.bg;

        for e in &self.edges {
            let a = &self.particles[e.a];
            let b = &self.particles[e.b];
            let Some(fg) = palette.color_at(e.alpha * 0.8) else {
                continue;
            };
            draw_line(frame, a.x, a.y, b.x, b.y, EDGE_GLYPH, fg, bg);
        }

        let halo = self.settings.glow >= 3.0;
        for p in &self.particles {
            let x = p.x.round();
            let y = p.y.round();
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (cx, cy) = (x as u16, y as u16);

            let mut t = p.alpha * self.settings.opacity.max(0.35) * 1.6;
            if pointer.inside {
                let dx = pointer.x - p.x;
                let dy = pointer.y - p.y;
                if (dx * dx + dy * dy).sqrt() < self.mouse_radius {
                    t += 0.25;
                }
            }
            let t = t.clamp(0.0, 1.0);
            let Some(fg) = palette.color_at(t) else {
                continue;
            };

            let ch = if p.radius < 0.9 {
                '\u{00B7}'
            } else if p.radius < 1.5 {
                '\u{2022}'
            } else {
                '\u{25CF}'
            };
            frame.set(
                cx,
                cy,
                Cell {
                    ch,
                    fg: Some(fg),
                    bg,
                    bold: t > 0.8,
                },
            );

            if halo && p.radius >= 1.5 {
                if let Some(dim) = palette.color_at(t * 0.3) {
                    for (nx, ny) in [
                        (cx.wrapping_sub(1), cy),
                        (cx + 1, cy),
                        (cx, cy.wrapping_sub(1)),
                        (cx, cy + 1),
                    ] {
                        if let Some(cell) = frame.get(nx, ny) {
                            if cell.ch == ' ' {
                                frame.set(
                                    nx,
                                    ny,
                                    Cell {
                                        ch: EDGE_GLYPH,
                                        fg: Some(dim),
                                        bg,
                                        bold: false,
                                    },
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

fn draw_line(
    frame: &mut Frame,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    ch: char,
    fg: crossterm::style::Color,
    bg: Option<crossterm::style::Color>,
) {
    let mut x = x0.round() as i32;
    let mut y = y0.round() as i32;
    let xe = x1.round() as i32;
    let ye = y1.round() as i32;

    let dx = (xe - x).abs();
    let dy = -(ye - y).abs();
    let sx = if x < xe { 1 } else { -1 };
    let sy = if y < ye { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && y >= 0 && x <= u16::MAX as i32 && y <= u16::MAX as i32 {
            let (ux, uy) = (x as u16, y as u16);
            if let Some(cell) = frame.get(ux, uy) {
                if cell.ch == ' ' {
                    frame.set(
                        ux,
                        uy,
                        Cell {
                            ch,
                            fg: Some(fg),
                            bg,
                            bold: false,
                        },
                    );
                }
            }
        }
        if x == xe && y == ye {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTier;
    use crate::runtime::Intensity;
    use crate::settings::resolve;

    fn settings() -> EffectSettings {
        resolve(
            Intensity::Medium,
            &CapabilityTier::forced(Intensity::High, 200, 60),
        )
    }

    fn field(boundary: BoundaryPolicy, hint: Option<usize>) -> ParticleField {
        ParticleField::new(boundary, settings(), 120.0, 12.0, hint, 500, 500, 7)
    }

    #[test]
    fn pool_size_is_clamped_to_ceiling() {
        let f = field(BoundaryPolicy::Reflect, Some(100_000));
        assert_eq!(f.particle_count(), MAX_PARTICLES);

        let f = field(BoundaryPolicy::Reflect, Some(1));
        assert_eq!(f.particle_count(), MIN_PARTICLES);
    }

    #[test]
    fn velocity_stays_bounded_under_sustained_attraction() {
        // Attraction radius covering the whole field, so every particle
        // is nudged every tick.
        let mut f = ParticleField::new(
            BoundaryPolicy::Reflect,
            settings(),
            120.0,
            800.0,
            Some(60),
            500,
            500,
            7,
        );
        let pointer = PointerState {
            x: 250.0,
            y: 250.0,
            inside: true,
        };
        for _ in 0..2000 {
            f.step(0.05, &pointer);
        }
        for p in f.particles() {
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!(speed <= MAX_SPEED * 1.001, "runaway velocity {}", speed);
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn pointer_outside_applies_only_momentum_and_friction() {
        let mut f = field(BoundaryPolicy::Reflect, Some(8));
        f.particles[0].x = 100.0;
        f.particles[0].y = 100.0;
        f.particles[0].vx = 10.0;
        f.particles[0].vy = -4.0;

        f.step(0.1, &PointerState::outside());

        let p = &f.particles()[0];
        assert!((p.vx - 10.0 * FRICTION).abs() < 1e-5);
        assert!((p.vy - -4.0 * FRICTION).abs() < 1e-5);
        assert!((p.x - (100.0 + p.vx * 0.1)).abs() < 1e-4);
    }

    #[test]
    fn connection_at_half_threshold_has_half_base_alpha() {
        let mut f = field(BoundaryPolicy::Reflect, Some(50));
        for p in &mut f.particles {
            p.vx = 0.0;
            p.vy = 0.0;
        }
        f.particles[0].x = 10.0;
        f.particles[0].y = 10.0;
        f.particles[1].x = 70.0;
        f.particles[1].y = 10.0;

        f.step(1e-6, &PointerState::outside());

        let base = f.settings.opacity;
        let edge = f
            .edges()
            .iter()
            .find(|e| e.a == 0 && e.b == 1)
            .expect("edge between the pair 60 apart");
        assert!((edge.alpha - 0.5 * base).abs() < 1e-3);
    }

    #[test]
    fn edges_are_unordered_and_unique() {
        let mut f = field(BoundaryPolicy::Reflect, Some(40));
        f.step(0.05, &PointerState::outside());

        let mut seen = std::collections::HashSet::new();
        for e in f.edges() {
            assert!(e.a < e.b);
            assert!(seen.insert((e.a, e.b)), "duplicate edge {:?}", (e.a, e.b));
            assert!(e.alpha > 0.0);
        }
    }

    #[test]
    fn reflect_inverts_velocity_and_clamps() {
        let mut f = field(BoundaryPolicy::Reflect, Some(8));
        f.particles[0].x = 1.0;
        f.particles[0].y = 50.0;
        f.particles[0].vx = -100.0;
        f.particles[0].vy = 0.0;

        f.step(0.5, &PointerState::outside());

        let p = &f.particles()[0];
        assert_eq!(p.x, 0.0);
        assert!(p.vx > 0.0);
    }

    #[test]
    fn wrap_teleports_to_opposite_edge() {
        let mut f = field(BoundaryPolicy::Wrap, Some(8));
        f.particles[0].x = 499.0;
        f.particles[0].y = 50.0;
        f.particles[0].vx = 20.0;
        f.particles[0].vy = 0.0;

        f.step(0.5, &PointerState::outside());

        let p = &f.particles()[0];
        assert!(p.x < 20.0, "expected wrap, got x={}", p.x);
        assert!(p.vx > 0.0);
    }

    #[test]
    fn zero_sized_viewport_is_a_no_op() {
        let mut f = ParticleField::new(
            BoundaryPolicy::Reflect,
            settings(),
            120.0,
            12.0,
            None,
            0,
            0,
            7,
        );
        assert_eq!(f.particle_count(), 0);
        f.step(0.1, &PointerState::outside());
        assert!(f.edges().is_empty());
    }
}

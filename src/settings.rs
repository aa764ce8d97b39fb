// Copyright (c) 2026 rezky_nightky

use crate::capability::CapabilityTier;
use crate::runtime::Intensity;

/// Resolved numeric knobs for one animation instance. Derived from the
/// requested intensity and the capability tier, then cached until either
/// changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSettings {
    pub opacity: f32,
    pub speed: f32,
    pub density: f32,
    pub glow: f32,
    pub target_fps: f64,
    pub trail_fade: f32,
}

struct BaseRow {
    opacity: f32,
    speed: f32,
    density: f32,
    glow: f32,
    trail_fade: f32,
}

fn base_row(level: Intensity) -> BaseRow {
    match level {
        Intensity::Low => BaseRow {
            opacity: 0.4,
            speed: 0.4,
            density: 0.6,
            glow: 2.0,
            trail_fade: 0.05,
        },
        Intensity::Medium => BaseRow {
            opacity: 0.6,
            speed: 0.65,
            density: 1.0,
            glow: 3.0,
            trail_fade: 0.08,
        },
        Intensity::High => BaseRow {
            opacity: 0.8,
            speed: 0.9,
            density: 1.5,
            glow: 5.0,
            trail_fade: 0.11,
        },
    }
}

/// Update frequency comes from the tier alone: constrained hosts render
/// fewer, lighter frames instead of stuttering through full-density ones.
pub fn target_fps(tier: &CapabilityTier) -> f64 {
    if tier.low_power {
        10.0
    } else if tier.medium {
        18.0
    } else {
        30.0
    }
}

/// Resolve a qualitative level against a tier. Tier adjustment only ever
/// scales cost down; a constrained host never pays more than the request.
pub fn resolve(level: Intensity, tier: &CapabilityTier) -> EffectSettings {
    let base = base_row(level);

    let mut opacity = base.opacity;
    let mut speed = base.speed;
    let mut density = base.density;
    let mut glow = base.glow;
    let mut trail_fade = base.trail_fade;

    if tier.low_power {
        opacity *= 0.75;
        speed *= 0.65;
        density *= 0.5;
        glow = (glow * 0.4).max(1.0);
        trail_fade *= 0.6;
    } else if tier.medium {
        density = density.min(0.55);
        trail_fade *= 0.85;
    }

    EffectSettings {
        opacity,
        speed,
        density,
        glow,
        target_fps: target_fps(tier),
        trail_fade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{classify, FixedCapability};
    use crate::runtime::Intensity;

    fn low_tier() -> CapabilityTier {
        classify(
            &FixedCapability {
                cores: 2,
                handheld: true,
            },
            80,
            24,
        )
    }

    fn medium_tier() -> CapabilityTier {
        classify(
            &FixedCapability {
                cores: 4,
                handheld: false,
            },
            120,
            40,
        )
    }

    fn high_tier() -> CapabilityTier {
        classify(
            &FixedCapability {
                cores: 8,
                handheld: false,
            },
            200,
            60,
        )
    }

    #[test]
    fn low_request_on_low_power_tier_matches_table() {
        let s = resolve(Intensity::Low, &low_tier());
        assert!((s.opacity - 0.3).abs() < 1e-6);
        assert!((s.speed - 0.26).abs() < 1e-6);
        assert!((s.density - 0.3).abs() < 1e-6);
        assert!((s.glow - 1.0).abs() < 1e-6);
        assert!((s.target_fps - 10.0).abs() < 1e-9);
    }

    #[test]
    fn high_tier_passes_base_table_through() {
        let s = resolve(Intensity::High, &high_tier());
        assert!((s.opacity - 0.8).abs() < 1e-6);
        assert!((s.speed - 0.9).abs() < 1e-6);
        assert!((s.density - 1.5).abs() < 1e-6);
        assert!((s.glow - 5.0).abs() < 1e-6);
        assert!((s.target_fps - 30.0).abs() < 1e-9);
    }

    #[test]
    fn medium_tier_caps_density() {
        let s = resolve(Intensity::High, &medium_tier());
        assert!((s.density - 0.55).abs() < 1e-6);
        assert!((s.speed - 0.9).abs() < 1e-6);
    }

    #[test]
    fn low_power_never_costs_more_than_high_tier() {
        for level in [Intensity::Low, Intensity::Medium, Intensity::High] {
            let lo = resolve(level, &low_tier());
            let hi = resolve(level, &high_tier());
            assert!(lo.opacity <= hi.opacity);
            assert!(lo.speed <= hi.speed);
            assert!(lo.density <= hi.density);
            assert!(lo.glow <= hi.glow);
            assert!(lo.target_fps <= hi.target_fps);
            assert!(lo.trail_fade <= hi.trail_fade);
        }
    }
}

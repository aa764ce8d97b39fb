// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::runtime::Intensity;

/// Viewport width at or below which a host counts as mid-range even with
/// plenty of cores. High tier needs more columns than this.
const MID_MAX_COLS: u16 = 120;
const MEDIUM_MAX_CORES: u32 = 4;
const LOW_MAX_CORES: u32 = 2;

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(225);

/// Ambient hardware hints. The environment implementation reads real
/// signals; tests inject a fixed one.
pub trait CapabilityProvider {
    /// Logical core count; 0 means unknown.
    fn core_count(&self) -> u32;
    /// Handheld-terminal heuristic (Termux and friends).
    fn handheld(&self) -> bool;
}

pub struct EnvCapability;

impl CapabilityProvider for EnvCapability {
    fn core_count(&self) -> u32 {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(0)
    }

    fn handheld(&self) -> bool {
        std::env::var_os("TERMUX_VERSION").is_some() || std::env::var_os("ANDROID_ROOT").is_some()
    }
}

/// Deterministic provider for tests and forced tiers.
#[allow(dead_code)]
pub struct FixedCapability {
    pub cores: u32,
    pub handheld: bool,
}

impl CapabilityProvider for FixedCapability {
    fn core_count(&self) -> u32 {
        self.cores
    }

    fn handheld(&self) -> bool {
        self.handheld
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapabilityTier {
    pub core_count: u32,
    pub handheld: bool,
    pub low_power: bool,
    pub medium: bool,
    pub high: bool,
    pub cols: u16,
    pub rows: u16,
}

impl CapabilityTier {
    pub fn forced(level: Intensity, cols: u16, rows: u16) -> Self {
        let (core_count, handheld) = match level {
            Intensity::Low => (LOW_MAX_CORES, true),
            Intensity::Medium => (MEDIUM_MAX_CORES, false),
            Intensity::High => (8, false),
        };
        Self {
            core_count,
            handheld,
            low_power: level == Intensity::Low,
            medium: level == Intensity::Medium,
            high: level == Intensity::High,
            cols,
            rows,
        }
    }
}

/// Tier classification, first match wins. An unknown core count is treated
/// as 2, which lands in the conservative low-power tier.
pub fn classify(provider: &dyn CapabilityProvider, cols: u16, rows: u16) -> CapabilityTier {
    let mut core_count = provider.core_count();
    if core_count == 0 {
        core_count = 2;
    }
    let handheld = provider.handheld();

    let low_power = handheld || core_count <= LOW_MAX_CORES;
    let medium = !low_power && (core_count <= MEDIUM_MAX_CORES || cols <= MID_MAX_COLS);
    let high = !low_power && !medium;

    CapabilityTier {
        core_count,
        handheld,
        low_power,
        medium,
        high,
        cols,
        rows,
    }
}

/// Owns a provider and re-classifies on resize, debounced so a drag-resize
/// storm does not reinitialize the effects on every event.
pub struct Profiler {
    provider: Box<dyn CapabilityProvider>,
    debounce: Duration,
    tier: CapabilityTier,
    pending: Option<(u16, u16)>,
    last_event: Option<Instant>,
}

impl Profiler {
    pub fn new(provider: Box<dyn CapabilityProvider>, cols: u16, rows: u16) -> Self {
        let tier = classify(provider.as_ref(), cols, rows);
        Self {
            provider,
            debounce: RESIZE_DEBOUNCE,
            tier,
            pending: None,
            last_event: None,
        }
    }

    pub fn tier(&self) -> &CapabilityTier {
        &self.tier
    }

    pub fn note_resize(&mut self, now: Instant, cols: u16, rows: u16) {
        self.pending = Some((cols, rows));
        self.last_event = Some(now);
    }

    /// Apply a pending resize once the viewport has been quiet for the
    /// debounce window. Returns the fresh tier when one was computed.
    pub fn poll(&mut self, now: Instant) -> Option<CapabilityTier> {
        let (cols, rows) = self.pending?;
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.debounce {
            return None;
        }
        self.pending = None;
        self.last_event = None;
        self.tier = classify(self.provider.as_ref(), cols, rows);
        Some(self.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handheld_or_two_cores_is_low_power() {
        let t = classify(
            &FixedCapability {
                cores: 8,
                handheld: true,
            },
            200,
            50,
        );
        assert!(t.low_power && !t.medium && !t.high);

        let t = classify(
            &FixedCapability {
                cores: 2,
                handheld: false,
            },
            200,
            50,
        );
        assert!(t.low_power);
    }

    #[test]
    fn unknown_core_count_falls_back_conservative() {
        let t = classify(
            &FixedCapability {
                cores: 0,
                handheld: false,
            },
            200,
            50,
        );
        assert_eq!(t.core_count, 2);
        assert!(t.low_power);
    }

    #[test]
    fn four_cores_or_narrow_viewport_is_medium() {
        let t = classify(
            &FixedCapability {
                cores: 4,
                handheld: false,
            },
            200,
            50,
        );
        assert!(t.medium && !t.low_power && !t.high);

        let t = classify(
            &FixedCapability {
                cores: 8,
                handheld: false,
            },
            100,
            30,
        );
        assert!(t.medium);
    }

    #[test]
    fn many_cores_and_wide_viewport_is_high() {
        let t = classify(
            &FixedCapability {
                cores: 8,
                handheld: false,
            },
            180,
            50,
        );
        assert!(t.high && !t.low_power && !t.medium);
    }

    #[test]
    fn profiler_debounces_resize_storms() {
        let now = Instant::now();
        let mut p = Profiler::new(
            Box::new(FixedCapability {
                cores: 8,
                handheld: false,
            }),
            180,
            50,
        );
        assert!(p.tier().high);

        p.note_resize(now, 100, 30);
        p.note_resize(now + Duration::from_millis(100), 90, 30);
        assert!(p.poll(now + Duration::from_millis(150)).is_none());
        assert!(p.tier().high);

        let refreshed = p.poll(now + Duration::from_millis(400)).unwrap();
        assert!(refreshed.medium);
        assert_eq!(refreshed.cols, 90);
        assert!(p.poll(now + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn forced_high_is_high_even_when_narrow() {
        let t = CapabilityTier::forced(Intensity::High, 60, 20);
        assert!(t.high && !t.medium && !t.low_power);
    }
}

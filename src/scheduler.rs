// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Paces the render loop at a target frame rate. Due times advance by
/// whole periods so remainder error carries over instead of resetting,
/// and only snap forward when the loop is hopelessly behind. Once
/// cancelled, no further frames are ever due.
#[derive(Clone, Debug)]
pub struct FrameClock {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl FrameClock {
    pub fn new(target_fps: f64, now: Instant) -> Self {
        Self {
            period: Self::period_for(target_fps),
            next_due: now,
            cancelled: false,
        }
    }

    fn period_for(target_fps: f64) -> Duration {
        Duration::from_secs_f64(1.0 / target_fps.max(1.0))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_target_fps(&mut self, target_fps: f64, now: Instant) {
        self.period = Self::period_for(target_fps);
        if self.next_due > now + self.period {
            self.next_due = now + self.period;
        }
    }

    /// True when a frame should run now. Advances the schedule by one
    /// period, keeping the fractional remainder; if more than a full
    /// period behind, drops the backlog instead of queueing late frames.
    pub fn due(&mut self, now: Instant) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if now > self.next_due {
            self.next_due = now + self.period;
        }
        true
    }

    /// How long the event poll may sleep before the next frame.
    pub fn timeout(&self, now: Instant) -> Duration {
        if self.cancelled {
            return Duration::from_millis(50);
        }
        self.next_due.saturating_duration_since(now)
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Tracks how much frame work overshoots the budget, as a 0..1 pressure
/// signal. Effects shed simulation load as pressure rises.
#[derive(Clone, Copy, Debug, Default)]
pub struct PressureGauge {
    pressure: f32,
}

impl PressureGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.pressure
    }

    pub fn record(&mut self, work: Duration, period: Duration) {
        let period_s = period.as_secs_f32().max(0.000_001);
        let overshoot = ((work.as_secs_f32() / period_s) - 1.0).clamp(0.0, 2.0);
        if overshoot > 0.0 {
            self.pressure = (self.pressure + overshoot * 0.25).min(1.0);
        } else {
            self.pressure = (self.pressure - 0.02).max(0.0);
        }
    }
}

/// Cap on how much simulated time one tick may consume. Shrinks as
/// pressure rises; a stalled host gets slower motion, not larger steps.
pub fn sim_delta_cap(period: Duration, pressure: f32) -> Duration {
    let base_s = period.as_secs_f64() * 3.0;
    let factor = (1.0 - (pressure as f64) * 0.7).clamp(0.3, 1.0);
    let min_s = (period.as_secs_f64() * 0.5).max(0.001);
    let max_s = base_s.min(0.5);
    Duration::from_secs_f64((base_s * factor).clamp(min_s, max_s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_due_at_period_boundaries_without_drift() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(20.0, t0);
        let period = clock.period();

        assert!(clock.due(t0));
        assert!(!clock.due(t0));

        // Arriving slightly late keeps the schedule aligned: the next
        // due time is one whole period after the previous one, not one
        // period after the late arrival.
        let late = t0 + period + Duration::from_millis(10);
        assert!(clock.due(late));
        assert!(clock.due(t0 + period * 2));
    }

    #[test]
    fn far_behind_snaps_instead_of_queueing() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(20.0, t0);
        assert!(clock.due(t0));

        let way_late = t0 + clock.period() * 10;
        assert!(clock.due(way_late));
        // Only one catch-up frame; the backlog is dropped.
        assert!(!clock.due(way_late));
    }

    #[test]
    fn cancelled_clock_never_fires() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(30.0, t0);
        clock.cancel();
        assert!(!clock.due(t0 + Duration::from_secs(5)));
        assert!(clock.is_cancelled());
    }

    #[test]
    fn pressure_rises_on_overshoot_and_decays_when_under_budget() {
        let mut gauge = PressureGauge::new();
        let period = Duration::from_millis(50);

        gauge.record(Duration::from_millis(100), period);
        let after_overshoot = gauge.value();
        assert!(after_overshoot > 0.0);

        gauge.record(Duration::from_millis(10), period);
        assert!(gauge.value() < after_overshoot);

        for _ in 0..200 {
            gauge.record(Duration::from_millis(1), period);
        }
        assert_eq!(gauge.value(), 0.0);
    }

    #[test]
    fn sim_cap_shrinks_under_pressure() {
        let period = Duration::from_millis(50);
        let relaxed = sim_delta_cap(period, 0.0);
        let pressed = sim_delta_cap(period, 1.0);
        assert!(pressed < relaxed);
        assert!(pressed >= Duration::from_millis(25));
    }
}

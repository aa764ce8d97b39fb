// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::event::{MouseEvent, MouseEventKind};

use crate::capability::CapabilityTier;

/// Live pointer state in cell coordinates, read-only to the effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub inside: bool,
}

impl PointerState {
    pub fn outside() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            inside: false,
        }
    }
}

pub fn throttle_for_tier(tier: &CapabilityTier) -> Duration {
    if tier.low_power {
        Duration::from_millis(200)
    } else if tier.medium {
        Duration::from_millis(120)
    } else {
        Duration::from_millis(60)
    }
}

/// Captures mouse movement with a throttle window so a high-frequency
/// event stream never drives per-event work. Presses always land; moves
/// inside the window are dropped.
pub struct InputTracker {
    pointer: PointerState,
    throttle: Duration,
    last_move: Option<Instant>,
}

impl InputTracker {
    pub fn new(throttle: Duration) -> Self {
        Self {
            pointer: PointerState::outside(),
            throttle,
            last_move: None,
        }
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn set_throttle(&mut self, throttle: Duration) {
        self.throttle = throttle;
    }

    /// Feed one terminal mouse event. Returns true when the event was
    /// accepted into the pointer state.
    pub fn track_mouse(&mut self, ev: &MouseEvent, now: Instant) -> bool {
        match ev.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some(last) = self.last_move {
                    if now.saturating_duration_since(last) < self.throttle {
                        return false;
                    }
                }
                self.last_move = Some(now);
            }
            MouseEventKind::Down(_) | MouseEventKind::Up(_) => {}
            _ => return false,
        }
        self.pointer = PointerState {
            x: ev.column as f32,
            y: ev.row as f32,
            inside: true,
        };
        true
    }

    /// Terminal focus left; the pointer is no longer over our surface.
    pub fn mark_outside(&mut self) {
        self.pointer.inside = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn moved(col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Moved,
            column: col,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn moves_inside_throttle_window_are_dropped() {
        let t0 = Instant::now();
        let mut tr = InputTracker::new(Duration::from_millis(100));

        assert!(tr.track_mouse(&moved(5, 5), t0));
        assert!(!tr.track_mouse(&moved(9, 9), t0 + Duration::from_millis(40)));
        assert_eq!(tr.pointer().x, 5.0);

        assert!(tr.track_mouse(&moved(9, 9), t0 + Duration::from_millis(120)));
        assert_eq!(tr.pointer().y, 9.0);
    }

    #[test]
    fn presses_bypass_the_throttle() {
        let t0 = Instant::now();
        let mut tr = InputTracker::new(Duration::from_millis(100));
        assert!(tr.track_mouse(&moved(1, 1), t0));

        let press = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::empty(),
        };
        assert!(tr.track_mouse(&press, t0 + Duration::from_millis(10)));
        assert_eq!(tr.pointer().x, 7.0);
        assert!(tr.pointer().inside);
    }

    #[test]
    fn focus_loss_marks_pointer_outside() {
        let mut tr = InputTracker::new(Duration::from_millis(50));
        tr.track_mouse(&moved(3, 3), Instant::now());
        assert!(tr.pointer().inside);
        tr.mark_outside();
        assert!(!tr.pointer().inside);
        assert_eq!(tr.pointer().x, 3.0);
    }
}

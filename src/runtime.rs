// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    #[allow(dead_code)]
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectMode {
    Rain,
    Net,
    Drift,
    Duo,
}

impl EffectMode {
    pub fn wants_rain(self) -> bool {
        matches!(self, EffectMode::Rain | EffectMode::Duo)
    }

    pub fn wants_particles(self) -> bool {
        matches!(self, EffectMode::Net | EffectMode::Drift | EffectMode::Duo)
    }
}

/// What a particle does when it runs off the grid. The interactive net
/// reflects; the decorative drift layer wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    Reflect,
    Wrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Cyan,
    Violet,
    Amber,
    Crimson,
    Ice,
    Aurora,
    Mono,
}

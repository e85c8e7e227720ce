//! Reactive-block edge detector.
//!
//! Watches for the moment a remembered melee attacker starts swinging nearby
//! and opens a short window during which BLOCK scores higher. The boost starts
//! at [`SPIKE_PEAK`] and decays linearly to 1.0 over [`SPIKE_TICKS`]; once it
//! expires a cooldown of [`COOLDOWN_TICKS`] suppresses new triggers.

/// Length of the elevated-score window.
pub const SPIKE_TICKS: u32 = 8;
/// Multiplier applied in the tick the window opens.
pub const SPIKE_PEAK: f64 = 2.5;
/// Ticks after a window closes before another can open.
pub const COOLDOWN_TICKS: u32 = 30;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReactiveBlock {
    previous_attacking: bool,
    spike_ticks: u32,
    cooldown_ticks: u32,
}

impl ReactiveBlock {
    /// Advances the detector by one tick.
    ///
    /// Counters that were already running are decremented before the edge
    /// check, so a window opened this tick reports the full peak multiplier.
    /// Returns `true` when a new window opened.
    pub fn update(&mut self, attacking_now: bool) -> bool {
        if self.cooldown_ticks > 0 {
            self.cooldown_ticks -= 1;
        }
        if self.spike_ticks > 0 {
            self.spike_ticks -= 1;
            if self.spike_ticks == 0 {
                self.cooldown_ticks = COOLDOWN_TICKS;
            }
        }

        let triggered = attacking_now && !self.previous_attacking && self.cooldown_ticks == 0;
        if triggered {
            self.spike_ticks = SPIKE_TICKS;
        }
        self.previous_attacking = attacking_now;

        triggered
    }

    /// Current BLOCK multiplier: `1 + (peak - 1) * remaining / window`.
    pub fn multiplier(&self) -> f64 {
        if self.spike_ticks == 0 {
            return 1.0;
        }
        1.0 + (SPIKE_PEAK - 1.0) * (self.spike_ticks as f64 / SPIKE_TICKS as f64)
    }

    pub fn is_active(&self) -> bool {
        self.spike_ticks > 0
    }

    pub fn spike_ticks(&self) -> u32 {
        self.spike_ticks
    }

    pub fn cooldown_ticks(&self) -> u32 {
        self.cooldown_ticks
    }
}

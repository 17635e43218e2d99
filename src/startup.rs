//! Startup light sequence.
//!
//! Plays a fixed blink pattern once after an enable trigger, typically
//! when the node is still unprovisioned. Each stage is an instantaneous
//! lightness jump; the stage is derived from the time since the trigger,
//! so a late poll skips straight to the stage that should be active.

use embassy_time::Duration;

use crate::dimmer::Dimmer;
use crate::log::log_info;
use crate::timestamp::Timestamp;

/// Stages of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    First,
    Second,
    Third,
    Fourth,
    /// Sequence finished, lightness restored
    Off,
}

/// Timed stages with their durations, in order
const TIMED_STAGES: [(StartupStage, Duration); 4] = [
    (StartupStage::First, Duration::from_millis(3000)),
    (StartupStage::Second, Duration::from_millis(1000)),
    (StartupStage::Third, Duration::from_millis(1000)),
    (StartupStage::Fourth, Duration::from_millis(1000)),
];

impl StartupStage {
    /// Lightness applied when the stage starts
    pub const fn lightness(self) -> u16 {
        match self {
            Self::First => 0xB504,
            Self::Second | Self::Fourth => 0x0001,
            Self::Third | Self::Off => 0xFFFF,
        }
    }

    /// Stage that should be active `elapsed` after the sequence start
    pub fn at(elapsed: Duration) -> Self {
        let mut remaining = elapsed;
        for (stage, duration) in TIMED_STAGES {
            if remaining < duration {
                return stage;
            }
            remaining -= duration;
        }
        Self::Off
    }

    /// Total duration of the timed stages
    pub fn total_duration() -> Duration {
        TIMED_STAGES
            .iter()
            .fold(Duration::from_millis(0), |acc, (_, duration)| acc + *duration)
    }
}

/// Startup sequence player
#[derive(Debug, Clone)]
pub struct StartupSequence {
    /// Enable requested, applied on the next poll
    pending: bool,
    /// Stage applied last
    stage: StartupStage,
    started_at: Timestamp,
}

impl StartupSequence {
    pub const fn new() -> Self {
        Self {
            pending: false,
            stage: StartupStage::Off,
            started_at: Timestamp::ZERO,
        }
    }

    /// Request the sequence to (re)start from the first stage
    pub fn enable(&mut self) {
        self.pending = true;
    }

    /// Stage applied last
    pub const fn stage(&self) -> StartupStage {
        self.stage
    }

    /// Check if the sequence is playing or about to start
    pub fn is_running(&self) -> bool {
        self.pending || self.stage != StartupStage::Off
    }

    /// Advance the sequence
    ///
    /// Returns the stage whose lightness jump was issued, if any. At most one
    /// jump is issued per stage change.
    pub fn poll(&mut self, now: Timestamp, dimmer: &Dimmer) -> Option<StartupStage> {
        if !dimmer.is_enabled() {
            return None;
        }

        let mut applied = None;
        if self.pending {
            self.pending = false;
            self.started_at = now;
            self.stage = StartupStage::First;
            Self::apply(self.stage, now, dimmer);
            applied = Some(self.stage);
        }

        if self.stage == StartupStage::Off {
            return applied;
        }

        let calculated = StartupStage::at(now.duration_since(self.started_at));
        if calculated != self.stage {
            self.stage = calculated;
            Self::apply(calculated, now, dimmer);
            applied = Some(calculated);
        }

        applied
    }

    fn apply(stage: StartupStage, now: Timestamp, dimmer: &Dimmer) {
        log_info!("[StartupSequence] stage {:?}", stage);
        dimmer.process_target_lightness(0, stage.lightness(), Duration::from_millis(0), now);
    }
}

impl Default for StartupSequence {
    fn default() -> Self {
        Self::new()
    }
}

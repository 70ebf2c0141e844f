// libs/scheduling-cell/src/services/slots.rs
use chrono::Duration;
use tracing::debug;

use shared_config::{AppConfig, SchedulingWindow};

use crate::models::{Slot, SlotGrid};

/// Builds the candidate slot grid for a provider's day.
///
/// Pure and deterministic: two calls with the same inputs always produce the
/// same grid, which is what lets the reschedule flow re-derive the grid the
/// patient originally picked from. The grid always starts at the window start
/// and never aligns to "now" or to existing bookings.
pub struct SlotGenerator {
    window: SchedulingWindow,
    default_step_minutes: i32,
}

impl SlotGenerator {
    pub fn new(window: SchedulingWindow, default_step_minutes: i32) -> Self {
        Self {
            window,
            default_step_minutes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.window, config.default_slot_minutes)
    }

    pub fn window(&self) -> SchedulingWindow {
        self.window
    }

    /// Generate the ordered slot grid for the given consultation duration.
    ///
    /// A missing or non-positive duration falls back to the clinic default
    /// step and flags `default_step_used` so the caller can surface a
    /// configuration warning to the operator (non-fatal).
    ///
    /// A window shorter than the step yields an empty grid, not an error.
    pub fn generate(&self, provider_duration_minutes: Option<i32>) -> SlotGrid {
        let (step_minutes, default_step_used) = match provider_duration_minutes {
            Some(d) if d > 0 => (d, false),
            _ => (self.default_step_minutes, true),
        };

        let step = Duration::minutes(step_minutes as i64);
        let mut slots = Vec::new();
        let mut cursor = self.window.start;

        loop {
            // Every emitted slot must fit a full consultation inside the window.
            let (slot_end, wrapped) = cursor.overflowing_add_signed(step);
            if wrapped != 0 || slot_end > self.window.end {
                break;
            }
            slots.push(Slot { start_time: cursor });
            cursor = slot_end;
        }

        debug!(
            "Generated {} slots with {} minute step (default: {})",
            slots.len(),
            step_minutes,
            default_step_used
        );

        SlotGrid {
            slots,
            step_minutes,
            default_step_used,
        }
    }
}

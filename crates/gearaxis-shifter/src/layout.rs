//! Button layout of the physical shifter

use crate::{ShifterError, ShifterResult};
use serde::{Deserialize, Serialize};

/// Gear band size: seven forward gears plus reverse.
pub const DEFAULT_GEAR_BAND: usize = 8;
pub const DEFAULT_SEQ_UP_INDEX: usize = 9;
pub const DEFAULT_SEQ_DOWN_INDEX: usize = 8;
/// Upper bound on the band so logical gears always fit in a `u8`.
pub const MAX_GEAR_BAND: usize = 32;

/// Which button indices carry which shifter function.
///
/// Indices `0..gear_band` are the gear band: forward gears in ascending
/// order with reverse in the last slot. The two sequential inputs sit
/// outside the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLayout {
    pub gear_band: usize,
    pub seq_up: usize,
    pub seq_down: usize,
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self {
            gear_band: DEFAULT_GEAR_BAND,
            seq_up: DEFAULT_SEQ_UP_INDEX,
            seq_down: DEFAULT_SEQ_DOWN_INDEX,
        }
    }
}

impl ButtonLayout {
    /// Builds a layout and checks it with [`ButtonLayout::validate`].
    pub fn new(gear_band: usize, seq_up: usize, seq_down: usize) -> ShifterResult<Self> {
        let layout = Self {
            gear_band,
            seq_up,
            seq_down,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> ShifterResult<()> {
        if !(2..=MAX_GEAR_BAND).contains(&self.gear_band) {
            return Err(ShifterError::InvalidLayout(format!(
                "gear band must hold 2..={MAX_GEAR_BAND} buttons, got {}",
                self.gear_band
            )));
        }
        if self.seq_up == self.seq_down {
            return Err(ShifterError::InvalidLayout(format!(
                "sequential up and down share button {}",
                self.seq_up
            )));
        }
        for (name, index) in [("up", self.seq_up), ("down", self.seq_down)] {
            if index < self.gear_band {
                return Err(ShifterError::InvalidLayout(format!(
                    "sequential {name} button {index} lies inside the gear band 0..{}",
                    self.gear_band
                )));
            }
        }
        Ok(())
    }

    /// Number of forward gears (the band minus the reverse slot).
    pub fn forward_gears(&self) -> u8 {
        u8::try_from(self.gear_band.saturating_sub(1)).unwrap_or(u8::MAX)
    }

    /// Logical gear reported for the reverse slot.
    pub fn reverse_gear(&self) -> u8 {
        u8::try_from(self.gear_band).unwrap_or(u8::MAX)
    }

    pub fn reverse_index(&self) -> usize {
        self.gear_band.saturating_sub(1)
    }

    /// Smallest button vector that covers every configured index.
    pub fn required_buttons(&self) -> usize {
        self.gear_band
            .max(self.seq_up.saturating_add(1))
            .max(self.seq_down.saturating_add(1))
    }
}

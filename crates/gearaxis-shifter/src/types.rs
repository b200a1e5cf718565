//! Shifter type definitions

use serde::{Deserialize, Serialize};

/// Raw button states for one poll, index-addressed.
pub type ButtonVector = Vec<bool>;

pub const NEUTRAL_GEAR: u8 = 0;
pub const FORWARD_GEARS: u8 = 7;
pub const REVERSE_GEAR: u8 = FORWARD_GEARS + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShiftMode {
    #[default]
    Unknown,
    HPattern,
    Sequential,
}

impl ShiftMode {
    pub fn is_known(self) -> bool {
        self != ShiftMode::Unknown
    }
}

/// Classified shifter state for a single poll.
///
/// `logical_gear` is `0` for neutral, `1..=N` for forward gears and `N + 1`
/// for reverse, where `N` is the number of forward slots in the gear band.
/// `forward_gear` carries the same number for forward gears only and stays
/// `0` when reverse is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftState {
    pub mode: ShiftMode,
    pub logical_gear: u8,
    pub forward_gear: u8,
    pub is_reverse: bool,
    pub is_neutral: bool,
    pub seq_up: bool,
    pub seq_down: bool,
}

impl ShiftState {
    pub fn released() -> Self {
        Self {
            mode: ShiftMode::Unknown,
            logical_gear: NEUTRAL_GEAR,
            forward_gear: 0,
            is_reverse: false,
            is_neutral: true,
            seq_up: false,
            seq_down: false,
        }
    }

    pub fn is_shifting(&self) -> bool {
        self.seq_up || self.seq_down
    }
}

impl Default for ShiftState {
    fn default() -> Self {
        Self::released()
    }
}

/// Console label for a logical gear: `N`, `R` or the gear number.
pub fn gear_label(logical_gear: u8, reverse_gear: u8) -> String {
    if logical_gear == NEUTRAL_GEAR {
        "N".to_string()
    } else if logical_gear == reverse_gear {
        "R".to_string()
    } else {
        logical_gear.to_string()
    }
}

/// Console label for a sequential input pair: `+`, `-` or `N`.
pub fn sequential_label(up: bool, down: bool) -> &'static str {
    if up {
        "+"
    } else if down {
        "-"
    } else {
        "N"
    }
}

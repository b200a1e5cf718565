//! Axis mapping and mode-retention policy
//!
//! [`AxisMapper::update`] is a pure function of the current reading and the
//! previous [`MapperState`]. It never touches a device; [`crate::GearAxisWriter`]
//! performs the writes it asks for.

use super::{GearAxisTable, NEUTRAL_GEAR, ShiftMode, ShiftState};
use serde::{Deserialize, Serialize};

/// What the axis currently represents. Exactly one variant is active, so the
/// axis value is never left over from an unrelated branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    Centered,
    Gear(u8),
    Sequential { up: bool, down: bool },
}

impl Selection {
    /// The mode this selection was acted upon in.
    pub fn mode(self) -> ShiftMode {
        match self {
            Selection::Centered => ShiftMode::Unknown,
            Selection::Gear(_) => ShiftMode::HPattern,
            Selection::Sequential { .. } => ShiftMode::Sequential,
        }
    }
}

/// Last selection actually written, and the value it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedState {
    pub selection: Selection,
    pub axis_value: i32,
}

impl EmittedState {
    pub fn centered(center: i32) -> Self {
        Self {
            selection: Selection::Centered,
            axis_value: center,
        }
    }
}

/// Bookkeeping carried from one poll cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperState {
    /// Effective mode of the previous cycle.
    pub retained_mode: ShiftMode,
    pub emitted: EmittedState,
    /// Consecutive cycles in which `retained_mode` stood in for an
    /// unreadable or all-released shifter.
    pub retained_cycles: u32,
}

/// How long a retained mode may stand in for missing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// `None` holds the last valid mode indefinitely.
    pub max_retained_cycles: Option<u32>,
}

impl RetentionPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_retained_cycles: None,
        }
    }

    pub fn bounded(max_retained_cycles: u32) -> Self {
        Self {
            max_retained_cycles: Some(max_retained_cycles),
        }
    }

    fn allows(&self, cycles: u32) -> bool {
        self.max_retained_cycles.is_none_or(|max| cycles <= max)
    }
}

/// Result of one [`AxisMapper::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisUpdate {
    /// Value to write this cycle, `None` when nothing changed.
    pub write: Option<i32>,
    pub effective_mode: ShiftMode,
    /// True when the effective mode came from retention, not from the reading.
    pub retained: bool,
    pub state: MapperState,
}

#[derive(Debug, Clone)]
pub struct AxisMapper {
    table: GearAxisTable,
    policy: RetentionPolicy,
}

impl AxisMapper {
    pub fn new(table: GearAxisTable, policy: RetentionPolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &GearAxisTable {
        &self.table
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Neutral, nothing retained, axis assumed at center.
    pub fn initial_state(&self) -> MapperState {
        MapperState {
            retained_mode: ShiftMode::Unknown,
            emitted: EmittedState::centered(self.table.center()),
            retained_cycles: 0,
        }
    }

    pub fn value_of(&self, selection: Selection) -> i32 {
        match selection {
            Selection::Centered => self.table.center(),
            Selection::Gear(gear) => self.table.value_for(gear),
            Selection::Sequential { up, down } => self.table.sequential_value(up, down),
        }
    }

    /// Decides the axis output for one poll.
    ///
    /// `current` is `None` when the input device could not be read this
    /// cycle. That is treated differently from an all-released reading: a
    /// failed read holds the previous output in every mode, while a released
    /// sequential shifter returns to center.
    pub fn update(&self, current: Option<&ShiftState>, state: &MapperState) -> AxisUpdate {
        let observed = current.map_or(ShiftMode::Unknown, |s| s.mode);

        let mut retained_cycles = 0;
        let effective_mode = if observed.is_known() {
            observed
        } else if state.retained_mode.is_known() {
            let held = state.retained_cycles.saturating_add(1);
            if self.policy.allows(held) {
                retained_cycles = held;
                state.retained_mode
            } else {
                ShiftMode::Unknown
            }
        } else {
            ShiftMode::Unknown
        };
        let retained = !observed.is_known() && effective_mode.is_known();

        let previous = state.emitted.selection;
        let selection = match effective_mode {
            ShiftMode::HPattern => match current {
                Some(s) if s.mode == ShiftMode::HPattern => Selection::Gear(s.logical_gear),
                // Between detents the shifter reports nothing; hold the gear.
                _ => match previous {
                    Selection::Gear(gear) => Selection::Gear(gear),
                    _ => Selection::Gear(NEUTRAL_GEAR),
                },
            },
            ShiftMode::Sequential => match (current, previous) {
                (Some(s), _) => Selection::Sequential {
                    up: s.seq_up,
                    down: s.seq_down,
                },
                (None, held @ Selection::Sequential { .. }) => held,
                (None, _) => Selection::Sequential {
                    up: false,
                    down: false,
                },
            },
            ShiftMode::Unknown => Selection::Centered,
        };

        let (write, emitted) = if selection == previous {
            (None, state.emitted)
        } else {
            let axis_value = self.value_of(selection);
            (
                Some(axis_value),
                EmittedState {
                    selection,
                    axis_value,
                },
            )
        };

        AxisUpdate {
            write,
            effective_mode,
            retained,
            state: MapperState {
                retained_mode: effective_mode,
                emitted,
                retained_cycles,
            },
        }
    }
}

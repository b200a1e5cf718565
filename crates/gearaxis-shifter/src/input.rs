//! Button vector classification

use super::{ButtonLayout, NEUTRAL_GEAR, ShiftMode, ShiftState};

fn pressed(buttons: &[bool], index: usize) -> bool {
    buttons.get(index).copied().unwrap_or(false)
}

/// Classifies one poll's buttons into a [`ShiftState`].
///
/// The gear band is scanned in ascending order and the first asserted slot
/// wins, so overlapping contacts during a shift resolve to the lower gear.
/// Missing indices read as released.
pub fn classify(buttons: &[bool], layout: &ButtonLayout) -> ShiftState {
    let engaged = buttons
        .iter()
        .take(layout.gear_band)
        .position(|&down| down);

    let seq_up = pressed(buttons, layout.seq_up);
    let seq_down = pressed(buttons, layout.seq_down);

    let Some(index) = engaged else {
        let mode = if seq_up || seq_down {
            ShiftMode::Sequential
        } else {
            ShiftMode::Unknown
        };
        return ShiftState {
            mode,
            seq_up,
            seq_down,
            ..ShiftState::released()
        };
    };

    let is_reverse = index == layout.reverse_index();
    let logical_gear = u8::try_from(index.saturating_add(1)).unwrap_or(u8::MAX);

    ShiftState {
        mode: ShiftMode::HPattern,
        logical_gear,
        forward_gear: if is_reverse { NEUTRAL_GEAR } else { logical_gear },
        is_reverse,
        is_neutral: false,
        seq_up,
        seq_down,
    }
}

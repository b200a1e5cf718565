//! Fuzzes classify + mapper over arbitrary button sequences.
//!
//! Every byte pair is one poll: a 16-bit button word, with 0xFFFF standing
//! in for a failed read.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_axis_mapper
#![no_main]
use gearaxis_shifter::{AxisMapper, ButtonLayout, GearAxisTable, RetentionPolicy, classify};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = GearAxisTable::build(0, 32768) else {
        return;
    };
    let layout = ButtonLayout::default();
    let mapper = AxisMapper::new(table, RetentionPolicy::bounded(4));
    let mut state = mapper.initial_state();

    for chunk in data.chunks_exact(2) {
        let word = u16::from_le_bytes([chunk[0], chunk[1]]);
        let reading = (word != u16::MAX).then(|| {
            let buttons: Vec<bool> = (0..16).map(|i| word & (1 << i) != 0).collect();
            classify(&buttons, &layout)
        });
        let update = mapper.update(reading.as_ref(), &state);
        if let Some(value) = update.write {
            assert!((0..=32768).contains(&value));
            assert_ne!(update.state.emitted.selection, state.emitted.selection);
        }
        state = update.state;
    }
});

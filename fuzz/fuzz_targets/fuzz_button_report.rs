//! Fuzzes input report decoding with arbitrary report layouts.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_button_report
#![no_main]
use gearaxis_hid::ButtonReportFormat;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&header, report)) = data.split_first() else {
        return;
    };
    let format = ButtonReportFormat {
        report_id: (header & 0x80 != 0).then_some(header & 0x0F),
        button_offset: usize::from(header & 0x07),
        button_count: usize::from(header >> 3),
    };
    // Must never panic on arbitrary bytes.
    if let Ok(Some(buttons)) = format.decode("fuzz", report) {
        assert_eq!(buttons.len(), format.button_count);
    }
});

//! USB HID input for gear shifters
//!
//! Finds the physical shifter among the attached HID devices, reads its
//! input reports and turns the button bitfield into a
//! [`gearaxis_shifter::ButtonVector`].
//!
//! - [`discovery`]: enumeration and [`DeviceMatcher`]
//! - [`report`]: [`ButtonReportFormat`] decoding
//! - [`reader`]: [`HidShifterReader`], the [`gearaxis_shifter::ButtonSource`] implementation

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod discovery;
pub mod reader;
pub mod report;

pub use discovery::*;
pub use reader::*;
pub use report::*;

/// Thrustmaster USB vendor ID.
pub const THRUSTMASTER_VENDOR_ID: u16 = 0x044F;

/// Largest input report the reader accepts.
pub const MAX_REPORT_SIZE: usize = 64;

/// How long one poll waits for a report before reusing the last one. The
/// host loop counts this wait as part of its cycle.
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 2;

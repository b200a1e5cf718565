//! Shifter-to-axis translation for sim racing
//!
//! This crate turns the discrete button state of an H-pattern / sequential
//! shifter into a single analog "gear axis" value:
//!
//! - [`classify`] converts a raw [`ButtonVector`] into a [`ShiftState`]
//! - [`GearAxisTable`] places gears, reverse and neutral on the axis range
//! - [`AxisMapper`] decides what (if anything) to write each poll cycle
//! - [`GearAxisWriter`] owns the virtual axis and applies those decisions
//!
//! Device I/O lives behind the [`ButtonSource`] and [`VirtualAxis`] traits.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device;
pub mod input;
pub mod layout;
pub mod mapper;
pub mod table;
pub mod types;
pub mod writer;

pub use device::{ButtonSource, DeviceError, VirtualAxis};
pub use input::*;
pub use layout::*;
pub use mapper::*;
pub use table::*;
pub use types::*;
pub use writer::GearAxisWriter;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShifterError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(#[source] DeviceError),

    #[error("Invalid axis range: min={min}, max={max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("Invalid button layout: {0}")]
    InvalidLayout(String),

    #[error("Axis write failed: {0}")]
    AxisWrite(#[source] DeviceError),
}

impl ShifterError {
    /// Errors that prevent the writer from ever starting.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            ShifterError::DeviceUnavailable(_)
                | ShifterError::InvalidRange { .. }
                | ShifterError::InvalidLayout(_)
        )
    }
}

pub type ShifterResult<T> = Result<T, ShifterError>;

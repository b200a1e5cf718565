//! Stand-in axis for `run --dry-run`

use gearaxis_shifter::{DeviceError, VirtualAxis};
use gearaxis_uinput::AxisConfig;
use tracing::info;

/// Accepts every write and only logs it.
#[derive(Debug, Clone, Copy)]
pub struct LoggingAxis {
    min: i32,
    max: i32,
}

impl LoggingAxis {
    pub fn new(config: &AxisConfig) -> Self {
        info!(min = config.min, max = config.max, "dry run: no virtual device is created");
        Self {
            min: config.min,
            max: config.max,
        }
    }
}

impl VirtualAxis for LoggingAxis {
    fn axis_range(&self) -> Result<(i32, i32), DeviceError> {
        Ok((self.min, self.max))
    }

    fn set_axis(&mut self, value: i32) -> Result<(), DeviceError> {
        info!(value, "dry run: axis");
        Ok(())
    }
}

//! Virtual gear axis on Linux uinput
//!
//! Creates a joystick with a single absolute X axis that games bind as an
//! analog input. A trigger button is registered as well; some games ignore
//! devices that expose no buttons at all.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use gearaxis_shifter::{DeviceError, VirtualAxis};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DEVICE_NAME: &str = "gearaxis virtual shifter";
pub const DEFAULT_AXIS_MIN: i32 = 0;
pub const DEFAULT_AXIS_MAX: i32 = 32768;

#[derive(Debug, Error)]
pub enum UinputError {
    #[error("Invalid axis range: min {min} must be below max {max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("Failed to create uinput device: {0}")]
    CreateDevice(#[source] std::io::Error),
}

impl UinputError {
    /// Creation failures usually mean `/dev/uinput` is missing or not writable.
    pub fn is_permission_problem(&self) -> bool {
        matches!(
            self,
            UinputError::CreateDevice(e)
                if matches!(e.kind(), std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound)
        )
    }
}

/// What the virtual device looks like to the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub device_name: String,
    pub min: i32,
    pub max: i32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            min: DEFAULT_AXIS_MIN,
            max: DEFAULT_AXIS_MAX,
        }
    }
}

impl AxisConfig {
    pub fn validate(&self) -> Result<(), UinputError> {
        if self.max <= self.min {
            return Err(UinputError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn abs_info(&self) -> AbsInfo {
        AbsInfo::new(self.min, self.min, self.max, 0, 0, 1)
    }
}

/// uinput joystick whose X axis carries the gear value.
pub struct VirtualGearAxis {
    device: VirtualDevice,
    config: AxisConfig,
    value: i32,
}

impl VirtualGearAxis {
    /// # Errors
    ///
    /// `InvalidRange` before touching uinput, `CreateDevice` when the kernel
    /// refuses the device.
    pub fn create(config: AxisConfig) -> Result<Self, UinputError> {
        config.validate()?;

        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_TRIGGER);

        let abs_setup = UinputAbsSetup::new(AbsoluteAxisType::ABS_X, config.abs_info());
        let device = VirtualDeviceBuilder::new()
            .map_err(UinputError::CreateDevice)?
            .name(&config.device_name)
            .with_keys(&keys)
            .map_err(UinputError::CreateDevice)?
            .with_absolute_axis(&abs_setup)
            .map_err(UinputError::CreateDevice)?
            .build()
            .map_err(UinputError::CreateDevice)?;

        info!(
            name = %config.device_name,
            min = config.min,
            max = config.max,
            "virtual gear axis created"
        );
        Ok(Self {
            device,
            value: config.min,
            config,
        })
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Last value emitted.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Device node, e.g. `/dev/input/event17`, once udev has created it.
    pub fn device_path(&mut self) -> Option<PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

impl VirtualAxis for VirtualGearAxis {
    fn axis_range(&self) -> Result<(i32, i32), DeviceError> {
        Ok((self.config.min, self.config.max))
    }

    fn set_axis(&mut self, value: i32) -> Result<(), DeviceError> {
        let event = InputEvent::new_now(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, value);
        self.device
            .emit(&[event])
            .map_err(|e| DeviceError::io(self.config.device_name.clone(), e.to_string()))?;
        debug!(value, "ABS_X emitted");
        self.value = value;
        Ok(())
    }
}

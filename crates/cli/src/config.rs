//! Command-line arguments and the validated run configuration

use clap::Args;
use gearaxis_hid::{
    ButtonReportFormat, DEFAULT_BUTTON_COUNT, DEFAULT_NAME_PATTERNS, DeviceMatcher, parse_hex_id,
};
use gearaxis_shifter::{
    ButtonLayout, DEFAULT_FORWARD_SPAN, DEFAULT_GEAR_BAND, DEFAULT_SEQ_DOWN_INDEX,
    DEFAULT_SEQ_UP_INDEX, GearAxisTable, RetentionPolicy,
};
use gearaxis_uinput::{AxisConfig, DEFAULT_AXIS_MAX, DEFAULT_AXIS_MIN, DEFAULT_DEVICE_NAME};
use std::time::Duration;

use crate::error::CliError;

/// Length of one poll cycle, including the time spent waiting on a read.
pub const DEFAULT_POLL_MS: u64 = 5;

/// Axis range arguments shared by `run` and `table`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AxisRangeArgs {
    /// Lowest value of the virtual axis
    #[arg(long, env = "GEARAXIS_AXIS_MIN", default_value_t = DEFAULT_AXIS_MIN, allow_negative_numbers = true)]
    pub axis_min: i32,

    /// Highest value of the virtual axis
    #[arg(long, env = "GEARAXIS_AXIS_MAX", default_value_t = DEFAULT_AXIS_MAX, allow_negative_numbers = true)]
    pub axis_max: i32,

    /// Number of buttons in the gear band (forward gears plus reverse)
    #[arg(long, env = "GEARAXIS_GEAR_BAND", default_value_t = DEFAULT_GEAR_BAND)]
    pub gear_band: usize,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// USB vendor ID of the shifter (hex or decimal)
    #[arg(long, env = "GEARAXIS_VID", value_parser = parse_hex_id)]
    pub vid: Option<u16>,

    /// USB product ID of the shifter (hex or decimal)
    #[arg(long, env = "GEARAXIS_PID", value_parser = parse_hex_id)]
    pub pid: Option<u16>,

    /// Product-name substring to match, case-insensitive (repeatable)
    #[arg(long = "name", env = "GEARAXIS_NAME", value_delimiter = ',')]
    pub names: Vec<String>,

    /// Only decode input reports with this report ID
    #[arg(long, env = "GEARAXIS_REPORT_ID", value_parser = parse_report_id)]
    pub report_id: Option<u8>,

    /// Byte offset of the button bitfield in the input report
    #[arg(long, env = "GEARAXIS_BUTTON_OFFSET", default_value_t = 0)]
    pub button_offset: usize,

    /// Number of buttons in the bitfield
    #[arg(long, env = "GEARAXIS_BUTTON_COUNT", default_value_t = DEFAULT_BUTTON_COUNT)]
    pub button_count: usize,

    #[command(flatten)]
    pub axis: AxisRangeArgs,

    /// Button index of sequential up
    #[arg(long, env = "GEARAXIS_SEQ_UP", default_value_t = DEFAULT_SEQ_UP_INDEX)]
    pub seq_up: usize,

    /// Button index of sequential down
    #[arg(long, env = "GEARAXIS_SEQ_DOWN", default_value_t = DEFAULT_SEQ_DOWN_INDEX)]
    pub seq_down: usize,

    /// Poll cycle length in milliseconds (device read included)
    #[arg(long, env = "GEARAXIS_POLL_MS", default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,

    /// Fall back to neutral after this long without a valid reading
    /// (default: hold the last gear indefinitely)
    #[arg(long, env = "GEARAXIS_NEUTRAL_AFTER_MS")]
    pub neutral_after_ms: Option<u64>,

    /// Name of the virtual joystick
    #[arg(long, env = "GEARAXIS_DEVICE_NAME", default_value = DEFAULT_DEVICE_NAME)]
    pub device_name: String,

    /// Log axis values instead of creating a uinput device
    #[arg(long, env = "GEARAXIS_DRY_RUN")]
    pub dry_run: bool,
}

fn parse_report_id(raw: &str) -> Result<u8, String> {
    let id = parse_hex_id(raw)?;
    u8::try_from(id).map_err(|e| format!("report ID '{raw}' does not fit in a byte: {e}"))
}

/// Everything `run` needs, checked before any device is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub matcher: DeviceMatcher,
    pub report: ButtonReportFormat,
    pub layout: ButtonLayout,
    pub retention: RetentionPolicy,
    pub poll_interval: Duration,
    pub axis: AxisConfig,
    pub dry_run: bool,
}

impl TryFrom<&RunArgs> for RunConfig {
    type Error = CliError;

    fn try_from(args: &RunArgs) -> Result<Self, CliError> {
        let layout = ButtonLayout::new(args.axis.gear_band, args.seq_up, args.seq_down)
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;

        if args.button_count < layout.required_buttons() {
            return Err(CliError::InvalidConfiguration(format!(
                "button count {} does not cover button index {}",
                args.button_count,
                layout.required_buttons().saturating_sub(1)
            )));
        }
        if args.poll_ms == 0 {
            return Err(CliError::InvalidConfiguration(
                "poll interval must be at least 1 ms".to_string(),
            ));
        }

        let axis = AxisConfig {
            device_name: args.device_name.clone(),
            min: args.axis.axis_min,
            max: args.axis.axis_max,
        };
        // Surfaces a bad range before the HID device is opened.
        GearAxisTable::build_with(axis.min, axis.max, layout.forward_gears(), DEFAULT_FORWARD_SPAN)
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;

        // Explicit IDs alone are enough to identify the device.
        let name_patterns = if !args.names.is_empty() {
            args.names.clone()
        } else if args.vid.is_some() && args.pid.is_some() {
            Vec::new()
        } else {
            DEFAULT_NAME_PATTERNS.iter().map(|s| (*s).to_string()).collect()
        };

        Ok(Self {
            matcher: DeviceMatcher {
                vendor_id: args.vid,
                product_id: args.pid,
                name_patterns,
            },
            report: ButtonReportFormat {
                report_id: args.report_id,
                button_offset: args.button_offset,
                button_count: args.button_count,
            },
            layout,
            retention: retention_policy(args.neutral_after_ms, args.poll_ms),
            poll_interval: Duration::from_millis(args.poll_ms),
            axis,
            dry_run: args.dry_run,
        })
    }
}

/// Converts a wall-clock fallback into whole poll cycles, rounding up.
pub fn retention_policy(neutral_after_ms: Option<u64>, poll_ms: u64) -> RetentionPolicy {
    match neutral_after_ms {
        None => RetentionPolicy::unbounded(),
        Some(ms) => {
            let cycles = ms.div_ceil(poll_ms.max(1));
            RetentionPolicy::bounded(u32::try_from(cycles).unwrap_or(u32::MAX))
        }
    }
}

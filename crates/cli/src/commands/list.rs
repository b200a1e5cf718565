use anyhow::Result;
use gearaxis_hid::{DeviceMatcher, DeviceSummary, list_devices};
use hidapi::HidApi;

use super::ListArgs;
use crate::error::CliError;
use crate::output::{self, ListedDevice};

pub fn execute(args: &ListArgs, json: bool) -> Result<()> {
    let api = HidApi::new()
        .map_err(|e| CliError::DeviceUnavailable(format!("failed to initialise HID API: {e}")))?;
    let listed = mark_shifters(list_devices(&api), &DeviceMatcher::default(), args.shifters_only);
    output::print_device_list(&listed, json)?;
    Ok(())
}

fn mark_shifters(
    devices: Vec<DeviceSummary>,
    matcher: &DeviceMatcher,
    shifters_only: bool,
) -> Vec<ListedDevice> {
    devices
        .into_iter()
        .map(|device| ListedDevice {
            shifter: matcher.matches(&device),
            device,
        })
        .filter(|entry| entry.shifter || !shifters_only)
        .collect()
}

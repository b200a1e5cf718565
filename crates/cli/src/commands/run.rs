use anyhow::{Context, Result};
use gearaxis_hid::HidShifterReader;
use gearaxis_shifter::{ButtonSource, GearAxisWriter, VirtualAxis};
use gearaxis_uinput::VirtualGearAxis;
use hidapi::HidApi;
use std::sync::atomic::AtomicBool;
use tracing::info;

use crate::config::{RunArgs, RunConfig};
use crate::dry_run::LoggingAxis;
use crate::error::CliError;
use crate::runner::{self, LoopStats};

pub fn execute(args: &RunArgs) -> Result<()> {
    let config = RunConfig::try_from(args)?;
    info!(
        layout = ?config.layout,
        report = ?config.report,
        retention = ?config.retention,
        poll_interval = ?config.poll_interval,
        "starting"
    );

    let api = HidApi::new()
        .map_err(|e| CliError::DeviceUnavailable(format!("failed to initialise HID API: {e}")))?;
    let mut source = HidShifterReader::connect(api, config.matcher.clone(), config.report)
        .map_err(CliError::from)?;
    info!(device = source.label(), "shifter connected");

    let stop = runner::install_stop_flag()?;

    let stats = if config.dry_run {
        drive(&mut source, LoggingAxis::new(&config.axis), &config, &stop)?
    } else {
        let mut axis = VirtualGearAxis::create(config.axis.clone()).map_err(CliError::from)?;
        if let Some(path) = axis.device_path() {
            info!(path = %path.display(), "virtual joystick node");
        }
        drive(&mut source, axis, &config, &stop)?
    };

    info!(writes = stats.writes, "stopped, axis back at neutral");
    Ok(())
}

/// Runs the loop and always re-centers the axis before returning.
fn drive<S, A>(source: &mut S, axis: A, config: &RunConfig, stop: &AtomicBool) -> Result<LoopStats>
where
    S: ButtonSource + ?Sized,
    A: VirtualAxis,
{
    let mut writer =
        GearAxisWriter::new(axis, config.layout, config.retention).map_err(CliError::from)?;

    let result = runner::run_loop(source, &mut writer, stop, config.poll_interval, None);
    writer.shutdown();

    result
        .map_err(CliError::from)
        .context("poll loop stopped")
}

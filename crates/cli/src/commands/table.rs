use anyhow::Result;
use gearaxis_shifter::{ButtonLayout, DEFAULT_FORWARD_SPAN, GearAxisTable};

use super::TableArgs;
use crate::error::CliError;
use crate::output;

/// Builds the table `run` would use for this range and band.
pub fn build(args: &TableArgs) -> Result<GearAxisTable, CliError> {
    let layout = ButtonLayout {
        gear_band: args.axis.gear_band,
        ..ButtonLayout::default()
    };
    // Sequential indices play no part in the table, so only the band is checked.
    if layout.forward_gears() == 0 || layout.gear_band > gearaxis_shifter::MAX_GEAR_BAND {
        return Err(CliError::InvalidConfiguration(format!(
            "gear band must hold 2..={} buttons, got {}",
            gearaxis_shifter::MAX_GEAR_BAND,
            args.axis.gear_band
        )));
    }
    Ok(GearAxisTable::build_with(
        args.axis.axis_min,
        args.axis.axis_max,
        layout.forward_gears(),
        DEFAULT_FORWARD_SPAN,
    )?)
}

pub fn execute(args: &TableArgs, json: bool) -> Result<()> {
    let table = build(args)?;
    output::print_table(&table, json)?;
    Ok(())
}

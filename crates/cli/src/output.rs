//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use gearaxis_hid::DeviceSummary;
use gearaxis_shifter::GearAxisTable;
use serde::Serialize;
use serde_json::json;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(err) = source {
        causes.push(err.to_string());
        source = err.source();
    }
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "causes": causes,
            "exit_code": crate::error::exit_code(error),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// One `list` entry: the device plus whether the default matcher takes it.
#[derive(Debug, Clone, Serialize)]
pub struct ListedDevice {
    #[serde(flatten)]
    pub device: DeviceSummary,
    pub shifter: bool,
}

pub fn print_device_list(devices: &[ListedDevice], json: bool) -> Result<(), serde_json::Error> {
    if json {
        let output = json!({
            "success": true,
            "devices": devices,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("{}", "No HID devices found".yellow());
        return Ok(());
    }
    println!("{}", "HID devices:".bold());
    for entry in devices {
        let line = render_device(entry);
        if entry.shifter {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

fn render_device(entry: &ListedDevice) -> String {
    let device = &entry.device;
    let marker = if entry.shifter { "*" } else { " " };
    let mut line = format!(
        "{marker} {}:{} {}",
        device.vendor_id_hex,
        device.product_id_hex,
        device.product.as_deref().unwrap_or("(unnamed)")
    );
    if let Some(manufacturer) = &device.manufacturer {
        line.push_str(&format!(" [{manufacturer}]"));
    }
    line.push_str(&format!(" if={} {}", device.interface_number, device.path));
    line
}

/// The gear table as the startup listing shows it.
pub fn render_table(table: &GearAxisTable) -> String {
    let mut lines: Vec<String> = table
        .rows()
        .iter()
        .map(|row| format!("Gear {:>2} => Axis X = {}", row.label, row.value))
        .collect();
    lines.push(format!("Neutral  => Axis X = {}", table.center()));
    lines.push(format!("Seq +    => Axis X = {}", table.sequential_value(true, false)));
    lines.push(format!("Seq -    => Axis X = {}", table.sequential_value(false, true)));
    lines.join("\n")
}

pub fn print_table(table: &GearAxisTable, json: bool) -> Result<(), serde_json::Error> {
    if json {
        let output = json!({
            "success": true,
            "min": table.min(),
            "max": table.max(),
            "center": table.center(),
            "gears": table.rows(),
            "sequential": {
                "up": table.sequential_value(true, false),
                "down": table.sequential_value(false, true),
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {}..={}",
        "Gear axis table for range".bold(),
        table.min(),
        table.max()
    );
    println!("{}", render_table(table));
    Ok(())
}

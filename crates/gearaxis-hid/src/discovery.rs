//! Enumerating HID devices and picking the shifter

use gearaxis_shifter::DeviceError;
use hidapi::{DeviceInfo, HidApi};
use serde::Serialize;
use std::ffi::CString;

/// Product-name fragments that identify a Thrustmaster TH8A/TH8RS.
pub const DEFAULT_NAME_PATTERNS: &[&str] = &["Gear Shift", "TH8"];

/// Which attached device is the shifter.
///
/// All configured criteria must hold. Name patterns are case-insensitive
/// substrings of the product string; any one pattern is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMatcher {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub name_patterns: Vec<String>,
}

impl Default for DeviceMatcher {
    fn default() -> Self {
        Self {
            vendor_id: None,
            product_id: None,
            name_patterns: DEFAULT_NAME_PATTERNS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl DeviceMatcher {
    /// Matcher that only checks the USB IDs.
    pub fn by_id(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            product_id: Some(product_id),
            name_patterns: Vec::new(),
        }
    }

    pub fn matches(&self, device: &DeviceSummary) -> bool {
        if self.vendor_id.is_some_and(|vid| vid != device.vendor_id) {
            return false;
        }
        if self.product_id.is_some_and(|pid| pid != device.product_id) {
            return false;
        }
        if self.name_patterns.is_empty() {
            return true;
        }
        let Some(product) = device.product.as_deref() else {
            return false;
        };
        let product = product.to_lowercase();
        self.name_patterns
            .iter()
            .any(|pattern| product.contains(&pattern.to_lowercase()))
    }

    /// Short description for log and error messages.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(vid) = self.vendor_id {
            parts.push(format!("vid={}", hex_u16(vid)));
        }
        if let Some(pid) = self.product_id {
            parts.push(format!("pid={}", hex_u16(pid)));
        }
        if !self.name_patterns.is_empty() {
            parts.push(format!("name~{}", self.name_patterns.join("|")));
        }
        if parts.is_empty() {
            return "any HID device".to_string();
        }
        parts.join(" ")
    }
}

/// One enumerated HID interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub vendor_id_hex: String,
    pub product_id_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub interface_number: i32,
    pub usage_page: u16,
    pub usage: u16,
    pub path: String,
}

impl DeviceSummary {
    pub fn from_info(info: &DeviceInfo) -> Self {
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            vendor_id_hex: hex_u16(info.vendor_id()),
            product_id_hex: hex_u16(info.product_id()),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product: info.product_string().map(str::to_string),
            serial: info.serial_number().map(str::to_string),
            interface_number: info.interface_number(),
            usage_page: info.usage_page(),
            usage: info.usage(),
            path: info.path().to_string_lossy().to_string(),
        }
    }

    /// Name used in logs and device errors.
    pub fn label(&self) -> String {
        match &self.product {
            Some(product) => format!("{product} ({}:{})", self.vendor_id_hex, self.product_id_hex),
            None => format!("{}:{}", self.vendor_id_hex, self.product_id_hex),
        }
    }

    pub fn c_path(&self) -> Result<CString, DeviceError> {
        CString::new(self.path.as_bytes())
            .map_err(|e| DeviceError::io(self.label(), format!("bad device path: {e}")))
    }
}

/// Every HID interface hidapi currently knows about, sorted by IDs.
pub fn list_devices(api: &HidApi) -> Vec<DeviceSummary> {
    let mut devices: Vec<DeviceSummary> = api.device_list().map(DeviceSummary::from_info).collect();
    devices.sort_by(|a, b| {
        (a.vendor_id, a.product_id, a.interface_number, &a.path).cmp(&(
            b.vendor_id,
            b.product_id,
            b.interface_number,
            &b.path,
        ))
    });
    devices
}

/// First device in `devices` accepted by `matcher`.
pub fn select_device<'a>(
    devices: &'a [DeviceSummary],
    matcher: &DeviceMatcher,
) -> Option<&'a DeviceSummary> {
    devices.iter().find(|device| matcher.matches(device))
}

/// Enumerates and selects the shifter.
///
/// # Errors
///
/// `NotFound` when no attached device matches.
pub fn find_device(api: &HidApi, matcher: &DeviceMatcher) -> Result<DeviceSummary, DeviceError> {
    let devices = list_devices(api);
    select_device(&devices, matcher)
        .cloned()
        .ok_or_else(|| DeviceError::not_found(matcher.describe()))
}

pub fn hex_u16(value: u16) -> String {
    format!("0x{value:04X}")
}

/// Parses a VID/PID given as hex (`0x044F`, `044f`) or, failing that, decimal.
pub fn parse_hex_id(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u16::from_str_radix(digits, 16)
        .or_else(|_| raw.parse::<u16>())
        .map_err(|e| format!("invalid ID value '{raw}', expected hex (0x1234) or decimal: {e}"))
}

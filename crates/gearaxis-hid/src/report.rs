//! Button bitfield decoding for HID input reports

use gearaxis_shifter::{ButtonVector, DeviceError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUTTON_COUNT: usize = 16;

/// Where the buttons live in an input report.
///
/// Button `i` is bit `i % 8` of byte `button_offset + i / 8`, counted from
/// the start of the report as returned by hidapi (i.e. including the report
/// ID byte when the device uses numbered reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonReportFormat {
    /// Only reports starting with this ID are decoded; others are skipped.
    pub report_id: Option<u8>,
    pub button_offset: usize,
    pub button_count: usize,
}

impl Default for ButtonReportFormat {
    fn default() -> Self {
        Self {
            report_id: None,
            button_offset: 0,
            button_count: DEFAULT_BUTTON_COUNT,
        }
    }
}

impl ButtonReportFormat {
    /// Bytes a report must have to cover every button.
    pub fn min_report_len(&self) -> usize {
        self.button_offset
            .saturating_add(self.button_count.div_ceil(8))
    }

    /// Decodes a report into button states.
    ///
    /// Returns `Ok(None)` for reports with a different report ID.
    ///
    /// # Errors
    ///
    /// `InvalidReport` when the report is too short for the configured buttons.
    pub fn decode(&self, device: &str, data: &[u8]) -> Result<Option<ButtonVector>, DeviceError> {
        if let Some(id) = self.report_id {
            if data.first() != Some(&id) {
                return Ok(None);
            }
        }

        let expected = self.min_report_len();
        let Some(bits) = data.get(self.button_offset..expected) else {
            return Err(DeviceError::InvalidReport {
                device: device.to_string(),
                expected,
                actual: data.len(),
            });
        };

        let buttons = (0..self.button_count)
            .map(|index| {
                bits.get(index / 8)
                    .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
            })
            .collect();
        Ok(Some(buttons))
    }
}

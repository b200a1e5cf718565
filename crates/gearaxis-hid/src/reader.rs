//! Reading the shifter as a [`ButtonSource`]

use crate::discovery::{DeviceMatcher, DeviceSummary, find_device};
use crate::report::ButtonReportFormat;
use crate::{DEFAULT_READ_TIMEOUT_MS, MAX_REPORT_SIZE};
use gearaxis_shifter::{ButtonSource, ButtonVector, DeviceError};
use hidapi::{HidApi, HidDevice, HidError};
use tracing::{debug, info, warn};

/// Upper bound on reports consumed by one poll, in case the device floods.
const MAX_DRAINED_REPORTS: usize = 64;

/// Raw input-report channel of an opened device.
pub trait ReportReader {
    /// Fills `buf` with one report. `Ok(0)` means nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, DeviceError>;
}

/// (Re)acquires the device behind a [`ReportReader`].
pub trait ReportOpener {
    type Reader: ReportReader;

    /// Opens the device, returning the reader and a label for logs.
    fn open(&mut self) -> Result<(Self::Reader, String), DeviceError>;
}

/// An opened hidapi device.
pub struct HidReport {
    device: HidDevice,
    label: String,
}

impl ReportReader for HidReport {
    fn read(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, DeviceError> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| hid_error(&self.label, &e))
    }
}

/// Opens the first device accepted by a [`DeviceMatcher`], re-enumerating
/// on every attempt so a replugged shifter is picked up.
pub struct HidOpener {
    api: HidApi,
    matcher: DeviceMatcher,
}

impl HidOpener {
    pub fn new(api: HidApi, matcher: DeviceMatcher) -> Self {
        Self { api, matcher }
    }

    pub fn matcher(&self) -> &DeviceMatcher {
        &self.matcher
    }
}

impl ReportOpener for HidOpener {
    type Reader = HidReport;

    fn open(&mut self) -> Result<(HidReport, String), DeviceError> {
        if let Err(e) = self.api.refresh_devices() {
            warn!(error = %e, "HID device refresh failed, using cached list");
        }
        let summary: DeviceSummary = find_device(&self.api, &self.matcher)?;
        let label = summary.label();
        let device = self
            .api
            .open_path(&summary.c_path()?)
            .map_err(|e| open_error(&label, &e))?;
        info!(device = %label, path = %summary.path, "shifter opened");
        Ok((
            HidReport {
                device,
                label: label.clone(),
            },
            label,
        ))
    }
}

fn hid_error(device: &str, error: &HidError) -> DeviceError {
    DeviceError::io(device, error.to_string())
}

fn open_error(device: &str, error: &HidError) -> DeviceError {
    let message = error.to_string();
    if message.to_lowercase().contains("permission") {
        return DeviceError::PermissionDenied(format!("{device}: {message}"));
    }
    DeviceError::io(device, message)
}

/// The physical shifter as a polled [`ButtonSource`].
///
/// The device only sends a report when a button changes, so a poll that
/// times out reports the last decoded vector. Reports queued since the
/// previous poll are skipped in favour of the newest one. A failed read triggers one
/// re-open and one more read before the error is handed to the caller.
pub struct HidShifterReader<O: ReportOpener> {
    opener: O,
    reader: Option<O::Reader>,
    label: String,
    format: ButtonReportFormat,
    timeout_ms: i32,
    last: ButtonVector,
    buf: [u8; MAX_REPORT_SIZE],
}

impl HidShifterReader<HidOpener> {
    /// Finds and opens the shifter through hidapi.
    ///
    /// # Errors
    ///
    /// `NotFound` when no device matches, or the open error.
    pub fn connect(
        api: HidApi,
        matcher: DeviceMatcher,
        format: ButtonReportFormat,
    ) -> Result<Self, DeviceError> {
        Self::open(HidOpener::new(api, matcher), format, DEFAULT_READ_TIMEOUT_MS)
    }
}

impl<O: ReportOpener> HidShifterReader<O> {
    /// Opens the device immediately so a missing shifter fails at startup.
    ///
    /// # Errors
    ///
    /// Whatever the opener reports.
    pub fn open(mut opener: O, format: ButtonReportFormat, timeout_ms: i32) -> Result<Self, DeviceError> {
        let (reader, label) = opener.open()?;
        Ok(Self {
            opener,
            reader: Some(reader),
            label,
            last: vec![false; format.button_count],
            format,
            timeout_ms,
            buf: [0; MAX_REPORT_SIZE],
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub fn last_buttons(&self) -> &[bool] {
        &self.last
    }

    fn reopen(&mut self) -> Result<(), DeviceError> {
        self.reader = None;
        let (reader, label) = self.opener.open()?;
        debug!(device = %label, "shifter re-acquired");
        self.reader = Some(reader);
        self.label = label;
        Ok(())
    }

    /// Waits up to the timeout for a report, then drains whatever else is
    /// queued without blocking. Only the newest matching report counts.
    fn read_once(&mut self) -> Result<ButtonVector, DeviceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(DeviceError::disconnected(self.label.clone()));
        };

        let mut latest: Option<Result<ButtonVector, DeviceError>> = None;
        let mut drain_error = None;
        let mut reports = 0usize;
        let mut len = reader.read(&mut self.buf, self.timeout_ms)?;
        while len > 0 {
            let report = self.buf.get(..len).unwrap_or(&self.buf);
            match self.format.decode(&self.label, report) {
                Ok(Some(buttons)) => latest = Some(Ok(buttons)),
                Ok(None) => {}
                Err(err) => latest = Some(Err(err)),
            }
            reports = reports.saturating_add(1);
            if reports >= MAX_DRAINED_REPORTS {
                debug!(device = %self.label, reports, "report queue still not empty");
                break;
            }
            match reader.read(&mut self.buf, 0) {
                Ok(next) => len = next,
                Err(err) => {
                    drain_error = Some(err);
                    break;
                }
            }
        }
        if reports > 1 {
            debug!(device = %self.label, reports, "skipped stale reports");
        }

        match latest {
            Some(Ok(buttons)) => self.last = buttons,
            Some(Err(err)) => return Err(err),
            None => {}
        }
        match drain_error {
            Some(err) => Err(err),
            None => Ok(self.last.clone()),
        }
    }
}

impl<O: ReportOpener> ButtonSource for HidShifterReader<O> {
    fn poll(&mut self) -> Result<ButtonVector, DeviceError> {
        if self.reader.is_none() {
            self.reopen()?;
            return self.read_once();
        }

        match self.read_once() {
            Ok(buttons) => Ok(buttons),
            Err(err @ DeviceError::InvalidReport { .. }) => Err(err),
            Err(err) => {
                warn!(device = %self.label, error = %err, "shifter read failed, re-acquiring");
                if let Err(reopen_err) = self.reopen() {
                    debug!(error = %reopen_err, "re-acquire failed");
                    return Err(err);
                }
                self.read_once()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type Script = Arc<Mutex<VecDeque<Result<Vec<u8>, DeviceError>>>>;

    /// Reads from a script shared by every reader the opener hands out.
    struct ScriptedReader {
        script: Script,
    }

    impl ReportReader for ScriptedReader {
        fn read(&mut self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize, DeviceError> {
            let next = self
                .script
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or(Ok(Vec::new()));
            let report = next?;
            for (slot, byte) in buf.iter_mut().zip(&report) {
                *slot = *byte;
            }
            Ok(report.len().min(buf.len()))
        }
    }

    struct ScriptedOpener {
        script: Script,
        opens: usize,
        fail_from: Option<usize>,
    }

    impl ScriptedOpener {
        fn new(reads: Vec<Result<Vec<u8>, DeviceError>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(reads.into())),
                opens: 0,
                fail_from: None,
            }
        }

        fn failing_after(mut self, successful_opens: usize) -> Self {
            self.fail_from = Some(successful_opens);
            self
        }
    }

    impl ReportOpener for ScriptedOpener {
        type Reader = ScriptedReader;

        fn open(&mut self) -> Result<(ScriptedReader, String), DeviceError> {
            if self.fail_from.is_some_and(|limit| self.opens >= limit) {
                return Err(DeviceError::not_found("th8a"));
            }
            self.opens += 1;
            Ok((
                ScriptedReader {
                    script: Arc::clone(&self.script),
                },
                "th8a".to_string(),
            ))
        }
    }

    fn reader(opener: ScriptedOpener) -> Result<HidShifterReader<ScriptedOpener>, DeviceError> {
        HidShifterReader::open(opener, ButtonReportFormat::default(), 2)
    }

    fn held(buttons: &[bool]) -> Vec<usize> {
        buttons
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    #[test]
    fn test_open_failure_surfaces() {
        let opener = ScriptedOpener::new(Vec::new()).failing_after(0);
        assert!(matches!(reader(opener), Err(DeviceError::NotFound(_))));
    }

    #[test]
    fn test_timeout_repeats_last_vector() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![
            Ok(vec![0b0000_1000, 0x00]),
            Ok(Vec::new()),
        ]))?;
        assert_eq!(held(&reader.poll()?), vec![3]);
        assert_eq!(held(&reader.poll()?), vec![3]);
        Ok(())
    }

    #[test]
    fn test_poll_returns_newest_queued_report() -> Result<(), DeviceError> {
        // 1st, 2nd and 3rd all arrived between two polls.
        let mut reader = reader(ScriptedOpener::new(vec![
            Ok(vec![0b0000_0001, 0x00]),
            Ok(vec![0b0000_0010, 0x00]),
            Ok(vec![0b0000_0100, 0x00]),
        ]))?;
        assert_eq!(held(&reader.poll()?), vec![2]);
        assert_eq!(held(&reader.poll()?), vec![2]);
        assert_eq!(reader.opener.opens, 1);
        Ok(())
    }

    #[test]
    fn test_stale_short_report_is_skipped() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![
            Ok(vec![0x01]),
            Ok(vec![0b0000_1000, 0x00]),
        ]))?;
        assert_eq!(held(&reader.poll()?), vec![3]);
        Ok(())
    }

    #[test]
    fn test_drain_failure_keeps_newest_report() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![
            Ok(vec![0b0001_0000, 0x00]),
            Err(DeviceError::io("th8a", "EPIPE")),
            Ok(Vec::new()),
        ]))?;
        // The failed drain read is re-acquired and the reading still holds 5th.
        assert_eq!(held(&reader.poll()?), vec![4]);
        assert_eq!(reader.opener.opens, 2);
        assert_eq!(held(reader.last_buttons()), vec![4]);
        Ok(())
    }

    #[test]
    fn test_initial_vector_is_released() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(Vec::new()))?;
        let buttons = reader.poll()?;
        assert_eq!(buttons.len(), 16);
        assert!(held(&buttons).is_empty());
        Ok(())
    }

    #[test]
    fn test_read_error_reacquires_once() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![
            Err(DeviceError::io("th8a", "EPIPE")),
            Ok(vec![0x00, 0b0000_0010]),
        ]))?;
        assert_eq!(held(&reader.poll()?), vec![9]);
        assert_eq!(reader.opener.opens, 2);
        Ok(())
    }

    #[test]
    fn test_second_failure_is_returned() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![
            Err(DeviceError::io("th8a", "EPIPE")),
            Err(DeviceError::io("th8a", "EPIPE again")),
            Ok(vec![0x01, 0x00]),
        ]))?;
        assert!(matches!(reader.poll(), Err(DeviceError::Io { .. })));
        assert_eq!(held(&reader.poll()?), vec![0]);
        Ok(())
    }

    #[test]
    fn test_failed_reacquire_returns_read_error_and_retries_next_poll() -> Result<(), DeviceError> {
        let mut reader = reader(
            ScriptedOpener::new(vec![Err(DeviceError::io("th8a", "EPIPE"))]).failing_after(1),
        )?;
        assert!(matches!(reader.poll(), Err(DeviceError::Io { .. })));
        assert!(!reader.is_open());

        assert!(matches!(reader.poll(), Err(DeviceError::NotFound(_))));

        reader.opener.fail_from = None;
        assert!(reader.poll().is_ok());
        assert!(reader.is_open());
        Ok(())
    }

    #[test]
    fn test_short_report_is_not_a_reacquire() -> Result<(), DeviceError> {
        let mut reader = reader(ScriptedOpener::new(vec![Ok(vec![0x01])]))?;
        assert!(matches!(reader.poll(), Err(DeviceError::InvalidReport { .. })));
        assert_eq!(reader.opener.opens, 1);
        Ok(())
    }

    #[test]
    fn test_foreign_report_id_keeps_last_vector() -> Result<(), DeviceError> {
        let format = ButtonReportFormat {
            report_id: Some(0x01),
            button_offset: 1,
            button_count: 16,
        };
        let opener = ScriptedOpener::new(vec![
            Ok(vec![0x01, 0b0000_0100, 0x00]),
            Ok(vec![0x02, 0xFF, 0xFF]),
        ]);
        let mut reader = HidShifterReader::open(opener, format, 2)?;
        assert_eq!(held(&reader.poll()?), vec![2]);
        assert_eq!(held(&reader.poll()?), vec![2]);
        assert_eq!(held(reader.last_buttons()), vec![2]);
        Ok(())
    }
}

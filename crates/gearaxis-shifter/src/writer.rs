//! Owns the virtual axis and applies mapper decisions to it.

use crate::device::{ButtonSource, DeviceError, VirtualAxis};
use crate::{
    AxisMapper, ButtonLayout, ButtonVector, GearAxisTable, MapperState, RetentionPolicy,
    Selection, ShiftMode, ShifterError, ShifterResult, classify, gear_label, sequential_label,
};
use tracing::{debug, info, warn};

/// Drives one virtual axis from successive shifter readings.
///
/// Dropping the writer re-centers the axis, so no gear survives the owner.
pub struct GearAxisWriter<A: VirtualAxis> {
    axis: A,
    layout: ButtonLayout,
    mapper: AxisMapper,
    state: MapperState,
    /// Last value the axis accepted; independent of the mapper bookkeeping.
    last_written: i32,
    shut_down: bool,
}

impl<A: VirtualAxis> GearAxisWriter<A> {
    /// Queries the axis range, builds the gear table and centers the axis.
    ///
    /// # Errors
    ///
    /// `DeviceUnavailable` when the range cannot be read or the initial
    /// center write fails, `InvalidRange` for an unusable range and
    /// `InvalidLayout` for a bad layout.
    pub fn new(mut axis: A, layout: ButtonLayout, policy: RetentionPolicy) -> ShifterResult<Self> {
        layout.validate()?;
        let (min, max) = axis.axis_range().map_err(ShifterError::DeviceUnavailable)?;
        let table = GearAxisTable::build_with(
            min,
            max,
            layout.forward_gears(),
            crate::DEFAULT_FORWARD_SPAN,
        )?;

        info!(min, max, center = table.center(), "gear axis range");
        for row in table.rows() {
            info!(gear = %row.label, value = row.value, "gear axis table");
        }

        let center = table.center();
        axis.set_axis(center).map_err(ShifterError::DeviceUnavailable)?;

        let mapper = AxisMapper::new(table, policy);
        let state = mapper.initial_state();
        Ok(Self {
            axis,
            layout,
            mapper,
            state,
            last_written: center,
            shut_down: false,
        })
    }

    pub fn table(&self) -> &GearAxisTable {
        self.mapper.table()
    }

    pub fn layout(&self) -> &ButtonLayout {
        &self.layout
    }

    pub fn state(&self) -> &MapperState {
        &self.state
    }

    pub fn last_written(&self) -> i32 {
        self.last_written
    }

    pub fn axis(&self) -> &A {
        &self.axis
    }

    /// Runs one cycle against a reading the caller already obtained.
    ///
    /// Returns the value written, if any. Read errors are absorbed by mode
    /// retention; write errors are returned and leave the state as it was.
    ///
    /// # Errors
    ///
    /// `AxisWrite` when the virtual axis rejects a value.
    pub fn step(&mut self, reading: Result<ButtonVector, DeviceError>) -> ShifterResult<Option<i32>> {
        let current = match reading {
            Ok(buttons) => Some(classify(&buttons, &self.layout)),
            Err(err) => {
                debug!(error = %err, "no shifter reading this cycle");
                None
            }
        };

        let update = self.mapper.update(current.as_ref(), &self.state);
        let Some(value) = update.write else {
            self.state = update.state;
            return Ok(None);
        };

        let written = self.write(value)?;
        self.report(update.state.emitted.selection, update.effective_mode);
        self.state = update.state;
        Ok(written.then_some(value))
    }

    /// Polls `source` once and runs a cycle with the result.
    ///
    /// # Errors
    ///
    /// See [`GearAxisWriter::step`].
    pub fn poll_once<S: ButtonSource + ?Sized>(&mut self, source: &mut S) -> ShifterResult<Option<i32>> {
        let reading = source.poll();
        self.step(reading)
    }

    /// Forces the axis back to center. Errors are logged and dropped since
    /// the device is being released anyway. Safe to call more than once; a
    /// write after it re-arms the next shutdown and the final drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let center = self.table().center();
        match self.axis.set_axis(center) {
            Ok(()) => {
                self.last_written = center;
                self.state = self.mapper.initial_state();
                info!(value = center, "axis returned to neutral");
            }
            Err(err) => warn!(error = %err, "failed to re-center axis on shutdown"),
        }
    }

    /// Returns `false` when `value` was already on the axis and nothing was sent.
    fn write(&mut self, value: i32) -> ShifterResult<bool> {
        if value == self.last_written {
            return Ok(false);
        }
        self.axis.set_axis(value).map_err(ShifterError::AxisWrite)?;
        self.last_written = value;
        // A gear is on the axis again, so the next shutdown must center it.
        self.shut_down = false;
        Ok(true)
    }

    fn report(&self, selection: Selection, mode: ShiftMode) {
        match selection {
            Selection::Gear(gear) => {
                let label = gear_label(gear, self.layout.reverse_gear());
                info!(gear = %label, value = self.last_written, "[H] transfer");
            }
            Selection::Sequential { up, down } => {
                info!(state = sequential_label(up, down), value = self.last_written, "[SEQ] state");
            }
            Selection::Centered => {
                info!(?mode, value = self.last_written, "[?] undefined mode, neutral");
            }
        }
    }
}

impl<A: VirtualAxis> Drop for GearAxisWriter<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{RecordingAxis, ScriptedButtonSource};

    fn writer(axis: &RecordingAxis) -> ShifterResult<GearAxisWriter<RecordingAxis>> {
        GearAxisWriter::new(axis.clone(), ButtonLayout::default(), RetentionPolicy::default())
    }

    #[test]
    fn test_startup_centers_axis() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 32768);
        let writer = writer(&axis)?;
        assert_eq!(axis.writes(), vec![16384]);
        assert_eq!(writer.last_written(), 16384);
        Ok(())
    }

    #[test]
    fn test_unavailable_axis_fails_startup() {
        let result = writer(&RecordingAxis::unavailable());
        assert!(matches!(result, Err(ShifterError::DeviceUnavailable(_))));
    }

    #[test]
    fn test_invalid_range_fails_startup() {
        let axis = RecordingAxis::new(500, 100);
        assert!(matches!(
            writer(&axis),
            Err(ShifterError::InvalidRange { min: 500, max: 100 })
        ));
        assert!(axis.writes().is_empty());
    }

    #[test]
    fn test_invalid_layout_fails_startup() {
        let axis = RecordingAxis::new(0, 100);
        let layout = ButtonLayout {
            gear_band: 8,
            seq_up: 3,
            seq_down: 9,
        };
        let result = GearAxisWriter::new(axis, layout, RetentionPolicy::default());
        assert!(matches!(result, Err(ShifterError::InvalidLayout(_))));
    }

    #[test]
    fn test_step_writes_once_per_change() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 32768);
        let mut writer = writer(&axis)?;
        let mut source = ScriptedButtonSource::new().press(&[3], 10).press(&[3], 10);

        assert_eq!(writer.poll_once(&mut source)?, Some(14745));
        assert_eq!(writer.poll_once(&mut source)?, None);
        assert_eq!(axis.writes(), vec![16384, 14745]);
        Ok(())
    }

    #[test]
    fn test_equal_value_is_not_rewritten() -> ShifterResult<()> {
        // Gear 1 and sequential down both sit at `min`.
        let axis = RecordingAxis::new(0, 32768);
        let mut writer = writer(&axis)?;
        let mut source = ScriptedButtonSource::new().press(&[0], 10).press(&[8], 10);

        assert_eq!(writer.poll_once(&mut source)?, Some(0));
        assert_eq!(writer.poll_once(&mut source)?, None);
        assert_eq!(writer.state().emitted.selection, Selection::Sequential { up: false, down: true });
        assert_eq!(axis.writes(), vec![16384, 0]);
        Ok(())
    }

    #[test]
    fn test_write_failure_surfaces_and_keeps_state() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 32768);
        let mut writer = writer(&axis)?;
        let before = *writer.state();

        axis.set_failing(true);
        let result = writer.step(Ok(vec![false, true]));
        assert!(matches!(result, Err(ShifterError::AxisWrite(_))));
        assert_eq!(*writer.state(), before);

        axis.set_failing(false);
        assert_eq!(writer.step(Ok(vec![false, true]))?, Some(4915));
        Ok(())
    }

    #[test]
    fn test_read_failure_is_absorbed() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 32768);
        let mut writer = writer(&axis)?;
        writer.step(Ok(vec![false, false, true]))?;
        let result = writer.step(Err(DeviceError::timeout("th8a", 5)))?;
        assert_eq!(result, None);
        assert_eq!(writer.state().retained_mode, ShiftMode::HPattern);
        Ok(())
    }

    #[test]
    fn test_shutdown_forces_center() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 32768);
        let mut writer = writer(&axis)?;
        writer.step(Ok(vec![false; 7].into_iter().chain([true]).collect()))?;
        assert_eq!(axis.last_write(), Some(32768));

        writer.shutdown();
        writer.shutdown();
        assert_eq!(axis.writes(), vec![16384, 32768, 16384]);
        Ok(())
    }

    #[test]
    fn test_shutdown_writes_center_even_when_already_centered() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 100);
        let mut writer = writer(&axis)?;
        writer.shutdown();
        assert_eq!(axis.writes(), vec![50, 50]);
        Ok(())
    }

    #[test]
    fn test_shutdown_failure_is_suppressed() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 100);
        let mut writer = writer(&axis)?;
        axis.set_failing(true);
        writer.shutdown();
        assert_eq!(axis.writes(), vec![50]);
        Ok(())
    }

    #[test]
    fn test_drop_recenters() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 100);
        {
            let mut writer = writer(&axis)?;
            writer.step(Ok(vec![true]))?;
        }
        assert_eq!(axis.writes(), vec![50, 0, 50]);
        Ok(())
    }

    #[test]
    fn test_step_after_shutdown_is_recentered_on_drop() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 100);
        {
            let mut writer = writer(&axis)?;
            writer.shutdown();
            assert_eq!(writer.step(Ok(vec![true]))?, Some(0));
        }
        assert_eq!(axis.writes(), vec![50, 50, 0, 50]);
        assert_eq!(axis.last_write(), Some(50));
        Ok(())
    }

    #[test]
    fn test_shutdown_without_new_writes_stays_idempotent() -> ShifterResult<()> {
        let axis = RecordingAxis::new(0, 100);
        {
            let mut writer = writer(&axis)?;
            writer.step(Ok(vec![true]))?;
            writer.shutdown();
            // All released after the reset: nothing to write, nothing to re-center.
            writer.step(Ok(vec![false]))?;
        }
        assert_eq!(axis.writes(), vec![50, 0, 50]);
        Ok(())
    }
}

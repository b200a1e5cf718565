//! Collaborator interfaces for the physical shifter and the virtual axis.

use super::ButtonVector;

/// Failure reported by an input or output collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Device not found
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Device disconnected
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// Permission denied
    #[error("Permission denied for device: {0}")]
    PermissionDenied(String),

    /// Read or write failed at the OS / driver layer
    #[error("I/O error on device {device}: {message}")]
    Io {
        /// Device identifier
        device: String,
        /// Error message
        message: String,
    },

    /// No report within the allotted time
    #[error("Device {device} timeout after {timeout_ms}ms")]
    Timeout {
        /// Device identifier
        device: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Report too short or malformed
    #[error("Invalid report from device {device}: expected {expected} bytes, got {actual}")]
    InvalidReport {
        /// Device identifier
        device: String,
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },
}

impl DeviceError {
    /// Check if this error indicates the device is unavailable.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::NotFound(_)
                | DeviceError::Disconnected(_)
                | DeviceError::PermissionDenied(_)
        )
    }

    /// Check if retrying the operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeviceError::Timeout { .. } | DeviceError::Io { .. } | DeviceError::InvalidReport { .. }
        )
    }

    pub fn not_found(device: impl Into<String>) -> Self {
        DeviceError::NotFound(device.into())
    }

    pub fn disconnected(device: impl Into<String>) -> Self {
        DeviceError::Disconnected(device.into())
    }

    pub fn io(device: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::Io {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn timeout(device: impl Into<String>, timeout_ms: u64) -> Self {
        DeviceError::Timeout {
            device: device.into(),
            timeout_ms,
        }
    }
}

/// Supplies the physical shifter's button state once per poll.
pub trait ButtonSource {
    /// Current buttons, or an error when no usable reading exists this cycle.
    fn poll(&mut self) -> Result<ButtonVector, DeviceError>;
}

/// The single virtual analog axis written by the mapper.
pub trait VirtualAxis {
    /// Inclusive `(min, max)` range the axis accepts.
    fn axis_range(&self) -> Result<(i32, i32), DeviceError>;

    fn set_axis(&mut self, value: i32) -> Result<(), DeviceError>;
}

impl<A: VirtualAxis + ?Sized> VirtualAxis for Box<A> {
    fn axis_range(&self) -> Result<(i32, i32), DeviceError> {
        (**self).axis_range()
    }

    fn set_axis(&mut self, value: i32) -> Result<(), DeviceError> {
        (**self).set_axis(value)
    }
}

impl<S: ButtonSource + ?Sized> ButtonSource for Box<S> {
    fn poll(&mut self) -> Result<ButtonVector, DeviceError> {
        (**self).poll()
    }
}

pub mod mock {
    //! In-memory collaborators for tests and dry runs.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed script of readings, then reports `Disconnected`.
    #[derive(Debug, Default)]
    pub struct ScriptedButtonSource {
        script: VecDeque<Result<ButtonVector, DeviceError>>,
        polls: usize,
    }

    impl ScriptedButtonSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a reading with the given button indices held.
        pub fn press(mut self, held: &[usize], len: usize) -> Self {
            let mut buttons = vec![false; len];
            for &index in held {
                if let Some(slot) = buttons.get_mut(index) {
                    *slot = true;
                }
            }
            self.script.push_back(Ok(buttons));
            self
        }

        pub fn release(self, len: usize) -> Self {
            self.press(&[], len)
        }

        pub fn fail(mut self, error: DeviceError) -> Self {
            self.script.push_back(Err(error));
            self
        }

        pub fn remaining(&self) -> usize {
            self.script.len()
        }

        pub fn polls(&self) -> usize {
            self.polls
        }
    }

    impl ButtonSource for ScriptedButtonSource {
        fn poll(&mut self) -> Result<ButtonVector, DeviceError> {
            self.polls = self.polls.saturating_add(1);
            self.script
                .pop_front()
                .unwrap_or_else(|| Err(DeviceError::disconnected("scripted source exhausted")))
        }
    }

    /// Records every `set_axis` call; clones share the same log.
    #[derive(Debug, Clone)]
    pub struct RecordingAxis {
        range: (i32, i32),
        writes: Arc<Mutex<Vec<i32>>>,
        fail_writes: Arc<Mutex<bool>>,
        fail_range: bool,
    }

    impl RecordingAxis {
        pub fn new(min: i32, max: i32) -> Self {
            Self {
                range: (min, max),
                writes: Arc::new(Mutex::new(Vec::new())),
                fail_writes: Arc::new(Mutex::new(false)),
                fail_range: false,
            }
        }

        /// An axis whose range query fails, as if the device went away.
        pub fn unavailable() -> Self {
            Self {
                fail_range: true,
                ..Self::new(0, 0)
            }
        }

        pub fn set_failing(&self, failing: bool) {
            let mut flag = self.fail_writes.lock().unwrap_or_else(|e| e.into_inner());
            *flag = failing;
        }

        pub fn writes(&self) -> Vec<i32> {
            self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        pub fn last_write(&self) -> Option<i32> {
            self.writes().last().copied()
        }

        pub fn write_count(&self) -> usize {
            self.writes.lock().unwrap_or_else(|e| e.into_inner()).len()
        }
    }

    impl VirtualAxis for RecordingAxis {
        fn axis_range(&self) -> Result<(i32, i32), DeviceError> {
            if self.fail_range {
                return Err(DeviceError::not_found("recording axis"));
            }
            Ok(self.range)
        }

        fn set_axis(&mut self, value: i32) -> Result<(), DeviceError> {
            if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
                return Err(DeviceError::io("recording axis", "write rejected"));
            }
            self.writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(value);
            Ok(())
        }
    }
}

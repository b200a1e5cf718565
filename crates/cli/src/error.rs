//! Error types for the gearaxis CLI

use gearaxis_shifter::{DeviceError, ShifterError};
use gearaxis_uinput::UinputError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Axis write failed: {0}")]
    AxisWrite(String),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceNotFound(_) | CliError::DeviceUnavailable(_) => 2,
            CliError::InvalidConfiguration(_) => 3,
            CliError::AxisWrite(_) => 4,
        }
    }
}

impl From<DeviceError> for CliError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::NotFound(name) => CliError::DeviceNotFound(name),
            other => CliError::DeviceUnavailable(other.to_string()),
        }
    }
}

impl From<ShifterError> for CliError {
    fn from(err: ShifterError) -> Self {
        match err {
            ShifterError::DeviceUnavailable(inner) => CliError::DeviceUnavailable(inner.to_string()),
            ShifterError::InvalidRange { .. } | ShifterError::InvalidLayout(_) => {
                CliError::InvalidConfiguration(err.to_string())
            }
            ShifterError::AxisWrite(inner) => CliError::AxisWrite(inner.to_string()),
        }
    }
}

impl From<UinputError> for CliError {
    fn from(err: UinputError) -> Self {
        match err {
            UinputError::InvalidRange { .. } => CliError::InvalidConfiguration(err.to_string()),
            UinputError::CreateDevice(_) if err.is_permission_problem() => CliError::DeviceUnavailable(
                format!("{err} (is /dev/uinput present and writable?)"),
            ),
            UinputError::CreateDevice(_) => CliError::DeviceUnavailable(err.to_string()),
        }
    }
}

/// Exit status for an error coming out of a command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CliError>())
        .map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(DeviceError::not_found("TH8")).exit_code(), 2);
        assert_eq!(CliError::from(DeviceError::PermissionDenied("hidraw3".into())).exit_code(), 2);
        assert_eq!(
            CliError::from(ShifterError::InvalidRange { min: 1, max: 0 }).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(ShifterError::InvalidLayout("band".into())).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(ShifterError::AxisWrite(DeviceError::io("uinput", "EIO"))).exit_code(),
            4
        );
        assert_eq!(
            CliError::from(ShifterError::DeviceUnavailable(DeviceError::disconnected("uinput")))
                .exit_code(),
            2
        );
        assert_eq!(CliError::from(UinputError::InvalidRange { min: 0, max: 0 }).exit_code(), 3);
    }

    #[test]
    fn test_exit_code_through_context() {
        let err = anyhow::Error::new(CliError::AxisWrite("EIO".into())).context("poll loop stopped");
        assert_eq!(exit_code(&err), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn test_uinput_permission_hint() {
        let err = CliError::from(UinputError::CreateDevice(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        )));
        assert!(err.to_string().contains("/dev/uinput"));
    }
}

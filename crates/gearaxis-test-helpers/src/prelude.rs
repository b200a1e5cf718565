//! Convenience re-exports for common test utilities.

pub use crate::buttons;
pub use crate::must::{must, must_some, must_with};
pub use crate::{assert_last_write, assert_non_decreasing};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

//! Shared test utilities for gearaxis.
//!
//! - [`mod@must`] - unwrap helpers that report the caller's location
//! - [`assertions`] - assertion macros for axis value sequences
//! - [`prelude`] - convenience re-exports
//!
//! ```rust,ignore
//! use gearaxis_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::panic)]

pub mod assertions;
pub mod must;
pub mod prelude;

pub use must::*;

/// Button vector of `len` entries with the given indices held.
pub fn buttons(held: &[usize], len: usize) -> Vec<bool> {
    (0..len).map(|index| held.contains(&index)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_sets_held_indices() {
        assert_eq!(buttons(&[1, 3], 5), vec![false, true, false, true, false]);
    }

    #[test]
    fn test_buttons_ignores_out_of_range() {
        assert_eq!(buttons(&[9], 2), vec![false, false]);
    }
}

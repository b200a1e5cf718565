//! Unwrap helpers with `#[track_caller]` so failures point at the test line.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error value.
///
/// ```rust
/// use gearaxis_test_helpers::must;
///
/// let value = must(Ok::<i32, &str>(16384));
/// assert_eq!(value, 16384);
/// ```
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Unwrap a `Result` with a context message.
#[track_caller]
pub fn must_with<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must_with: {context}: {e:?}"),
    }
}

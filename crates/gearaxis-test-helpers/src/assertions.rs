//! Assertion macros for axis value sequences.

/// Assert that a sequence never decreases.
///
/// ```rust
/// use gearaxis_test_helpers::assert_non_decreasing;
///
/// assert_non_decreasing!(&[0, 4915, 4915, 9830]);
/// ```
#[macro_export]
macro_rules! assert_non_decreasing {
    ($values:expr $(,)?) => {
        let values = $values;
        for (i, pair) in values.windows(2).enumerate() {
            if let [prev, next] = pair {
                if prev > next {
                    panic!(
                        "assertion failed: sequence decreases at index {}: {:?} > {:?}",
                        i + 1,
                        prev,
                        next
                    );
                }
            }
        }
    };
}

/// Assert the last element of a write log, with the whole log on failure.
///
/// ```rust
/// use gearaxis_test_helpers::assert_last_write;
///
/// assert_last_write!(vec![16384, 14745, 16384], 16384);
/// ```
#[macro_export]
macro_rules! assert_last_write {
    ($writes:expr, $expected:expr $(,)?) => {
        let writes = $writes;
        let expected = $expected;
        match writes.last() {
            Some(last) if *last == expected => {}
            other => panic!(
                "assertion failed: last write {:?} != {:?}\n  writes: {:?}",
                other, expected, writes
            ),
        }
    };
}

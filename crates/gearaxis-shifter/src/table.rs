//! Gear-to-axis value table

use super::{FORWARD_GEARS, NEUTRAL_GEAR, ShifterError, ShifterResult, gear_label};
use serde::Serialize;

/// Share of the axis range used by the forward gears. The top slice is left
/// empty so reverse at `max` stays well clear of the highest gear.
pub const DEFAULT_FORWARD_SPAN: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GearAxisTable {
    min: i32,
    max: i32,
    center: i32,
    /// Values for forward gears `1..=N`, in gear order.
    forward: Vec<i32>,
}

/// One printable table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GearAxisRow {
    pub gear: u8,
    pub label: String,
    pub value: i32,
}

impl GearAxisTable {
    /// Seven forward gears over the lower 90% of `[min, max]`, reverse at `max`.
    pub fn build(min: i32, max: i32) -> ShifterResult<Self> {
        Self::build_with(min, max, FORWARD_GEARS, DEFAULT_FORWARD_SPAN)
    }

    pub fn build_with(
        min: i32,
        max: i32,
        forward_gears: u8,
        forward_span: f64,
    ) -> ShifterResult<Self> {
        if max <= min || !(forward_span > 0.0 && forward_span <= 1.0) || forward_gears == 0 {
            return Err(ShifterError::InvalidRange { min, max });
        }

        let range = f64::from(max) - f64::from(min);
        let steps = f64::from(forward_gears.saturating_sub(1).max(1));
        let forward = (1..=forward_gears)
            .map(|gear| {
                let t = f64::from(gear - 1) / steps;
                // Truncation toward zero; the product never exceeds `range`.
                let offset = (range * forward_span * t) as i64;
                clamp_i32(i64::from(min) + offset)
            })
            .collect();

        let center = clamp_i32((i64::from(min) + i64::from(max)) / 2);

        Ok(Self {
            min,
            max,
            center,
            forward,
        })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn center(&self) -> i32 {
        self.center
    }

    pub fn forward_gears(&self) -> u8 {
        u8::try_from(self.forward.len()).unwrap_or(u8::MAX)
    }

    pub fn reverse_gear(&self) -> u8 {
        self.forward_gears().saturating_add(1)
    }

    /// Axis value for a logical gear. Neutral and unknown gears map to center.
    pub fn value_for(&self, logical_gear: u8) -> i32 {
        if logical_gear == NEUTRAL_GEAR {
            return self.center;
        }
        if logical_gear == self.reverse_gear() {
            return self.max;
        }
        self.forward
            .get(usize::from(logical_gear) - 1)
            .copied()
            .unwrap_or(self.center)
    }

    /// Up alone pins the axis to `max`, down alone to `min`; anything else
    /// (nothing held, or both at once) is center.
    pub fn sequential_value(&self, up: bool, down: bool) -> i32 {
        match (up, down) {
            (true, false) => self.max,
            (false, true) => self.min,
            _ => self.center,
        }
    }

    /// Forward gears followed by reverse, for display.
    pub fn rows(&self) -> Vec<GearAxisRow> {
        let reverse = self.reverse_gear();
        (1..=reverse)
            .map(|gear| GearAxisRow {
                gear,
                label: gear_label(gear, reverse),
                value: self.value_for(gear),
            })
            .collect()
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn render(table: &GearAxisTable) -> String {
        table
            .rows()
            .iter()
            .map(|row| format!("Gear {} => {}", row.label, row.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_vjoy_default_range() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(0, 32768)?;
        assert_eq!(table.center(), 16384);
        assert_eq!(table.value_for(1), 0);
        assert_eq!(table.value_for(4), 14745);
        assert_eq!(table.value_for(7), 29491);
        assert_eq!(table.value_for(8), 32768);
        assert_eq!(table.value_for(0), 16384);
        Ok(())
    }

    #[test]
    fn test_table_rendering() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(0, 32768)?;
        assert_snapshot!(render(&table), @r"
        Gear 1 => 0
        Gear 2 => 4915
        Gear 3 => 9830
        Gear 4 => 14745
        Gear 5 => 19660
        Gear 6 => 24576
        Gear 7 => 29491
        Gear R => 32768
        ");
        Ok(())
    }

    #[test]
    fn test_signed_range() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(-32767, 32767)?;
        assert_eq!(table.center(), 0);
        assert_eq!(table.value_for(1), -32767);
        assert_eq!(table.value_for(8), 32767);
        assert!(table.value_for(7) < table.value_for(8));
        Ok(())
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(matches!(
            GearAxisTable::build(100, 100),
            Err(ShifterError::InvalidRange { min: 100, max: 100 })
        ));
        assert!(matches!(
            GearAxisTable::build(10, -10),
            Err(ShifterError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_invalid_span_rejected() {
        assert!(GearAxisTable::build_with(0, 1000, 7, 0.0).is_err());
        assert!(GearAxisTable::build_with(0, 1000, 7, 1.5).is_err());
        assert!(GearAxisTable::build_with(0, 1000, 7, f64::NAN).is_err());
        assert!(GearAxisTable::build_with(0, 1000, 0, 0.9).is_err());
    }

    #[test]
    fn test_single_forward_gear() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build_with(0, 1000, 1, 0.9)?;
        assert_eq!(table.value_for(1), 0);
        assert_eq!(table.reverse_gear(), 2);
        assert_eq!(table.value_for(2), 1000);
        Ok(())
    }

    #[test]
    fn test_out_of_table_gear_is_center() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(0, 1000)?;
        assert_eq!(table.value_for(42), table.center());
        Ok(())
    }

    #[test]
    fn test_sequential_values() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(0, 32768)?;
        assert_eq!(table.sequential_value(true, false), 32768);
        assert_eq!(table.sequential_value(false, true), 0);
        assert_eq!(table.sequential_value(false, false), 16384);
        assert_eq!(table.sequential_value(true, true), 16384);
        Ok(())
    }

    #[test]
    fn test_extreme_range_does_not_overflow() -> Result<(), Box<dyn std::error::Error>> {
        let table = GearAxisTable::build(i32::MIN, i32::MAX)?;
        assert_eq!(table.value_for(1), i32::MIN);
        assert_eq!(table.value_for(8), i32::MAX);
        assert_eq!(table.center(), 0);
        Ok(())
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_table_is_monotonic(min in -100_000i32..100_000, spread in 1i32..200_000) {
            let max = min + spread;
            let table = GearAxisTable::build(min, max).map_err(|e| TestCaseError::fail(e.to_string()))?;
            for gear in 1u8..7 {
                prop_assert!(table.value_for(gear) <= table.value_for(gear + 1));
            }
            prop_assert_eq!(table.value_for(8), max);
            prop_assert!(table.value_for(8) > table.value_for(7));
            prop_assert_eq!(table.value_for(1), min);
        }

        #[test]
        fn prop_center_within_range(min in -100_000i32..100_000, spread in 1i32..200_000) {
            let max = min + spread;
            let table = GearAxisTable::build(min, max).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(table.center() >= min && table.center() <= max);
        }
    }
}

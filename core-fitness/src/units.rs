//! Weight unit conversion.
//!
//! Writes convert pounds to kilograms with the exact international pound;
//! reads convert kilograms back with the rounded factor the platform apps
//! display. The two factors are not inverses, so a pound→kg→pound round
//! trip drifts by about 1e-5 relative.

use bridge_traits::WeightUnit;

/// Exact international avoirdupois pound.
pub const KILOGRAMS_PER_POUND: f64 = 0.45359237;

pub const POUNDS_PER_KILOGRAM: f64 = 2.2046;

pub const OUNCES_PER_POUND: f64 = 16.0;

/// Imperial weight split into pounds and ounces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Imperial {
    pub pounds: f64,
    pub ounces: f64,
}

impl Imperial {
    pub fn pounds(pounds: f64) -> Self {
        Self {
            pounds,
            ounces: 0.0,
        }
    }
}

pub fn imperial_to_kilograms(weight: Imperial) -> f64 {
    (weight.pounds + weight.ounces / OUNCES_PER_POUND) * KILOGRAMS_PER_POUND
}

pub fn kilograms_to_pounds(kilograms: f64) -> f64 {
    kilograms * POUNDS_PER_KILOGRAM
}

/// Value in `unit` to the kilograms the host stores.
pub fn to_kilograms(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kilogram => value,
        WeightUnit::Pound => imperial_to_kilograms(Imperial::pounds(value)),
    }
}

/// Host kilograms to the caller's `unit`.
pub fn from_kilograms(kilograms: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kilogram => kilograms,
        WeightUnit::Pound => kilograms_to_pounds(kilograms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_pounds_to_kilograms() {
        assert!(close(to_kilograms(150.0, WeightUnit::Pound), 68.0389, 1e-4));
        assert!(close(to_kilograms(1.0, WeightUnit::Pound), KILOGRAMS_PER_POUND, 1e-12));
    }

    #[test]
    fn test_ounces_contribute_sixteenths() {
        let kg = imperial_to_kilograms(Imperial {
            pounds: 10.0,
            ounces: 8.0,
        });
        assert!(close(kg, 10.5 * KILOGRAMS_PER_POUND, 1e-12));
    }

    #[test]
    fn test_kilograms_untouched_for_metric() {
        assert_eq!(to_kilograms(72.5, WeightUnit::Kilogram), 72.5);
        assert_eq!(from_kilograms(72.5, WeightUnit::Kilogram), 72.5);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        for original in [0.5, 1.0, 99.9, 150.0, 320.0] {
            let back = from_kilograms(to_kilograms(original, WeightUnit::Pound), WeightUnit::Pound);
            assert!(
                close(back, original, original * 1e-3),
                "{original} came back as {back}"
            );
        }
    }
}

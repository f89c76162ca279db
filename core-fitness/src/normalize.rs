//! Reshaping of host sample payloads into caller records.
//!
//! Elements the host sends with a missing measurement are dropped here, not
//! reported as errors. A distance or weight of exactly zero (or NaN) counts
//! as missing, matching the host bridges this replaces.

use std::collections::HashMap;

use bridge_traits::{
    DataSourceInfo, NativeDistanceSample, NativeSourceSteps, NativeStepSample,
    NativeWeightSample, WeightUnit,
};
use core_runtime::TimeZonePolicy;

use crate::dates::to_iso_string;
use crate::models::{DailyStepEntry, DistanceSample, SourcedSteps, WeightSample};
use crate::units::from_kilograms;

/// `appPackage`, or `appPackage:stream` when the source names a stream.
pub fn source_label(source: &DataSourceInfo) -> String {
    match source.stream.as_deref() {
        Some(stream) if !stream.is_empty() => format!("{}:{}", source.app_package, stream),
        _ => source.app_package.clone(),
    }
}

/// Sum step samples into one entry per calendar day.
///
/// Days appear in the order they are first seen. Gaps and samples without a
/// step count are skipped and never open a day on their own.
pub fn build_daily_steps(
    samples: &[Option<NativeStepSample>],
    zone: TimeZonePolicy,
) -> Vec<DailyStepEntry> {
    let mut entries: Vec<DailyStepEntry> = Vec::new();
    let mut by_day: HashMap<String, usize> = HashMap::new();

    for sample in samples.iter().flatten() {
        let Some(steps) = sample.steps else {
            continue;
        };

        let day = zone.day_key(sample.start_date);
        match by_day.get(&day) {
            Some(&index) => {
                let entry = &mut entries[index];
                entry.value = entry.value.saturating_add(steps);
            }
            None => {
                by_day.insert(day.clone(), entries.len());
                entries.push(DailyStepEntry { date: day, value: steps });
            }
        }
    }

    entries
}

pub fn normalize_step_sources(
    sources: Vec<NativeSourceSteps>,
    zone: TimeZonePolicy,
) -> Vec<SourcedSteps> {
    sources
        .into_iter()
        .map(|entry| SourcedSteps {
            source: source_label(&entry.source),
            steps: build_daily_steps(&entry.steps, zone),
        })
        .collect()
}

pub fn normalize_distance_samples(samples: Vec<NativeDistanceSample>) -> Vec<DistanceSample> {
    samples
        .into_iter()
        .filter_map(|sample| {
            let distance = present(sample.distance)?;
            Some(DistanceSample {
                start_date: to_iso_string(sample.start_date),
                end_date: to_iso_string(sample.end_date),
                distance,
            })
        })
        .collect()
}

/// Drop empty weights and convert the rest from host kilograms to `unit`.
pub fn normalize_weight_samples(
    samples: Vec<NativeWeightSample>,
    unit: WeightUnit,
) -> Vec<WeightSample> {
    samples
        .into_iter()
        .filter_map(|sample| {
            let kilograms = present(sample.value)?;
            Some(WeightSample {
                start_date: to_iso_string(sample.start_date),
                end_date: to_iso_string(sample.end_date),
                value: from_kilograms(kilograms, unit),
            })
        })
        .collect()
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn step(start: DateTime<Utc>, steps: Option<u64>) -> Option<NativeStepSample> {
        Some(NativeStepSample {
            start_date: start,
            steps,
        })
    }

    #[test]
    fn test_source_label() {
        let bare = DataSourceInfo {
            app_package: "com.google.android.gms".to_string(),
            stream: None,
        };
        assert_eq!(source_label(&bare), "com.google.android.gms");

        let streamed = DataSourceInfo {
            app_package: "com.google.android.gms".to_string(),
            stream: Some("estimated_steps".to_string()),
        };
        assert_eq!(source_label(&streamed), "com.google.android.gms:estimated_steps");

        let empty_stream = DataSourceInfo {
            app_package: "com.fitbit".to_string(),
            stream: Some(String::new()),
        };
        assert_eq!(source_label(&empty_stream), "com.fitbit");
    }

    #[test]
    fn test_daily_buckets_sum_per_day() {
        let samples = vec![
            step(at(2024, 1, 1, 8), Some(100)),
            step(at(2024, 1, 1, 9), Some(50)),
            step(at(2024, 1, 2, 10), Some(200)),
        ];

        let days = build_daily_steps(&samples, TimeZonePolicy::Utc);
        assert_eq!(
            days,
            vec![
                DailyStepEntry {
                    date: "2024-01-01".to_string(),
                    value: 150
                },
                DailyStepEntry {
                    date: "2024-01-02".to_string(),
                    value: 200
                },
            ]
        );
    }

    #[test]
    fn test_bucket_order_follows_first_occurrence() {
        let samples = vec![
            step(at(2024, 3, 5, 8), Some(1)),
            step(at(2024, 3, 4, 8), Some(2)),
            step(at(2024, 3, 5, 20), Some(3)),
        ];

        let days = build_daily_steps(&samples, TimeZonePolicy::Utc);
        let order: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(order, vec!["2024-03-05", "2024-03-04"]);
        assert_eq!(days[0].value, 4);
    }

    #[test]
    fn test_gaps_and_missing_counts_never_open_a_day() {
        let samples = vec![
            None,
            step(at(2024, 1, 1, 8), None),
            step(at(2024, 1, 2, 8), Some(7)),
            None,
        ];

        let days = build_daily_steps(&samples, TimeZonePolicy::Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "2024-01-02");
        assert_eq!(days[0].value, 7);
    }

    #[test]
    fn test_zero_steps_still_counts_as_a_day() {
        let days = build_daily_steps(&[step(at(2024, 1, 1, 8), Some(0))], TimeZonePolicy::Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].value, 0);
    }

    #[test]
    fn test_day_key_follows_zone() {
        let late_evening = step(at(2024, 1, 1, 23), Some(10));
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc = build_daily_steps(std::slice::from_ref(&late_evening), TimeZonePolicy::Utc);
        let shifted = build_daily_steps(&[late_evening], TimeZonePolicy::Fixed(plus_two));

        assert_eq!(utc[0].date, "2024-01-01");
        assert_eq!(shifted[0].date, "2024-01-02");
    }

    #[test]
    fn test_distance_drops_empty_samples() {
        let sample = |distance| NativeDistanceSample {
            start_date: at(2024, 1, 1, 8),
            end_date: at(2024, 1, 1, 9),
            distance,
        };
        let input = vec![
            sample(Some(1200.0)),
            sample(None),
            sample(Some(0.0)),
            sample(Some(f64::NAN)),
            sample(Some(35.5)),
        ];

        let out = normalize_distance_samples(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].start_date, "2024-01-01T08:00:00.000Z");
        assert_eq!(out[0].end_date, "2024-01-01T09:00:00.000Z");
        assert_eq!(out[1].distance, 35.5);
    }

    #[test]
    fn test_weight_converted_to_requested_unit() {
        let input = vec![
            NativeWeightSample {
                start_date: at(2024, 1, 1, 7),
                end_date: at(2024, 1, 1, 7),
                value: Some(70.0),
            },
            NativeWeightSample {
                start_date: at(2024, 1, 2, 7),
                end_date: at(2024, 1, 2, 7),
                value: None,
            },
        ];

        let kilos = normalize_weight_samples(input.clone(), WeightUnit::Kilogram);
        assert_eq!(kilos.len(), 1);
        assert_eq!(kilos[0].value, 70.0);

        let pounds = normalize_weight_samples(input, WeightUnit::Pound);
        assert!((pounds[0].value - 154.322).abs() < 1e-9);
    }

    #[test]
    fn test_weight_drops_zero_and_nan() {
        let sample = |value| NativeWeightSample {
            start_date: at(2024, 1, 1, 7),
            end_date: at(2024, 1, 1, 7),
            value,
        };
        let input = vec![
            sample(Some(0.0)),
            sample(Some(f64::NAN)),
            sample(Some(71.2)),
            sample(None),
        ];

        let out = normalize_weight_samples(input, WeightUnit::Kilogram);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 71.2);
    }
}

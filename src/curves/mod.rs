//! Reshapes lap telemetry into the series the charts plot.
//!
//! Every builder is a single pass over an already loaded series. Row order is
//! kept as recorded, nothing is resampled or deduplicated here.

pub mod colormap;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::errors::{Channel, FastlapError};
use crate::telemetry::{Lap, TelemetrySample, require};

pub use colormap::{Colormap, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpeedPoint {
    pub time_s: f64,
    pub speed_kph: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackPoint {
    pub x: f32,
    pub y: f32,
    pub speed_kph: f32,
}

/// Line between two consecutive samples, colored by the leading sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackSegment {
    pub start: TrackPoint,
    pub end: TrackPoint,
    /// Leading sample speed normalized over the whole lap, in [0, 1]
    pub color_value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrackCurve {
    pub points: Vec<TrackPoint>,
    pub segments: Vec<TrackSegment>,
    /// `None` when the curve has no points
    pub normalizer: Option<SpeedNormalizer>,
}

/// Linear map of `[min, max]` speed onto `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpeedNormalizer {
    pub min_kph: f32,
    pub max_kph: f32,
}

impl SpeedNormalizer {
    pub fn from_speeds(speeds: impl IntoIterator<Item = f32>) -> Option<Self> {
        match speeds.into_iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some(Self {
                min_kph: v,
                max_kph: v,
            }),
            MinMaxResult::MinMax(min_kph, max_kph) => Some(Self { min_kph, max_kph }),
        }
    }

    /// A flat lap (all speeds equal) maps everything to 0
    pub fn normalize(&self, speed_kph: f32) -> f64 {
        let range = f64::from(self.max_kph) - f64::from(self.min_kph);
        if range <= 0.0 {
            return 0.0;
        }
        (f64::from(speed_kph) - f64::from(self.min_kph)) / range
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub mean_kph: f64,
    pub max_kph: f64,
    pub min_kph: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LapTimePoint {
    pub lap_number: u32,
    pub lap_time_s: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DistancePoint {
    pub distance_m: f64,
    pub speed_kph: f32,
}

/// (Time, Speed) for every row of the lap, in order.
pub fn build_speed_curve(telemetry: &[TelemetrySample]) -> Result<Vec<SpeedPoint>, FastlapError> {
    if telemetry.is_empty() {
        return Err(FastlapError::EmptySeries {
            series: "telemetry",
        });
    }
    telemetry
        .iter()
        .map(|sample| {
            Ok(SpeedPoint {
                time_s: require(sample.time_s, Channel::Time)?,
                speed_kph: require(sample.speed_kph, Channel::Speed)?,
            })
        })
        .collect()
}

/// Track outline with one speed-colored segment per pair of consecutive
/// samples. Fewer than two samples is a valid, empty track.
pub fn build_track_curve(telemetry: &[TelemetrySample]) -> Result<TrackCurve, FastlapError> {
    let points = telemetry
        .iter()
        .map(|sample| {
            Ok(TrackPoint {
                x: require(sample.x, Channel::X)?,
                y: require(sample.y, Channel::Y)?,
                speed_kph: require(sample.speed_kph, Channel::Speed)?,
            })
        })
        .collect::<Result<Vec<_>, FastlapError>>()?;

    let normalizer = SpeedNormalizer::from_speeds(points.iter().map(|p| p.speed_kph));
    let segments = match normalizer {
        Some(normalizer) => points
            .iter()
            .tuple_windows()
            .map(|(start, end)| TrackSegment {
                start: *start,
                end: *end,
                color_value: normalizer.normalize(start.speed_kph),
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(TrackCurve {
        points,
        segments,
        normalizer,
    })
}

/// Speed column of a lap, failing if any row lacks it
pub fn speed_series(telemetry: &[TelemetrySample]) -> Result<Vec<f32>, FastlapError> {
    telemetry
        .iter()
        .map(|sample| require(sample.speed_kph, Channel::Speed))
        .collect()
}

/// Mean, max and min of a speed series. A NaN or infinite speed is not a
/// reading and fails the whole series.
pub fn build_summary_statistics(speeds: &[f32]) -> Result<SummaryStatistics, FastlapError> {
    if speeds.iter().any(|v| !v.is_finite()) {
        return Err(FastlapError::MissingField {
            channel: Channel::Speed,
        });
    }
    let normalizer = SpeedNormalizer::from_speeds(speeds.iter().copied())
        .ok_or(FastlapError::EmptySeries { series: "speed" })?;
    let min_kph = f64::from(normalizer.min_kph);
    let max_kph = f64::from(normalizer.max_kph);
    let sum: f64 = speeds.iter().map(|v| f64::from(*v)).sum();
    // rounding in the sum can land a hair outside the extrema
    let mean_kph = (sum / speeds.len() as f64).clamp(min_kph, max_kph);
    Ok(SummaryStatistics {
        mean_kph,
        max_kph,
        min_kph,
    })
}

/// (Distance, Speed) for every row of the lap, in order.
pub fn build_speed_distance_curve(
    telemetry: &[TelemetrySample],
) -> Result<Vec<DistancePoint>, FastlapError> {
    if telemetry.is_empty() {
        return Err(FastlapError::EmptySeries {
            series: "telemetry",
        });
    }
    telemetry
        .iter()
        .map(|sample| {
            Ok(DistancePoint {
                distance_m: require(sample.distance_m, Channel::Distance)?,
                speed_kph: require(sample.speed_kph, Channel::Speed)?,
            })
        })
        .collect()
}

/// (LapNumber, LapTime) for each timed lap. Untimed laps are left out as gaps.
pub fn build_lap_time_curve(laps: &[&Lap]) -> Result<Vec<LapTimePoint>, FastlapError> {
    if laps.is_empty() {
        return Err(FastlapError::EmptySeries { series: "laps" });
    }
    let curve: Vec<LapTimePoint> = laps
        .iter()
        .filter_map(|lap| {
            lap.lap_time_s
                .filter(|t| t.is_finite())
                .map(|lap_time_s| LapTimePoint {
                    lap_number: lap.lap_number,
                    lap_time_s,
                })
        })
        .collect();
    if curve.is_empty() {
        return Err(FastlapError::MissingField {
            channel: Channel::LapTime,
        });
    }
    Ok(curve)
}

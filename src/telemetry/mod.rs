pub mod cache;
pub mod loader;
pub mod store;
pub mod writer;

use std::{borrow::Cow, fmt, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::Velocity,
    velocity::{kilometer_per_hour, meter_per_second},
};

use crate::errors::{Channel, FastlapError};

pub use cache::CachedSessionProvider;
pub use store::{EventSummary, SessionProvider, SessionStore};

/// One row of car telemetry recorded during a lap. Every channel is optional,
/// a series lacks a channel when any of its rows lacks it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    /// Elapsed time since the start of the lap, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    /// Car speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kph: Option<f32>,
    /// Planar position, track-local units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Meters driven since the start of the lap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum SessionType {
    FP1,
    FP2,
    FP3,
    Q,
    R,
}

impl SessionType {
    pub const ALL: [SessionType; 5] = [
        SessionType::FP1,
        SessionType::FP2,
        SessionType::FP3,
        SessionType::Q,
        SessionType::R,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SessionType::FP1 => "FP1",
            SessionType::FP2 => "FP2",
            SessionType::FP3 => "FP3",
            SessionType::Q => "Q",
            SessionType::R => "R",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            SessionType::FP1 => "Practice 1",
            SessionType::FP2 => "Practice 2",
            SessionType::FP3 => "Practice 3",
            SessionType::Q => "Qualifying",
            SessionType::R => "Race",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionType {
    type Err = FastlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SessionType::ALL
            .into_iter()
            .find(|t| {
                t.code().eq_ignore_ascii_case(wanted) || t.long_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| FastlapError::InvalidUserInput {
                field: "session".to_string(),
                reason: format!("'{wanted}' is not one of FP1, FP2, FP3, Q, R"),
            })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub year: u32,
    pub event_name: String,
    pub session: SessionType,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            year: 0,
            event_name: "Unknown".to_string(),
            session: SessionType::R,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lap {
    pub driver: String,
    pub lap_number: u32,
    /// Lap time in seconds, `None` for laps without a valid time (in/out laps, red flags)
    pub lap_time_s: Option<f64>,
    pub telemetry: Vec<TelemetrySample>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub info: SessionInfo,
    pub laps: Vec<Lap>,
}

impl Session {
    /// Driver codes in order of first appearance
    pub fn drivers(&self) -> Vec<String> {
        self.laps
            .iter()
            .map(|lap| lap.driver.clone())
            .unique()
            .collect()
    }

    pub fn pick_driver(&self, driver: &str) -> Vec<&Lap> {
        self.laps
            .iter()
            .filter(|lap| lap.driver.eq_ignore_ascii_case(driver))
            .collect()
    }

    /// The driver's lap with the minimum lap time. Ties go to the earlier lap.
    pub fn pick_fastest(&self, driver: &str) -> Result<&Lap, FastlapError> {
        let laps = self.pick_driver(driver);
        if laps.is_empty() {
            return Err(FastlapError::DriverNotFound {
                driver: driver.to_string(),
            });
        }
        laps.into_iter()
            .filter_map(|lap| {
                lap.lap_time_s
                    .filter(|t| t.is_finite())
                    .map(|lap_time| (lap, lap_time))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(lap, _)| lap)
            .ok_or_else(|| FastlapError::NoTimedLap {
                driver: driver.to_string(),
            })
    }

    pub fn pick_lap(&self, driver: &str, lap_number: u32) -> Result<&Lap, FastlapError> {
        let laps = self.pick_driver(driver);
        if laps.is_empty() {
            return Err(FastlapError::DriverNotFound {
                driver: driver.to_string(),
            });
        }
        laps.into_iter()
            .find(|lap| lap.lap_number == lap_number)
            .ok_or_else(|| FastlapError::LapNotFound {
                driver: driver.to_string(),
                lap_number,
            })
    }
}

pub(crate) fn require<T>(value: Option<T>, channel: Channel) -> Result<T, FastlapError> {
    value.ok_or(FastlapError::MissingField { channel })
}

/// Cumulative distance driven at each sample, integrating speed over time.
/// The first sample covers the time elapsed since the lap started.
pub fn integrate_distance(telemetry: &[TelemetrySample]) -> Result<Vec<f64>, FastlapError> {
    let mut distances = Vec::with_capacity(telemetry.len());
    let mut prev_time = 0.0;
    let mut total = 0.0;
    for sample in telemetry {
        let time = require(sample.time_s, Channel::Time)?;
        let speed = require(sample.speed_kph, Channel::Speed)?;
        let speed_mps =
            Velocity::new::<kilometer_per_hour>(f64::from(speed)).get::<meter_per_second>();
        total += speed_mps * (time - prev_time);
        distances.push(total);
        prev_time = time;
    }
    Ok(distances)
}

/// Borrows the series when every row carries a distance, otherwise returns a
/// copy with distance filled in from [`integrate_distance`].
pub fn with_distance(
    telemetry: &[TelemetrySample],
) -> Result<Cow<'_, [TelemetrySample]>, FastlapError> {
    if telemetry.iter().all(|s| s.distance_m.is_some()) {
        return Ok(Cow::Borrowed(telemetry));
    }
    let distances = integrate_distance(telemetry)?;
    Ok(Cow::Owned(
        telemetry
            .iter()
            .zip(distances)
            .map(|(sample, distance)| TelemetrySample {
                distance_m: Some(distance),
                ..sample.clone()
            })
            .collect(),
    ))
}

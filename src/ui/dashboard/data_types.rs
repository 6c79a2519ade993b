use std::fmt;
use std::sync::Arc;

use crate::telemetry::{Session, SessionType};

#[derive(Clone)]
pub enum UiState {
    /// Nothing selected yet or the store is empty
    Idle,
    Error { message: String },
    Display { session: Arc<Session> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    SpeedPlot,
    LapTimes,
    SpeedDistance,
    SummaryStatistics,
    TrackMap,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::SpeedPlot,
        Page::LapTimes,
        Page::SpeedDistance,
        Page::SummaryStatistics,
        Page::TrackMap,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::SpeedPlot => "Speed Plot",
            Page::LapTimes => "Lap Times",
            Page::SpeedDistance => "Speed vs. Distance",
            Page::SummaryStatistics => "Summary Statistics",
            Page::TrackMap => "Track Map",
        }
    }

    /// What is missing when the page has nothing to show
    pub fn data_name(&self) -> &'static str {
        match self {
            Page::SpeedPlot => "speed",
            Page::LapTimes => "lap times",
            Page::SpeedDistance => "speed vs. distance",
            Page::SummaryStatistics => "summary statistics",
            Page::TrackMap => "track position",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LapSelection {
    #[default]
    Fastest,
    Number(u32),
}

impl fmt::Display for LapSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LapSelection::Fastest => f.write_str("Fastest"),
            LapSelection::Number(n) => write!(f, "Lap {}", n),
        }
    }
}

/// The session a selection points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKey {
    pub year: u32,
    pub track: String,
    pub session: SessionType,
}

// Error types for fastlap

use std::{fmt, io, path::PathBuf};

use snafu::Snafu;

use crate::telemetry::SessionType;

/// Telemetry and lap columns the curve builders read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Time,
    Speed,
    X,
    Y,
    Distance,
    LapTime,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Time => "Time",
            Channel::Speed => "Speed",
            Channel::X => "X",
            Channel::Y => "Y",
            Channel::Distance => "Distance",
            Channel::LapTime => "LapTime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Snafu)]
pub enum FastlapError {
    // Curve building errors
    #[snafu(display("Required field {channel} is missing from the series"))]
    MissingField { channel: Channel },
    #[snafu(display("The {series} series has no rows"))]
    EmptySeries { series: &'static str },

    // Lap selection errors
    #[snafu(display("No laps found for driver {driver}"))]
    DriverNotFound { driver: String },
    #[snafu(display("Driver {driver} has no timed lap in this session"))]
    NoTimedLap { driver: String },
    #[snafu(display("Lap {lap_number} not found for driver {driver}"))]
    LapNotFound { driver: String, lap_number: u32 },

    // Session lookup errors
    #[snafu(display("No event matching '{track}' found for {year}"))]
    EventNotFound { year: u32, track: String },
    #[snafu(display("Session {session} not recorded for {event} {year}"))]
    SessionNotFound {
        year: u32,
        event: String,
        session: SessionType,
    },

    // Session file errors
    #[snafu(display("Error loading session file"))]
    SessionLoaderError { source: io::Error },
    #[snafu(display("Invalid session file {}: {reason}", path.display()))]
    InvalidSessionFile { path: PathBuf, reason: String },
    #[snafu(display("Error writing session file"))]
    WriterError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Boundary errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
    #[snafu(display("Chart rendering failed: {reason}"))]
    RenderError { reason: String },
    #[snafu(display("Could not start dashboard: {reason}"))]
    DashboardError { reason: String },
    #[snafu(display("API server error"))]
    ServerError { source: io::Error },
}

impl FastlapError {
    /// Errors that mean "nothing to show for this selection" rather than a
    /// failure. Boundaries turn these into a warning for the user.
    pub fn is_data_absence(&self) -> bool {
        matches!(
            self,
            FastlapError::MissingField { .. }
                | FastlapError::EmptySeries { .. }
                | FastlapError::DriverNotFound { .. }
                | FastlapError::NoTimedLap { .. }
                | FastlapError::LapNotFound { .. }
        )
    }
}

/// The warning shown in place of a chart when the selection has no data.
pub fn no_data_warning(what: &str, driver: &str) -> String {
    format!("No {what} data available for driver {driver} in this session.")
}

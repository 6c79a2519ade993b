use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Lap, Session, SessionInfo, TelemetrySample};
use crate::FastlapError;

/// One line of a session file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SessionRecord {
    SessionStart(SessionInfo),
    Lap(LapHeader),
    Sample(LapSample),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapHeader {
    pub driver: String,
    pub lap_number: u32,
    #[serde(default)]
    pub lap_time_s: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapSample {
    pub driver: String,
    pub lap_number: u32,
    #[serde(flatten)]
    pub sample: TelemetrySample,
}

pub fn load_session_jsonl(source_file: &Path) -> Result<Session, FastlapError> {
    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| FastlapError::SessionLoaderError { source: e })?
        .collect::<Result<Vec<SessionRecord>, io::Error>>()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                FastlapError::InvalidSessionFile {
                    path: source_file.to_path_buf(),
                    reason: e.to_string(),
                }
            } else {
                FastlapError::SessionLoaderError { source: e }
            }
        })?;

    let invalid = |reason: &str| FastlapError::InvalidSessionFile {
        path: source_file.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut info: Option<SessionInfo> = None;
    let mut laps: Vec<Lap> = Vec::new();
    // (driver, lap number) -> position in `laps`
    let mut lap_index: HashMap<(String, u32), usize> = HashMap::new();
    let mut lap_slot = |laps: &mut Vec<Lap>, driver: String, lap_number: u32| -> usize {
        // driver codes are matched case-insensitively everywhere else
        let driver = driver.trim().to_uppercase();
        *lap_index
            .entry((driver.clone(), lap_number))
            .or_insert_with(|| {
                laps.push(Lap {
                    driver,
                    lap_number,
                    ..Default::default()
                });
                laps.len() - 1
            })
    };

    for record in records {
        match record {
            SessionRecord::SessionStart(session_info) => {
                if info.is_some() {
                    return Err(invalid("more than one SessionStart record"));
                }
                info = Some(session_info);
            }
            SessionRecord::Lap(header) => {
                if info.is_none() {
                    return Err(invalid("Lap record before SessionStart"));
                }
                let slot = lap_slot(&mut laps, header.driver, header.lap_number);
                laps[slot].lap_time_s = header.lap_time_s;
            }
            SessionRecord::Sample(point) => {
                if info.is_none() {
                    return Err(invalid("Sample record before SessionStart"));
                }
                let slot = lap_slot(&mut laps, point.driver, point.lap_number);
                laps[slot].telemetry.push(point.sample);
            }
        }
    }

    let info = info.ok_or_else(|| invalid("missing SessionStart record"))?;
    let session = Session { info, laps };
    info!(
        "Loaded {:?}: {} {} {} with {} laps from {} drivers",
        source_file,
        session.info.year,
        session.info.event_name,
        session.info.session,
        session.laps.len(),
        session.drivers().len()
    );
    Ok(session)
}

/// Reads only the header of a session file. Returns `None` when the first line
/// is not a `SessionStart` record.
pub fn read_session_header(source_file: &Path) -> Result<Option<SessionInfo>, FastlapError> {
    let file = File::open(source_file).map_err(|e| FastlapError::SessionLoaderError { source: e })?;
    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    reader
        .read_line(&mut first_line)
        .map_err(|e| FastlapError::SessionLoaderError { source: e })?;

    match serde_json::from_str::<SessionRecord>(&first_line) {
        Ok(SessionRecord::SessionStart(info)) => Ok(Some(info)),
        Ok(_) => Ok(None),
        Err(e) => {
            debug!("Unreadable session header in {:?}: {}", source_file, e);
            Ok(None)
        }
    }
}

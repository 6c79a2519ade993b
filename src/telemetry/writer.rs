use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::{
    Session,
    loader::{LapHeader, LapSample, SessionRecord},
};
use crate::FastlapError;

/// Writes a session in the JSON Lines layout `load_session_jsonl` reads: the
/// header, then for each lap its `Lap` record followed by its samples.
pub fn write_session_jsonl(file: &Path, session: &Session) -> Result<(), FastlapError> {
    let session_file = File::create(file).map_err(|e| FastlapError::WriterError { source: e })?;
    let mut session_file_writer = BufWriter::new(session_file);

    write_record(
        &mut session_file_writer,
        &SessionRecord::SessionStart(session.info.clone()),
    )?;
    for lap in &session.laps {
        write_record(
            &mut session_file_writer,
            &SessionRecord::Lap(LapHeader {
                driver: lap.driver.clone(),
                lap_number: lap.lap_number,
                lap_time_s: lap.lap_time_s,
            }),
        )?;
        for sample in &lap.telemetry {
            write_record(
                &mut session_file_writer,
                &SessionRecord::Sample(LapSample {
                    driver: lap.driver.clone(),
                    lap_number: lap.lap_number,
                    sample: sample.clone(),
                }),
            )?;
        }
    }
    session_file_writer
        .flush()
        .map_err(|e| FastlapError::WriterError { source: e })?;
    Ok(())
}

fn write_record(writer: &mut impl Write, record: &SessionRecord) -> Result<(), FastlapError> {
    serde_json::to_writer(&mut *writer, record)
        .map_err(|e| FastlapError::WriterError { source: e.into() })?;
    writeln!(writer).map_err(|e| FastlapError::WriterError { source: e })
}

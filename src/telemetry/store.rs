// Recorded session storage: one JSON Lines file per session under
// <root>/<year>/<event slug>/<SESSION>.jsonl

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    Session, SessionType,
    loader::{load_session_jsonl, read_session_header},
    writer::write_session_jsonl,
};
use crate::FastlapError;

/// Source of loaded sessions for the API and the dashboard.
pub trait SessionProvider: Send + Sync {
    /// Resolve `track` for `year` and load the requested session
    fn load_session(
        &self,
        year: u32,
        track: &str,
        session: SessionType,
    ) -> Result<Arc<Session>, FastlapError>;

    /// Canonical name of the event `track` refers to. Every spelling that
    /// loads the same event resolves to the same name.
    fn resolve_track(&self, _year: u32, track: &str) -> Result<String, FastlapError> {
        Ok(SessionStore::normalize_event_name(track))
    }

    /// Every recorded event with the sessions available for it
    fn event_schedule(&self) -> Result<Vec<EventSummary>, FastlapError>;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub year: u32,
    pub event_name: String,
    pub slug: String,
    pub sessions: Vec<SessionType>,
}

pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Result<Self, FastlapError> {
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| FastlapError::SessionLoaderError { source: e })?;
        }
        Ok(Self { root })
    }

    pub fn default_storage_path() -> Result<PathBuf, FastlapError> {
        let app_data_dir = dirs::data_dir().ok_or(FastlapError::NoConfigDir)?;
        Ok(app_data_dir.join("fastlap").join("sessions"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize event name for consistent directory naming and lookups
    pub fn normalize_event_name(event_name: &str) -> String {
        event_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn session_file(&self, year: u32, slug: &str, session: SessionType) -> PathBuf {
        self.root
            .join(year.to_string())
            .join(slug)
            .join(format!("{}.jsonl", session.code()))
    }

    /// Event directory slugs recorded for a year, sorted
    fn event_slugs(&self, year: u32) -> Result<Vec<String>, FastlapError> {
        let year_dir = self.root.join(year.to_string());
        if !year_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut slugs = list_dir_names(&year_dir)?;
        slugs.sort();
        Ok(slugs)
    }

    /// Exact slug match first, otherwise the first event whose slug contains
    /// the requested one.
    pub fn resolve_event(&self, year: u32, track: &str) -> Result<String, FastlapError> {
        let wanted = Self::normalize_event_name(track);
        let not_found = || FastlapError::EventNotFound {
            year,
            track: track.to_string(),
        };
        if wanted.is_empty() {
            return Err(not_found());
        }
        let slugs = self.event_slugs(year)?;
        if let Some(exact) = slugs.iter().find(|s| **s == wanted) {
            return Ok(exact.clone());
        }
        slugs
            .into_iter()
            .find(|s| s.contains(&wanted))
            .ok_or_else(not_found)
    }

    pub fn save_session(&self, session: &Session) -> Result<PathBuf, FastlapError> {
        let slug = Self::normalize_event_name(&session.info.event_name);
        let path = self.session_file(session.info.year, &slug, session.info.session);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FastlapError::WriterError { source: e })?;
        }
        write_session_jsonl(&path, session)?;
        debug!("Saved session to {:?}", path);
        Ok(path)
    }
}

impl SessionProvider for SessionStore {
    fn load_session(
        &self,
        year: u32,
        track: &str,
        session: SessionType,
    ) -> Result<Arc<Session>, FastlapError> {
        let slug = self.resolve_event(year, track)?;
        let path = self.session_file(year, &slug, session);
        if !path.exists() {
            return Err(FastlapError::SessionNotFound {
                year,
                event: slug,
                session,
            });
        }
        load_session_jsonl(&path).map(Arc::new)
    }

    fn resolve_track(&self, year: u32, track: &str) -> Result<String, FastlapError> {
        self.resolve_event(year, track)
    }

    fn event_schedule(&self) -> Result<Vec<EventSummary>, FastlapError> {
        let mut years: Vec<u32> = list_dir_names(&self.root)?
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        years.sort_unstable();

        let mut schedule = Vec::new();
        for year in years {
            for slug in self.event_slugs(year)? {
                let sessions: Vec<SessionType> = SessionType::ALL
                    .into_iter()
                    .filter(|s| self.session_file(year, &slug, *s).is_file())
                    .collect();
                if sessions.is_empty() {
                    continue;
                }
                let header_file = self.session_file(year, &slug, sessions[0]);
                let event_name = match read_session_header(&header_file) {
                    Ok(Some(info)) => info.event_name,
                    Ok(None) => slug.clone(),
                    Err(e) => {
                        warn!("Could not read header for {} {}: {}", year, slug, e);
                        slug.clone()
                    }
                };
                schedule.push(EventSummary {
                    year,
                    event_name,
                    slug,
                    sessions,
                });
            }
        }
        Ok(schedule)
    }
}

fn list_dir_names(dir: &Path) -> Result<Vec<String>, FastlapError> {
    let entries = fs::read_dir(dir).map_err(|e| FastlapError::SessionLoaderError { source: e })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FastlapError::SessionLoaderError { source: e })?;
        if entry.path().is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Lap, SessionInfo, TelemetrySample};
    use tempfile::TempDir;

    fn session(year: u32, event_name: &str, session: SessionType) -> Session {
        Session {
            info: SessionInfo {
                year,
                event_name: event_name.to_string(),
                session,
            },
            laps: vec![Lap {
                driver: "LEC".to_string(),
                lap_number: 1,
                lap_time_s: Some(84.2),
                telemetry: vec![
                    TelemetrySample {
                        time_s: Some(0.0),
                        speed_kph: Some(280.0),
                        x: Some(10.0),
                        y: Some(-4.0),
                        distance_m: None,
                    },
                    TelemetrySample {
                        time_s: Some(0.25),
                        speed_kph: Some(282.5),
                        x: Some(29.5),
                        y: Some(-4.1),
                        distance_m: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_normalize_event_name() {
        assert_eq!(
            SessionStore::normalize_event_name("Abu Dhabi Grand Prix"),
            "abu_dhabi_grand_prix"
        );
        assert_eq!(
            SessionStore::normalize_event_name(" São Paulo GP "),
            "são_paulo_gp"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().to_path_buf()).unwrap();
        let original = session(2024, "Abu Dhabi Grand Prix", SessionType::R);

        let path = store.save_session(&original).unwrap();
        assert!(path.ends_with("2024/abu_dhabi_grand_prix/R.jsonl"));

        let loaded = store
            .load_session(2024, "Abu Dhabi Grand Prix", SessionType::R)
            .unwrap();
        assert_eq!(*loaded, original);
    }

    #[test]
    fn test_partial_track_name_resolves() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().to_path_buf()).unwrap();
        store
            .save_session(&session(2024, "Abu Dhabi Grand Prix", SessionType::R))
            .unwrap();

        let loaded = store.load_session(2024, "abu dhabi", SessionType::R).unwrap();
        assert_eq!(loaded.info.event_name, "Abu Dhabi Grand Prix");
    }

    #[test]
    fn test_lookup_failures() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().to_path_buf()).unwrap();
        store
            .save_session(&session(2024, "Abu Dhabi Grand Prix", SessionType::R))
            .unwrap();

        assert!(matches!(
            store.load_session(2024, "Monaco", SessionType::R),
            Err(FastlapError::EventNotFound { .. })
        ));
        assert!(matches!(
            store.load_session(2023, "Abu Dhabi", SessionType::R),
            Err(FastlapError::EventNotFound { .. })
        ));
        assert!(matches!(
            store.load_session(2024, "Abu Dhabi", SessionType::FP1),
            Err(FastlapError::SessionNotFound { .. })
        ));
        assert!(matches!(
            store.load_session(2024, "  ", SessionType::R),
            Err(FastlapError::EventNotFound { .. })
        ));
    }

    #[test]
    fn test_event_schedule() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().to_path_buf()).unwrap();
        store
            .save_session(&session(2024, "Abu Dhabi Grand Prix", SessionType::R))
            .unwrap();
        store
            .save_session(&session(2024, "Abu Dhabi Grand Prix", SessionType::Q))
            .unwrap();
        store
            .save_session(&session(2023, "Monaco Grand Prix", SessionType::FP1))
            .unwrap();
        fs::create_dir_all(temp_dir.path().join("2024").join("empty_event")).unwrap();
        fs::create_dir_all(temp_dir.path().join("not_a_year")).unwrap();

        let schedule = store.event_schedule().unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].year, 2023);
        assert_eq!(schedule[0].event_name, "Monaco Grand Prix");
        assert_eq!(schedule[0].sessions, vec![SessionType::FP1]);
        assert_eq!(schedule[1].event_name, "Abu Dhabi Grand Prix");
        assert_eq!(schedule[1].sessions, vec![SessionType::Q, SessionType::R]);
    }
}

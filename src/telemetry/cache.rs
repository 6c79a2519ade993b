use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::{EventSummary, Session, SessionProvider, SessionType};
use crate::FastlapError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SessionKey {
    year: u32,
    track: String,
    session: SessionType,
}

/// Memoizes successful session loads for the lifetime of the process.
/// Recorded sessions never change, so entries are never invalidated. Failed
/// loads are not cached.
pub struct CachedSessionProvider<P> {
    inner: P,
    sessions: Mutex<HashMap<SessionKey, Arc<Session>>>,
}

impl<P: SessionProvider> CachedSessionProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cached_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<P: SessionProvider> SessionProvider for CachedSessionProvider<P> {
    fn load_session(
        &self,
        year: u32,
        track: &str,
        session: SessionType,
    ) -> Result<Arc<Session>, FastlapError> {
        // keyed on the resolved event so partial names share one entry
        let key = SessionKey {
            year,
            track: self.inner.resolve_track(year, track)?,
            session,
        };
        if let Some(cached) = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!("Session cache hit for {:?}", key);
            return Ok(Arc::clone(cached));
        }

        // the lock is not held while loading, two concurrent misses both load
        // and the later insert wins
        let loaded = self.inner.load_session(year, track, session)?;
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    fn resolve_track(&self, year: u32, track: &str) -> Result<String, FastlapError> {
        self.inner.resolve_track(year, track)
    }

    fn event_schedule(&self) -> Result<Vec<EventSummary>, FastlapError> {
        self.inner.event_schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{SessionInfo, SessionStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingProvider {
        loads: AtomicUsize,
    }

    impl SessionProvider for CountingProvider {
        fn load_session(
            &self,
            year: u32,
            track: &str,
            session: SessionType,
        ) -> Result<Arc<Session>, FastlapError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if track == "Nowhere" {
                return Err(FastlapError::EventNotFound {
                    year,
                    track: track.to_string(),
                });
            }
            Ok(Arc::new(Session {
                info: SessionInfo {
                    year,
                    event_name: track.to_string(),
                    session,
                },
                laps: vec![],
            }))
        }

        fn event_schedule(&self) -> Result<Vec<EventSummary>, FastlapError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_repeated_loads_hit_cache() {
        let provider = CachedSessionProvider::new(CountingProvider::default());
        let first = provider.load_session(2024, "Abu Dhabi", SessionType::R).unwrap();
        let second = provider.load_session(2024, "abu dhabi", SessionType::R).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.inner().loads.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cached_sessions(), 1);
    }

    #[test]
    fn test_key_includes_year_and_session() {
        let provider = CachedSessionProvider::new(CountingProvider::default());
        provider.load_session(2024, "Abu Dhabi", SessionType::R).unwrap();
        provider.load_session(2024, "Abu Dhabi", SessionType::Q).unwrap();
        provider.load_session(2023, "Abu Dhabi", SessionType::R).unwrap();

        assert_eq!(provider.inner().loads.load(Ordering::SeqCst), 3);
        assert_eq!(provider.cached_sessions(), 3);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let provider = CachedSessionProvider::new(CountingProvider::default());
        assert!(provider.load_session(2024, "Nowhere", SessionType::R).is_err());
        assert!(provider.load_session(2024, "Nowhere", SessionType::R).is_err());

        assert_eq!(provider.inner().loads.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cached_sessions(), 0);
    }

    #[test]
    fn test_partial_track_names_share_one_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().to_path_buf()).unwrap();
        store
            .save_session(&Session {
                info: SessionInfo {
                    year: 2024,
                    event_name: "Abu Dhabi Grand Prix".to_string(),
                    session: SessionType::R,
                },
                laps: vec![],
            })
            .unwrap();

        let provider = CachedSessionProvider::new(store);
        let full = provider.load_session(2024, "Abu Dhabi", SessionType::R).unwrap();
        for partial in ["abu", "dhabi", "Abu Dhabi Grand Prix"] {
            let again = provider.load_session(2024, partial, SessionType::R).unwrap();
            assert!(Arc::ptr_eq(&full, &again));
        }
        assert_eq!(provider.cached_sessions(), 1);

        assert!(matches!(
            provider.load_session(2024, "Monaco", SessionType::R),
            Err(FastlapError::EventNotFound { .. })
        ));
        assert_eq!(provider.cached_sessions(), 1);
    }
}

//! On-disk layout for event records and the standings file
//!
//! ```text
//! <root>/events/<event_id>.json
//! <root>/standings.json
//! ```

use crate::error::{Error, Result};
use crate::event::EventResult;
use crate::standings::{aggregate, Standings};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EVENTS_DIR: &str = "events";
const STANDINGS_FILE: &str = "standings.json";

/// Output directory holding processed events and standings
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join(EVENTS_DIR)
    }

    pub fn standings_path(&self) -> PathBuf {
        self.root.join(STANDINGS_FILE)
    }

    /// Path of the record for an event id
    pub fn event_path(&self, event_id: &str) -> PathBuf {
        self.events_dir().join(format!("{}.json", event_id))
    }

    /// Write an event record, replacing any earlier record with the same id
    pub fn save_event(&self, event: &EventResult) -> Result<PathBuf> {
        fs::create_dir_all(self.events_dir())?;
        let path = self.event_path(&event.event_id);
        write_json(&path, event)?;
        info!("Saved event data to {}", path.display());
        Ok(path)
    }

    /// Load one event record
    pub fn load_event<P: AsRef<Path>>(path: P) -> Result<EventResult> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::EventRecord {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load every `*.json` record directly under the events directory, in path
    /// order; a missing directory means no events yet
    pub fn load_events(&self) -> Result<Vec<EventResult>> {
        let events_dir = self.events_dir();
        if !events_dir.is_dir() {
            debug!("No events directory at {}", events_dir.display());
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        for entry in WalkDir::new(&events_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
                events.push(Self::load_event(path)?);
            }
        }

        debug!("Loaded {} event records from {}", events.len(), events_dir.display());
        Ok(events)
    }

    /// Aggregate all stored events into fresh standings
    pub fn build_standings(&self) -> Result<Standings> {
        Ok(aggregate(&self.load_events()?))
    }

    /// Write the standings file
    pub fn save_standings(&self, standings: &Standings) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.standings_path();
        write_json(&path, standings)?;
        info!("Updated standings at {}", path.display());
        Ok(path)
    }

    /// Rebuild standings from stored events and write them
    pub fn update_standings(&self) -> Result<(Standings, PathBuf)> {
        let standings = self.build_standings()?;
        let path = self.save_standings(&standings)?;
        Ok((standings, path))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::process_sheet;
    use crate::parser::parse_csv_str;
    use crate::scoring::EventType;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_event(id: &str, event_type: EventType) -> EventResult {
        let csv = "\
Open 2026,,,,,,
Date : 2026/02/14,,,,,,
Rk.,,Name,Rtg,1,2,Pts.
1,,\"Doe, John\",1800,1,1,2
2,,Roe Jane,1900,0,0,0
";
        let sheet = parse_csv_str(csv, "open.csv").unwrap();
        process_sheet(&sheet, event_type, id.to_string(), Utc::now()).unwrap()
    }

    #[test]
    fn test_missing_directory_yields_empty_standings() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path().join("nothing-yet"));

        let standings = data.build_standings().unwrap();
        assert!(standings.standings.is_empty());
        assert!(standings.events.is_empty());
    }

    #[test]
    fn test_save_and_load_event() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path());
        let event = sample_event("open-2026", EventType::GroupC);

        let path = data.save_event(&event).unwrap();
        assert_eq!(path, temp_dir.path().join("events").join("open-2026.json"));

        let loaded = DataDir::load_event(&path).unwrap();
        assert_eq!(loaded, event);
    }

    #[test]
    fn test_update_standings_reads_all_events() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path());
        data.save_event(&sample_event("classical-1", EventType::GroupC)).unwrap();
        data.save_event(&sample_event("rapid-1", EventType::Rapid)).unwrap();
        fs::write(data.events_dir().join("notes.txt"), "ignored").unwrap();

        let (standings, path) = data.update_standings().unwrap();
        assert!(path.exists());
        assert_eq!(standings.events.len(), 2);
        assert_eq!(standings.events[0].date, "2026-02-14");

        let john = standings.find_player("John Doe").unwrap();
        assert_eq!(john.position, 1);
        assert_eq!(john.rapid_events.len(), 1);
        assert_eq!(john.classical_events.len(), 1);

        let written: Standings = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.standings, standings.standings);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path());
        data.save_event(&sample_event("a", EventType::GroupA)).unwrap();
        data.save_event(&sample_event("b", EventType::GroupB)).unwrap();

        let first = data.build_standings().unwrap();
        let second = data.build_standings().unwrap();
        assert_eq!(first.standings, second.standings);
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn test_corrupt_event_record() {
        let temp_dir = TempDir::new().unwrap();
        let data = DataDir::new(temp_dir.path());
        fs::create_dir_all(data.events_dir()).unwrap();
        fs::write(data.event_path("broken"), "{ not json").unwrap();

        let err = data.load_events().unwrap_err();
        assert!(matches!(err, Error::EventRecord { .. }));
    }
}

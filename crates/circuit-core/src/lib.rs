//! circuit-core: Core library for scoring chess crosstables and building circuit standings
//!
//! This library provides functionality to:
//! - Read Chess-Results crosstable exports (Excel workbooks or CSV) into raw sheets
//! - Extract tournament info and player rows from Swiss and round-robin layouts
//! - Calculate circuit points per player for each event type
//! - Aggregate processed events into best-N standings
//! - Store event records and standings as JSON

pub mod error;
pub mod event;
pub mod extractor;
pub mod parser;
pub mod scoring;
pub mod standings;
pub mod store;
pub mod table;

pub use error::{Error, Result, UnknownEventType};
pub use event::{event_id_from_path, process_event, process_sheet, EventResult, PlayerResult};
pub use extractor::{extract, Extraction, Layout, PlayerRow, TournamentInfo};
pub use parser::{parse_csv, read_sheet};
pub use scoring::{calculate, Category, CircuitPoints, EventType, ScoringRules};
pub use standings::{aggregate, normalize_player_key, EventEntry, EventSummary, Standings, StandingsEntry};
pub use store::DataDir;
pub use table::{CellValue, Sheet};

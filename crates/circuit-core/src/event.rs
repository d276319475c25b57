//! Event processing: extraction plus per-player scoring for one crosstable

use crate::error::Result;
use crate::extractor::{extract, PlayerRow, TournamentInfo};
use crate::parser::read_sheet;
use crate::scoring::{calculate, CircuitPoints, EventType};
use crate::table::Sheet;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A player row together with the circuit points it earned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    #[serde(flatten)]
    pub player: PlayerRow,
    pub circuit_points: CircuitPoints,
}

/// Scored results of one processed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    /// Source file name without extension
    pub event_id: String,
    pub event_type: EventType,
    #[serde(default)]
    pub tournament: TournamentInfo,
    pub total_players: usize,
    /// Ordered by circuit total, then final rank
    pub results: Vec<PlayerResult>,
    pub processed_at: DateTime<Utc>,
}

impl EventResult {
    /// Tournament name, falling back to the event id
    pub fn display_name(&self) -> &str {
        self.tournament.name.as_deref().unwrap_or(&self.event_id)
    }

    /// Tournament date, empty when unknown
    pub fn date(&self) -> &str {
        self.tournament.date.as_deref().unwrap_or("")
    }
}

/// Event id for a source file: its base name without extension
pub fn event_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read, extract and score a crosstable file
pub fn process_event<P: AsRef<Path>>(path: P, event_type: EventType) -> Result<EventResult> {
    let path = path.as_ref();
    let sheet = read_sheet(path)?;
    process_sheet(&sheet, event_type, event_id_from_path(path), Utc::now())
}

/// Extract and score an already loaded sheet
pub fn process_sheet(
    sheet: &Sheet,
    event_type: EventType,
    event_id: String,
    processed_at: DateTime<Utc>,
) -> Result<EventResult> {
    let extraction = extract(sheet)?;
    let rules = event_type.rules();
    let total_players = extraction.total_players;

    let mut results: Vec<PlayerResult> = extraction
        .players
        .into_iter()
        .map(|player| {
            let circuit_points = calculate(&player, rules, total_players);
            PlayerResult {
                player,
                circuit_points,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.circuit_points
            .total
            .cmp(&a.circuit_points.total)
            .then_with(|| a.player.final_rank.cmp(&b.player.final_rank))
    });

    info!(
        "Processed {} ({}): {} players",
        event_id, event_type, total_players
    );

    Ok(EventResult {
        event_id,
        event_type,
        tournament: extraction.tournament,
        total_players,
        results,
        processed_at,
    })
}

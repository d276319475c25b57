//! Standings aggregation across events
//!
//! Player identities are folded by normalized name, each event contributes one
//! entry per player, and only the best [`BEST_N`] entries per category count.

use crate::event::{EventResult, PlayerResult};
use crate::scoring::{Category, EventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Events counted per category
pub const BEST_N: usize = 3;

/// One event's contribution to a player's standing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub event_id: String,
    pub event_type: EventType,
    pub category: Category,
    pub final_rank: u32,
    /// Circuit total earned in the event
    pub points: u32,
    /// Whether the entry is among the best counted for its category
    #[serde(default)]
    pub counted: bool,
}

/// A player's line in the overall standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsEntry {
    /// Normalized identity used to fold name variants
    pub key: String,
    /// Display name, preferring the "Last, First" form
    pub name: String,
    pub title: String,
    /// Highest rating seen
    pub rating: u32,
    /// Federation from the first event seen
    pub federation: String,
    pub rapid_events: Vec<EventEntry>,
    pub classical_events: Vec<EventEntry>,
    pub rapid_points: u32,
    pub classical_points: u32,
    pub total_points: u32,
    pub events_counted: usize,
    pub events_total: usize,
    pub position: usize,
}

/// Summary line for one processed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: String,
    pub event_type: EventType,
    pub category: Category,
    pub name: String,
    /// ISO date, empty when unknown
    pub date: String,
    pub total_players: usize,
}

/// Complete standings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub standings: Vec<StandingsEntry>,
    pub events: Vec<EventSummary>,
    pub updated_at: DateTime<Utc>,
}

impl Standings {
    /// Find a player by any spelling of their name
    pub fn find_player(&self, name: &str) -> Option<&StandingsEntry> {
        let key = normalize_player_key(name);
        self.standings.iter().find(|e| e.key == key)
    }
}

/// A player's accumulated record before best-N scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub key: String,
    pub name: String,
    pub title: String,
    pub rating: u32,
    pub federation: String,
    pub rapid_events: Vec<EventEntry>,
    pub classical_events: Vec<EventEntry>,
}

impl PlayerRecord {
    /// Record for a single result row in one event
    pub fn from_result(event: &EventResult, result: &PlayerResult) -> Self {
        let player = &result.player;
        let category = event.event_type.category();
        let entry = EventEntry {
            event_id: event.event_id.clone(),
            event_type: event.event_type,
            category,
            final_rank: player.final_rank,
            points: result.circuit_points.total,
            counted: false,
        };

        let (rapid_events, classical_events) = match category {
            Category::Rapid => (vec![entry], Vec::new()),
            Category::Classical => (Vec::new(), vec![entry]),
        };

        Self {
            key: normalize_player_key(&player.name),
            name: player.name.clone(),
            title: player.title.clone(),
            rating: player.rating,
            federation: player.federation.clone(),
            rapid_events,
            classical_events,
        }
    }

    /// Fold a later record of the same player into this one
    ///
    /// The display name switches to a comma form once one is seen and never
    /// switches back. Rating keeps the maximum, title the first non-empty value
    /// and federation the first value.
    pub fn merge(&mut self, later: PlayerRecord) {
        if later.name.contains(',') && !self.name.contains(',') {
            self.name = later.name;
        }
        self.rating = self.rating.max(later.rating);
        if self.title.is_empty() {
            self.title = later.title;
        }
        self.rapid_events.extend(later.rapid_events);
        self.classical_events.extend(later.classical_events);
    }
}

/// Grouping key for a player name: commas become spaces, words are
/// lowercased and sorted, so "Doe, John" and "John Doe" share a key
pub fn normalize_player_key(name: &str) -> String {
    let mut words: Vec<String> = name
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    words.sort();
    words.join(" ")
}

/// Mark the best `n` entries as counted and return their point sum
pub fn apply_best_n(events: &mut [EventEntry], n: usize) -> u32 {
    events.sort_by(|a, b| b.points.cmp(&a.points));

    let mut total = 0;
    for (i, event) in events.iter_mut().enumerate() {
        event.counted = i < n;
        if event.counted {
            total += event.points;
        }
    }
    total
}

/// Order in which events are folded: date, then event id
fn chronological(a: &EventResult, b: &EventResult) -> Ordering {
    a.date()
        .cmp(b.date())
        .then_with(|| a.event_id.cmp(&b.event_id))
}

/// Final ranking order: total points, then rating, then name
fn ranking(a: &StandingsEntry, b: &StandingsEntry) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.rating.cmp(&a.rating))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.key.cmp(&b.key))
}

/// Build standings from scratch out of processed events
///
/// The result does not depend on the order of `events`.
pub fn aggregate(events: &[EventResult]) -> Standings {
    let mut ordered: Vec<&EventResult> = events.iter().collect();
    ordered.sort_by(|a, b| chronological(a, b));

    let mut players: BTreeMap<String, PlayerRecord> = BTreeMap::new();
    for event in &ordered {
        for result in &event.results {
            let record = PlayerRecord::from_result(event, result);
            match players.get_mut(&record.key) {
                Some(existing) => existing.merge(record),
                None => {
                    players.insert(record.key.clone(), record);
                }
            }
        }
    }

    let mut standings: Vec<StandingsEntry> = players.into_values().map(score_player).collect();
    standings.sort_by(ranking);
    for (i, entry) in standings.iter_mut().enumerate() {
        entry.position = i + 1;
    }

    let mut summaries: Vec<EventSummary> = ordered
        .iter()
        .map(|event| EventSummary {
            event_id: event.event_id.clone(),
            event_type: event.event_type,
            category: event.event_type.category(),
            name: event.display_name().to_string(),
            date: event.date().to_string(),
            total_players: event.total_players,
        })
        .collect();
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.event_id.cmp(&b.event_id)));

    Standings {
        standings,
        events: summaries,
        updated_at: Utc::now(),
    }
}

fn score_player(record: PlayerRecord) -> StandingsEntry {
    let PlayerRecord {
        key,
        name,
        title,
        rating,
        federation,
        mut rapid_events,
        mut classical_events,
    } = record;

    let rapid_points = apply_best_n(&mut rapid_events, BEST_N);
    let classical_points = apply_best_n(&mut classical_events, BEST_N);

    let events_counted = rapid_events
        .iter()
        .chain(&classical_events)
        .filter(|e| e.counted)
        .count();
    let events_total = rapid_events.len() + classical_events.len();

    StandingsEntry {
        key,
        name,
        title,
        rating,
        federation,
        rapid_events,
        classical_events,
        rapid_points,
        classical_points,
        total_points: rapid_points + classical_points,
        events_counted,
        events_total,
        position: 0,
    }
}

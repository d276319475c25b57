//! Circuit point calculation for a single player result

use crate::error::UnknownEventType;
use crate::extractor::PlayerRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum share of rounds a player must complete to score
pub const MIN_COMPLETION_RATIO: f64 = 0.5;

/// Bonus points per place gained over the starting rank
pub const BONUS_PER_PLACE: u32 = 2;

/// Display bands for open events; the last band is implicitly "Rest"
const PERCENTILE_LABELS: &[(f64, &str)] = &[
    (0.01, "Top 1%"),
    (0.03, "Top 3%"),
    (0.05, "Top 5%"),
    (0.10, "Top 10%"),
    (0.20, "Top 20%"),
    (0.33, "Top 33%"),
    (0.50, "Top 50%"),
];

const REST_LABEL: &str = "Rest";

/// Kind of circuit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    GroupA,
    GroupB,
    GroupC,
    Rapid,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::GroupA,
        EventType::GroupB,
        EventType::GroupC,
        EventType::Rapid,
    ];

    /// Wire name, e.g. "group_a"
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::GroupA => "group_a",
            EventType::GroupB => "group_b",
            EventType::GroupC => "group_c",
            EventType::Rapid => "rapid",
        }
    }

    /// Scoring rules for this event type
    pub fn rules(&self) -> &'static ScoringRules {
        match self {
            EventType::GroupA => &GROUP_A,
            EventType::GroupB => &GROUP_B,
            EventType::GroupC => &GROUP_C,
            EventType::Rapid => &RAPID,
        }
    }

    /// Standings category this event counts toward
    pub fn category(&self) -> Category {
        match self {
            EventType::Rapid => Category::Rapid,
            _ => Category::Classical,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// Standings category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Rapid,
    Classical,
}

/// How placement points are awarded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fixed points per final rank; unlisted ranks score 0
    Table(&'static [(u32, u32)]),
    /// (percentile ceiling, points) pairs in ascending percentile order
    Bands(&'static [(f64, u32)]),
}

/// Immutable scoring configuration for one event type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    pub placement: Placement,
    /// Absolute cap on the performance bonus
    pub bonus_cap: u32,
    /// Whether the bonus is also limited to half the placement points
    pub bonus_capped_by_placement: bool,
    /// Awarded only to players who played every round
    pub participation: u32,
}

impl ScoringRules {
    /// Open events rank by percentile band and show a band label
    pub fn is_open(&self) -> bool {
        matches!(self.placement, Placement::Bands(_))
    }
}

pub const GROUP_A: ScoringRules = ScoringRules {
    placement: Placement::Table(&[(1, 125), (2, 103), (3, 85), (4, 70), (5, 55), (6, 43)]),
    bonus_cap: 20,
    bonus_capped_by_placement: false,
    participation: 5,
};

pub const GROUP_B: ScoringRules = ScoringRules {
    placement: Placement::Table(&[(1, 110), (2, 90), (3, 75), (4, 62), (5, 48), (6, 37)]),
    bonus_cap: 20,
    bonus_capped_by_placement: false,
    participation: 5,
};

pub const GROUP_C: ScoringRules = ScoringRules {
    placement: Placement::Bands(&[
        (0.01, 100),
        (0.03, 90),
        (0.05, 82),
        (0.10, 72),
        (0.20, 62),
        (0.33, 52),
        (0.50, 44),
        (1.00, 22),
    ]),
    bonus_cap: 25,
    bonus_capped_by_placement: true,
    participation: 5,
};

pub const RAPID: ScoringRules = ScoringRules {
    placement: Placement::Bands(&[
        (0.01, 70),
        (0.03, 63),
        (0.05, 57),
        (0.10, 50),
        (0.20, 43),
        (0.33, 36),
        (0.50, 31),
        (1.00, 15),
    ]),
    bonus_cap: 25,
    bonus_capped_by_placement: true,
    participation: 5,
};

/// Points a player earned toward the circuit in one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPoints {
    pub placement: u32,
    pub performance_bonus: u32,
    pub participation: u32,
    pub total: u32,
    pub eligible: bool,
    pub eligibility_reason: Option<String>,
    pub percentile_band: Option<String>,
}

/// Last rank inside a percentile band: ceil(percentile * field size)
fn band_cutoff(percentile: f64, total_players: usize) -> u32 {
    (percentile * total_players as f64).ceil() as u32
}

/// Placement points for a final rank
pub fn placement_points(rules: &ScoringRules, final_rank: u32, total_players: usize) -> u32 {
    match rules.placement {
        Placement::Table(table) => table
            .iter()
            .find(|(rank, _)| *rank == final_rank)
            .map(|(_, points)| *points)
            .unwrap_or(0),
        Placement::Bands(bands) => bands
            .iter()
            .find(|(percentile, _)| final_rank <= band_cutoff(*percentile, total_players))
            .or(bands.last())
            .map(|(_, points)| *points)
            .unwrap_or(0),
    }
}

/// Display label for the band a final rank falls in
pub fn percentile_band(final_rank: u32, total_players: usize) -> &'static str {
    PERCENTILE_LABELS
        .iter()
        .find(|(percentile, _)| final_rank <= band_cutoff(*percentile, total_players))
        .map(|(_, label)| *label)
        .unwrap_or(REST_LABEL)
}

/// Bonus for finishing above the starting rank, after caps
pub fn performance_bonus(rules: &ScoringRules, seed_rank: u32, final_rank: u32, placement: u32) -> u32 {
    let raw = BONUS_PER_PLACE * seed_rank.saturating_sub(final_rank);
    let capped = raw.min(rules.bonus_cap);
    if rules.bonus_capped_by_placement {
        capped.min(placement / 2)
    } else {
        capped
    }
}

/// Share of rounds played; 0 when the event has no rounds
pub fn completion_ratio(player: &PlayerRow) -> f64 {
    if player.total_rounds == 0 {
        0.0
    } else {
        player.rounds_played as f64 / player.total_rounds as f64
    }
}

/// Compute circuit points for one player
pub fn calculate(player: &PlayerRow, rules: &ScoringRules, total_players: usize) -> CircuitPoints {
    let percentile_band = rules
        .is_open()
        .then(|| percentile_band(player.final_rank, total_players).to_string());

    if completion_ratio(player) < MIN_COMPLETION_RATIO {
        return CircuitPoints {
            placement: 0,
            performance_bonus: 0,
            participation: 0,
            total: 0,
            eligible: false,
            eligibility_reason: Some(format!(
                "Did not complete minimum rounds ({}/{})",
                player.rounds_played, player.total_rounds
            )),
            percentile_band,
        };
    }

    let placement = placement_points(rules, player.final_rank, total_players);
    let bonus = performance_bonus(rules, player.seed_rank, player.final_rank, placement);
    let participation = if player.completed { rules.participation } else { 0 };

    CircuitPoints {
        placement,
        performance_bonus: bonus,
        participation,
        total: placement + bonus + participation,
        eligible: true,
        eligibility_reason: None,
        percentile_band,
    }
}

//! Crosstable extraction: locate the header, resolve columns and read player rows
//!
//! Two layouts are recognized:
//! - Swiss/open: a metadata preamble followed by a header starting with `No.`
//! - Round-robin: a header starting with `Rk.` whose third cell is `Name`
//!
//! The scan walks the sheet top to bottom as a small state machine, see [`ScanState`].

use crate::error::{Error, Result};
use crate::table::{CellValue, Sheet};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Publisher footer that ends the player section (first cell, case-insensitive)
const PUBLISHER_FOOTER: &str = "chess-results";

/// Section markers that also end the player section (first cell, exact case)
const SECTION_FOOTERS: &[&str] = &["Final Ranking", "You find all"];

/// Captions that close the metadata preamble
const SECTION_CAPTIONS: &[&str] = &["Starting rank crosstable", "Final Ranking"];

/// Text that stands for an empty cell in exported sheets
const NULL_MARKERS: &[&str] = &["nan", "NaN"];

/// Highest bare integer accepted as a round-robin round column
const MAX_ROUND_COLUMN: i64 = 20;

/// Tournament details picked up from the preamble; all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One player line of a crosstable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    /// Starting rank, always derived from rating order
    pub seed_rank: u32,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub federation: String,
    /// Game points scored in the tournament
    #[serde(default)]
    pub points: f64,
    pub final_rank: u32,
    pub rounds_played: u32,
    pub total_rounds: u32,
    pub completed: bool,
}

/// Result of extracting one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub tournament: TournamentInfo,
    pub players: Vec<PlayerRow>,
    pub total_players: usize,
}

/// The two supported crosstable layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Starting-rank crosstable with a `No.` column
    Swiss,
    /// Final-ranking table starting with `Rk.`
    RoundRobin,
}

impl Layout {
    /// Match a row against the header signatures
    pub fn detect(row: &[CellValue]) -> Option<Layout> {
        let text_at = |i: usize| row.get(i).map(CellValue::text).unwrap_or_default();
        match text_at(0).as_str() {
            "No." => Some(Layout::Swiss),
            "Rk." if text_at(2) == "Name" => Some(Layout::RoundRobin),
            _ => None,
        }
    }
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub name: usize,
    pub rating: Option<usize>,
    pub federation: Option<usize>,
    pub points: Option<usize>,
    pub final_rank: usize,
    /// Round result columns, left to right
    pub rounds: Vec<usize>,
}

impl ColumnMap {
    /// Resolve columns from a header row by exact (trimmed) cell text; the
    /// `No.` column is ignored since starting ranks are re-derived
    pub fn from_header(
        row: &[CellValue],
        patterns: &Patterns,
        path: &Path,
    ) -> Result<Self> {
        let mut name = None;
        let mut rating = None;
        let mut federation = None;
        let mut points = None;
        let mut final_rank = None;
        let mut rounds = Vec::new();

        for (i, cell) in row.iter().enumerate() {
            let text = cell.text();
            match text.as_str() {
                "Name" => name = Some(i),
                "Rtg" => rating = Some(i),
                "FED" => federation = Some(i),
                "Pts." => points = Some(i),
                "Rk." => final_rank = Some(i),
                _ => {}
            }

            if patterns.is_round_header(&text) {
                rounds.push(i);
            }
        }

        let missing = |column: &str| Error::StructuralFormat {
            path: path.to_path_buf(),
            message: format!("header row has no '{}' column", column),
        };
        let name = name.ok_or_else(|| missing("Name"))?;
        let final_rank = final_rank.ok_or_else(|| missing("Rk."))?;

        if rounds.is_empty() {
            warn!("No round columns found in {}", path.display());
        }

        Ok(Self {
            name,
            rating,
            federation,
            points,
            final_rank,
            rounds,
        })
    }
}

/// Compiled text patterns used while scanning
#[derive(Debug, Clone)]
pub struct Patterns {
    year: Regex,
    date: Regex,
    integer: Regex,
    swiss_round: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            year: Regex::new(r"\b(?:19|20)\d{2}\b")?,
            date: Regex::new(r"(\d{4})/(\d{2})/(\d{2})")?,
            integer: Regex::new(r"\d+")?,
            swiss_round: Regex::new(r"^\d+\.Rd")?,
        })
    }

    /// `1.Rd`, `2.Rd`, ... or a bare round number 1-20
    fn is_round_header(&self, text: &str) -> bool {
        if self.swiss_round.is_match(text) {
            return true;
        }
        !text.is_empty()
            && text.bytes().all(|b| b.is_ascii_digit())
            && text
                .parse::<i64>()
                .is_ok_and(|n| (1..=MAX_ROUND_COLUMN).contains(&n))
    }
}

/// Scanner position within the sheet
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// Reading tournament metadata lines
    SeekingPreamble,
    /// Preamble closed by a caption; waiting for the header row
    SeekingHeader,
    /// Header found; reading player rows
    ReadingRows(ColumnMap),
    /// Footer reached
    Done,
}

/// What a row below the header turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Player,
    Footer,
    Skip,
}

/// Extract tournament info and player rows from a sheet
pub fn extract(sheet: &Sheet) -> Result<Extraction> {
    let patterns = Patterns::new()?;
    let mut tournament = TournamentInfo::default();
    let mut players = Vec::new();
    let mut state = ScanState::SeekingPreamble;

    let enter_rows = |idx: usize, row: &[CellValue], layout: Layout| -> Result<ScanState> {
        debug!("Header row {} ({:?}) in {}", idx + 1, layout, sheet.source_path.display());
        let columns = ColumnMap::from_header(row, &patterns, &sheet.source_path)?;
        Ok(ScanState::ReadingRows(columns))
    };

    for (idx, row) in sheet.rows.iter().enumerate() {
        state = match state {
            ScanState::SeekingPreamble => match Layout::detect(row) {
                Some(layout) => enter_rows(idx, row, layout)?,
                None if is_section_caption(row) => ScanState::SeekingHeader,
                None => {
                    read_metadata(row, &patterns, &mut tournament);
                    ScanState::SeekingPreamble
                }
            },
            ScanState::SeekingHeader => match Layout::detect(row) {
                Some(layout) => enter_rows(idx, row, layout)?,
                None => ScanState::SeekingHeader,
            },
            ScanState::ReadingRows(columns) => match classify_row(row, &columns) {
                RowKind::Player => {
                    players.push(read_player(row, &columns));
                    ScanState::ReadingRows(columns)
                }
                RowKind::Footer => ScanState::Done,
                RowKind::Skip => {
                    debug!("Skipping row {} in {}", idx + 1, sheet.source_path.display());
                    ScanState::ReadingRows(columns)
                }
            },
            ScanState::Done => break,
        };
    }

    if matches!(state, ScanState::SeekingPreamble | ScanState::SeekingHeader) {
        return Err(Error::StructuralFormat {
            path: sheet.source_path.clone(),
            message: "could not find header row with 'No.' or 'Rk.' column".to_string(),
        });
    }

    assign_seed_ranks(&mut players);
    let total_players = players.len();

    Ok(Extraction {
        tournament,
        players,
        total_players,
    })
}

fn first_text(row: &[CellValue]) -> String {
    row.first().map(CellValue::to_string_value).unwrap_or_default()
}

fn is_section_caption(row: &[CellValue]) -> bool {
    let first = first_text(row);
    SECTION_CAPTIONS.iter().any(|c| first.contains(c))
}

/// Fill in whichever tournament field this preamble line describes; the first
/// occurrence of each field wins
fn read_metadata(row: &[CellValue], patterns: &Patterns, info: &mut TournamentInfo) {
    let line = first_text(row);

    if line.contains("Date :") {
        if info.date.is_none() {
            info.date = patterns
                .date
                .captures(&line)
                .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]));
        }
    } else if line.contains("Number of rounds") {
        if info.rounds.is_none() {
            info.rounds = patterns
                .integer
                .find(&line)
                .and_then(|m| m.as_str().parse().ok());
        }
    } else if line.contains("Location :") {
        if info.location.is_none() {
            info.location = Some(line.replace("Location :", "").trim().to_string());
        }
    } else if info.name.is_none() && patterns.year.is_match(&line) {
        info.name = Some(line.trim().to_string());
    }
}

fn classify_row(row: &[CellValue], columns: &ColumnMap) -> RowKind {
    if row.get(columns.final_rank).is_some_and(CellValue::is_digits) {
        return RowKind::Player;
    }

    let first = first_text(row);
    if first.to_lowercase().contains(PUBLISHER_FOOTER)
        || SECTION_FOOTERS.iter().any(|m| first.contains(m))
    {
        RowKind::Footer
    } else {
        RowKind::Skip
    }
}

fn cell(row: &[CellValue], col: usize) -> &CellValue {
    static EMPTY: CellValue = CellValue::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

fn optional_text(row: &[CellValue], col: Option<usize>) -> String {
    col.map(|c| cell(row, c).text()).unwrap_or_default()
}

/// Non-negative whole number via float conversion; bad cells read as 0
fn whole_number(row: &[CellValue], col: Option<usize>) -> u32 {
    col.and_then(|c| cell(row, c).as_f64())
        .filter(|f| (0.0..=u32::MAX as f64).contains(f))
        .map(|f| f.trunc() as u32)
        .unwrap_or(0)
}

fn read_player(row: &[CellValue], columns: &ColumnMap) -> PlayerRow {
    let final_rank = whole_number(row, Some(columns.final_rank));
    let name = cell(row, columns.name).text();

    let title = columns
        .name
        .checked_sub(1)
        .map(|c| cell(row, c).text())
        .filter(|t| !NULL_MARKERS.contains(&t.as_str()))
        .unwrap_or_default();

    let rating = whole_number(row, columns.rating);
    if rating == 0 {
        debug!("No usable rating for '{}', using 0", name);
    }

    let points = columns
        .points
        .and_then(|c| cell(row, c).as_f64())
        .unwrap_or(0.0);

    let total_rounds = columns.rounds.len() as u32;
    let rounds_played = columns
        .rounds
        .iter()
        .filter(|&&c| !cell(row, c).text().is_empty())
        .count() as u32;

    PlayerRow {
        seed_rank: 0,
        name,
        title,
        rating,
        federation: optional_text(row, columns.federation),
        points,
        final_rank,
        rounds_played,
        total_rounds,
        completed: rounds_played >= total_rounds,
    }
}

/// Re-derive starting ranks: rating descending, then name ascending
pub fn assign_seed_ranks(players: &mut [PlayerRow]) {
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by(|&a, &b| {
        players[b]
            .rating
            .cmp(&players[a].rating)
            .then_with(|| players[a].name.cmp(&players[b].name))
    });

    for (rank, idx) in order.into_iter().enumerate() {
        players[idx].seed_rank = rank as u32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    const SWISS: &str = "\
Keshmat Open 2026,,,,,,,,,
Last update 12.01.2026 18:40:12,,,,,,,,,
Chess-Results crosstable export,,,,,,,,,
Location : Dubai Chess Club,,,,,,,,,
Date : 2026/01/10 to 2026/01/11,,,,,,,,,
Number of rounds : 3,,,,,,,,,
Starting rank crosstable after Round 3,,,,,,,,,
No.,,Name,Rtg,FED,1.Rd,2.Rd,3.Rd,Pts. ,Rk.
1,FM,\"Zed, Alpha\",2100,UAE,4w1,3b1,2w½,2.5,1
2,,\"Doe, John\",1900,IND,3b1,4w1,1b½,2.5,2
3,nan,Brown Bob,1900,,2w0,1w0,,0,4
4,,\"Smith, Ann\",,EGY,1b0,2b0,-,1,3
,,,,,,,,,
Chess-Results Server Chess-results.com,,,,,,,,,
5,,Ghost Player,1500,,,,,0,5
";

    const ROUND_ROBIN: &str = "\
Group A Invitational 2026,,,,,,,,,
Final Ranking crosstable after 3 Rounds,,,,,,,,,
Rk.,,Name,Rtg,FED,1,2,3,4,Pts.
1,GM,\"Ali, Omar\",2400,UAE,*,1,1,½,2.5
2,IM,\"Khan, Sara\",2450,PAK,0,*,1,1,2
3,,\"Lee, Tom\",2200,,0,0,*,1,1
4,,\"Rao, Dev\",2300,IND,½,,,*,0.5
You find all details on chess-results.com,,,,,,,,,
";

    fn extract_str(csv: &str) -> Result<Extraction> {
        extract(&parse_csv_str(csv, "event.csv").unwrap())
    }

    #[test]
    fn test_swiss_metadata() {
        let result = extract_str(SWISS).unwrap();
        let info = &result.tournament;

        assert_eq!(info.name.as_deref(), Some("Keshmat Open 2026"));
        assert_eq!(info.date.as_deref(), Some("2026-01-10"));
        assert_eq!(info.rounds, Some(3));
        assert_eq!(info.location.as_deref(), Some("Dubai Chess Club"));
    }

    #[test]
    fn test_swiss_rows_stop_at_footer() {
        let result = extract_str(SWISS).unwrap();

        assert_eq!(result.total_players, 4);
        assert!(result.players.iter().all(|p| p.name != "Ghost Player"));
    }

    #[test]
    fn test_swiss_fields() {
        let result = extract_str(SWISS).unwrap();
        let alpha = &result.players[0];

        assert_eq!(alpha.name, "Zed, Alpha");
        assert_eq!(alpha.title, "FM");
        assert_eq!(alpha.rating, 2100);
        assert_eq!(alpha.federation, "UAE");
        assert_eq!(alpha.points, 2.5);
        assert_eq!(alpha.final_rank, 1);
        assert_eq!(alpha.total_rounds, 3);
        assert_eq!(alpha.rounds_played, 3);
        assert!(alpha.completed);

        let bob = &result.players[2];
        assert_eq!(bob.title, "");
        assert_eq!(bob.federation, "");
        assert_eq!(bob.rounds_played, 2);
        assert!(!bob.completed);

        // Missing rating degrades to 0
        let ann = &result.players[3];
        assert_eq!(ann.rating, 0);
        assert_eq!(ann.rounds_played, 3);
    }

    #[test]
    fn test_seed_ranks_follow_rating_then_name() {
        let result = extract_str(SWISS).unwrap();
        let seed = |name: &str| {
            result
                .players
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.seed_rank)
                .unwrap()
        };

        assert_eq!(seed("Zed, Alpha"), 1);
        // Equal ratings: "Brown Bob" sorts before "Doe, John"
        assert_eq!(seed("Brown Bob"), 2);
        assert_eq!(seed("Doe, John"), 3);
        assert_eq!(seed("Smith, Ann"), 4);
    }

    #[test]
    fn test_round_robin_layout() {
        let sheet = parse_csv_str(ROUND_ROBIN, "rr.csv").unwrap();
        assert_eq!(Layout::detect(&sheet.rows[2]), Some(Layout::RoundRobin));

        let result = extract(&sheet).unwrap();
        assert_eq!(result.total_players, 4);
        assert_eq!(result.tournament.name.as_deref(), Some("Group A Invitational 2026"));

        let omar = &result.players[0];
        assert_eq!(omar.total_rounds, 4);
        assert_eq!(omar.rounds_played, 4);
        assert_eq!(omar.points, 2.5);
        // Sara has the higher rating, so she is seeded first
        assert_eq!(omar.seed_rank, 2);
        assert_eq!(result.players[1].seed_rank, 1);

        let dev = &result.players[3];
        assert_eq!(dev.rounds_played, 2);
        assert!(!dev.completed);
    }

    #[test]
    fn test_first_header_wins() {
        let csv = "\
Rk.,,Name,Rtg,1,2
1,,A,1500,*,1
No.,,Name,Rtg,1,2
2,,B,1400,0,*
";
        let result = extract_str(csv).unwrap();
        // The second header line is skipped as a non-player row
        assert_eq!(result.total_players, 2);
        assert_eq!(result.players[1].name, "B");
    }

    #[test]
    fn test_missing_header_is_structural_error() {
        let err = extract_str("Some Open 2026\nplain,text,rows\n").unwrap_err();
        assert!(matches!(err, Error::StructuralFormat { .. }));
    }

    #[test]
    fn test_header_without_rank_column() {
        let err = extract_str("No.,,Name,Rtg\n1,,A,1500\n").unwrap_err();
        assert!(matches!(err, Error::StructuralFormat { .. }));
    }

    #[test]
    fn test_bad_rating_and_points_degrade() {
        let csv = "Rk.,,Name,Rtg,Pts.,1\n3,,A,unrated,x,1\n";
        let sheet = parse_csv_str(csv, "t.csv").unwrap();
        let result = extract(&sheet).unwrap();

        assert_eq!(result.players[0].final_rank, 3);
        assert_eq!(result.players[0].rating, 0);
        assert_eq!(result.players[0].points, 0.0);
    }

    #[test]
    fn test_decimal_rank_text_is_not_a_player_row() {
        let csv = "Rk.,,Name,Rtg,1\n3.0,,A,1500,1\n4,,B,1400,1\n";
        let result = extract_str(csv).unwrap();

        assert_eq!(result.total_players, 1);
        assert_eq!(result.players[0].name, "B");
    }

    #[test]
    fn test_infinite_cells_degrade_to_zero() {
        let csv = "Rk.,,Name,Rtg,1,Pts.\n1,,A,1500,1,1e999\n2,,B,1e999,1,1\n";
        let result = extract_str(csv).unwrap();

        assert_eq!(result.players[0].points, 0.0);
        assert_eq!(result.players[1].rating, 0);
        assert_eq!(result.players[1].points, 1.0);
    }

    #[test]
    fn test_section_footers_are_case_sensitive() {
        let csv = "\
Rk.,,Name,Rtg,1
1,,A,1500,1
final ranking notes,,,,
2,,B,1400,1
Final Ranking after 1 round,,,,
3,,C,1300,1
";
        let result = extract_str(csv).unwrap();
        let names: Vec<&str> = result.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_round_header_patterns() {
        let patterns = Patterns::new().unwrap();
        assert!(patterns.is_round_header("1.Rd"));
        assert!(patterns.is_round_header("11.Rd"));
        assert!(patterns.is_round_header("20"));
        assert!(!patterns.is_round_header("21"));
        assert!(!patterns.is_round_header("0"));
        assert!(!patterns.is_round_header("Rd.1"));
    }
}

//! Circuit standings CLI
//!
//! Command-line tool for scoring Chess-Results crosstables and updating circuit standings.

use circuit_core::{
    calculate, extract, process_event, read_sheet, DataDir, EventType, Standings,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "circuit")]
#[command(about = "Chess circuit points and standings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a crosstable, save the event and rebuild standings
    Process {
        /// Crosstable file (xlsx, xls, ods or csv)
        file: PathBuf,

        /// Event type: group_a, group_b, group_c or rapid
        event_type: EventType,

        /// Output directory for JSON files
        #[arg(short, long, default_value = "data")]
        output_dir: PathBuf,
    },

    /// Rebuild standings from saved events and print them
    Standings {
        /// Output directory holding saved events
        #[arg(short, long, default_value = "data")]
        output_dir: PathBuf,

        /// Maximum number of players to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show what would be extracted from a crosstable without saving anything
    Inspect {
        /// Crosstable file (xlsx, xls, ods or csv)
        file: PathBuf,

        /// Also show circuit points for this event type
        #[arg(short, long)]
        event_type: Option<EventType>,
    },
}

fn main() {
    sensible_env_logger::init!();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> circuit_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            file,
            event_type,
            output_dir,
        } => cmd_process(&file, event_type, &output_dir),
        Commands::Standings { output_dir, limit } => cmd_standings(&output_dir, limit),
        Commands::Inspect { file, event_type } => cmd_inspect(&file, event_type),
    }
}

fn cmd_process(file: &Path, event_type: EventType, output_dir: &Path) -> circuit_core::Result<()> {
    let event = process_event(file, event_type)?;
    let data = DataDir::new(output_dir);

    let event_path = data.save_event(&event)?;
    println!("Saved event data to {}", event_path.display());

    let (_, standings_path) = data.update_standings()?;
    println!("Updated standings at {}", standings_path.display());

    Ok(())
}

fn cmd_standings(output_dir: &Path, limit: Option<usize>) -> circuit_core::Result<()> {
    let data = DataDir::new(output_dir);
    let (standings, path) = data.update_standings()?;

    println!("Standings ({} players, {} events)", standings.standings.len(), standings.events.len());
    println!();
    print_standings(&standings, limit);
    println!();
    println!("Written to {}", path.display());

    Ok(())
}

fn print_standings(standings: &Standings, limit: Option<usize>) {
    println!("Pos\tName\tTitle\tRtg\tFED\tRapid\tClassical\tTotal\tEvents");
    println!("{}", "-".repeat(9 * 10));

    let row_limit = limit.unwrap_or(standings.standings.len());
    for entry in standings.standings.iter().take(row_limit) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}/{}",
            entry.position,
            entry.name,
            entry.title,
            entry.rating,
            entry.federation,
            entry.rapid_points,
            entry.classical_points,
            entry.total_points,
            entry.events_counted,
            entry.events_total,
        );
    }

    if standings.standings.len() > row_limit {
        println!("... ({} more players)", standings.standings.len() - row_limit);
    }
}

fn cmd_inspect(file: &Path, event_type: Option<EventType>) -> circuit_core::Result<()> {
    let sheet = read_sheet(file)?;
    let extraction = extract(&sheet)?;
    let info = &extraction.tournament;

    println!("File: {}", file.display());
    println!("Tournament: {}", info.name.as_deref().unwrap_or("-"));
    println!("Date: {}", info.date.as_deref().unwrap_or("-"));
    println!("Location: {}", info.location.as_deref().unwrap_or("-"));
    if let Some(rounds) = info.rounds {
        println!("Rounds: {}", rounds);
    }
    println!("Players: {}", extraction.total_players);
    println!();

    println!("Rk.\tSeed\tName\tTitle\tRtg\tFED\tPts.\tRounds\tCircuit");
    println!("{}", "-".repeat(9 * 10));

    for player in &extraction.players {
        let circuit = match event_type {
            Some(t) => {
                let points = calculate(player, t.rules(), extraction.total_players);
                match points.eligibility_reason {
                    Some(reason) => reason,
                    None => points.total.to_string(),
                }
            }
            None => String::new(),
        };

        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}/{}\t{}",
            player.final_rank,
            player.seed_rank,
            player.name,
            player.title,
            player.rating,
            player.federation,
            player.points,
            player.rounds_played,
            player.total_rounds,
            circuit,
        );
    }

    Ok(())
}

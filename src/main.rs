use clap::{Parser, Subcommand};
use prolingo_review::*;

use database::db;
use export::json::{export_items_to_path, import_items};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "prolingo", version, about = "Spaced-repetition review scheduler")]
struct Cli {
    /// SQLite database holding review items
    #[arg(long, default_value = "prolingo.sqlite3", global = true)]
    db: PathBuf,

    /// JSON file with scheduler settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add new items, due immediately
    Add { ids: Vec<String> },
    /// Record a review of one item
    Review {
        id: String,
        /// Recall quality, 0 (blackout) to 5 (perfect)
        quality: u8,
        /// The item was not recalled
        #[arg(long)]
        forgot: bool,
    },
    /// List due items, most urgent first
    Due,
    /// Show review statistics
    Stats,
    /// Review due items interactively
    Practice,
    /// Move the simulated date forward by one day
    AdvanceDay,
    /// Write all items to a JSON file
    Export { path: PathBuf },
    /// Load items from a JSON file, replacing items with the same id
    Import { path: PathBuf },
    /// Score a spoken transcript against the expected phrase
    Pronounce {
        expected: String,
        spoken: String,
        #[arg(long, default_value_t = pronunciation::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SchedulerConfig::load(path)?,
        None => SchedulerConfig::default(),
    };

    match cli.command {
        Command::Pronounce {
            expected,
            spoken,
            threshold,
        } => {
            let score = pronunciation::score_pronunciation(&expected, &spoken, threshold);
            println!(
                "{}% similar, {} (quality {})",
                score.percentage,
                if score.accepted { "accepted" } else { "try again" },
                score.quality()
            );
            Ok(())
        }
        command => run_with_store(command, &cli.db, config),
    }
}

fn run_with_store(command: Command, db_path: &Path, config: SchedulerConfig) -> Result<()> {
    let conn = db::init_database(db_path)?;

    match command {
        Command::Add { ids } => {
            for id in ids {
                let item = db::add_item(&id, &config, &conn)?;
                println!("{} (due {})", item.id, format_date(item.next_review));
            }
        }
        Command::Review {
            id,
            quality,
            forgot,
        } => {
            let quality = Quality::new(quality)?;
            let item = db::get_item(&id, &conn)?.ok_or_else(|| Error::NotFound(id.clone()))?;
            let now = db::get_current_date(&conn)?;

            let next = schedule_next_review(&item, !forgot, quality, now, &config);
            db::update_item(&next, &conn)?;
            println!(
                "{}: next review in {} day(s) on {} (ease {:.2})",
                next.id,
                next.interval,
                format_date(next.next_review),
                next.ease_factor
            );
        }
        Command::Due => {
            let now = db::get_current_date(&conn)?;
            let due = prioritize(&db::get_due_items(&conn)?, now);
            if due.is_empty() {
                println!("Nothing due on {}", format_date(now));
            }
            for item in due {
                println!(
                    "{:<24} ease {:.2}  interval {}d",
                    item.id, item.ease_factor, item.interval
                );
            }
        }
        Command::Stats => {
            let now = db::get_current_date(&conn)?;
            let stats = review_stats(&db::load_all_items(&conn)?, now, &config);
            println!("Date:       {}", format_date(now));
            println!("Items:      {}", stats.total_count);
            println!("Due:        {}", stats.due_count);
            println!("Upcoming:   {}", stats.upcoming_count);
            println!(
                "Mastered:   {} ({:.1}%)",
                stats.mastered_count, stats.mastery_percentage
            );
            println!("Avg ease:   {:.2}", stats.average_ease_factor);
        }
        Command::Practice => practice(&conn, config)?,
        Command::AdvanceDay => {
            let date = db::advance_day(&conn)?;
            println!("Current date is now {}", format_date(date));
        }
        Command::Export { path } => {
            let items = db::load_all_items(&conn)?;
            export_items_to_path(&items, &path)?;
            println!("Exported {} items to {}", items.len(), path.display());
        }
        Command::Import { path } => {
            let items = import_items(&path, &config)?;
            for item in &items {
                db::upsert_item(item, &conn)?;
            }
            println!("Imported {} items from {}", items.len(), path.display());
        }
        Command::Pronounce { .. } => unreachable!("pronounce is handled in run without a store"),
    }

    Ok(())
}

/// Walks through due items, reading a 0-5 rating per item from stdin.
/// Ratings of 3 and above count as remembered; an empty line stops the session.
fn practice(conn: &rusqlite::Connection, config: SchedulerConfig) -> Result<()> {
    let now = db::get_current_date(conn)?;
    let mut session = ReviewSession::new(prioritize(&db::get_due_items(conn)?, now), config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut round = 0;
    while let Some(item) = session.current_item() {
        if session.round_number() != round {
            round = session.round_number();
            println!("{}", session.phase_message());
        }

        print!("{} - rating 0-5 (empty to stop): ", item.id);
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let Some(quality) = line.parse::<u8>().ok().and_then(|v| Quality::new(v).ok()) else {
            println!("Please enter a number from 0 to 5");
            continue;
        };

        if let Some(updated) = session.grade_current(quality.is_passing(), quality, now) {
            db::update_item(&updated, conn)?;
        }
    }

    if session.is_completed() {
        println!("Session complete!");
    } else {
        println!("{} items left for later", session.remaining_count());
    }
    Ok(())
}

fn format_date(date: chrono::DateTime<chrono::Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

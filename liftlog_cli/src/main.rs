use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Log strength workouts from dictated sentences", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an utterance and append it to the journal
    Log {
        /// The dictated sentence, e.g. "bench press 3 sets of 10 at 60 kg"
        words: Vec<String>,

        /// Treat this utterance as continuing the current exercise
        #[arg(long)]
        voice_continuation: bool,

        /// Date to log against (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Skip the structuring service even if configured
        #[arg(long)]
        no_assist: bool,

        /// Dry run - show the parse without logging
        #[arg(long)]
        dry_run: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an utterance and print the outcome as JSON without saving anything
    Parse {
        words: Vec<String>,

        /// Exercise currently in progress
        #[arg(long)]
        last_exercise: Option<String>,

        /// Last set number of that exercise
        #[arg(long, default_value_t = 0)]
        last_set: u32,

        #[arg(long)]
        voice_continuation: bool,
    },

    /// Summarize logged workouts
    Summary {
        #[command(subcommand)]
        period: SummaryPeriod,
    },

    /// Forget the exercise in progress
    Reset,

    /// Export every logged set to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum SummaryPeriod {
    /// One day (defaults to today)
    Daily {
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },

    /// Seven days (defaults to the current week)
    Weekly {
        /// First day of the period
        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },
}

/// Files under the data directory
struct Paths {
    journal: PathBuf,
    session: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let journal_dir = data_dir.join("journal");
        Self {
            journal: journal_dir.join("workouts.jsonl"),
            session: journal_dir.join("session.json"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        liftlog_core::logging::init_with_level("debug");
    } else {
        liftlog_core::logging::init();
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Log {
            words,
            voice_continuation,
            date,
            no_assist,
            dry_run,
            json,
        } => cmd_log(
            &paths,
            &config,
            &words.join(" "),
            LogOptions {
                voice_continuation,
                date: date.unwrap_or_else(today),
                no_assist,
                dry_run,
                json,
            },
        ),
        Commands::Parse {
            words,
            last_exercise,
            last_set,
            voice_continuation,
        } => {
            let ctx = SessionContext {
                last_exercise,
                last_set_number: last_set,
                is_voice_continuation: voice_continuation,
            };
            let outcome = parse_utterance(&words.join(" "), &ctx);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::Summary { period } => cmd_summary(&paths, &config, period),
        Commands::Reset => {
            SessionContext::clear(&paths.session)?;
            println!("✓ Session cleared");
            Ok(())
        }
        Commands::Export { out } => {
            let workouts = load_workouts(&paths.journal, NaiveDate::MIN, NaiveDate::MAX)?;
            let rows = export_csv(&workouts, &out)?;
            println!("✓ Exported {} sets to {}", rows, out.display());
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

struct LogOptions {
    voice_continuation: bool,
    date: NaiveDate,
    no_assist: bool,
    dry_run: bool,
    json: bool,
}

fn cmd_log(paths: &Paths, config: &Config, utterance: &str, opts: LogOptions) -> Result<()> {
    if utterance.trim().is_empty() {
        return Err(Error::Input("Nothing to log: the utterance is empty".into()));
    }

    let mut ctx = SessionContext::load(&paths.session)?;
    ctx.is_voice_continuation = opts.voice_continuation;

    let structurer = if opts.no_assist {
        None
    } else {
        HttpStructurer::from_config(&config.assist)?
    };

    let (outcome, assisted) = match structurer {
        Some(ref structurer) => {
            let result = parse_with_assist(structurer, utterance, &ctx);
            let assisted = result.is_assisted();
            (result.outcome, assisted)
        }
        None => (parse_utterance(utterance, &ctx), false),
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        display_outcome(&outcome, assisted);
    }

    if opts.dry_run {
        println!("\n[Dry run - not logging]");
        return Ok(());
    }

    let mut entry = JournalEntry::new(opts.date, utterance, outcome.clone());
    entry.assisted = assisted;
    let mut sink = JsonlSink::new(&paths.journal);
    sink.append(&entry)?;

    outcome.next_context().save(&paths.session)?;
    Ok(())
}

fn cmd_summary(paths: &Paths, config: &Config, period: SummaryPeriod) -> Result<()> {
    match period {
        SummaryPeriod::Daily { date, json } => {
            let date = date.unwrap_or_else(today);
            let workouts = load_workouts(&paths.journal, date, date)?;
            let summary = daily_summary(&workouts, date);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.text());
            }
        }
        SummaryPeriod::Weekly { from, json } => {
            let start = from.unwrap_or_else(|| config.summary.week_start.week_of(today()));
            let end = liftlog_core::summary::week_end(start).ok_or_else(|| {
                Error::Input(format!("A week starting {} runs past the end of the calendar", start))
            })?;
            let workouts = load_workouts(&paths.journal, start, end)?;
            let summary = weekly_summary(&workouts, start);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.text());
            }
        }
    }
    Ok(())
}

fn display_outcome(outcome: &ParseOutcome, assisted: bool) {
    let status = if outcome.is_continuation {
        "continuing"
    } else {
        "new exercise"
    };
    println!();
    println!("  {} ({})", outcome.exercise(), status);
    if assisted {
        println!("  ℹ structured by assist service");
    }

    for set in outcome.sets() {
        if set.weight.weight_kg == 0.0 {
            println!("  → Set {}: {} reps", set.set, set.reps);
        } else {
            println!(
                "  → Set {}: {} reps @ {} {}",
                set.set,
                set.reps,
                set.weight.spoken_value(),
                set.weight.weight_unit.as_str()
            );
        }
    }
    println!();
}

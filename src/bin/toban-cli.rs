#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use toban::{
    build_roster, render_calendar, table, verify, BuildOptions, JsonStorage, Storage, Strategy,
    TextCalendar,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Monthly duty roster builder (availability CSV in, schedule out)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Enable logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a roster from an availability table
    Schedule {
        /// Availability CSV (Name,Group,<shift columns>; 0=available 1=not)
        #[arg(long)]
        input: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// greedy | exact-feasible | exact-optimizing
        #[arg(long, default_value = "greedy")]
        strategy: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Search time bound for the exact strategies (ms)
        #[arg(long, default_value_t = 10_000)]
        time_limit_ms: u64,
        /// Parallel search workers for the exact strategies
        #[arg(long, default_value_t = 1)]
        workers: usize,
        /// Weight of an on-call relative to a duty in the load totals
        #[arg(long, default_value_t = 0.5)]
        oncall_weight: f64,
        /// Roster JSON output
        #[arg(long)]
        out_json: Option<String>,
        /// Schedule CSV output
        #[arg(long)]
        out_csv: Option<String>,
        /// Per-doctor summary CSV output
        #[arg(long)]
        out_summary: Option<String>,
        /// Input table annotated with 3=duty / 4=on-call codes
        #[arg(long)]
        annotated: Option<String>,
        /// Text calendar output
        #[arg(long)]
        calendar: Option<String>,
        /// Extra holiday dates (YYYY-MM-DD), repeatable
        #[arg(long = "holiday")]
        holidays: Vec<String>,
    },

    /// Audit a saved roster against the availability table
    Check {
        #[arg(long)]
        input: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Roster JSON produced by `schedule --out-json`
        #[arg(long)]
        roster: String,
    },

    /// Render a saved roster as a text calendar
    Calendar {
        /// Roster JSON produced by `schedule --out-json`
        #[arg(long)]
        roster: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<String>,
        /// Extra holiday dates (YYYY-MM-DD), repeatable
        #[arg(long = "holiday")]
        holidays: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let sub = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        let _ = tracing::subscriber::set_global_default(sub);
    }
    #[cfg(not(feature = "logging"))]
    let _ = cli.log;

    match cli.cmd {
        Commands::Schedule {
            input,
            year,
            month,
            strategy,
            seed,
            time_limit_ms,
            workers,
            oncall_weight,
            out_json,
            out_csv,
            out_summary,
            annotated,
            calendar,
            holidays,
        } => {
            let strategy: Strategy = strategy.parse().map_err(anyhow::Error::msg)?;
            let holidays = parse_holidays(&holidays)?;
            let table_data = table::import_table_csv(&input, year, month)?;
            let opts = BuildOptions {
                seed,
                time_limit_ms,
                workers,
                oncall_weight,
            };
            let roster = build_roster(&table_data, strategy, &opts)
                .with_context(|| format!("building roster for {year}-{month:02}"))?;

            println!("Shift,Duty_G0,Duty_G1,Oncall_G0");
            for rec in &roster.shifts {
                println!(
                    "{},{},{},{}",
                    rec.shift,
                    rec.duty_senior.as_deref().unwrap_or(""),
                    rec.duty_junior.as_deref().unwrap_or(""),
                    rec.oncall.as_deref().unwrap_or("")
                );
            }
            println!();
            println!("Name,Group,Duty,Oncall,Total");
            for s in &roster.summary {
                println!(
                    "{},{},{},{},{}",
                    s.name,
                    s.group.code(),
                    s.duty,
                    s.oncall,
                    s.total
                );
            }

            if let Some(path) = out_json {
                JsonStorage::open(&path)?.save(&roster)?;
                eprintln!("roster written to {path}");
            }
            if let Some(path) = out_csv {
                table::export_schedule_csv(&path, &roster)?;
                eprintln!("schedule written to {path}");
            }
            if let Some(path) = out_summary {
                table::export_summary_csv(&path, &roster)?;
                eprintln!("summary written to {path}");
            }
            if let Some(path) = annotated {
                let warnings = table::export_annotated_csv(&path, &table_data, &roster)?;
                for w in warnings {
                    eprintln!("Warning: {w}");
                }
                eprintln!("annotated table written to {path}");
            }
            if let Some(path) = calendar {
                let text = render_calendar(&roster, &holidays, &TextCalendar);
                std::fs::write(&path, text)
                    .with_context(|| format!("writing calendar {path}"))?;
                eprintln!("calendar written to {path}");
            }
        }

        Commands::Check {
            input,
            year,
            month,
            roster,
        } => {
            let table_data = table::import_table_csv(&input, year, month)?;
            let roster = JsonStorage::open(&roster)?.load()?;
            let violations = verify(&table_data, &roster);
            if violations.is_empty() {
                println!("OK: roster satisfies all rules");
            } else {
                for v in &violations {
                    println!("{:?}: {}", v.kind, v.detail);
                }
                bail!("{} rule violation(s)", violations.len());
            }
        }

        Commands::Calendar {
            roster,
            out,
            holidays,
        } => {
            let holidays = parse_holidays(&holidays)?;
            let roster = JsonStorage::open(&roster)?.load()?;
            let text = render_calendar(&roster, &holidays, &TextCalendar);
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("writing calendar {path}"))?,
                None => print!("{text}"),
            }
        }
    }

    Ok(())
}

fn parse_holidays(raw: &[String]) -> Result<Vec<NaiveDate>> {
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid holiday date: {s}"))
        })
        .collect()
}

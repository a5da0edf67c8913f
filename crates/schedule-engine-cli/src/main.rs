//! `schedctl` — operate on schedule snapshot files from the command line.
//!
//! Every command reads a snapshot JSON file (the engine's interchange
//! format), runs one engine operation against it, prints a summary, and —
//! for mutating commands — writes the updated snapshot back only when
//! `--write` is passed.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use schedule_engine::exceptions::{
    apply_exception, ExceptionKind, RecurringPattern, ScheduleException,
};
use schedule_engine::export::{
    export_snapshot, import_snapshot, snapshot_from_json, snapshot_to_json,
};
use schedule_engine::generator::generate;
use schedule_engine::reconciler::{reconcile, DateRange};
use schedule_engine::working_hours::Weekday;
use schedule_engine::ScheduleContext;

#[derive(Parser)]
#[command(name = "schedctl")]
#[command(about = "Instructor schedule toolbox: generate, reconcile, and override slots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh snapshot with the default weekly template
    Init {
        #[arg(long)]
        out: PathBuf,
    },
    /// Validate every weekday configuration in a snapshot
    Check {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Preview the slots one date would generate (dry run)
    Generate {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Reconcile a date range against the snapshot's working hours
    Reconcile {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Write the updated snapshot back in place
        #[arg(long)]
        write: bool,
    },
    /// Apply a date-range exception (vacation, illness, ...)
    ApplyException {
        #[arg(long)]
        snapshot: PathBuf,
        /// vacation | illness | holiday | training | other
        #[arg(long)]
        kind: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// yearly | monthly
        #[arg(long)]
        recurring: Option<String>,
        /// Recurrence expansion anchor; defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { out } => {
            let ctx = ScheduleContext::new();
            write_snapshot(&ctx, &out)?;
            println!("Wrote default snapshot to {}.", out.display());
        }
        Commands::Check { snapshot } => {
            let ctx = load_context(&snapshot)?;
            let mut problems = 0;
            for weekday in Weekday::ALL {
                if let Err(err) = ctx.working_hours.day(weekday).validate() {
                    problems += 1;
                    println!("{weekday}: {err}");
                }
            }
            if problems > 0 {
                bail!("{problems} weekday configuration(s) failed validation");
            }
            println!("All weekday configurations are valid.");
        }
        Commands::Generate { snapshot, date } => {
            let ctx = load_context(&snapshot)?;
            let weekday = Weekday::from(chrono::Datelike::weekday(&date));
            let slots = generate(date, ctx.working_hours.day(weekday));
            if slots.is_empty() {
                println!("No slots for {date} ({weekday}).");
            } else {
                println!("{} slot(s) for {date} ({weekday}):", slots.len());
                for slot in &slots {
                    println!("- {}-{}", slot.start_time, slot.end_time);
                }
            }
        }
        Commands::Reconcile {
            snapshot,
            from,
            days,
            write,
        } => {
            let mut ctx = load_context(&snapshot)?;
            let report = reconcile(&mut ctx, DateRange::horizon(from, days));

            println!(
                "Generated {} slot(s) across {} date(s).",
                report.generated.len(),
                report.regenerated_dates.len()
            );
            for warning in &report.warnings {
                println!("warning: {} ({}): {}", warning.date, warning.weekday, warning.reason);
            }
            for day in &report.protected_days {
                println!(
                    "skipped {}: {} booked, {} in progress",
                    day.date, day.booked_count, day.in_progress_count
                );
            }
            if write {
                write_snapshot(&ctx, &snapshot)?;
                println!("Updated {}.", snapshot.display());
            }
        }
        Commands::ApplyException {
            snapshot,
            kind,
            from,
            to,
            recurring,
            today,
            write,
        } => {
            let mut ctx = load_context(&snapshot)?;
            let exception = ScheduleException::new(
                parse_kind(&kind)?,
                from,
                to,
                recurring.as_deref().map(parse_recurring).transpose()?,
            )?;

            let anchor = today.unwrap_or_else(|| Utc::now().date_naive());
            let outcome = apply_exception(&mut ctx, &exception, anchor);
            ctx.exceptions.push(exception);

            println!("Blocked {} slot(s).", outcome.blocked_slot_ids.len());
            if !outcome.warned_booked_slot_ids.is_empty() {
                println!(
                    "{} booked slot(s) fall inside this range and need explicit confirmation:",
                    outcome.warned_booked_slot_ids.len()
                );
                for id in &outcome.warned_booked_slot_ids {
                    println!("- {id}");
                }
            }
            if write {
                write_snapshot(&ctx, &snapshot)?;
                println!("Updated {}.", snapshot.display());
            }
        }
    }

    Ok(())
}

fn load_context(path: &PathBuf) -> anyhow::Result<ScheduleContext> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = snapshot_from_json(&json)
        .with_context(|| format!("{} is not a valid schedule snapshot", path.display()))?;
    Ok(import_snapshot(snapshot))
}

fn write_snapshot(ctx: &ScheduleContext, path: &PathBuf) -> anyhow::Result<()> {
    let snapshot = export_snapshot(ctx, Utc::now().to_rfc3339());
    let json = snapshot_to_json(&snapshot)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn parse_kind(s: &str) -> anyhow::Result<ExceptionKind> {
    Ok(match s {
        "vacation" => ExceptionKind::Vacation,
        "illness" => ExceptionKind::Illness,
        "holiday" => ExceptionKind::Holiday,
        "training" => ExceptionKind::Training,
        "other" => ExceptionKind::Other,
        _ => bail!("unknown exception kind '{s}' (expected vacation, illness, holiday, training, or other)"),
    })
}

fn parse_recurring(s: &str) -> anyhow::Result<RecurringPattern> {
    Ok(match s {
        "yearly" => RecurringPattern::Yearly,
        "monthly" => RecurringPattern::Monthly,
        _ => bail!("unknown recurrence '{s}' (expected yearly or monthly)"),
    })
}

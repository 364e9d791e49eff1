use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::Instrument;

use guestmig_common::config::{Config, RunOptions};
use guestmig_common::guest::CreationFailure;
use guestmig_common::target::TargetName;
use guestmig_common::{error, success, warn};
use guestmig_core::export::{export_failures_to_path, export_to_path};
use guestmig_core::migration::{MigrationDriver, MigrationOutcome, Stage};

use crate::commands::{EXIT_INTERRUPTED, client, stop_on_ctrl_c};
use crate::mprint;
use crate::terminal::{colors, format, print, progress};

pub async fn migrate(
    cfg: &Config,
    output: &Path,
    failures_path: Option<&Path>,
    options: &RunOptions,
    quiet: u8,
) -> anyhow::Result<ExitCode> {
    let portal_id = cfg.new.require_portal_id()?;
    let source = client(cfg, TargetName::Legacy)?;
    let destination = client(cfg, TargetName::New)?;
    let stop = stop_on_ctrl_c();
    let start_time = Instant::now();

    print::header(if options.dry_run { "dry run" } else { "migrating guests" }, quiet);

    let span = progress::stage_span("starting");
    let outcome = MigrationDriver::new(&source, &destination, portal_id, options)
        .with_stop_flag(stop)
        .on_progress(progress::driver_hook(span.clone()))
        .run()
        .instrument(span)
        .await;

    if outcome.stage >= Stage::FetchDetails {
        export_to_path(output, &outcome.records)
            .with_context(|| format!("cannot export guests to {}", output.display()))?;
        success!("{} fetched guest(s) written to {}", outcome.records.len(), output.display());
    }

    if !outcome.failures.is_empty() {
        report_failures(&outcome.failures, quiet);
        if let Some(path) = failures_path {
            export_failures_to_path(path, &outcome.failures)
                .with_context(|| format!("cannot write failures to {}", path.display()))?;
            warn!("{} failed guest(s) written to {}", outcome.failures.len(), path.display());
        }
    }

    if let Some(abort) = &outcome.abort {
        error!("migration stopped: {abort}");
    }
    print_summary(&outcome, start_time.elapsed(), quiet);

    Ok(exit_code(&outcome))
}

fn exit_code(outcome: &MigrationOutcome) -> ExitCode {
    if outcome.was_interrupted() {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report_failures(failures: &[CreationFailure], quiet: u8) {
    if quiet > 1 {
        return;
    }
    print::header("creation failures", quiet);
    for (idx, failure) in failures.iter().enumerate() {
        if quiet > 0 {
            error!("{} ({}): {}", failure.record.username, failure.record.id, failure.reason);
            continue;
        }
        print::tree_head(idx, &failure.record.username);
        print::as_tree_one_level(format::failure_to_details(failure));
        if idx + 1 != failures.len() {
            mprint!();
        }
    }
}

fn print_summary(outcome: &MigrationOutcome, total_time: Duration, quiet: u8) {
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    if quiet > 0 {
        let line = format!(
            "{} created, {} failed, {} skipped in {total_time}",
            outcome.created,
            outcome.failures.len(),
            outcome.skipped.len()
        );
        mprint!();
        if outcome.is_success() {
            success!("{line}");
        } else {
            warn!("{line}");
        }
        return;
    }

    print::header("summary", quiet);
    let rows: [(&str, ColoredString); 7] = [
        ("Fetched", format::count(outcome.records.len(), colors::GOOD)),
        ("Skipped", format::count(outcome.skipped.len(), colors::WARNING)),
        ("Duplicates", format::count(outcome.duplicates, colors::WARNING)),
        ("Sponsors", format::count(outcome.sponsors.len(), colors::PRIMARY)),
        ("Created", format::count(outcome.created, colors::GOOD)),
        ("Failed", format::count(outcome.failures.len(), colors::BAD)),
        ("Not attempted", format::count(outcome.pending(), colors::WARNING)),
    ];
    print::set_key_width(rows.iter().map(|(key, _)| *key));
    for (key, value) in rows {
        print::aligned_line(key, value);
    }
    if !outcome.listing_complete && outcome.stage > Stage::Paginate {
        print::aligned_line("Listing", "incomplete".color(colors::WARNING));
    }

    let verdict = match (&outcome.abort, outcome.stage) {
        (Some(_), stage) => format!("Stopped during {stage}").red().bold(),
        (None, _) if outcome.failures.is_empty() => "Migration Complete".green().bold(),
        (None, _) => "Migration Finished With Failures".yellow().bold(),
    };
    print::fat_separator();
    print::centerln(&format!("{verdict} in {total_time}"));
}

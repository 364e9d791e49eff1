use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use colored::*;
use tracing::Instrument;

use guestmig_common::config::{Config, RunOptions};
use guestmig_common::target::TargetName;
use guestmig_common::{info, success, warn};
use guestmig_core::export::export_to_path;
use guestmig_core::migration::{collect_guest_ids, fetch_details, probe};

use crate::commands::{EXIT_INTERRUPTED, client, stop_on_ctrl_c};
use crate::terminal::{colors, format, print, progress};

pub async fn export(
    cfg: &Config,
    target: TargetName,
    output: &Path,
    options: &RunOptions,
    quiet: u8,
) -> anyhow::Result<ExitCode> {
    let directory = client(cfg, target)?;
    let stop = stop_on_ctrl_c();
    let start_time = Instant::now();

    print::header(&format!("exporting guests from {target}"), quiet);

    let reported = probe(&directory)
        .await
        .with_context(|| format!("{target} target is unreachable"))?;
    info!("{} reports {reported} guest(s)", format::target_name(target));

    let walk = collect_guest_ids(&directory, options).await?;

    let span = progress::stage_span("detail fetch");
    let report = progress::fetch_hook(span.clone(), walk.ids.len());
    let batch = fetch_details(
        &directory,
        &walk.ids,
        options.fetch_concurrency,
        Some(&stop),
        &report,
    )
    .instrument(span)
    .await;

    export_to_path(output, &batch.records)
        .with_context(|| format!("cannot export guests to {}", output.display()))?;
    success!("{} guest(s) written to {}", batch.records.len(), output.display());

    let elapsed = format!("{:.2}s", start_time.elapsed().as_secs_f64()).bold().yellow();
    let summary = format!(
        "Export finished: {} written, {} skipped, {} sponsor(s) in {elapsed}",
        format::count(batch.records.len(), colors::GOOD),
        format::count(batch.skipped.len(), colors::WARNING),
        batch.sponsors.len(),
    );
    if quiet == 0 {
        print::fat_separator();
        print::centerln(&summary);
    }

    if batch.interrupted {
        warn!("export interrupted; {} of {} id(s) handled", batch.records.len() + batch.skipped.len(), walk.ids.len());
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}

use std::process::ExitCode;

use anyhow::Context;

use guestmig_common::config::Config;
use guestmig_common::target::TargetName;
use guestmig_common::warn;
use guestmig_core::migration::list_portals;

use crate::mprint;
use crate::commands::client;
use crate::terminal::{format, print};

pub async fn portals(cfg: &Config, target: TargetName, quiet: u8) -> anyhow::Result<ExitCode> {
    let directory = client(cfg, target)?;
    let portals = list_portals(&directory)
        .await
        .with_context(|| format!("cannot list portals on {target}"))?;

    print::header(&format!("portals on {target}"), quiet);
    if portals.is_empty() {
        warn!("{} reports no portals", format::target_name(target));
        return Ok(ExitCode::SUCCESS);
    }

    for (idx, portal) in portals.iter().enumerate() {
        if quiet > 0 {
            print::print(&portal.id);
            continue;
        }
        print::tree_head(idx, &portal.name);
        print::as_tree_one_level(format::portal_to_details(portal));
        if idx + 1 != portals.len() {
            mprint!();
        }
    }

    if quiet == 0 {
        print::end_of_program();
    }
    Ok(ExitCode::SUCCESS)
}

use std::process::ExitCode;

use colored::*;

use guestmig_common::config::Config;
use guestmig_common::target::TargetName;
use guestmig_common::{error, success};
use guestmig_core::migration::probe;

use crate::commands::client;
use crate::terminal::{colors, format, print};

pub async fn check(cfg: &Config, quiet: u8) -> anyhow::Result<ExitCode> {
    print::header("connectivity check", quiet);
    print::set_key_width(TargetName::ALL.iter().map(|t| t.as_str()));

    let mut reachable = 0;
    for target in TargetName::ALL {
        let directory = client(cfg, target)?;
        match probe(&directory).await {
            Ok(total) => {
                reachable += 1;
                success!("{} answers at {}", format::target_name(target), directory.base_url());
                if quiet == 0 {
                    let value = format!("{} guest(s) reported", total).color(colors::GOOD);
                    print::aligned_line(target.as_str(), value);
                }
            }
            Err(err) => {
                error!("{} is unreachable: {err}", format::target_name(target));
                if quiet == 0 {
                    print::aligned_line(target.as_str(), err.to_string().color(colors::BAD));
                }
            }
        }
    }

    if quiet == 0 {
        print::end_of_program();
    }

    Ok(if reachable == TargetName::ALL.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

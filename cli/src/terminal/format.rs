use colored::*;

use guestmig_common::guest::{CreationFailure, PortalSummary};
use guestmig_common::target::TargetName;

use crate::terminal::colors;

type Detail = (String, ColoredString);

pub fn target_name(target: TargetName) -> ColoredString {
    let color = match target {
        TargetName::Legacy => colors::TARGET_LEGACY,
        TargetName::New => colors::TARGET_NEW,
    };
    target.as_str().color(color).bold()
}

pub fn count(n: usize, color: Color) -> ColoredString {
    if n == 0 {
        n.to_string().color(colors::MUTED)
    } else {
        n.to_string().color(color).bold()
    }
}

fn or_dash(value: &str) -> ColoredString {
    if value.is_empty() {
        "-".color(colors::MUTED)
    } else {
        value.normal()
    }
}

pub fn portal_to_details(portal: &PortalSummary) -> Vec<Detail> {
    vec![
        ("Id".to_string(), portal.id.color(colors::ACCENT)),
        ("Name".to_string(), or_dash(&portal.name)),
        ("Notes".to_string(), or_dash(&portal.description)),
    ]
}

pub fn failure_to_details(failure: &CreationFailure) -> Vec<Detail> {
    let record = &failure.record;
    let mut details = vec![
        ("Id".to_string(), record.id.color(colors::ACCENT)),
        ("Sponsor".to_string(), or_dash(&record.sponsor_username)),
    ];
    if let Some(status) = failure.status() {
        details.push(("Status".to_string(), status.to_string().color(colors::BAD)));
    }
    details.push(("Reason".to_string(), failure.reason.to_string().color(colors::BAD)));
    details
}

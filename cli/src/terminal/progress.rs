use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use guestmig_core::migration::{ProgressHook, Stage};

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg:<20} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
        .progress_chars("=> ")
}

/// A span rendered as a progress bar for as long as it lives.
pub fn stage_span(name: &'static str) -> Span {
    let span = info_span!("progress", indicatif.pb_show = true);
    span.pb_set_message(name);
    span
}

/// Turns driver progress reports into bar updates on `span`.
pub fn driver_hook(span: Span) -> ProgressHook {
    Box::new(move |stage: Stage, handled: usize, total: usize| {
        span.pb_set_message(&stage.to_string());
        span.pb_set_length(total as u64);
        span.pb_set_position(handled as u64);
    })
}

/// Progress callback for a detail fetch of `total` ids.
pub fn fetch_hook(span: Span, total: usize) -> impl Fn(usize) + Send + Sync {
    span.pb_set_length(total as u64);
    move |handled| span.pb_set_position(handled as u64)
}

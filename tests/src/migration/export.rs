use anyhow::Context;
use guestmig_common::config::RunOptions;
use guestmig_common::target::TargetName;
use guestmig_core::export::{COLUMNS, export_failures_to_path, export_to_path};
use guestmig_core::migration::MigrationDriver;
use guestmig_protocols::guest::{USERNAME_PREFIX, parse_guest_detail};

use crate::support::{ErsServer, PORTAL_ID, guest};

#[tokio::test]
async fn fetched_guests_are_written_even_when_the_portal_is_missing() -> anyhow::Result<()> {
    let records = vec![guest("a1", "alice.g", "sponsor1"), guest("a2", "bob, jr", "sponsor2")];
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_guests(&records, 100).await;
    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], 100).await;
    new.serve_portal(404).await;
    let (source, destination) = (legacy.client(), new.client());
    let options = RunOptions::default();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;
    assert!(outcome.abort.is_some());

    let dir = tempfile::tempdir()?;
    let file = dir.path().join("guests.csv");
    export_to_path(&file, &outcome.records)?;

    let mut reader = csv::Reader::from_path(&file)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    assert_eq!(headers, COLUMNS);

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "alice.g");
    assert_eq!(&rows[0][2], "a1");
    assert_eq!(&rows[1][0], "bob, jr");
    assert_eq!(&rows[1][10], "sponsor2");
    Ok(())
}

#[tokio::test]
async fn failure_report_lists_only_refused_guests() -> anyhow::Result<()> {
    let records = vec![
        guest("a1", "alice.g", "sponsor1"),
        guest("a2", "bob.g", "sponsor1"),
    ];
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_guests(&records, 100).await;
    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], 100).await;
    new.serve_portal(200).await;
    new.reject_creation("alice.g", 500, "internal error").await;
    new.accept_creations().await;
    let (source, destination) = (legacy.client(), new.client());
    let options = RunOptions::default();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    let dir = tempfile::tempdir()?;
    let file = dir.path().join("failures.csv");
    export_failures_to_path(&file, &outcome.failures)?;

    let text = std::fs::read_to_string(&file).context("failure report missing")?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(",error"));
    assert!(lines[1].starts_with("alice.g,"));
    assert!(lines[1].contains("HTTP 500"));
    assert!(lines[1].contains("internal error"));
    Ok(())
}

#[tokio::test]
async fn created_payload_carries_the_prefixed_username() -> anyhow::Result<()> {
    let records = vec![guest("a1", "alice.g", "sponsor1")];
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_guests(&records, 100).await;
    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], 100).await;
    new.serve_portal(200).await;
    new.accept_creations().await;
    let (source, destination) = (legacy.client(), new.client());
    let options = RunOptions::default();

    MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    let requests = new.server.received_requests().await.unwrap_or_default();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .context("no creation request")?;
    let sent = parse_guest_detail("a1", &String::from_utf8_lossy(&post.body))?;

    let mut expected = records[0].clone();
    expected.username = format!("{USERNAME_PREFIX}alice.g");
    // Status is read-only on the API and never sent.
    expected.status.clear();
    assert_eq!(sent, expected);
    Ok(())
}

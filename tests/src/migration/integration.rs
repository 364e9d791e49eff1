use std::time::Duration;

use guestmig_common::config::{ListingPolicy, RunOptions};
use guestmig_common::error::FetchError;
use guestmig_common::guest::{FailureReason, GuestRecord};
use guestmig_common::target::TargetName;
use guestmig_core::migration::{MigrationDriver, MigrationError, Stage};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::support::{ErsServer, PASSWORD, PORTAL_ID, detail_body, guest};

const PAGE_SIZE: usize = 2;

fn options() -> RunOptions {
    RunOptions {
        page_size: PAGE_SIZE as u32,
        ..RunOptions::default()
    }
}

fn guests() -> Vec<GuestRecord> {
    vec![
        guest("a1", "alice.g", "sponsor1"),
        guest("a2", "bob.g", "sponsor2"),
        guest("a3", "carol.g", "sponsor1"),
    ]
}

/// Legacy serving `records`, new accepting everything on a valid portal.
async fn deployments(records: &[GuestRecord]) -> (ErsServer, ErsServer) {
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_guests(records, PAGE_SIZE).await;

    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], PAGE_SIZE).await;
    new.serve_portal(200).await;
    (legacy, new)
}

#[tokio::test]
async fn every_legacy_guest_lands_on_the_new_deployment() {
    let records = guests();
    let (legacy, new) = deployments(&records).await;
    new.accept_creations().await;
    let (source, destination) = (legacy.client(), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.abort);
    assert!(outcome.listing_complete);
    assert_eq!(outcome.stage, Stage::Done);
    assert_eq!(outcome.records, records);
    assert_eq!(outcome.created, 3);
    assert_eq!(
        outcome.sponsors.into_iter().collect::<Vec<_>>(),
        vec!["sponsor1", "sponsor2"]
    );
    assert_eq!(
        new.posted_usernames().await,
        vec!["guestalice.g", "guestbob.g", "guestcarol.g"]
    );
}

#[tokio::test]
async fn missing_portal_leaves_the_destination_untouched() {
    let records = guests();
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_guests(&records, PAGE_SIZE).await;
    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], PAGE_SIZE).await;
    new.serve_portal(404).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&new.server)
        .await;
    let (source, destination) = (legacy.client(), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(matches!(
        outcome.abort,
        Some(MigrationError::PortalNotFound { target: TargetName::New, .. })
    ));
    assert_eq!(outcome.created, 0);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn slow_detail_is_skipped_and_the_rest_migrates() {
    let records = guests();
    let slow = ErsServer::start(TargetName::Legacy).await;
    slow.serve_listing(&records, PAGE_SIZE).await;
    slow.serve_detail(&records[0], Duration::from_secs(2)).await;
    for record in &records[1..] {
        slow.serve_detail(record, Duration::ZERO).await;
    }

    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], PAGE_SIZE).await;
    new.serve_portal(200).await;
    new.accept_creations().await;
    let (source, destination) = (slow.client(), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].id, "a1");
    assert_eq!(outcome.skipped[0].error, FetchError::Timeout);
    assert!(outcome.records.iter().all(|r| r.id != "a1"));
    assert_eq!(outcome.created, 2);
    assert_eq!(new.posted_usernames().await, vec!["guestbob.g", "guestcarol.g"]);
}

#[tokio::test]
async fn unparseable_details_are_skipped_and_never_created() {
    let records = guests();
    let legacy = ErsServer::start(TargetName::Legacy).await;
    legacy.serve_listing(&records, PAGE_SIZE).await;
    legacy.serve_detail(&records[0], Duration::ZERO).await;
    // Cut off mid-document.
    let full = detail_body(&records[1]);
    let cut = &full[..full.find("<sponsorUserName>").unwrap()];
    legacy.serve_raw_detail("a2", cut).await;
    // A 200 whose body is not a guest.
    legacy
        .serve_raw_detail(
            "a3",
            r#"<ns3:ersResponse operation="GET-getById-guestuser" xmlns:ns3="ers.ise.cisco.com"><messages/></ns3:ersResponse>"#,
        )
        .await;

    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], PAGE_SIZE).await;
    new.serve_portal(200).await;
    new.accept_creations().await;
    let (source, destination) = (legacy.client(), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.abort);
    let skipped: Vec<&str> = outcome.skipped.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(skipped, vec!["a2", "a3"]);
    assert!(outcome.skipped.iter().all(|s| matches!(s.error, FetchError::Parse(_))));
    assert_eq!(outcome.records, records[..1]);
    assert_eq!(outcome.created, 1);
    assert_eq!(new.posted_usernames().await, vec!["guestalice.g"]);
}

#[tokio::test]
async fn refused_creation_is_recorded_with_the_server_reason() {
    let records = guests();
    let (legacy, new) = deployments(&records).await;
    new.reject_creation("bob.g", 400, "  CRUD operation exception: user already exists ")
        .await;
    new.accept_creations().await;
    let (source, destination) = (legacy.client(), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(!outcome.is_success());
    assert!(outcome.abort.is_none());
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures.len() + outcome.created, outcome.records.len());

    let failure = &outcome.failures[0];
    assert_eq!(failure.record.id, "a2");
    assert_eq!(failure.status(), Some(400));
    assert_eq!(
        failure.reason,
        FailureReason::Request(FetchError::Rejected {
            status: 400,
            detail: "CRUD operation exception: user already exists".into(),
        })
    );
}

#[tokio::test]
async fn wrong_credentials_stop_the_run_at_the_connectivity_check() {
    let records = guests();
    let (legacy, new) = deployments(&records).await;
    let mut bad = legacy.target_config();
    bad.password = format!("{PASSWORD}-typo");
    let (source, destination) = (legacy.client_for(&bad), new.client());
    let options = options();

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(matches!(
        outcome.abort,
        Some(MigrationError::Unreachable { target: TargetName::Legacy, source: FetchError::Auth })
    ));
    assert_eq!(outcome.stage, Stage::ConnectivityCheck);
    assert!(outcome.records.is_empty());
    assert!(new.posted_usernames().await.is_empty());
}

#[tokio::test]
async fn dry_run_validates_without_creating() {
    let records = guests();
    let (legacy, new) = deployments(&records).await;
    let (source, destination) = (legacy.client(), new.client());
    let options = RunOptions {
        dry_run: true,
        ..options()
    };

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.records.len(), 3);
    assert!(new.posted_usernames().await.is_empty());
}

#[tokio::test]
async fn broken_listing_page_aborts_under_fail_fast() {
    let records = guests();
    let legacy = ErsServer::start(TargetName::Legacy).await;
    // Page 2 fails with a server error.
    legacy.serve_guests(&records[..2], PAGE_SIZE).await;
    let new = ErsServer::start(TargetName::New).await;
    new.serve_guests(&[], PAGE_SIZE).await;
    new.serve_portal(200).await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&legacy.server)
        .await;

    let (source, destination) = (legacy.client(), new.client());
    let options = RunOptions {
        listing_policy: ListingPolicy::FailFast,
        ..options()
    };

    let outcome = MigrationDriver::new(&source, &destination, PORTAL_ID, &options)
        .run()
        .await;

    assert!(matches!(
        outcome.abort,
        Some(MigrationError::IncompleteListing { target: TargetName::Legacy, collected: 2, .. })
    ));
    assert!(!outcome.listing_complete);
    assert!(outcome.records.is_empty());
}

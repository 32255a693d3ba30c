//! Contract Test: Idempotency
//!
//! Constraints verified:
//! - A second pass with no address change performs reads only
//! - An address change between passes edits every record exactly once

mod common;

use common::*;
use ddns_core::Reconciler;

#[tokio::test]
async fn second_pass_without_address_change_does_not_write() {
    let provider = MockDnsProvider::new().with_record("vpn", "2", "198.51.100.9");

    let reconciler = Reconciler::new(
        Box::new(FixedIpSource::new("203.0.113.5")),
        Box::new(provider.clone()),
        minimal_config(&["home", "vpn"]),
    )
    .expect("reconciler construction succeeds");

    let first = reconciler.reconcile().await.expect("first pass succeeds");
    assert_eq!(first.writes(), 2, "first pass creates home and edits vpn");
    let writes_after_first = provider.write_calls().len();

    let second = reconciler.reconcile().await.expect("second pass succeeds");

    assert_eq!(second.writes(), 0);
    assert_eq!(
        provider.write_calls().len(),
        writes_after_first,
        "second pass must not write"
    );
    assert!(second
        .outcomes
        .iter()
        .all(|o| o.outcome.label() == "unchanged"));
}

#[tokio::test]
async fn address_change_between_passes_triggers_edits() {
    let provider = MockDnsProvider::new()
        .with_record("home", "1", "203.0.113.5")
        .with_record("vpn", "2", "203.0.113.5");

    // First run: nothing to do
    {
        let reconciler = Reconciler::new(
            Box::new(FixedIpSource::new("203.0.113.5")),
            Box::new(provider.clone()),
            minimal_config(&["home", "vpn"]),
        )
        .expect("reconciler construction succeeds");

        let report = reconciler.reconcile().await.expect("pass succeeds");
        assert_eq!(report.writes(), 0);
    }

    // Second run: the public address moved
    {
        let reconciler = Reconciler::new(
            Box::new(FixedIpSource::new("192.0.2.44")),
            Box::new(provider.clone()),
            minimal_config(&["home", "vpn"]),
        )
        .expect("reconciler construction succeeds");

        let report = reconciler.reconcile().await.expect("pass succeeds");
        assert_eq!(report.writes(), 2);
    }

    let edited_ids: Vec<String> = provider
        .write_calls()
        .into_iter()
        .filter_map(|c| match c {
            ProviderCall::Edit { record_id, content, .. } => {
                assert_eq!(content, "192.0.2.44");
                Some(record_id)
            }
            _ => None,
        })
        .collect();
    assert_eq!(edited_ids, vec!["1", "2"]);
}

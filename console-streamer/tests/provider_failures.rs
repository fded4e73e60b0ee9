mod support;

use console_streamer::{OptionSet, EMPTY_SNAPSHOT};
use std::time::Duration;
use support::{
    make_streamer, recv_within, single_provider, FailingProvider, PanickingProvider, TICK_MS,
};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn failing_provider_publishes_empty_snapshots_and_keeps_entry() {
    let failing = FailingProvider::new("failing");
    let streamer = make_streamer(TICK_MS, single_provider(failing.clone()));

    assert_eq!(
        streamer
            .get_snapshot("failing", OptionSet::new())
            .expect("failure is absorbed"),
        EMPTY_SNAPSHOT
    );

    let mut receiver = streamer
        .get_stream("failing", OptionSet::new())
        .expect("stream available")
        .subscribe();
    for _ in 0..3 {
        let payload = recv_within(&mut receiver, WAIT)
            .await
            .expect("ticker keeps publishing");
        assert_eq!(payload, EMPTY_SNAPSHOT);
    }

    assert!(streamer.contains("failing"));
    assert!(failing.calls() >= 4);
    assert!(streamer.deactivate("failing"));
}

#[tokio::test]
async fn panicking_provider_does_not_kill_ticker() {
    let streamer = make_streamer(TICK_MS, single_provider(PanickingProvider::new("boom")));

    assert_eq!(
        streamer
            .get_snapshot("boom", OptionSet::new())
            .expect("panic is absorbed"),
        EMPTY_SNAPSHOT
    );

    let subscription = streamer
        .get_or_create("boom", OptionSet::new())
        .expect("entry still registered");
    let mut receiver = subscription.stream().subscribe();
    for _ in 0..3 {
        let payload = recv_within(&mut receiver, WAIT)
            .await
            .expect("ticker survives panics");
        assert_eq!(payload, EMPTY_SNAPSHOT);
    }
    assert!(subscription.is_ticker_running());

    assert!(streamer.deactivate("boom"));
}

#[test]
fn try_snapshot_surfaces_what_invoke_snapshot_hides() {
    let streamer = make_streamer(3_600_000, single_provider(FailingProvider::new("failing")));
    let subscription = streamer
        .get_or_create("failing", OptionSet::new())
        .expect("subscription created");

    let err = subscription
        .try_snapshot()
        .expect_err("failure is visible");
    assert_eq!(err.to_string(), "snapshot provider failed: backend unavailable");
    assert_eq!(subscription.invoke_snapshot(), EMPTY_SNAPSHOT);

    let missing = streamer
        .get_or_create("missing", OptionSet::new())
        .expect("subscription created");
    assert!(missing.try_snapshot().expect("miss is not an error").is_none());
}

// ABOUTME: Tests for the channel-backed router and its inbox.
// ABOUTME: Verifies messages flow through unchanged and the inbox ends when routers drop.

use chrono::{TimeZone, Utc};
use smsgate_core::testing::RecordingRouter;
use smsgate_core::{ChannelRouter, IncomingMessage, Router};
use tokio_stream::StreamExt;

fn sample(text: &str) -> IncomingMessage {
    let sent = Utc.with_ymd_and_hms(2024, 5, 4, 9, 30, 0).unwrap();
    IncomingMessage::new("gsm", "+15557654321", sent, text)
}

#[tokio::test]
async fn test_channel_router_delivers_unchanged() {
    let (router, mut inbox) = ChannelRouter::new();
    let msg = sample("hi");
    router.incoming(msg.clone());

    assert_eq!(inbox.recv().await, Some(msg));
    assert!(inbox.try_recv().is_none());
}

#[tokio::test]
async fn test_inbox_stream_ends_when_router_dropped() {
    let (router, inbox) = ChannelRouter::new();
    router.incoming(sample("one"));
    router.incoming(sample("two"));
    drop(router);

    let texts: Vec<String> = inbox.into_stream().map(|m| m.text).collect().await;
    assert_eq!(texts, vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn test_incoming_after_inbox_dropped_does_not_panic() {
    let (router, inbox) = ChannelRouter::new();
    drop(inbox);
    router.incoming(sample("lost"));
}

#[test]
fn test_recording_router_keeps_order() {
    let router = RecordingRouter::new();
    router.incoming(sample("a"));
    router.incoming(sample("b"));

    let texts: Vec<_> = router.received().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

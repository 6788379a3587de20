// ABOUTME: Tests for the virtual modem driver's scripted behavior.
// ABOUTME: Covers open failures, PIN checks, network waits, sends, and inbound delivery.

use chrono::{TimeZone, Utc};
use smsgate_modem::drivers::virtual_modem::{SentSms, VirtualModem};
use smsgate_modem::{ModemConnector, ModemError, ModemIncoming, ModemSession, Port};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_open_records_port() {
    let modem = VirtualModem::new();
    let probe = modem.probe();

    let _session = modem.open(&Port::device("/dev/ttyUSB0")).await.unwrap();
    assert_eq!(probe.opened_ports(), vec![Port::device("/dev/ttyUSB0")]);
}

#[tokio::test]
async fn test_open_failure_is_scripted() {
    let modem = VirtualModem::new().fail_open(ModemError::PortNotFound {
        port: "/dev/ttyUSB3".to_string(),
    });

    match modem.open(&Port::device("/dev/ttyUSB3")).await {
        Err(err) => assert!(err.is_port_unavailable()),
        Ok(_) => panic!("Expected open to fail"),
    }
}

#[tokio::test]
async fn test_expected_pin_rejects_others() {
    let modem = VirtualModem::new().expect_pin("1234");
    let probe = modem.probe();
    let session = modem.open(&Port::Auto).await.unwrap();

    assert!(session.use_pin("0000").await.is_err());
    assert!(session.use_pin("1234").await.is_ok());
    assert_eq!(probe.pins(), vec!["0000".to_string(), "1234".to_string()]);
}

#[tokio::test]
async fn test_network_failure_carries_description() {
    let modem = VirtualModem::new().fail_network("Network registration denied");
    let session = modem.open(&Port::Auto).await.unwrap();

    let err = session.wait_for_network().await.unwrap_err();
    assert_eq!(err, ModemError::modem("Network registration denied"));
}

#[tokio::test(start_paused = true)]
async fn test_network_delay_is_honored() {
    let modem = VirtualModem::new()
        .with_signal(12)
        .with_network_delay(Duration::from_secs(5));
    let session = modem.open(&Port::Auto).await.unwrap();

    let started = tokio::time::Instant::now();
    let signal = session.wait_for_network().await.unwrap();
    assert_eq!(signal.0, 12);
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn test_send_records_accepted_and_rejected() {
    let accepting = VirtualModem::new();
    let accepting_probe = accepting.probe();
    let session = accepting.open(&Port::Auto).await.unwrap();
    assert!(session.send_sms("+15551234567", "hello").await);

    let rejecting = VirtualModem::new().reject_sends();
    let rejecting_probe = rejecting.probe();
    let session = rejecting.open(&Port::Auto).await.unwrap();
    assert!(!session.send_sms("+15551234567", "hello").await);

    assert_eq!(
        accepting_probe.sent(),
        vec![SentSms {
            recipient: "+15551234567".to_string(),
            text: "hello".to_string(),
            accepted: true,
        }]
    );
    assert!(!rejecting_probe.sent()[0].accepted);
}

#[tokio::test]
async fn test_deliver_without_handler_drops_message() {
    let modem = VirtualModem::new();
    let probe = modem.probe();
    let _session = modem.open(&Port::Auto).await.unwrap();

    let msg = ModemIncoming::new("+15557654321", Utc::now(), "hi");
    assert!(!probe.has_handler());
    assert!(!probe.deliver(msg));
}

#[tokio::test]
async fn test_deliver_reaches_handler_in_order() {
    let modem = VirtualModem::new();
    let probe = modem.probe();
    let session = modem.open(&Port::Auto).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    session.receive(Arc::new(move |msg: ModemIncoming| {
        let _ = tx.send(msg);
    }));
    assert!(probe.has_handler());

    let sent = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    assert!(probe.deliver(ModemIncoming::new("+15557654321", sent, "first")));
    assert!(probe.deliver(ModemIncoming::new("+15557654321", sent, "second")));

    assert_eq!(rx.recv().await.unwrap().text, "first");
    assert_eq!(rx.recv().await.unwrap().text, "second");
}

#[tokio::test]
async fn test_dropping_session_unregisters_handler() {
    let modem = VirtualModem::new();
    let probe = modem.probe();
    let session = modem.open(&Port::Auto).await.unwrap();
    session.receive(Arc::new(|_msg: ModemIncoming| {}));
    assert!(probe.has_handler());

    drop(session);
    assert!(!probe.has_handler());
}

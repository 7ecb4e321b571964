//! End-to-end tests of the dictation loop over the in-memory Bluetooth stack.
//!
//! These drive the public API exactly as `main.rs` does with `--dry-run` and
//! check the socket-level sequence the host would observe.

use std::io;
use std::time::Duration;

use btkbd_core::protocol::{CONTROL_PSM, INTERRUPT_PSM};
use btkbd_core::{decode_report, KeyboardReport};
use btkbd_server::application::dictation::{DictationError, DictationLoop, Termination};
use btkbd_server::application::establish::{ConnectionEstablisher, HidProfile};
use btkbd_server::application::session::TransportError;
use btkbd_server::infrastructure::bluetooth::mock::{
    ChannelEvent, ChannelLog, MockBluetoothManager, MockChannelFactory, MOCK_ADAPTER,
};
use btkbd_server::infrastructure::service_record::DEFAULT_SERVICE_RECORD;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

fn dictation(channels: MockChannelFactory) -> DictationLoop<MockBluetoothManager, MockChannelFactory> {
    DictationLoop::new(ConnectionEstablisher::new(
        MockBluetoothManager::default(),
        channels,
        HidProfile::keyboard("btkbd keyboard", DEFAULT_SERVICE_RECORD),
    ))
}

fn decoded(log: &ChannelLog) -> Vec<KeyboardReport> {
    log.sent(INTERRUPT_PSM)
        .iter()
        .map(|bytes| decode_report(bytes).expect("every packet is a keyboard report"))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_full_session_event_order() {
    // Arrange
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));

    // Act
    dl.run(BufReader::new(&b"a\n"[..]).lines()).await.unwrap();

    // Assert
    let events = log.events();
    assert_eq!(
        events[..4],
        [
            ChannelEvent::Listen { psm: CONTROL_PSM, address: MOCK_ADAPTER },
            ChannelEvent::Listen { psm: INTERRUPT_PSM, address: MOCK_ADAPTER },
            ChannelEvent::Accept { psm: CONTROL_PSM },
            ChannelEvent::Accept { psm: INTERRUPT_PSM },
        ]
    );
    assert_eq!(
        events[events.len() - 2..],
        [
            ChannelEvent::Close { psm: INTERRUPT_PSM },
            ChannelEvent::Close { psm: CONTROL_PSM },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reports_alternate_press_release_for_every_line() {
    // Arrange
    let text = "Hello, World!\n\nsecond line ~`\"\ttab\n";
    let expected_chars: usize = text.lines().map(|l| l.chars().count() + 1).sum();
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));

    // Act
    let summary = dl.run(BufReader::new(text.as_bytes()).lines()).await.unwrap();

    // Assert
    let reports = decoded(&log);
    assert_eq!(reports.len(), 2 * expected_chars);
    assert_eq!(summary.reports as usize, reports.len());
    assert_eq!(summary.lines, 3);
    for (i, pair) in reports.chunks(2).enumerate() {
        assert!(!pair[0].is_release(), "report {} must be a press", 2 * i);
        assert!(pair[1].is_release(), "report {} must be a release", 2 * i + 1);
    }
    assert!(log.sent(CONTROL_PSM).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_typing_is_paced_at_ten_milliseconds_per_report() {
    // Arrange
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));
    let start = tokio::time::Instant::now();

    // Act: 4 characters plus Enter
    dl.run(BufReader::new(&b"abcd\n"[..]).lines()).await.unwrap();

    // Assert
    assert_eq!(start.elapsed(), Duration::from_millis(10 * 2 * 5));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_mid_line_stops_typing() {
    // Arrange: the host drops the link on the 4th report (release of 'b')
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()).with_send_failure_at(4));

    // Act
    let result = dl.run(BufReader::new(&b"abc\nnever typed\n"[..]).lines()).await;

    // Assert
    assert!(matches!(
        result,
        Err(DictationError::Transport(TransportError::Write(_)))
    ));
    assert_eq!(log.sent(INTERRUPT_PSM).len(), 3);
    assert_eq!(log.closed(), vec![INTERRUPT_PSM, CONTROL_PSM]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_waiting_for_input_keeps_typed_lines() {
    // Arrange
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));
    let (tx, rx) = mpsc::channel::<io::Result<String>>(4);
    tx.send(Ok("ok".to_string())).await.unwrap();
    let shutdown = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
    };

    // Act: the sender stays alive, so only the shutdown future can end the loop
    let summary = dl.run_until(rx, shutdown).await.unwrap();
    drop(tx);

    // Assert
    assert_eq!(summary.termination, Termination::Shutdown);
    assert_eq!(summary.lines, 1);
    assert_eq!(summary.reports, 6);
    assert_eq!(log.closed(), vec![INTERRUPT_PSM, CONTROL_PSM]);
}

#[tokio::test]
async fn test_rejected_registration_fails_before_any_socket() {
    let log = ChannelLog::default();
    let mut manager = MockBluetoothManager::default();
    manager.fail_registration = true;
    let dl = DictationLoop::new(ConnectionEstablisher::new(
        manager,
        MockChannelFactory::new(log.clone()),
        HidProfile::keyboard("btkbd keyboard", DEFAULT_SERVICE_RECORD),
    ));

    let result = dl.run(BufReader::new(&b"a\n"[..]).lines()).await;

    assert!(matches!(result, Err(DictationError::Setup(_))));
    assert!(log.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_lines_split_across_reads_are_typed_whole() {
    // Arrange: input arrives in fragments, as from a pipe
    let input = tokio_test::io::Builder::new()
        .read(b"He")
        .read(b"y\nyo")
        .read(b"u\n")
        .build();
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));

    // Act
    let summary = tokio_test::assert_ok!(dl.run(BufReader::new(input).lines()).await);

    // Assert
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.characters, 8);
    assert_eq!(decoded(&log).len(), 16);
}

#[tokio::test(start_paused = true)]
async fn test_read_error_after_first_line_closes_session() {
    // Arrange
    let input = tokio_test::io::Builder::new()
        .read(b"a\n")
        .read_error(io::Error::new(io::ErrorKind::Other, "tty detached"))
        .build();
    let log = ChannelLog::default();
    let dl = dictation(MockChannelFactory::new(log.clone()));

    // Act
    let result = dl.run(BufReader::new(input).lines()).await;

    // Assert
    assert!(matches!(result, Err(DictationError::Input(_))));
    assert_eq!(log.sent(INTERRUPT_PSM).len(), 4);
    assert_eq!(log.closed(), vec![INTERRUPT_PSM, CONTROL_PSM]);
}

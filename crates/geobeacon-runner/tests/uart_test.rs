//! End-to-end tests: a TCP client plays the GNSS receiver against a hub
//! running on the UART bridge.

use geobeacon_hub::{LocationHub, UpdateOutcome};
use geobeacon_runner::beacon::{BeaconAdvertiser, LoggingSink};
use geobeacon_runner::config::BeaconConfig;
use geobeacon_runner::uart_server::UartBridge;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

/// Helper to bind a bridge on a free loopback port and connect a client.
fn connect() -> (LocationHub<UartBridge>, TcpStream) {
    let bridge = UartBridge::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .expect("bind should succeed");
    let client = TcpStream::connect(bridge.local_addr()).expect("connect should succeed");
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    (LocationHub::new(bridge), client)
}

/// Run update cycles until one does something.
fn update_until_busy(hub: &mut LocationHub<UartBridge>) -> UpdateOutcome {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        match hub.update() {
            UpdateOutcome::Idle => std::thread::sleep(Duration::from_millis(5)),
            outcome => return outcome,
        }
    }
    UpdateOutcome::Idle
}

fn read_exact_len(client: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    client.read_exact(&mut buf).expect("reply should arrive");
    buf
}

// ============================================================================
// Location updates over TCP
// ============================================================================

#[test]
fn test_invalid_line_gets_diagnostic() {
    let (mut hub, mut client) = connect();

    client.write_all(b"+95.000000,+000.000000\r\n").unwrap();
    let outcome = update_until_busy(&mut hub);
    assert!(matches!(outcome, UpdateOutcome::Rejected(_)));

    assert_eq!(read_exact_len(&mut client, 19), b"Invalid location!\r\n");
    assert_eq!(hub.location().to_string(), "+00.000000,+000.000000");
}

#[test]
fn test_valid_line_is_echoed_by_advertiser() {
    let (mut hub, mut client) = connect();

    let sender = hub.transport().sender();
    let mut advertiser = BeaconAdvertiser::new(&BeaconConfig::default(), LoggingSink::default())
        .with_echo(Box::new(move |field: &[u8]| sender.send_line(field)));
    advertiser.start();
    hub.subscribe(advertiser).unwrap();

    client.write_all(b"-33.868820,").unwrap();
    client.flush().unwrap();
    client.write_all(b"151.209296\n").unwrap();

    let outcome = update_until_busy(&mut hub);
    assert_eq!(outcome, UpdateOutcome::Updated { notified: 1 });
    assert_eq!(hub.location().to_string(), "-33.868820,+151.209296");

    assert_eq!(read_exact_len(&mut client, 25), b"-33.868820\r\n+151.209296\r\n");
    assert_eq!(hub.stats().accepted, 1);
}

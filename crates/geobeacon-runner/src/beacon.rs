//! Beacon advertiser.
//!
//! Subscribes to the location hub and turns every accepted fix into a
//! non-connectable advertising payload:
//!
//! ```text
//! +------+------+-------+------+------+-------+-------+--------------------+
//! | 0x02 | 0x01 | flags | len  | 0xFF | id_lo | id_hi | beacon info (22 B) |
//! +------+------+-------+------+------+-------+-------+--------------------+
//! ```
//!
//! The beacon info is the encoded location record. Two payload buffers are
//! used alternately so the one handed to the radio is never rewritten while
//! it may still be on air.

use crate::config::BeaconConfig;
use geobeacon_hub::LocationSubscriber;
use geobeacon_protocol::{codec, LocationFix, LATITUDE_FIELD_LEN, RECORD_LEN};

/// Length of the beacon info carried in the manufacturer data.
pub const BEACON_INFO_LEN: usize = RECORD_LEN;

/// Maximum legacy advertising data length.
pub const ADV_DATA_MAX_LEN: usize = 31;

/// Longest device name put in the scan response.
pub const SHORT_NAME_MAX_LEN: usize = 11;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_SHORT_NAME: u8 = 0x08;
const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;
const FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Receives finished payloads, standing in for the radio stack.
pub trait AdvertisingSink {
    /// Replace the advertised data and scan response.
    fn configure(&mut self, advertising_data: &[u8], scan_response: &[u8]);
}

/// Sink that logs each payload in hex.
#[derive(Debug, Default)]
pub struct LoggingSink {
    /// Number of payloads configured so far.
    pub updates: u64,
}

impl AdvertisingSink for LoggingSink {
    fn configure(&mut self, advertising_data: &[u8], scan_response: &[u8]) {
        self.updates += 1;
        tracing::info!(
            update = self.updates,
            adv = %hex::encode(advertising_data),
            scan_rsp = %hex::encode(scan_response),
            "advertising payload updated"
        );
    }
}

/// Callback used to echo accepted fields back over the serial link.
pub type EchoFn = Box<dyn FnMut(&[u8])>;

/// Builds advertising payloads from location fixes.
pub struct BeaconAdvertiser<S> {
    company_id: u16,
    beacon_info: [u8; BEACON_INFO_LEN],
    payloads: [Vec<u8>; 2],
    active: usize,
    scan_response: Vec<u8>,
    echo: Option<EchoFn>,
    sink: S,
}

impl<S: AdvertisingSink> BeaconAdvertiser<S> {
    /// Create an advertiser initialised to the default (origin) location.
    pub fn new(config: &BeaconConfig, sink: S) -> Self {
        let mut advertiser = BeaconAdvertiser {
            company_id: config.company_id,
            beacon_info: codec::encode(&LocationFix::default()),
            payloads: [
                Vec::with_capacity(ADV_DATA_MAX_LEN),
                Vec::with_capacity(ADV_DATA_MAX_LEN),
            ],
            active: 0,
            scan_response: build_scan_response(&config.device_name),
            echo: None,
            sink,
        };
        advertiser.payloads[0] = advertiser.build_advertising_data();
        advertiser
    }

    /// Echo the latitude and longitude fields of each fix through `echo`.
    pub fn with_echo(mut self, echo: EchoFn) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Push the current payload to the sink.
    pub fn start(&mut self) {
        self.sink
            .configure(&self.payloads[self.active], &self.scan_response);
    }

    /// The payload currently handed to the radio.
    pub fn advertising_data(&self) -> &[u8] {
        &self.payloads[self.active]
    }

    /// The scan response.
    pub fn scan_response(&self) -> &[u8] {
        &self.scan_response
    }

    /// The encoded location carried in the manufacturer data.
    pub fn beacon_info(&self) -> &[u8; BEACON_INFO_LEN] {
        &self.beacon_info
    }

    fn build_advertising_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(ADV_DATA_MAX_LEN);
        data.extend_from_slice(&[2, AD_TYPE_FLAGS, FLAG_BR_EDR_NOT_SUPPORTED]);
        data.push((1 + 2 + BEACON_INFO_LEN) as u8);
        data.push(AD_TYPE_MANUFACTURER_DATA);
        data.extend_from_slice(&self.company_id.to_le_bytes());
        data.extend_from_slice(&self.beacon_info);
        data
    }
}

impl<S: AdvertisingSink> LocationSubscriber for BeaconAdvertiser<S> {
    fn notify(&mut self, fix: &LocationFix) {
        self.beacon_info = codec::encode(fix);

        if let Some(echo) = self.echo.as_mut() {
            let (latitude, rest) = self.beacon_info.split_at(LATITUDE_FIELD_LEN);
            echo(latitude);
            echo(&rest[1..]);
        }

        let next = 1 - self.active;
        self.payloads[next] = self.build_advertising_data();
        self.active = next;
        self.sink
            .configure(&self.payloads[self.active], &self.scan_response);
    }
}

fn build_scan_response(device_name: &str) -> Vec<u8> {
    let name = &device_name.as_bytes()[..device_name.len().min(SHORT_NAME_MAX_LEN)];
    let mut data = Vec::with_capacity(2 + name.len());
    data.push((1 + name.len()) as u8);
    data.push(AD_TYPE_SHORT_NAME);
    data.extend_from_slice(name);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingSink {
        payloads: Rc<RefCell<Vec<(Vec<u8>, Vec<u8>)>>>,
    }

    impl AdvertisingSink for RecordingSink {
        fn configure(&mut self, advertising_data: &[u8], scan_response: &[u8]) {
            self.payloads
                .borrow_mut()
                .push((advertising_data.to_vec(), scan_response.to_vec()));
        }
    }

    #[test]
    fn test_initial_payload() {
        let advertiser = BeaconAdvertiser::new(&BeaconConfig::default(), RecordingSink::default());
        let data = advertiser.advertising_data();
        assert_eq!(data.len(), 29);
        assert!(data.len() <= ADV_DATA_MAX_LEN);
        assert_eq!(&data[..3], &[0x02, 0x01, 0x04]);
        assert_eq!(&data[3..7], &[0x19, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&data[7..], b"+00.000000,+000.000000");
    }

    #[test]
    fn test_scan_response_name() {
        let advertiser = BeaconAdvertiser::new(&BeaconConfig::default(), RecordingSink::default());
        let mut expected = vec![12, 0x08];
        expected.extend_from_slice(b"GNSS Beacon");
        assert_eq!(advertiser.scan_response(), expected.as_slice());

        let config = BeaconConfig {
            device_name: "A Very Long Beacon Name".to_string(),
            ..Default::default()
        };
        let advertiser = BeaconAdvertiser::new(&config, RecordingSink::default());
        assert_eq!(advertiser.scan_response().len(), 2 + SHORT_NAME_MAX_LEN);
        assert_eq!(&advertiser.scan_response()[2..], b"A Very Long");
    }

    #[test]
    fn test_notify_updates_payload_and_flips_buffers() {
        let sink = RecordingSink::default();
        let config = BeaconConfig {
            company_id: 0x0059,
            ..Default::default()
        };
        let mut advertiser = BeaconAdvertiser::new(&config, sink.clone());
        advertiser.start();

        let fix = codec::parse(b"-33.868820,+151.209296").unwrap();
        advertiser.notify(&fix);
        assert_eq!(advertiser.active, 1);
        assert_eq!(advertiser.beacon_info(), b"-33.868820,+151.209296");
        assert_eq!(&advertiser.advertising_data()[5..7], &[0x59, 0x00]);

        advertiser.notify(&LocationFix::default());
        assert_eq!(advertiser.active, 0);

        let payloads = sink.payloads.borrow();
        assert_eq!(payloads.len(), 3);
        assert_eq!(&payloads[1].0[7..], b"-33.868820,+151.209296");
        assert_eq!(&payloads[2].0[7..], b"+00.000000,+000.000000");
    }

    #[test]
    fn test_echo_sends_both_fields() {
        let echoed = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&echoed);
        let mut advertiser = BeaconAdvertiser::new(&BeaconConfig::default(), RecordingSink::default())
            .with_echo(Box::new(move |line: &[u8]| log.borrow_mut().push(line.to_vec())));

        advertiser.notify(&codec::parse(b"12.345678,045.678901").unwrap());
        assert_eq!(
            *echoed.borrow(),
            vec![b"+12.345678".to_vec(), b"+045.678901".to_vec()]
        );
    }
}

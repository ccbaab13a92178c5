//! Fixtures and fakes shared by unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

use crate::clock::Clock;
use crate::derive::{GeocodeError, Geocoder};
use crate::oem::parse_epoch;
use crate::refresh::{FeedSource, RefreshError};

/// Three ISS-like samples four minutes apart, laid out like the NASA feed.
pub const SAMPLE_OEM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ndm xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="https://sanaregistry.org/r/ndmxml_unqualified/ndmxml-2.0.0-master-2.0.xsd">
  <oem id="CCSDS_OEM_VERS" version="2.0">
    <header>
      <CREATION_DATE>2024-299T18:37:21.420Z</CREATION_DATE>
      <ORIGINATOR>JSC</ORIGINATOR>
    </header>
    <body>
      <segment>
        <metadata>
          <OBJECT_NAME>ISS</OBJECT_NAME>
          <OBJECT_ID>1998-067-A</OBJECT_ID>
          <CENTER_NAME>EARTH</CENTER_NAME>
          <REF_FRAME>EME2000</REF_FRAME>
          <TIME_SYSTEM>UTC</TIME_SYSTEM>
          <START_TIME>2024-300T00:00:00.000Z</START_TIME>
          <STOP_TIME>2024-300T00:08:00.000Z</STOP_TIME>
        </metadata>
        <data>
          <COMMENT>Units are in kg and m^2</COMMENT>
          <COMMENT>MASS=459325.00</COMMENT>
          <stateVector>
            <EPOCH>2024-300T00:00:00.000Z</EPOCH>
            <X units="km">-4921.7510</X>
            <Y units="km">3589.2650</Y>
            <Z units="km">-3011.3596</Z>
            <X_DOT units="km/s">-1.9495</X_DOT>
            <Y_DOT units="km/s">-6.2363</Y_DOT>
            <Z_DOT units="km/s">-3.9982</Z_DOT>
          </stateVector>
          <stateVector>
            <EPOCH>2024-300T00:04:00.000Z</EPOCH>
            <X units="km">-5371.9774</X>
            <Y units="km">2117.3200</Y>
            <Z units="km">-3582.3956</Z>
            <X_DOT units="km/s">-5.1315</X_DOT>
            <Y_DOT units="km/s">-4.9597</Y_DOT>
            <Z_DOT units="km/s">-2.7832</Z_DOT>
          </stateVector>
          <COMMENT>End of first orbit arc</COMMENT>
          <stateVector>
            <EPOCH>2024-300T00:08:00.000Z</EPOCH>
            <X units="km">-5551.6501</X>
            <Y units="km">643.7234</Y>
            <Z units="km">-3865.1707</Z>
            <X_DOT units="km/s">-6.9814</X_DOT>
            <Y_DOT units="km/s">-2.9444</Y_DOT>
            <Z_DOT units="km/s">-1.1256</Z_DOT>
          </stateVector>
        </data>
      </segment>
    </body>
  </oem>
</ndm>
"#;

pub fn epoch(s: &str) -> DateTime<Utc> {
    parse_epoch(s).unwrap_or_else(|| panic!("bad test epoch {s}"))
}

pub struct FixedClock(pub Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(s: &str) -> Self {
        FixedClock(Mutex::new(epoch(s)))
    }

    pub fn set(&self, s: &str) {
        *self.0.lock().unwrap() = epoch(s);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub struct FixedGeocoder(pub Option<String>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn reverse_geocode(&self, _: f64, _: f64) -> Result<Option<String>, GeocodeError> {
        Ok(self.0.clone())
    }
}

pub struct SlowGeocoder(pub Duration);

#[async_trait]
impl Geocoder for SlowGeocoder {
    async fn reverse_geocode(&self, _: f64, _: f64) -> Result<Option<String>, GeocodeError> {
        tokio::time::sleep(self.0).await;
        Ok(Some("too late".into()))
    }
}

/// Feed that serves canned responses and counts fetches. When `gate` is set,
/// every fetch waits for it to be notified first.
pub struct FakeFeed {
    responses: Mutex<Vec<Result<Vec<u8>, String>>>,
    pub fetches: AtomicUsize,
    pub gate: Option<Notify>,
    pub started: Notify,
}

impl FakeFeed {
    /// Responses are served in order; the last one repeats.
    pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(|b| b.as_bytes().to_vec()).map_err(String::from))
                    .collect(),
            ),
            fetches: AtomicUsize::new(0),
            gate: None,
            started: Notify::new(),
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, RefreshError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses[0].clone()
        };
        response.map_err(RefreshError::FetchFailed)
    }
}

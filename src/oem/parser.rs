use serde::Deserialize;

use super::epoch::parse_epoch;
use super::error::OemError;
use super::types::StateVector;

// Intermediate records mirror the CCSDS OEM XML layout. Anything not named here
// (header, metadata, COMMENT, covariance, attributes) is skipped by serde.

#[derive(Debug, Deserialize)]
struct Document {
    /// Present when the root is `<ndm>`.
    oem: Option<OemMessage>,
    /// Present when the root is `<oem>` itself.
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct OemMessage {
    body: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(rename = "segment", default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    data: SegmentData,
}

#[derive(Debug, Deserialize)]
struct SegmentData {
    #[serde(rename = "stateVector", default)]
    state_vectors: Vec<RawStateVector>,
}

#[derive(Debug, Deserialize)]
struct RawStateVector {
    #[serde(rename = "EPOCH")]
    epoch: String,
    #[serde(rename = "X")]
    x: Quantity,
    #[serde(rename = "Y")]
    y: Quantity,
    #[serde(rename = "Z")]
    z: Quantity,
    #[serde(rename = "X_DOT")]
    x_dot: Quantity,
    #[serde(rename = "Y_DOT")]
    y_dot: Quantity,
    #[serde(rename = "Z_DOT")]
    z_dot: Quantity,
}

/// Numeric element carrying a `units` attribute we do not need.
#[derive(Debug, Deserialize)]
struct Quantity {
    #[serde(rename = "$text")]
    value: f64,
}

/// Parse an OEM XML document into state vectors, in document order.
///
/// Epochs are normalized to whole UTC seconds. A single bad entry rejects the
/// whole document.
pub fn parse_oem(xml: &[u8]) -> Result<Vec<StateVector>, OemError> {
    let text = std::str::from_utf8(xml)?;
    let document: Document = quick_xml::de::from_str(text)?;

    let body = match (document.oem, document.body) {
        (Some(message), _) => message.body,
        (None, Some(body)) => body,
        (None, None) => return Err(OemError::MissingBody),
    };

    body.segments
        .into_iter()
        .flat_map(|segment| segment.data.state_vectors)
        .enumerate()
        .map(|(index, raw)| convert(index, raw))
        .collect()
}

fn convert(index: usize, raw: RawStateVector) -> Result<StateVector, OemError> {
    let epoch = parse_epoch(&raw.epoch).ok_or_else(|| OemError::InvalidEpoch {
        index,
        value: raw.epoch.clone(),
    })?;

    let fields = [
        ("X", raw.x.value),
        ("Y", raw.y.value),
        ("Z", raw.z.value),
        ("X_DOT", raw.x_dot.value),
        ("Y_DOT", raw.y_dot.value),
        ("Z_DOT", raw.z_dot.value),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(OemError::NonFinite { index, field });
    }

    Ok(StateVector {
        epoch,
        position: [raw.x.value, raw.y.value, raw.z.value],
        velocity: [raw.x_dot.value, raw.y_dot.value, raw.z_dot.value],
    })
}

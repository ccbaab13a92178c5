use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Every epoch leaving the service is rendered in this form.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// Day-of-year is what the ISS feed publishes; calendar dates are what clients send back.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%jT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses an OEM or RFC 3339 timestamp into a UTC instant truncated to whole seconds.
pub fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).trunc_subsecs(0));
    }

    let naive = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .unwrap_or(s);

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc().trunc_subsecs(0))
}

pub fn format_epoch(epoch: &DateTime<Utc>) -> String {
    epoch.format(CANONICAL_FORMAT).to_string()
}

use chrono::Duration;

/// Parses a signed humantime duration: `"5s"`, `"+3s"`, `"-9h"`, `"1h 30m"`.
pub fn parse_signed_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (neg, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let dur = parse_duration(rest)?;
    Ok(if neg { -dur } else { dur })
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

pub fn format_signed_duration(d: Duration) -> String {
    let magnitude = d.abs().to_std().unwrap_or_default();
    let formatted = humantime::format_duration(magnitude).to_string();
    if d < Duration::zero() {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Serde adapter for `std::time::Duration` written as humantime strings.
pub mod duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for signed `chrono::Duration` offsets such as `"-9h"`.
pub mod signed_duration {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_signed_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_signed_duration(&s).map_err(serde::de::Error::custom)
    }
}

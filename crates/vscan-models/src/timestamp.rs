//! Timestamp parsing for playback seeking.
//!
//! Analysis rows carry positions as `HH:MM:SS.mmm`. The fractional part is
//! optional and is read as a decimal fraction of a second, so `.5` and `.500`
//! both mean half a second.

/// Parse an `HH:MM:SS` or `HH:MM:SS.mmm` timestamp to total seconds.
///
/// # Examples
/// ```
/// use vscan_models::timestamp::parse_timestamp_to_seconds;
/// assert_eq!(parse_timestamp_to_seconds("00:01:23.500").unwrap(), 83.5);
/// assert_eq!(parse_timestamp_to_seconds("01:00:00").unwrap(), 3600.0);
/// ```
pub fn parse_timestamp_to_seconds(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() != 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let hours = parse_component("hours", parts[0])?;
    let minutes = parse_component("minutes", parts[1])?;

    let (whole, fraction) = match parts[2].split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (parts[2], None),
    };
    let seconds = parse_component("seconds", whole)?;

    let fraction = match fraction {
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimestampError::InvalidValue("milliseconds", digits.to_string()));
            }
            format!("0.{}", digits)
                .parse::<f64>()
                .map_err(|_| TimestampError::InvalidValue("milliseconds", digits.to_string()))?
        }
        None => 0.0,
    };

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + fraction)
}

fn parse_component(name: &'static str, raw: &str) -> Result<u64, TimestampError> {
    if raw.starts_with('-') {
        return Err(TimestampError::Negative);
    }
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::InvalidValue(name, raw.to_string()));
    }
    raw.parse()
        .map_err(|_| TimestampError::InvalidValue(name, raw.to_string()))
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let total_ms = (total_secs.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// A component carries a minus sign
    Negative,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Not in `HH:MM:SS[.mmm]` form
    InvalidFormat(String),
    /// Parses, but is too far out to seek to
    OutOfRange(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::Negative => write!(f, "Timestamp cannot be negative"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: '{}'", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use HH:MM:SS or HH:MM:SS.mmm",
                ts
            ),
            Self::OutOfRange(ts) => write!(f, "Timestamp '{}' is out of range", ts),
        }
    }
}

impl std::error::Error for TimestampError {}

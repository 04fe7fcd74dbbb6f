use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ApiError;

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$")
        .expect("Invalid duration regex")
});

/// Whole seconds of an ISO-8601 duration such as `PT1H2M3S`.
/// Fractional seconds are truncated.
pub fn parse_iso8601_duration(value: &str) -> Result<u64, ApiError> {
    let value = value.trim();
    let invalid = || ApiError::ParseError(format!("Invalid ISO-8601 duration: '{}'", value));

    let caps = DURATION_REGEX.captures(value).ok_or_else(invalid)?;
    // "P" and "PT" match the pattern but carry no component
    if value.ends_with('P') || value.ends_with('T') {
        return Err(invalid());
    }

    let part = |i: usize| -> Result<u64, ApiError> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };

    let seconds = match caps.get(5) {
        Some(m) => m.as_str().parse::<f64>().map_err(|_| invalid())?.trunc() as u64,
        None => 0,
    };

    [(part(1)?, 7 * 86_400), (part(2)?, 86_400), (part(3)?, 3_600), (part(4)?, 60), (seconds, 1)]
        .into_iter()
        .try_fold(0u64, |total, (count, unit)| count.checked_mul(unit)?.checked_add(total))
        .ok_or_else(invalid)
}

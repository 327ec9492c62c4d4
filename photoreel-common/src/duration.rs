use std::time::Duration;
use std::str::FromStr;
use anyhow::{bail, Context, Result};

pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    humantime::Duration::from_str(duration_str)
        .map(|d| d.into())
        .with_context(|| format!("Invalid duration format: {}", duration_str))
}

/// Longest accepted slideshow interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Parses a slideshow interval. Intervals are whole seconds, between one
/// second and [`MAX_INTERVAL`].
pub fn parse_interval(interval_str: &str) -> Result<Duration> {
    // Bare numbers are seconds
    let duration = match interval_str.trim().parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => parse_duration(interval_str)?,
    };
    check_interval(duration)?;
    Ok(duration)
}

pub fn check_interval(duration: Duration) -> Result<()> {
    if duration.subsec_nanos() != 0 {
        bail!("Interval must be a whole number of seconds, got {:?}", duration);
    }
    if duration.as_secs() == 0 {
        bail!("Interval must be at least one second");
    }
    if duration > MAX_INTERVAL {
        bail!("Interval must be at most {}s, got {}s", MAX_INTERVAL.as_secs(), duration.as_secs());
    }
    Ok(())
}

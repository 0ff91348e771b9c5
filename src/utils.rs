//! Utility functions for log formatting and request pacing.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for log fields
//! - Randomised politeness delays between article requests

use crate::config::DelayRange;
use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped characters appended. The cut always falls on a character
/// boundary.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it has at most `max` characters, otherwise a
/// truncated version with `"…(+N chars)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => {
            let dropped = s[cut..].chars().count();
            format!("{}…(+{} chars)", &s[..cut], dropped)
        }
    }
}

/// Pick a delay uniformly from `range` (inclusive, milliseconds).
///
/// A reversed range is treated as its minimum.
pub fn random_delay(range: DelayRange) -> Duration {
    let ms = if range.max > range.min {
        rng().random_range(range.min..=range.max)
    } else {
        range.min
    };
    Duration::from_millis(ms)
}

/// Sleep for a random delay from `range` before the next request.
pub async fn politeness_delay(range: DelayRange) {
    let delay = random_delay(range);
    if delay.is_zero() {
        return;
    }
    debug!(ms = delay.as_millis() as u64, "Politeness delay");
    sleep(delay).await;
}

//! # Match Results
//!
//! The single value produced by a successful pipeline run. Rounding is
//! applied once at construction: confidence to 3 decimal places, the
//! processing time to 2.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Decision returned for one comparison request. Not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Whether any reference face is within tolerance of the probe face.
    pub is_match: bool,
    /// Heuristic similarity in `[0, 1]`, rounded to 3 decimal places.
    pub confidence: f64,
    /// Wall-clock processing time in seconds, rounded to 2 decimal places.
    pub processing_time_secs: f64,
    /// When the result was assembled.
    pub timestamp: DateTime<Utc>,
}

impl MatchResult {
    /// Assemble a result, rounding confidence and elapsed time.
    pub fn new(is_match: bool, confidence: f64, elapsed: Duration, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_match,
            confidence: round_to(confidence.clamp(0.0, 1.0), 3),
            processing_time_secs: round_to(elapsed.as_secs_f64(), 2),
            timestamp,
        }
    }

    /// Human-readable summary of the decision.
    pub fn message(&self) -> &'static str {
        if self.is_match {
            "Face match successful"
        } else {
            "Faces do not match"
        }
    }

    /// Timestamp as fractional seconds since the Unix epoch.
    pub fn unix_timestamp(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / 1_000_000.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn rounds_confidence_and_time() {
        let r = MatchResult::new(true, 0.812_345, Duration::from_millis(1_234), at());
        assert_eq!(r.confidence, 0.812);
        assert_eq!(r.processing_time_secs, 1.23);

        let r = MatchResult::new(false, 0.299_95, Duration::from_millis(5), at());
        assert_eq!(r.confidence, 0.3);
        assert_eq!(r.processing_time_secs, 0.01);
    }

    #[test]
    fn confidence_is_clamped() {
        let r = MatchResult::new(false, -0.4, Duration::ZERO, at());
        assert_eq!(r.confidence, 0.0);
        let r = MatchResult::new(true, 1.2, Duration::ZERO, at());
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn message_follows_decision() {
        assert_eq!(
            MatchResult::new(true, 0.9, Duration::ZERO, at()).message(),
            "Face match successful"
        );
        assert_eq!(
            MatchResult::new(false, 0.1, Duration::ZERO, at()).message(),
            "Faces do not match"
        );
    }

    #[test]
    fn unix_timestamp_is_fractional_seconds() {
        let ts = at() + chrono::Duration::milliseconds(250);
        let r = MatchResult::new(true, 1.0, Duration::ZERO, ts);
        assert_eq!(r.unix_timestamp(), at().timestamp() as f64 + 0.25);
    }
}

//! The slice of the active treatment profile the constraint chain reads.
//!
//! The full profile (time-of-day basal schedule, ISF, carb ratios, targets)
//! lives with its own collaborator; a decision only needs the rates below,
//! captured at the moment the chain is invoked.

use serde::{Deserialize, Serialize};

/// Basal rates for the in-flight decision, in U/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Basal rate applicable right now.
    pub current_basal: f64,
    /// Highest scheduled basal rate of the day.
    pub max_daily_basal: f64,
}

impl Profile {
    pub fn new(current_basal: f64, max_daily_basal: f64) -> Self {
        Self {
            current_basal,
            max_daily_basal,
        }
    }

    /// Absolute rate equivalent of a percent temp-basal request.
    pub fn percent_to_absolute(&self, percent: i32) -> f64 {
        self.current_basal * f64::from(percent) / 100.0
    }

    /// Percent equivalent of an absolute rate, rounded down so the result
    /// never re-exceeds the absolute ceiling it was derived from.
    pub fn absolute_to_percent(&self, absolute: f64) -> i32 {
        (absolute / self.current_basal * 100.0).floor() as i32
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_round_trip_rounds_down() {
        let profile = Profile::new(0.9, 1.2);
        let absolute = profile.percent_to_absolute(150);
        assert!((absolute - 1.35).abs() < 1e-9);
        // 1.35 / 0.9 * 100 = 150 exactly; nudge down and the floor shows.
        assert_eq!(profile.absolute_to_percent(1.3499), 149);
    }

    #[test]
    fn negative_percent_stays_negative() {
        let profile = Profile::default();
        assert!((profile.percent_to_absolute(-22) - (-0.22)).abs() < 1e-9);
    }
}

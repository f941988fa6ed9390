//! Boost Gesture Detection
//!
//! A boost is requested by selecting the same pony `clicks` times within a
//! rolling `window`. Only the pony currently being clicked is tracked:
//! selecting another pony starts over from scratch.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

use crate::models::PonyId;

/// Gesture thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoostConfig {
    /// Selections needed to trigger a boost
    pub clicks: usize,
    /// The first and last of those selections must be strictly closer than this
    pub window_ms: i64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            clicks: 5,
            window_ms: 1000,
        }
    }
}

/// Sliding-window click counter for the boost gesture
#[derive(Debug, Clone)]
pub struct BoostDetector {
    config: BoostConfig,
    target: Option<PonyId>,
    clicks: VecDeque<DateTime<Utc>>,
}

impl BoostDetector {
    pub fn new(config: BoostConfig) -> Self {
        Self {
            config,
            target: None,
            clicks: VecDeque::with_capacity(config.clicks),
        }
    }

    /// Record a selection of `pony_id` at `at`
    ///
    /// Returns `true` when this selection completes the gesture; the history
    /// is then cleared so the next boost needs a full new series.
    pub fn record(&mut self, pony_id: &PonyId, at: DateTime<Utc>) -> bool {
        if self.target.as_ref() != Some(pony_id) {
            self.target = Some(pony_id.clone());
            self.clicks.clear();
        }

        self.clicks.push_back(at);
        while self.clicks.len() > self.config.clicks {
            self.clicks.pop_front();
        }

        if self.clicks.len() < self.config.clicks.max(1) {
            return false;
        }

        let (Some(first), Some(last)) = (self.clicks.front(), self.clicks.back()) else {
            return false;
        };
        if *last - *first < Duration::milliseconds(self.config.window_ms) {
            self.clicks.clear();
            true
        } else {
            false
        }
    }

    /// Pony whose clicks are currently counted
    pub fn target(&self) -> Option<&PonyId> {
        self.target.as_ref()
    }

    /// Clicks held for the current target
    pub fn pending_clicks(&self) -> usize {
        self.clicks.len()
    }
}

impl Default for BoostDetector {
    fn default() -> Self {
        Self::new(BoostConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_600_000_000_000 + ms).unwrap()
    }

    fn clicks(detector: &mut BoostDetector, pony: i64, times: &[i64]) -> Vec<bool> {
        let pony = PonyId::from(pony);
        times.iter().map(|&t| detector.record(&pony, at(t))).collect()
    }

    #[test]
    fn test_five_quick_clicks_boost_once() {
        let mut detector = BoostDetector::default();

        let fired = clicks(&mut detector, 1, &[0, 200, 400, 600, 800]);
        assert_eq!(fired, vec![false, false, false, false, true]);
        assert_eq!(detector.pending_clicks(), 0);
    }

    #[test]
    fn test_slow_series_slides_into_a_quick_one() {
        let mut detector = BoostDetector::default();

        let fired = clicks(&mut detector, 1, &[0, 200, 400, 600, 1001]);
        assert_eq!(fired, vec![false; 5]);

        // 200..1199 is within the window
        assert_eq!(clicks(&mut detector, 1, &[1199]), vec![true]);
    }

    #[test]
    fn test_exactly_one_window_apart_does_not_fire() {
        let mut detector = BoostDetector::default();

        let fired = clicks(&mut detector, 1, &[0, 250, 500, 750, 1000]);
        assert_eq!(fired, vec![false; 5]);
    }

    #[test]
    fn test_other_pony_resets_progress() {
        let mut detector = BoostDetector::default();

        let mut fired = clicks(&mut detector, 1, &[0, 200, 400]);
        fired.extend(clicks(&mut detector, 2, &[400]));
        fired.extend(clicks(&mut detector, 1, &[600, 800]));

        assert!(fired.iter().all(|f| !f));
        assert_eq!(detector.target(), Some(&PonyId::from(1)));
        assert_eq!(detector.pending_clicks(), 2);
    }

    #[test]
    fn test_next_boost_needs_a_full_series() {
        let mut detector = BoostDetector::default();

        clicks(&mut detector, 1, &[0, 100, 200, 300, 400]);
        let fired = clicks(&mut detector, 1, &[500, 600, 700, 800]);
        assert_eq!(fired, vec![false; 4]);
        assert_eq!(clicks(&mut detector, 1, &[900]), vec![true]);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut detector = BoostDetector::new(BoostConfig {
            clicks: 3,
            window_ms: 300,
        });

        assert_eq!(clicks(&mut detector, 4, &[0, 100, 299]), vec![false, false, true]);
    }
}

pub mod alerts;
pub mod stopwatch;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::NotificationConfig,
    tracker::{
        alerts::{Alert, AlertPolicy},
        stopwatch::Stopwatch,
    },
    utils::clock::Clock,
};

/// The order currently being worked on. Purely in-memory, cleared when its
/// time slice is pushed to the ledger.
struct OrderSelection {
    name: String,
    started: DateTime<Utc>,
}

/// Session state the presentation shell drives: the stopwatch, the alert
/// policy and the active order selection. Reset clears all three.
pub struct ActivityTracker {
    clock: Arc<dyn Clock>,
    stopwatch: Stopwatch,
    alerts: AlertPolicy,
    selection: Option<OrderSelection>,
}

impl ActivityTracker {
    pub fn new(clock: Arc<dyn Clock>, notifications: &NotificationConfig) -> Self {
        Self {
            stopwatch: Stopwatch::new(clock.clone()),
            alerts: AlertPolicy::new(notifications),
            selection: None,
            clock,
        }
    }

    pub fn start(&mut self) {
        self.stopwatch.start();
    }

    pub fn pause(&mut self) {
        self.stopwatch.pause();
    }

    pub fn toggle(&mut self) {
        self.stopwatch.toggle();
    }

    pub fn reset(&mut self) {
        self.stopwatch.reset();
        self.alerts.reset();
        self.selection = None;
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    /// Evaluated once per tick by the shell.
    pub fn check_alert(&mut self) -> Option<Alert> {
        self.alerts.check(self.stopwatch.elapsed())
    }

    /// Marks `name` as being worked on from this moment. Selecting while a
    /// previous selection is pending replaces it, the shell is expected to
    /// push first.
    pub fn select_order(&mut self, name: impl Into<String>) {
        self.selection = Some(OrderSelection {
            name: name.into(),
            started: self.clock.time(),
        });
    }

    pub fn selected_order(&self) -> Option<&str> {
        self.selection.as_ref().map(|v| v.name.as_str())
    }

    /// Takes the pending selection along with the wall-clock time spent on it
    /// since it was selected. Selection time runs independently of the
    /// stopwatch, matching how order slices were measured originally.
    pub fn take_order(&mut self) -> Option<(String, Duration)> {
        let selection = self.selection.take()?;
        let spent = self.clock.time() - selection.started;
        Some((selection.name, spent))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::NaiveDate;

    use super::*;
    use crate::{config::ThresholdSpec, utils::clock::testing::FakeClock};

    fn fixture() -> (FakeClock, ActivityTracker) {
        let clock = FakeClock::at_midnight(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let notifications = NotificationConfig {
            information: ThresholdSpec {
                seconds: 10,
                ..Default::default()
            },
            warning: ThresholdSpec {
                seconds: 20,
                ..Default::default()
            },
            critical: ThresholdSpec {
                seconds: 30,
                ..Default::default()
            },
        };
        let tracker = ActivityTracker::new(Arc::new(clock.clone()), &notifications);
        (clock, tracker)
    }

    #[test]
    fn alerts_follow_tracked_time() {
        let (clock, mut tracker) = fixture();
        tracker.start();
        clock.advance(StdDuration::from_secs(9));
        assert_eq!(tracker.check_alert(), None);
        clock.advance(StdDuration::from_secs(1));
        let alert = tracker.check_alert().unwrap();
        assert_eq!(alert.severity, alerts::Severity::Information);
        assert_eq!(alert.message, "Finish now!");
        assert_eq!(tracker.check_alert(), None);
    }

    #[test]
    fn pausing_does_not_rearm_alerts() {
        let (clock, mut tracker) = fixture();
        tracker.start();
        clock.advance(StdDuration::from_secs(10));
        assert!(tracker.check_alert().is_some());
        tracker.pause();
        tracker.start();
        assert_eq!(tracker.check_alert(), None);
    }

    #[test]
    fn reset_clears_clock_alerts_and_selection() {
        let (clock, mut tracker) = fixture();
        tracker.start();
        tracker.select_order("maintenance");
        clock.advance(StdDuration::from_secs(35));
        assert!(tracker.check_alert().is_some());

        tracker.reset();
        assert_eq!(tracker.elapsed(), Duration::zero());
        assert!(!tracker.is_running());
        assert_eq!(tracker.selected_order(), None);
        assert_eq!(tracker.take_order(), None);

        // All three levels rearmed: the first to fire is information again.
        clock.advance(StdDuration::from_secs(1));
        tracker.start();
        clock.advance(StdDuration::from_secs(10));
        assert_eq!(
            tracker.check_alert().map(|a| a.severity),
            Some(alerts::Severity::Information)
        );
    }

    #[test]
    fn order_slice_is_wall_clock_since_selection() {
        let (clock, mut tracker) = fixture();
        tracker.select_order("ord-77");
        assert_eq!(tracker.selected_order(), Some("ord-77"));
        clock.advance(StdDuration::from_secs(120));
        // The stopwatch being paused does not stop the order slice.
        let (name, spent) = tracker.take_order().unwrap();
        assert_eq!(name, "ord-77");
        assert_eq!(spent, Duration::seconds(120));
        assert_eq!(tracker.take_order(), None);
    }

    #[test]
    fn reselecting_restarts_the_slice() {
        let (clock, mut tracker) = fixture();
        tracker.select_order("first");
        clock.advance(StdDuration::from_secs(60));
        tracker.select_order("second");
        clock.advance(StdDuration::from_secs(30));
        let (name, spent) = tracker.take_order().unwrap();
        assert_eq!(name, "second");
        assert_eq!(spent, Duration::seconds(30));
    }
}

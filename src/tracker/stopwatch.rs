use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::utils::clock::Clock;

/// Running/paused elapsed time for the current work session.
///
/// Elapsed time is always recomputed from the time source instead of being
/// incremented on ticks, so a missed or delayed tick never loses time. While
/// running `start_time` is kept at `now - accumulated`, which makes resuming
/// a plain subtraction.
pub struct Stopwatch {
    clock: Arc<dyn Clock>,
    start_time: Option<DateTime<Utc>>,
    accumulated: Duration,
    running: bool,
}

impl Stopwatch {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            start_time: None,
            accumulated: Duration::zero(),
            running: false,
        }
    }

    /// No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.start_time = Some(self.clock.time() - self.accumulated);
        self.running = true;
    }

    /// Folds the running interval into `accumulated`. No-op when paused.
    pub fn pause(&mut self) {
        let Some(start_time) = self.start_time.take() else {
            return;
        };
        self.accumulated = self.clock.time() - start_time;
        self.running = false;
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.start_time = None;
        self.accumulated = Duration::zero();
        self.running = false;
    }

    pub fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(start_time) => self.clock.time() - start_time,
            None => self.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::NaiveDate;

    use super::*;
    use crate::utils::clock::testing::FakeClock;

    fn fixture() -> (FakeClock, Stopwatch) {
        let clock = FakeClock::at_midnight(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap());
        let stopwatch = Stopwatch::new(Arc::new(clock.clone()));
        (clock, stopwatch)
    }

    #[test]
    fn starts_paused_at_zero() {
        let (_, stopwatch) = fixture();
        assert!(!stopwatch.is_running());
        assert_eq!(stopwatch.elapsed(), Duration::zero());
    }

    #[test]
    fn tracks_time_while_running() {
        let (clock, mut stopwatch) = fixture();
        stopwatch.start();
        clock.advance(StdDuration::from_secs(90));
        assert_eq!(stopwatch.elapsed(), Duration::seconds(90));
        stopwatch.pause();
        assert_eq!(stopwatch.elapsed(), Duration::seconds(90));
    }

    #[test]
    fn paused_time_does_not_count() {
        let (clock, mut stopwatch) = fixture();
        stopwatch.start();
        clock.advance(StdDuration::from_secs(10));
        stopwatch.pause();
        clock.advance(StdDuration::from_secs(3600));
        assert_eq!(stopwatch.elapsed(), Duration::seconds(10));

        stopwatch.start();
        clock.advance(StdDuration::from_secs(5));
        assert_eq!(stopwatch.elapsed(), Duration::seconds(15));
    }

    #[test]
    fn start_is_idempotent() {
        let (clock, mut stopwatch) = fixture();
        stopwatch.start();
        clock.advance(StdDuration::from_secs(30));
        stopwatch.start();
        clock.advance(StdDuration::from_secs(30));
        assert_eq!(stopwatch.elapsed(), Duration::seconds(60));
    }

    #[test]
    fn pause_is_idempotent() {
        let (clock, mut stopwatch) = fixture();
        stopwatch.start();
        clock.advance(StdDuration::from_secs(30));
        stopwatch.pause();
        clock.advance(StdDuration::from_secs(30));
        stopwatch.pause();
        assert_eq!(stopwatch.elapsed(), Duration::seconds(30));
        assert!(!stopwatch.is_running());
    }

    #[test]
    fn toggling_never_loses_time() {
        let (clock, mut stopwatch) = fixture();
        let intervals = [7_u64, 13, 120, 1, 3599];
        for interval in intervals {
            stopwatch.toggle();
            clock.advance(StdDuration::from_secs(interval));
            stopwatch.toggle();
            // Paused gaps must not count.
            clock.advance(StdDuration::from_secs(1000));
        }
        let expected: u64 = intervals.iter().sum();
        assert_eq!(stopwatch.elapsed(), Duration::seconds(expected as i64));
    }

    #[test]
    fn reset_zeroes_and_stops() {
        let (clock, mut stopwatch) = fixture();
        stopwatch.start();
        clock.advance(StdDuration::from_secs(500));
        stopwatch.reset();
        assert!(!stopwatch.is_running());
        assert_eq!(stopwatch.elapsed(), Duration::zero());

        // A fresh start after reset counts from zero again.
        stopwatch.start();
        clock.advance(StdDuration::from_secs(2));
        assert_eq!(stopwatch.elapsed(), Duration::seconds(2));
    }
}

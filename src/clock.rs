use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of "now" and of delays, injected so retry paths run in tests
/// without real sleeps.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn manual_clock_advances_on_sleep() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::at(start);
        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(60)).await;
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(60); 2]);
        assert_eq!(clock.now(), start + chrono::Duration::minutes(2));
    }

    #[tokio::test]
    async fn system_clock_sleeps() {
        let before = std::time::Instant::now();
        SystemClock.sleep(Duration::from_millis(5)).await;
        assert!(before.elapsed() >= Duration::from_millis(5));
    }
}

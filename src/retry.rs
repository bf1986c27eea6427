use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Uniform-interval retry policy for remote listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. At least 1.
    pub max_attempts: u32,
    /// Fixed delay between attempts. No backoff.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Where a retried call stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Attempting(u32),
    Succeeded,
    Exhausted,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attempt::Attempting(n) => write!(f, "ATTEMPTING({n})"),
            Attempt::Succeeded => write!(f, "SUCCEEDED"),
            Attempt::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// What the caller should do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Wait `delay`, then make attempt number `attempt`.
    Retry { attempt: u32, delay: Duration },
    /// No attempts left.
    GiveUp,
}

/// Ephemeral per-call retry state.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    state: Attempt,
    last_error: Option<SourceError>,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            policy: policy.clone(),
            state: Attempt::Attempting(1),
            last_error: None,
        }
    }

    pub fn state(&self) -> Attempt {
        self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    pub fn succeed(&mut self) {
        self.state = Attempt::Succeeded;
    }

    /// Record a failure of the current attempt and compute the next step.
    pub fn fail(&mut self, error: SourceError) -> Transition {
        self.last_error = Some(error);
        match self.state {
            Attempt::Attempting(n) if n < self.policy.max_attempts => {
                self.state = Attempt::Attempting(n + 1);
                Transition::Retry {
                    attempt: n + 1,
                    delay: self.policy.delay,
                }
            }
            _ => {
                self.state = Attempt::Exhausted;
                Transition::GiveUp
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(60))
    }

    #[test]
    fn default_policy_is_ten_attempts_one_minute() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 10);
        assert_eq!(p.delay, Duration::from_secs(60));
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn failures_retry_then_give_up() {
        let mut state = RetryState::new(&policy(3));
        assert_eq!(state.state(), Attempt::Attempting(1));

        let t = state.fail(SourceError::RateLimited("429".into()));
        assert_eq!(
            t,
            Transition::Retry {
                attempt: 2,
                delay: Duration::from_secs(60)
            }
        );

        let t = state.fail(SourceError::Transient("reset".into()));
        assert!(matches!(t, Transition::Retry { attempt: 3, .. }));

        let t = state.fail(SourceError::Transient("reset again".into()));
        assert_eq!(t, Transition::GiveUp);
        assert_eq!(state.state(), Attempt::Exhausted);
        assert_eq!(
            state.last_error(),
            Some(&SourceError::Transient("reset again".into()))
        );
    }

    #[test]
    fn single_attempt_gives_up_immediately() {
        let mut state = RetryState::new(&policy(1));
        assert_eq!(
            state.fail(SourceError::Transient("x".into())),
            Transition::GiveUp
        );
    }

    #[test]
    fn delay_is_uniform() {
        let mut state = RetryState::new(&policy(5));
        let delays: Vec<_> = (0..4)
            .filter_map(|_| match state.fail(SourceError::Transient("x".into())) {
                Transition::Retry { delay, .. } => Some(delay),
                Transition::GiveUp => None,
            })
            .collect();
        assert_eq!(delays, vec![Duration::from_secs(60); 4]);
    }

    #[test]
    fn success_after_retry() {
        let mut state = RetryState::new(&policy(3));
        state.fail(SourceError::Transient("x".into()));
        state.succeed();
        assert_eq!(state.state(), Attempt::Succeeded);
    }

    #[test]
    fn attempt_display() {
        assert_eq!(Attempt::Attempting(2).to_string(), "ATTEMPTING(2)");
        assert_eq!(Attempt::Succeeded.to_string(), "SUCCEEDED");
        assert_eq!(Attempt::Exhausted.to_string(), "EXHAUSTED");
    }
}

use std::collections::HashSet;
use std::time::Duration;

use crate::config::Config;
use crate::fetch::FetchOutcome;
use crate::types::Outcome;

/// One retry cycle's working state, owned exclusively by the retry loop
/// processing a single URL and discarded on terminal outcome.
#[derive(Debug)]
pub struct Attempt {
    count: u32,
}

impl Attempt {
    pub fn new() -> Self {
        Self { count: 1 }
    }

    /// Attempt number currently executing (starts at 1)
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new()
    }
}

/// Decision returned by the policy after each raw outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Wait out the delay, then go again
    RetryAfter(Duration),
    /// Terminal state reached; detail is empty only for `Ok`
    Done(Outcome, String),
}

/// Decides, per raw outcome, whether to retry, how long to wait, and when
/// to give up. Pure state machine; all I/O lives with the caller.
///
/// A full run performs at most `1 + max_retries` attempts with exactly one
/// fixed delay before each retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    retryable_statuses: HashSet<u16>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration, retryable_statuses: HashSet<u16>) -> Self {
        Self {
            max_retries,
            delay,
            retryable_statuses,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            u32::from(config.max_retries_count()),
            config.retry_delay_duration(),
            config.retryable_status_set(),
        )
    }

    /// Classify the raw outcome of the attempt that just finished and
    /// advance the attempt state if a retry is due.
    pub fn assess(&self, outcome: FetchOutcome, attempt: &mut Attempt) -> Verdict {
        match outcome {
            FetchOutcome::Status(status) if self.retryable_statuses.contains(&status) => {
                if attempt.count <= self.max_retries {
                    attempt.count += 1;
                    Verdict::RetryAfter(self.delay)
                } else {
                    Verdict::Done(
                        Outcome::RetryableExhausted(status),
                        format!(
                            "gave up after {} attempts, last status {status}",
                            attempt.count
                        ),
                    )
                }
            }
            // Any status outside the retryable set is terminal, even non-2xx:
            // the tool reports reachability, not application-level success.
            FetchOutcome::Status(status) => Verdict::Done(Outcome::Ok(status), String::new()),
            FetchOutcome::Timeout => {
                if attempt.count <= self.max_retries {
                    attempt.count += 1;
                    Verdict::RetryAfter(self.delay)
                } else {
                    Verdict::Done(
                        Outcome::Timeout,
                        format!("request timed out after {} attempts", attempt.count),
                    )
                }
            }
            FetchOutcome::Connection(detail) => {
                if attempt.count <= self.max_retries {
                    attempt.count += 1;
                    Verdict::RetryAfter(self.delay)
                } else {
                    Verdict::Done(Outcome::ConnectionError, detail)
                }
            }
            // Unclassified failures are never retried
            FetchOutcome::Other(detail) => Verdict::Done(Outcome::UnknownError, detail),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_retries,
            Duration::from_millis(10),
            [429, 503].into_iter().collect(),
        )
    }

    #[test]
    fn test_assess__success_on_first_attempt_is_terminal() {
        let policy = policy(3);
        let mut attempt = Attempt::new();

        let verdict = policy.assess(FetchOutcome::Status(200), &mut attempt);

        assert_eq!(verdict, Verdict::Done(Outcome::Ok(200), String::new()));
        assert_eq!(attempt.count(), 1);
    }

    #[test]
    fn test_assess__non_retryable_error_status_is_ok_category() {
        let policy = policy(3);
        let mut attempt = Attempt::new();

        // 404 is not in the retryable set: terminal OK with that status
        let verdict = policy.assess(FetchOutcome::Status(404), &mut attempt);

        assert_eq!(verdict, Verdict::Done(Outcome::Ok(404), String::new()));
    }

    #[test]
    fn test_assess__retryable_status_retries_then_exhausts() {
        let policy = policy(3);
        let mut attempt = Attempt::new();

        // Attempts 1..=3 each schedule a retry
        for _ in 0..3 {
            let verdict = policy.assess(FetchOutcome::Status(429), &mut attempt);
            assert_eq!(verdict, Verdict::RetryAfter(Duration::from_millis(10)));
        }
        assert_eq!(attempt.count(), 4);

        // Attempt 4 exhausts, carrying the last status
        let verdict = policy.assess(FetchOutcome::Status(429), &mut attempt);
        match verdict {
            Verdict::Done(Outcome::RetryableExhausted(429), detail) => {
                assert!(detail.contains("4 attempts"));
                assert!(detail.contains("429"));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_assess__503_then_200_succeeds_after_one_retry() {
        let policy = policy(3);
        let mut attempt = Attempt::new();

        assert_eq!(
            policy.assess(FetchOutcome::Status(503), &mut attempt),
            Verdict::RetryAfter(Duration::from_millis(10))
        );
        assert_eq!(attempt.count(), 2);

        assert_eq!(
            policy.assess(FetchOutcome::Status(200), &mut attempt),
            Verdict::Done(Outcome::Ok(200), String::new())
        );
    }

    #[test]
    fn test_assess__timeout_retries_then_exhausts_as_timeout() {
        let policy = policy(2);
        let mut attempt = Attempt::new();

        assert!(matches!(
            policy.assess(FetchOutcome::Timeout, &mut attempt),
            Verdict::RetryAfter(_)
        ));
        assert!(matches!(
            policy.assess(FetchOutcome::Timeout, &mut attempt),
            Verdict::RetryAfter(_)
        ));

        let verdict = policy.assess(FetchOutcome::Timeout, &mut attempt);
        match verdict {
            Verdict::Done(Outcome::Timeout, detail) => {
                assert!(detail.contains("3 attempts"));
            }
            other => panic!("expected timeout exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_assess__connection_failure_keeps_last_detail_on_exhaustion() {
        let policy = policy(1);
        let mut attempt = Attempt::new();

        assert!(matches!(
            policy.assess(
                FetchOutcome::Connection("first failure".to_string()),
                &mut attempt
            ),
            Verdict::RetryAfter(_)
        ));

        let verdict = policy.assess(
            FetchOutcome::Connection("dns error: lookup failed".to_string()),
            &mut attempt,
        );
        assert_eq!(
            verdict,
            Verdict::Done(
                Outcome::ConnectionError,
                "dns error: lookup failed".to_string()
            )
        );
    }

    #[test]
    fn test_assess__unclassified_failure_is_never_retried() {
        let policy = policy(5);
        let mut attempt = Attempt::new();

        let verdict = policy.assess(
            FetchOutcome::Other("redirect loop detected".to_string()),
            &mut attempt,
        );

        assert_eq!(
            verdict,
            Verdict::Done(Outcome::UnknownError, "redirect loop detected".to_string())
        );
        assert_eq!(attempt.count(), 1);
    }

    #[test]
    fn test_assess__zero_retries_exhausts_immediately() {
        let policy = policy(0);
        let mut attempt = Attempt::new();

        let verdict = policy.assess(FetchOutcome::Status(503), &mut attempt);
        assert!(matches!(
            verdict,
            Verdict::Done(Outcome::RetryableExhausted(503), _)
        ));

        let mut attempt = Attempt::new();
        let verdict = policy.assess(FetchOutcome::Timeout, &mut attempt);
        assert!(matches!(verdict, Verdict::Done(Outcome::Timeout, _)));
    }

    #[test]
    fn test_assess__custom_retryable_set_is_honored() {
        let policy = RetryPolicy::new(
            1,
            Duration::from_millis(10),
            [500].into_iter().collect(),
        );
        let mut attempt = Attempt::new();

        // 500 retryable under this policy, 429 not
        assert!(matches!(
            policy.assess(FetchOutcome::Status(500), &mut attempt),
            Verdict::RetryAfter(_)
        ));
        assert_eq!(
            policy.assess(FetchOutcome::Status(429), &mut Attempt::new()),
            Verdict::Done(Outcome::Ok(429), String::new())
        );
    }

    #[test]
    fn test_from_config__uses_configured_values() {
        let config = Config {
            max_retries: Some(2),
            retry_delay: Some(50),
            retryable_status_codes: Some(vec![429]),
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);

        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.delay, Duration::from_millis(50));
        assert!(policy.retryable_statuses.contains(&429));
        assert!(!policy.retryable_statuses.contains(&503));
    }
}

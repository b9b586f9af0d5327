// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! Failed-login throttling per client address
use std::time::Duration;

use gymdesk_backend::auth::AuthRateLimiter;

#[test]
fn test_rate_limiter_allows_initial_attempts() {
    let rate_limiter = AuthRateLimiter::default();
    assert!(rate_limiter.check_rate_limit("127.0.0.1"));
}

#[test]
fn test_rate_limiter_blocks_after_max_attempts() {
    let rate_limiter = AuthRateLimiter::default();

    for _ in 0..4 {
        rate_limiter.record_failed_attempt("127.0.0.2");
    }
    assert!(rate_limiter.check_rate_limit("127.0.0.2"));

    rate_limiter.record_failed_attempt("127.0.0.2");
    assert!(!rate_limiter.check_rate_limit("127.0.0.2"));
}

#[test]
fn test_rate_limiter_resets_after_success() {
    let rate_limiter = AuthRateLimiter::default();

    for _ in 0..3 {
        rate_limiter.record_failed_attempt("127.0.0.3");
    }
    rate_limiter.record_success("127.0.0.3");

    // the counter starts over
    for _ in 0..4 {
        rate_limiter.record_failed_attempt("127.0.0.3");
    }
    assert!(rate_limiter.check_rate_limit("127.0.0.3"));
}

#[test]
fn test_different_clients_tracked_separately() {
    let rate_limiter = AuthRateLimiter::new(2, Duration::from_secs(60));

    rate_limiter.record_failed_attempt("10.0.0.1");
    rate_limiter.record_failed_attempt("10.0.0.1");

    assert!(!rate_limiter.check_rate_limit("10.0.0.1"));
    assert!(rate_limiter.check_rate_limit("10.0.0.2"));
    assert_eq!(rate_limiter.tracked_clients(), 1);
}

#[test]
fn test_lockout_expires() {
    let rate_limiter = AuthRateLimiter::new(1, Duration::from_millis(20));

    rate_limiter.record_failed_attempt("10.0.0.9");
    assert!(!rate_limiter.check_rate_limit("10.0.0.9"));

    std::thread::sleep(Duration::from_millis(40));
    assert!(rate_limiter.check_rate_limit("10.0.0.9"));
}

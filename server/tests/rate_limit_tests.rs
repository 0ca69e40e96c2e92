use college_map::config::RateLimitConfig;
use college_map::middleware::RateLimiter;
use std::net::{IpAddr, Ipv4Addr};
use std::thread;
use std::time::Duration;

#[test]
fn test_rate_limiter_creation() {
    let limiter = RateLimiter::new();
    let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

    assert!(limiter.check_rate_limit(ip));
}

#[test]
fn test_rate_limit_blocks_over_limit() {
    let limiter = RateLimiter::new();
    let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

    // Default allows 10 attempts per window
    for _ in 0..10 {
        assert!(limiter.check_rate_limit(ip), "Should allow requests under limit");
    }

    assert!(
        !limiter.check_rate_limit(ip),
        "Should block requests over limit"
    );
}

#[test]
fn test_configured_limit() {
    let limiter = RateLimiter::from_config(&RateLimitConfig {
        max_requests: 3,
        window_secs: 60,
    });
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    for _ in 0..3 {
        assert!(limiter.check_rate_limit(ip));
    }
    assert!(!limiter.check_rate_limit(ip));
}

#[test]
fn test_rate_limit_per_ip() {
    let limiter = RateLimiter::new();
    let ip1 = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1));
    let ip2 = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2));

    for _ in 0..10 {
        limiter.check_rate_limit(ip1);
    }

    assert!(!limiter.check_rate_limit(ip1));
    assert!(limiter.check_rate_limit(ip2));
}

#[test]
fn test_cleanup_keeps_recent_entries() {
    let limiter = RateLimiter::new();
    let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

    for _ in 0..5 {
        limiter.check_rate_limit(ip);
    }

    assert_eq!(limiter.cleanup_old_entries(), 0);
    assert_eq!(limiter.tracked_clients(), 1);
    assert!(limiter.check_rate_limit(ip));
}

#[test]
fn test_window_expiration() {
    let limiter = RateLimiter::from_config(&RateLimitConfig {
        max_requests: 1,
        window_secs: 0,
    });
    let ip1 = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let ip2 = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));

    // every earlier attempt has already aged out of an empty window
    for _ in 0..3 {
        assert!(limiter.check_rate_limit(ip1));
    }
    assert!(limiter.check_rate_limit(ip2));

    assert_eq!(limiter.tracked_clients(), 2);
    assert_eq!(limiter.cleanup_old_entries(), 2);
    assert_eq!(limiter.tracked_clients(), 0);
}

#[test]
fn test_concurrent_rate_limiting() {
    use std::sync::Arc;

    let limiter = Arc::new(RateLimiter::new());
    let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let mut handles = vec![];

    for _ in 0..5 {
        let limiter_clone = Arc::clone(&limiter);
        let handle = thread::spawn(move || {
            for _ in 0..3 {
                limiter_clone.check_rate_limit(ip);
                thread::sleep(Duration::from_millis(1));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // 15 attempts against a limit of 10
    assert!(!limiter.check_rate_limit(ip));
}

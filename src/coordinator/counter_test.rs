// ABOUTME: Tests for the exchange counter.
// ABOUTME: Covers limit handling, single shutdown raise, and concurrent increments.

use std::sync::Arc;

use super::counter::{ExchangeCounter, UnitOutcome};
use super::shutdown::Shutdown;

#[tokio::test]
async fn test_record_unit_increments_count() {
    let counter = ExchangeCounter::new(10, Shutdown::new());

    assert_eq!(counter.record_unit().await, UnitOutcome::Recorded { count: 1 });
    assert_eq!(counter.record_unit().await, UnitOutcome::Recorded { count: 2 });
    assert_eq!(counter.count().await, 2);
    assert!(!counter.shutdown().is_raised());
}

#[tokio::test]
async fn test_limit_raises_shutdown() {
    let shutdown = Shutdown::new();
    let counter = ExchangeCounter::new(3, shutdown.clone());

    counter.record_unit().await;
    counter.record_unit().await;
    assert!(!shutdown.is_raised());

    let outcome = counter.record_unit().await;
    assert_eq!(outcome, UnitOutcome::LimitReached { count: 3 });
    assert!(shutdown.is_raised());
}

#[tokio::test]
async fn test_units_after_limit_are_rejected() {
    let counter = ExchangeCounter::new(1, Shutdown::new());

    assert!(counter.record_unit().await.is_counted());

    // In-flight work finishing after the limit must not be counted
    for _ in 0..5 {
        assert_eq!(counter.record_unit().await, UnitOutcome::Rejected);
    }
    assert_eq!(counter.count().await, 1);
}

#[tokio::test]
async fn test_limit_of_one() {
    let counter = ExchangeCounter::new(1, Shutdown::new());
    assert_eq!(
        counter.record_unit().await,
        UnitOutcome::LimitReached { count: 1 }
    );
}

#[test]
#[should_panic(expected = "limit must be positive")]
fn test_zero_limit_panics() {
    let _ = ExchangeCounter::new(0, Shutdown::new());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_not_lost() {
    const PRODUCERS: u64 = 8;
    const UNITS: u64 = 250;

    let counter = Arc::new(ExchangeCounter::new(PRODUCERS * UNITS, Shutdown::new()));
    let mut handles = Vec::new();

    for _ in 0..PRODUCERS {
        let counter = counter.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..UNITS {
                assert!(counter.record_unit().await.is_counted());
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(counter.count().await, PRODUCERS * UNITS);
    assert!(counter.shutdown().is_raised());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exactly_one_caller_reaches_limit() {
    let counter = Arc::new(ExchangeCounter::new(50, Shutdown::new()));
    let mut handles = Vec::new();

    // More attempts than the limit allows
    for _ in 0..100 {
        let counter = counter.clone();
        handles.push(tokio::spawn(async move { counter.record_unit().await }));
    }

    let mut recorded = 0;
    let mut reached = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            UnitOutcome::Recorded { .. } => recorded += 1,
            UnitOutcome::LimitReached { count } => {
                assert_eq!(count, 50);
                reached += 1;
            }
            UnitOutcome::Rejected => rejected += 1,
        }
    }

    assert_eq!(reached, 1, "Exactly one unit should hit the limit");
    assert_eq!(recorded, 49);
    assert_eq!(rejected, 50);
    assert_eq!(counter.count().await, 50);
}

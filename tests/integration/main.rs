#[path = "../common/mod.rs"]
mod common;

use std::error::Error as StdError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use retries::jitter::FixedJitter;
use retries::{ConfigError, Rescue, RetryError, RetryOptions, with_retries, with_retries_async};

use common::time::ManualClock;
use common::{KindError, is_a, is_b};

fn fast() -> RetryOptions<KindError> {
    RetryOptions::new()
        .base_delay(Duration::ZERO)
        .max_delay(Duration::ZERO)
}

#[test]
fn retries_until_successful() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = Arc::clone(&observed);
    let mut tries = 0;

    let result = with_retries(
        fast()
            .max_attempts(4)
            .rescue(Rescue::when(is_a))
            .on_retry(move |err, attempt, _elapsed| {
                assert!(is_a(err));
                observed_clone.lock().unwrap().push(attempt);
            }),
        |attempt| {
            tries += 1;
            assert_eq!(tries, attempt);
            if attempt < 4 {
                Err(KindError::A(attempt))
            } else {
                Ok("done")
            }
        },
    );

    assert_eq!(result.unwrap(), "done");
    assert_eq!(tries, 4);
    assert_eq!(*observed.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn reraises_after_default_max_attempts() {
    let mut tries = 0;
    let result: Result<(), _> = with_retries(
        fast().rescue(Rescue::when(is_a)).sleep_enabled(false),
        |attempt| {
            tries += 1;
            Err(KindError::A(attempt))
        },
    );

    assert_eq!(tries, 3);
    match result {
        Err(RetryError::Operation(KindError::A(attempt))) => assert_eq!(attempt, 3),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unrescued_error_is_raised_immediately() {
    let observed = Arc::new(AtomicU32::new(0));
    let observed_clone = Arc::clone(&observed);
    let mut tries = 0;

    let result: Result<(), _> = with_retries(
        fast()
            .max_attempts(10)
            .rescue(Rescue::when(is_b))
            .on_retry(move |_, _, _| {
                observed_clone.fetch_add(1, Ordering::SeqCst);
            }),
        |attempt| {
            tries += 1;
            Err(KindError::A(attempt))
        },
    );

    assert_eq!(tries, 1);
    assert_eq!(observed.load(Ordering::SeqCst), 0);
    assert_eq!(result.unwrap_err().into_operation(), Some(KindError::A(1)));
}

#[test]
fn rescues_any_of_a_list_of_kinds() {
    let result = with_retries(
        fast()
            .max_attempts(3)
            .rescue(Rescue::when(is_a).or_when(is_b)),
        |attempt| match attempt {
            1 => Err(KindError::A(attempt)),
            2 => Err(KindError::B(attempt)),
            _ => Ok("done"),
        },
    );
    assert_eq!(result.unwrap(), "done");
}

#[test]
fn final_error_comes_from_last_attempt() {
    for max_attempts in 1..=6 {
        let mut tries = 0;
        let result: Result<(), _> = with_retries(fast().max_attempts(max_attempts), |attempt| {
            tries += 1;
            Err(KindError::B(attempt))
        });
        assert_eq!(tries, max_attempts);
        assert_eq!(
            result.unwrap_err().into_operation(),
            Some(KindError::B(max_attempts))
        );
    }
}

#[test]
fn observer_runs_once_per_retried_failure() {
    for (max_attempts, succeed_on) in [(1, 1), (3, 3), (5, 2), (5, 9), (8, 8)] {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let mut tries = 0;

        let _ = with_retries(
            fast()
                .max_attempts(max_attempts)
                .on_retry(move |_, _, _| {
                    calls_clone.fetch_add(1, Ordering::SeqCst);
                }),
            |attempt| {
                tries += 1;
                if attempt >= succeed_on {
                    Ok(())
                } else {
                    Err(KindError::A(attempt))
                }
            },
        );

        assert_eq!(tries, succeed_on.min(max_attempts));
        assert_eq!(calls.load(Ordering::SeqCst), tries - 1);
    }
}

#[test]
fn observer_sees_elapsed_time_from_clock() {
    let clock = Arc::new(ManualClock::new());
    let op_clock = Arc::clone(&clock);
    let elapsed = Arc::new(Mutex::new(Vec::new()));
    let elapsed_clone = Arc::clone(&elapsed);

    let result: Result<(), _> = with_retries(
        fast()
            .max_attempts(4)
            .clock(clock.clone())
            .on_retry(move |_, _, since_start| {
                elapsed_clone.lock().unwrap().push(since_start);
            }),
        |attempt| {
            op_clock.advance(Duration::from_secs(5));
            Err(KindError::A(attempt))
        },
    );

    assert!(result.is_err());
    assert_eq!(
        *elapsed.lock().unwrap(),
        vec![
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(15),
        ]
    );
}

#[test]
fn disabled_sleep_skips_long_backoff() {
    let started = Instant::now();
    let mut tries = 0;

    let result: Result<(), _> = with_retries(
        RetryOptions::new()
            .max_attempts(10)
            .base_delay(Duration::from_secs(100))
            .max_delay(Duration::from_secs(100))
            .sleep_enabled(false),
        |attempt| {
            tries += 1;
            Err(KindError::A(attempt))
        },
    );

    assert!(result.is_err());
    assert_eq!(tries, 10);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn zero_attempts_is_rejected_before_running() {
    let mut tries = 0;
    let result: Result<(), _> = with_retries(fast().max_attempts(0), |_| {
        tries += 1;
        Ok::<_, KindError>(())
    });

    assert_eq!(tries, 0);
    match result {
        Err(RetryError::Config(ConfigError::MaxAttempts(0))) => {}
        other => panic!("expected max_attempts error, got {:?}", other),
    }
}

#[test]
fn inverted_delays_are_rejected_before_running() {
    let mut tries = 0;
    let result: Result<(), _> = with_retries(
        RetryOptions::new()
            .base_delay(Duration::from_secs(2))
            .max_delay(Duration::from_secs(1)),
        |_| {
            tries += 1;
            Ok::<_, KindError>(())
        },
    );

    assert_eq!(tries, 0);
    let err = result.unwrap_err();
    assert!(matches!(err.config(), Some(ConfigError::DelayOrder { .. })));
    assert!(err.to_string().contains("base_delay"));
}

#[test]
fn boxed_errors_are_classified_by_type() {
    type BoxError = Box<dyn StdError + Send + Sync>;
    let mut tries = 0;

    let result: Result<(), BoxError> = with_retries(
        RetryOptions::<BoxError>::new()
            .max_attempts(5)
            .base_delay(Duration::ZERO)
            .max_delay(Duration::ZERO)
            .rescue(Rescue::kind::<KindError>()),
        |attempt| {
            tries += 1;
            if attempt < 3 {
                Err(Box::new(KindError::A(attempt)) as BoxError)
            } else {
                Err("permission denied".into())
            }
        },
    )
    .map_err(|err| err.into_operation().expect("operation error"));

    assert_eq!(tries, 3);
    assert_eq!(result.unwrap_err().to_string(), "permission denied");
}

#[test]
fn boxed_errors_match_any_listed_type() {
    type BoxError = Box<dyn StdError + Send + Sync>;
    let mut tries = 0;

    let result: Result<(), _> = with_retries(
        RetryOptions::<BoxError>::new()
            .max_attempts(6)
            .base_delay(Duration::ZERO)
            .max_delay(Duration::ZERO)
            .rescue(Rescue::kind::<KindError>().or_kind::<std::fmt::Error>()),
        |attempt| {
            tries += 1;
            match attempt {
                1 => Err(Box::new(KindError::B(attempt)) as BoxError),
                2 => Err(Box::new(std::fmt::Error) as BoxError),
                3 => Err(Box::new(std::io::Error::other(KindError::A(attempt))) as BoxError),
                _ => Err("permission denied".into()),
            }
        },
    );

    assert_eq!(tries, 4);
    let err = result.unwrap_err().into_operation().expect("operation error");
    assert_eq!(err.to_string(), "permission denied");
}

#[test]
fn concurrent_executions_keep_separate_state() {
    let handles: Vec<_> = (1..=8u32)
        .map(|worker| {
            std::thread::spawn(move || {
                let mut tries = 0;
                let result = with_retries(
                    RetryOptions::new()
                        .max_attempts(worker + 1)
                        .base_delay(Duration::from_millis(1))
                        .max_delay(Duration::from_millis(2))
                        .sleep_enabled(true),
                    |attempt| {
                        tries += 1;
                        if attempt <= worker {
                            Err(KindError::A(attempt))
                        } else {
                            Ok(worker)
                        }
                    },
                );
                (result.unwrap(), tries)
            })
        })
        .collect();

    for handle in handles {
        let (worker, tries) = handle.join().unwrap();
        assert_eq!(tries, worker + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn async_backoff_waits_on_the_runtime_clock() {
    let started = tokio::time::Instant::now();
    let mut tries = 0;

    let result: Result<(), _> = with_retries_async(
        RetryOptions::new()
            .max_attempts(3)
            .base_delay(Duration::from_secs(1))
            .max_delay(Duration::from_secs(2))
            .sleep_enabled(true)
            .jitter(Arc::new(FixedJitter(0.0))),
        |attempt| {
            tries += 1;
            async move { Err(KindError::A(attempt)) }
        },
    )
    .await;

    // 1s floor after attempt 1, then 2s halved by jitter after attempt 2
    let waited = started.elapsed();
    assert!(result.is_err());
    assert_eq!(tries, 3);
    assert!(waited >= Duration::from_secs(2), "waited {:?}", waited);
    assert!(waited < Duration::from_secs(3), "waited {:?}", waited);
}

#[tokio::test]
async fn async_success_short_circuits() {
    let mut tries = 0;
    let result = with_retries_async(fast().max_attempts(5), |attempt| {
        tries += 1;
        async move {
            if attempt == 2 {
                Ok(attempt)
            } else {
                Err(KindError::A(attempt))
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(tries, 2);
}

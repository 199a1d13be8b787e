mod common;

use std::cell::Cell;
use std::time::{Duration, Instant};

use common::*;
use kubestrap::errors::KubestrapError;
use kubestrap::exec::{RetryPolicy, retry};
use proptest::prelude::*;

fn policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn zero_attempts_never_invokes() {
    let calls = Cell::new(0);

    let err = retry(&policy(0), || {
        calls.set(calls.get() + 1);
        async { Ok::<_, String>(()) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.get(), 0);
    assert!(err.last.is_none());
    assert_eq!(err.to_string(), "retry failed after 0 attempts");
}

#[tokio::test]
async fn exhausted_error_wraps_last_failure() {
    let calls = Cell::new(0);

    let err = retry(&policy(3), || {
        calls.set(calls.get() + 1);
        let n = calls.get();
        async move { Err::<(), _>(format!("boom {n}")) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.get(), 3);
    assert_eq!(err.last.as_deref(), Some("boom 3"));
    assert_eq!(err.to_string(), "retry failed after 3 attempts: boom 3");
}

#[tokio::test]
async fn delay_is_slept_between_attempts_only() {
    let delay = Duration::from_millis(50);

    let start = Instant::now();
    let _ = retry(&RetryPolicy::new(3, delay), || async { Err::<(), _>("no") }).await;
    let elapsed = start.elapsed();

    // Two sleeps for three attempts.
    assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
    assert!(elapsed < delay * 3 + Duration::from_millis(40), "elapsed {elapsed:?}");

    let start = Instant::now();
    retry(&RetryPolicy::new(3, delay), || async { Ok::<_, String>(()) })
        .await
        .unwrap();
    assert!(start.elapsed() < delay);
}

#[cfg(unix)]
#[tokio::test]
async fn retries_a_flaky_process_until_it_succeeds() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let counter = dir.path().join("count");
    let (runner, capture) = mock_runner(["kind"]);

    let execution = with_timeout(retry(&policy(5), || {
        runner.run_silent("kind", fail_times(&counter, 2))
    }))
    .await
    .unwrap();

    assert_eq!(execution.stdout_text(), "ok after 3\n");
    assert!(capture.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn exhausted_process_retry_keeps_stderr() {
    let (runner, _capture) = mock_runner(["helm"]);

    let err: KubestrapError = retry(&policy(2), || runner.run_silent("helm", fail()))
        .await
        .unwrap_err()
        .into();

    assert!(matches!(err, KubestrapError::RetryExhausted { attempts: 2, .. }));
    assert_eq!(err.captured_stderr(), Some("FAILURE"));
    assert!(err.to_string().starts_with("retry failed after 2 attempts: command"));
}

proptest! {
    #[test]
    fn invocations_match_first_success(attempts in 0u32..8, failures in 0u32..10) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let calls = Cell::new(0u32);
        let result = rt.block_on(retry(&RetryPolicy::new(attempts, Duration::ZERO), || {
            calls.set(calls.get() + 1);
            let ok = calls.get() > failures;
            async move { if ok { Ok(()) } else { Err("fail") } }
        }));

        if failures < attempts {
            prop_assert!(result.is_ok());
            prop_assert_eq!(calls.get(), failures + 1);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(calls.get(), attempts);
        }
    }
}

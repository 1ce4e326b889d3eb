//! Async adapter over the synchronous dispatcher.
//!
//! Dispatch itself is blocking: handlers run on the caller's thread. The
//! adapter moves a call onto tokio's blocking pool and bounds how long the
//! caller waits for it.

use corelib::Tuple;
use dispatch::{DispatchError, Object};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Call `method` on `object`, giving up after `timeout`.
///
/// A handler still running at the deadline is not interrupted; it finishes
/// on the blocking pool and its result is discarded.
///
/// # Errors
///
/// - Any [`DispatchError`] the call itself produces
/// - [`DispatchError::TimedOut`] if the deadline passes first
/// - [`DispatchError::Cancelled`] if the task panicked or was aborted
pub async fn call_with_timeout(
    object: Arc<Object>,
    method: impl Into<String>,
    args: Tuple,
    timeout: Duration,
) -> Result<Tuple, DispatchError> {
    let method = method.into();
    let member = method.clone();
    let started = Instant::now();

    let task = tokio::task::spawn_blocking(move || object.call(&method, &args));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => {
            trace!(method = %member, elapsed = ?started.elapsed(), "call finished");
            result
        }
        Ok(Err(join_error)) => {
            warn!(method = %member, error = %join_error, "call task did not complete");
            Err(DispatchError::Cancelled { member })
        }
        Err(_) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            warn!(method = %member, elapsed_ms, "call timed out");
            Err(DispatchError::TimedOut { member, elapsed_ms })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{tuple, Value};
    use dispatch::ErrorKind;

    fn object() -> Arc<Object> {
        let object = Object::new();
        object
            .advertise_method("add::i(ii)", |args: &Tuple| -> anyhow::Result<Vec<Value>> {
                Ok(vec![Value::Int32(args.get::<i32>(0)? + args.get::<i32>(1)?)])
            })
            .unwrap();
        object
            .advertise_method("slow::i()", |_: &Tuple| -> anyhow::Result<Vec<Value>> {
                std::thread::sleep(Duration::from_millis(300));
                Ok(vec![Value::Int32(0)])
            })
            .unwrap();
        object
            .advertise_method("boom::i()", |_: &Tuple| -> anyhow::Result<Vec<Value>> {
                panic!("handler blew up")
            })
            .unwrap();
        Arc::new(object)
    }

    #[tokio::test]
    async fn test_call_completes() {
        let result = call_with_timeout(object(), "add", tuple![2i32, 3i32], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.get::<i32>(0).unwrap(), 5);
    }

    #[tokio::test]
    async fn test_dispatch_errors_pass_through() {
        let err = call_with_timeout(object(), "add", tuple!["x"], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let err = call_with_timeout(object(), "slow", tuple![], Duration::from_millis(20))
            .await
            .unwrap_err();
        match err {
            DispatchError::TimedOut { member, elapsed_ms } => {
                assert_eq!(member, "slow");
                assert!(elapsed_ms >= 20);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_is_cancelled() {
        let err = call_with_timeout(object(), "boom", tuple![], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Cancelled {
                member: "boom".into()
            }
        );
    }
}

use std::time::Duration;
use tokio::time::sleep;

use crate::DatabaseError;

/// Runs `operation` until it succeeds, doubling the delay after each failed attempt.
///
/// Only transient errors (see [`DatabaseError::is_transient`]) are retried; anything else is
/// returned straight away.
pub async fn retry_with_backoff<F, T>(
    mut operation: F,
    max_retries: usize,
    initial_delay: Duration,
) -> Result<T, DatabaseError>
where
    F: FnMut() -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<T, DatabaseError>> + Send>,
    >,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                tracing::warn!("Attempt {attempt} failed: {e}. Retrying in {delay:?}...");
                sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            move || {
                let counter = counter.clone();
                Box::pin(async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(DatabaseError::Connection("database is locked".to_string()))
                    } else {
                        Ok("opened")
                    }
                })
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result.ok(), Some("opened"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), DatabaseError> = retry_with_backoff(
            move || {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(DatabaseError::Connection(
                        "unable to open database file".to_string(),
                    ))
                })
            },
            2,
            Duration::from_millis(1),
        )
        .await;

        assert!(matches!(result, Err(DatabaseError::Connection(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_migration_errors_are_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<(), DatabaseError> = retry_with_backoff(
            move || {
                let counter = counter.clone();
                Box::pin(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(DatabaseError::Migration("checksum mismatch".to_string()))
                })
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert!(matches!(result, Err(DatabaseError::Migration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Debounce: collapse a burst of calls into one delayed call.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Wraps an action so that only the last call in any `wait` window runs.
///
/// Each [`Debounced::call`] aborts the pending timer and arms a new one. When
/// a timer fires, the action is spawned as its own task, so a later call never
/// interrupts an action that has already started.
///
/// Calls made outside a tokio runtime are dropped with a warning.
pub struct Debounced<F> {
    action: Arc<F>,
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<F> fmt::Debug for Debounced<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Wrap `action` so that bursts of calls collapse into the last one.
///
/// # Examples
///
/// ```rust,no_run
/// use article_eater_client::utils::debounce;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let search = debounce(
///     |query: String| async move { println!("searching for {}", query) },
///     Duration::from_millis(300),
/// );
///
/// search.call("dayl".to_string());
/// search.call("daylight".to_string()); // only this one runs
/// # }
/// ```
pub fn debounce<F>(action: F, wait: Duration) -> Debounced<F> {
    Debounced {
        action: Arc::new(action),
        wait,
        pending: Mutex::new(None),
    }
}

impl<F> Debounced<F> {
    /// Schedule the action with `args`, dropping any call still waiting
    pub fn call<A, Fut>(&self, args: A)
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        A: Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No runtime; debounced call dropped");
                return;
            }
        };

        let action = Arc::clone(&self.action);
        let wait = self.wait;
        let spawner = runtime.clone();
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            spawner.spawn(action(args));
        }));
    }

    /// Drop the waiting call, if any
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Whether a call is still waiting for its timer
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

//! Notification capability injected into the client.
//!
//! The client never writes to a global console or toast container. Instead it
//! reports through a [`Notifier`], which is handed over at construction time:
//!
//! - [`TracingNotifier`]: logs diagnostics and toasts through `tracing`
//! - [`RecordingNotifier`]: keeps everything in memory, for tests
//! - [`crate::ui::ToastBoard`]: keeps toasts on screen and dismisses them on a timer
//!
//! [`spawn_guarded`] and [`report_unhandled`] act as the process-wide hook for
//! failures nobody else handled: they log the error and raise a generic toast.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::ApiError;

/// How long a toast stays visible unless told otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Message shown when a failure escapes every caller
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Visual kind of a toast or alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    /// CSS-style name (`info`, `success`, `warning`, `error`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short-lived notice for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error)
    }

    /// Override how long the toast stays visible
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Sink for diagnostics and user-facing notices.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// A pipeline call to `endpoint` failed with `error`
    fn diagnostic(&self, endpoint: &str, error: &ApiError);

    /// Show a notice to the user
    fn toast(&self, toast: Toast);
}

/// Notifier that writes everything to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn diagnostic(&self, endpoint: &str, error: &ApiError) {
        tracing::error!(endpoint, error = %error, "API Error ({})", endpoint);
    }

    fn toast(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => tracing::error!(kind = %toast.kind, "{}", toast.message),
            ToastKind::Warning => tracing::warn!(kind = %toast.kind, "{}", toast.message),
            ToastKind::Info | ToastKind::Success => {
                tracing::info!(kind = %toast.kind, "{}", toast.message)
            }
        }
    }
}

/// Notifier that records every call, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    diagnostics: Mutex<Vec<(String, ApiError)>>,
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(endpoint, error)` pairs, oldest first
    pub fn diagnostics(&self) -> Vec<(String, ApiError)> {
        self.diagnostics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Recorded toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn diagnostic(&self, endpoint: &str, error: &ApiError) {
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push((endpoint.to_string(), error.clone()));
        }
    }

    fn toast(&self, toast: Toast) {
        if let Ok(mut guard) = self.toasts.lock() {
            guard.push(toast);
        }
    }
}

/// Log a failure that escaped every caller and show the generic notice.
pub fn report_unhandled(notifier: &dyn Notifier, error: &dyn fmt::Display) {
    tracing::error!("Unhandled failure: {}", error);
    notifier.toast(Toast::error(UNEXPECTED_ERROR_MESSAGE));
}

/// Run `future` on the tokio runtime, routing its error to [`report_unhandled`].
///
/// The returned handle resolves to `Some(value)` on success and `None` when
/// the task failed. A failure never propagates as a panic.
pub fn spawn_guarded<F, T, E>(
    notifier: Arc<dyn Notifier>,
    future: F,
) -> tokio::task::JoinHandle<Option<T>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        match future.await {
            Ok(value) => Some(value),
            Err(err) => {
                report_unhandled(notifier.as_ref(), &err);
                None
            }
        }
    })
}

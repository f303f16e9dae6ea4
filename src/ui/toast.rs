//! On-screen toasts that dismiss themselves.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::markup::escape_html;
use crate::api::ApiError;
use crate::notify::{Notifier, Toast};

/// Time a toast keeps fading out after its display duration ends
pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
struct BoardState {
    next_id: u64,
    active: Vec<(u64, Toast)>,
}

/// The set of toasts currently on screen.
///
/// Each shown toast is removed after its duration plus [`FADE_DURATION`].
/// Cloning the board shares the same toasts.
#[derive(Debug, Clone, Default)]
pub struct ToastBoard {
    state: Arc<Mutex<BoardState>>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `toast` and return its id.
    ///
    /// Outside a tokio runtime the toast stays until [`ToastBoard::dismiss`]
    /// is called.
    pub fn show(&self, toast: Toast) -> u64 {
        let lifetime = toast.duration + FADE_DURATION;
        let id = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.next_id += 1;
            let id = state.next_id;
            state.active.push((id, toast));
            id
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let board = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(lifetime).await;
                    board.dismiss(id);
                });
            }
            Err(_) => tracing::debug!(id, "No runtime; toast will not auto-dismiss"),
        }

        id
    }

    /// Remove a toast; returns whether it was still on screen
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.active.len();
        state.active.retain(|(toast_id, _)| *toast_id != id);
        state.active.len() != before
    }

    /// Toasts currently on screen, oldest first
    pub fn active(&self) -> Vec<Toast> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active.iter().map(|(_, toast)| toast.clone()).collect()
    }

    /// Markup for every toast on screen, stacked top-right
    pub fn render(&self) -> String {
        self.active()
            .iter()
            .map(|toast| {
                format!(
                    concat!(
                        r#"<div class="alert alert-{}" style="position: fixed; top: 20px; right: 20px; "#,
                        r#"z-index: 10000; min-width: 300px; "#,
                        r#"box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1);">{}</div>"#
                    ),
                    toast.kind.as_str(),
                    escape_html(&toast.message)
                )
            })
            .collect()
    }
}

impl Notifier for ToastBoard {
    fn diagnostic(&self, endpoint: &str, error: &ApiError) {
        tracing::error!(endpoint, error = %error, "API Error ({})", endpoint);
    }

    fn toast(&self, toast: Toast) {
        self.show(toast);
    }
}

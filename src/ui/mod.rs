//! Presentation helpers.
//!
//! - [`markup`]: HTML banners, badges, progress bars and modal state
//! - [`chart`]: bar chart and sparkline markup
//! - [`ToastBoard`]: toasts with timed auto-dismiss
//! - terminal output for the CLI: colored status lines and [`TerminalNotifier`]

pub mod chart;
pub mod markup;
mod toast;

pub use chart::{bar_chart, sparkline, ChartPoint};
pub use markup::{
    alert, badge, confidence_badge, error_alert, escape_html, loading, progress_bar,
    success_alert, ModalSet,
};
pub use toast::{ToastBoard, FADE_DURATION};

use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::api::ApiError;
use crate::notify::{Notifier, Toast, ToastKind};

/// Check if stderr is a terminal.
pub fn is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Status icons for each notice kind.
pub fn status_icon(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "✓",
        ToastKind::Error => "✗",
        ToastKind::Warning => "⚠",
        ToastKind::Info => "ℹ",
    }
}

/// A status line with a colored icon, or a plain one when `color` is off.
pub fn status_line(kind: ToastKind, message: &str, color: bool) -> String {
    let icon = status_icon(kind);
    if !color {
        return format!("{} {}", icon, message);
    }
    match kind {
        ToastKind::Success => format!("{} {}", icon.green().bold(), message),
        ToastKind::Error => format!("{} {}", icon.red().bold(), message),
        ToastKind::Warning => format!("{} {}", icon.yellow().bold(), message),
        ToastKind::Info => format!("{} {}", icon.cyan().bold(), message),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Notifier for the CLI: diagnostics go to `tracing`, toasts to stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            color: is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn diagnostic(&self, endpoint: &str, error: &ApiError) {
        tracing::error!(endpoint, error = %error, "API Error ({})", endpoint);
    }

    fn toast(&self, toast: Toast) {
        eprintln!("{}", status_line(toast.kind, &toast.message, self.color));
    }
}

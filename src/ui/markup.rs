//! HTML fragments for banners, badges and progress bars.
//!
//! All text arguments are escaped; the output is safe to drop into a page.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::notify::ToastKind;
use crate::utils::{confidence_tone, format_confidence};

/// Badge style used when none is given
pub const DEFAULT_BADGE_KIND: &str = "gray";

/// Progress bar style used when none is given
pub const DEFAULT_PROGRESS_KIND: &str = "primary";

/// Escape text for use inside HTML elements and attributes.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Spinner shown while a request is in flight
pub fn loading() -> String {
    r#"<div class="spinner"></div> Loading..."#.to_string()
}

/// Error banner
pub fn error_alert(message: &str) -> String {
    format!(
        r#"<div class="alert alert-error"><strong>Error:</strong> {}</div>"#,
        escape_html(message)
    )
}

/// Success banner
pub fn success_alert(message: &str) -> String {
    format!(
        r#"<div class="alert alert-success">{}</div>"#,
        escape_html(message)
    )
}

/// Inline badge, e.g. `badge("complete", "success")`
pub fn badge(text: &str, kind: &str) -> String {
    format!(
        r#"<span class="badge badge-{}">{}</span>"#,
        escape_html(kind),
        escape_html(text)
    )
}

/// Badge showing a formatted confidence score in its matching color
pub fn confidence_badge(score: Option<f64>) -> String {
    let kind = score.map(confidence_tone).map_or(DEFAULT_BADGE_KIND, |k| k.as_str());
    badge(&format_confidence(score), kind)
}

/// Horizontal progress bar; `percentage` is clamped to `0..=100`
pub fn progress_bar(percentage: f64, kind: &str) -> String {
    let width = if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    };
    format!(
        r#"<div class="progress-bar"><div class="progress-fill {}" style="width: {}%"></div></div>"#,
        escape_html(kind),
        width
    )
}

/// Banner for a toast of the given kind
pub fn alert(message: &str, kind: ToastKind) -> String {
    format!(
        r#"<div class="alert alert-{}">{}</div>"#,
        kind.as_str(),
        escape_html(message)
    )
}

/// Which modals are currently open.
///
/// Open modals carry the `active` class, mirroring how the page toggles them.
#[derive(Debug, Default, Clone)]
pub struct ModalSet {
    active: HashSet<String>,
}

impl ModalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, modal_id: &str) {
        self.active.insert(modal_id.to_string());
    }

    pub fn hide(&mut self, modal_id: &str) {
        self.active.remove(modal_id);
    }

    pub fn is_active(&self, modal_id: &str) -> bool {
        self.active.contains(modal_id)
    }

    /// Class attribute for the modal element
    pub fn class_list(&self, modal_id: &str) -> &'static str {
        if self.is_active(modal_id) {
            "modal active"
        } else {
            "modal"
        }
    }
}

//! # Article Eater Client
//!
//! Client for the Article Eater research backend: a request pipeline that
//! attaches the stored credential and normalizes failures, typed endpoint
//! calls, and the formatting helpers a dashboard needs to render results.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`api`]: request pipeline, endpoint calls and [`ApiError`]
//! - [`models`]: request bodies (job submissions, provider keys)
//! - [`storage`]: credential stores
//! - [`notify`]: diagnostics and toast notices
//! - [`ui`]: markup, charts, toasts and terminal output
//! - [`utils`]: HTTP client, debounce, DOI extraction and display formatting
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod storage;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use api::{ApiError, ArticleEaterClient, RequestOptions};
pub use notify::{Notifier, Toast, ToastKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

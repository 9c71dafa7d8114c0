//! # KGE-Gen Console
//!
//! Client-side control layer of the KGE-Gen dataset generation console: it
//! authenticates a user, gates navigation by role, and keeps an in-memory
//! view of server-managed tasks and review items synchronized with the
//! backend.
//!
//! ## Features
//!
//! - **Session**: token and profile lifecycle with a degraded mode that keeps
//!   a cached identity while the backend is unreachable
//! - **Navigation guard**: per-route authentication and role checks
//! - **Task store**: wholesale list reconciliation and fault-tolerant polling
//! - **Review workspace**: single, batch and auto review without optimistic
//!   mutation
//!
//! ## Architecture
//!
//! ```text
//! NavigationGuard → SessionManager ─┐
//! TaskStore / ReviewWorkspace ──────┼→ Gateway (HTTP) → console backend
//!                                   │     ↑ BearerAuth, SessionInvalidation
//!                     SQLite (token + user mirror)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kgegen_console::{Config, Console};
//! use kgegen_console::notify::TracingNotifier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let console = Console::open(config, Arc::new(TracingNotifier)).await?;
//!     console.start().await?;
//!     console.tasks.refresh_list().await?;
//!     Ok(())
//! }
//! ```

/// Application state wiring all components together.
pub mod app;
/// Command-line surface.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Working copy of the generation configuration.
pub mod config_store;
/// Error types and result aliases.
pub mod error;
/// HTTP gateway to the console backend.
pub mod gateway;
/// Wire types shared with the backend.
pub mod models;
/// Routes, navigator and the navigation guard.
pub mod navigation;
/// User-facing notifications.
pub mod notify;
/// Review workspace for generated items.
pub mod review;
/// Session state and lifecycle.
pub mod session;
/// Persisted token and user mirror.
pub mod storage;
/// Task reconciliation store and poller.
pub mod tasks;

pub use app::{Console, StartupSession};
pub use config::Config;
pub use error::{AppError, AppResult};

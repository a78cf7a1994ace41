//! Engagement engine for the Clipstream backend: viewer-relative view
//! composition over independent relations (likes, subscriptions, comments,
//! tweets, playlists) and race-safe presence toggles with
//! exactly-one-relation-per-key invariants.
//!
//! Transport, authentication and media handling live in external
//! collaborators; this crate exposes typed operations over a
//! [`context::RequestContext`] and [`repository::Stores`].

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod repository;
pub mod services;

pub use context::RequestContext;
pub use error::{AppError, Result};
pub use repository::Stores;

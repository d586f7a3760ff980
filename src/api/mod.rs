//! # API Module
//!
//! HTTP handlers mounted on the short-lived local listener that receives the
//! OAuth redirect (see [`crate::server`]).
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the redirect from Spotify's authorization page,
//!   checks the `state` parameter and hands the authorization code (or the
//!   reason authorization failed) to the waiting flow.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use genrify::api::{CallbackState, callback};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .layer(Extension(state));
//! ```

mod callback;

pub use callback::{CallbackOutcome, CallbackState, callback};

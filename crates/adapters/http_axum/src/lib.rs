//! # homelink-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **fulfillment webhook** (`POST /fulfillment`) the assistant
//!   cloud calls with SYNC, QUERY, EXECUTE and DISCONNECT intents
//! - Serve **operator endpoints** to reset the account link and to ask for a
//!   fresh SYNC (`POST /link/reset`, `POST /sync`)
//! - Map HTTP requests into application service calls (driving adapter)
//!
//! TLS termination and authentication of the caller happen in front of this
//! router.
//!
//! ## Dependency rule
//! Depends on `homelink-app` (for port traits and services) and
//! `homelink-domain` (for the wire types). Never leaks axum types into the
//! domain.

pub mod error;
pub mod router;
pub mod state;

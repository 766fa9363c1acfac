//! umlforge-client: the studio process
//!
//! Owns the outbound call to the diagram generator, the runtime store the
//! reducer runs in, and the axum server that renders the view, streams
//! snapshots over SSE and accepts browser actions.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod server;
pub mod session;
pub mod store;

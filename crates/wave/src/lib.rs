//! Wave chat server library.
//!
//! Provides the room-based broadcast hub, WebSocket session handling, and the
//! HTTP API around them.

pub mod api;
pub mod auth;
pub mod db;
pub mod message;
pub mod user;
pub mod ws;

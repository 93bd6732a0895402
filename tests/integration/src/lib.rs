//! Integration test utilities for the chat gateway
//!
//! This crate provides helpers for running end-to-end tests against a live
//! gateway over HTTP and WebSocket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

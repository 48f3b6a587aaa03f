//! Integration test utilities for the gateway client
//!
//! This crate provides a scripted gateway running on a local listener so
//! the tests can drive the real WebSocket transport end to end.

pub mod mock_gateway;

pub use mock_gateway::*;

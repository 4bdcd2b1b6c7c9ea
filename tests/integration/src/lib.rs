//! Integration test utilities for the realtime client
//!
//! This crate provides an in-memory transport, a scripted HTTP collaborator, and
//! fixtures for driving the full client stack without a network.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

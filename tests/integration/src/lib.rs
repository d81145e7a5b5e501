//! Integration test utilities for the idea service
//!
//! This crate provides a recording fake of the chat platform and helpers
//! for running the idea lifecycle end to end on in-memory repositories.

pub mod fixtures;
pub mod helpers;
pub mod platform;
pub mod repository;

pub use fixtures::*;
pub use helpers::*;
pub use platform::FakePlatform;
pub use repository::SlowSaveRepository;

//! Test infrastructure for serial hashtag synchronization
//!
//! Provides:
//! - Element and interface fixtures
//! - An in-memory controller that records every API call
//! - Verification helpers over the recorded controller state

mod fake_controller;
pub mod fixtures;
mod verification;

pub use fake_controller::{ControllerCall, FakeController};
pub use fixtures::*;
pub use verification::*;

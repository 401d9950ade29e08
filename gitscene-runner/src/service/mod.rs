//! Service layer
//!
//! Services wire the concrete collaborators of this crate into the core
//! execution model. They are trait-based so callers can swap in their own
//! implementation for testing.

mod execution;

pub use execution::{ExecutionService, StandardExecutionService};

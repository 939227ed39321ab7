//! Path access rule entities.

pub mod rule;

pub use rule::{Effect, Rule, Subject};

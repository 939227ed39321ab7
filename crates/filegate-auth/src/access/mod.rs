//! Path access control.
//!
//! Resolution for a `(source, path, principal)` triple:
//! 1. Collect the source's rules whose prefix covers the path and whose
//!    subject matches the principal.
//! 2. The longest prefix wins.
//! 3. On equal prefixes a user rule beats a group rule, which beats `*`.
//! 4. No matching rule means deny.

pub mod gate;
pub mod policy;

pub use gate::AccessGate;
pub use policy::{PathPolicy, Principal, RuleSet, RuleSetBuilder};

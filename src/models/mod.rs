//! Data shapes consumed by the permission engine.
//!
//! Everything here is a read-only snapshot: the engine never creates, edits or
//! persists roles and assignments.

mod assignment;
mod key;
pub mod raw;
mod role;
mod rule;
mod user;
mod validators;

pub use assignment::*;
pub use key::*;
pub use role::*;
pub use rule::*;
pub use user::*;
pub use validators::*;
